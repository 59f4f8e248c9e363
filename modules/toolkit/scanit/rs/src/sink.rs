use std::path::PathBuf;

use ahash::AHashMap;
use derive_getters::Getters;
use eyre::{ensure, OptionExt, Result};

use lociscan_core_rs::loc::Chromosome;
use lociscan_io_rs::track::{self, Track, TrackValue};

/// Receiver of finalized locus values.
///
/// For each chromosome the scanner calls `start_chromosome`, then `emit` for finalized loci in
/// ascending position order, then `finish_chromosome`. Positions that were never emitted hold
/// the default value passed at the start.
pub trait LocusSink<V> {
    fn start_chromosome(&mut self, chromosome: &Chromosome, default: V) -> Result<()>;

    fn emit(&mut self, position: u32, value: V) -> Result<()>;

    fn finish_chromosome(&mut self, chromosome: &Chromosome) -> Result<()>;
}

struct PendingTrack<V: TrackValue> {
    chromosome: Chromosome,
    default: V,
    track: Track<V>,
    // Next position to be written, one past the chromosome end once complete
    next: u64,
}

impl<V: TrackValue> PendingTrack<V> {
    fn pad_to(&mut self, position: u64) {
        if position > self.next {
            // At most u32::MAX positions are padded on a chromosome that fits u32 coordinates
            self.track.append(self.default, (position - self.next) as u32);
            self.next = position;
        }
    }
}

/// Streams values into run-length encoded tracks and saves one file per chromosome.
#[derive(Getters)]
pub struct TrackSink<V: TrackValue> {
    writer: track::Writer,
    #[getter(skip)]
    current: Option<PendingTrack<V>>,
    written: Vec<PathBuf>,
}

impl<V: TrackValue> TrackSink<V> {
    pub fn new(writer: track::Writer) -> Self {
        Self {
            writer,
            current: None,
            written: Vec::new(),
        }
    }
}

impl<V: TrackValue> LocusSink<V> for TrackSink<V> {
    fn start_chromosome(&mut self, chromosome: &Chromosome, default: V) -> Result<()> {
        ensure!(
            self.current.is_none(),
            "Track for {} is still open",
            chromosome.name()
        );
        self.current = Some(PendingTrack {
            chromosome: chromosome.clone(),
            default,
            track: track::empty(),
            next: 1,
        });
        Ok(())
    }

    fn emit(&mut self, position: u32, value: V) -> Result<()> {
        let pending = self
            .current
            .as_mut()
            .ok_or_eyre("Value emitted outside of a chromosome")?;
        ensure!(
            u64::from(position) >= pending.next && pending.chromosome.contains(position),
            "Position {position} is out of order or outside of {}",
            pending.chromosome
        );

        pending.pad_to(u64::from(position));
        pending.track.append(value, 1);
        pending.next = u64::from(position) + 1;
        Ok(())
    }

    fn finish_chromosome(&mut self, chromosome: &Chromosome) -> Result<()> {
        let mut pending = self
            .current
            .take()
            .ok_or_eyre(format!("Track for {} was never started", chromosome.name()))?;
        ensure!(
            pending.chromosome == *chromosome,
            "Track for {} can't be finished as {}",
            pending.chromosome,
            chromosome
        );

        pending.pad_to(u64::from(*chromosome.length()) + 1);
        let path = self.writer.write(chromosome.name(), &pending.track)?;
        self.written.push(path);
        Ok(())
    }
}

/// Keeps dense per-position values of every chromosome in memory.
#[derive(Clone, Debug, Default)]
pub struct DenseSink<V> {
    tracks: AHashMap<String, Vec<V>>,
    current: Option<String>,
}

impl<V> DenseSink<V> {
    pub fn new() -> Self {
        Self {
            tracks: AHashMap::new(),
            current: None,
        }
    }

    pub fn get(&self, chromosome: &str) -> Option<&[V]> {
        self.tracks.get(chromosome).map(|x| x.as_slice())
    }

    pub fn into_inner(self) -> AHashMap<String, Vec<V>> {
        self.tracks
    }
}

impl<V: Copy> LocusSink<V> for DenseSink<V> {
    fn start_chromosome(&mut self, chromosome: &Chromosome, default: V) -> Result<()> {
        self.tracks.insert(
            chromosome.name().clone(),
            vec![default; *chromosome.length() as usize],
        );
        self.current = Some(chromosome.name().clone());
        Ok(())
    }

    fn emit(&mut self, position: u32, value: V) -> Result<()> {
        let values = self
            .current
            .as_ref()
            .and_then(|x| self.tracks.get_mut(x))
            .ok_or_eyre("Value emitted outside of a chromosome")?;
        let slot = position
            .checked_sub(1)
            .and_then(|ind| values.get_mut(ind as usize))
            .ok_or_eyre(format!("Position {position} is outside of the chromosome"))?;
        *slot = value;
        Ok(())
    }

    fn finish_chromosome(&mut self, _: &Chromosome) -> Result<()> {
        self.current = None;
        Ok(())
    }
}

/// Drops all values, for flavors that only accumulate state inside the model.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Discard;

impl<V> LocusSink<V> for Discard {
    fn start_chromosome(&mut self, _: &Chromosome, _: V) -> Result<()> {
        Ok(())
    }

    fn emit(&mut self, _: u32, _: V) -> Result<()> {
        Ok(())
    }

    fn finish_chromosome(&mut self, _: &Chromosome) -> Result<()> {
        Ok(())
    }
}
