use derive_getters::Getters;
use eyre::{bail, ensure, OptionExt, Result, WrapErr};
use log::{debug, info, warn};

use lociscan_core_rs::loc::{Chromosome, Strand};
use lociscan_io_rs::bam::AlignmentRecord;
use lociscan_io_rs::fasta::{ReferenceSequence, ReferenceSequences};

use crate::cache::LocusCache;
use crate::config::ScanConfig;
use crate::mapping::{overlap_start, ReadLayout};
use crate::sink::LocusSink;
use crate::stats::ScanStats;
use crate::trimming::{EdgeTrimmer, TrimmedRead};

/// Chromosome currently being scanned.
#[derive(Clone, Copy, Debug)]
pub struct ChromosomeContext<'a> {
    pub chromosome: &'a Chromosome,
    /// Present only for models that request a reference.
    pub reference: Option<&'a ReferenceSequence>,
}

/// A filtered read ready to contribute to loci.
#[derive(Clone, Copy, Debug)]
pub struct ScanRead<'a> {
    pub record: &'a AlignmentRecord,
    pub layout: &'a ReadLayout,
    /// Trimmed copy of the read, its positions are the ones to contribute.
    pub trimmed: &'a TrimmedRead,
    /// Positions at or after this one are left to the mate.
    pub overlap_start: Option<u32>,
    pub strand: Strand,
}

impl ScanRead<'_> {
    /// Whether the read is allowed to contribute to the 1-based position.
    #[inline]
    pub fn contributes(&self, position: u32) -> bool {
        self.overlap_start.is_none_or(|start| position < start)
    }

    /// (read index, reference position) of every contributing aligned base after trimming.
    pub fn aligned(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.trimmed
            .positions()
            .iter()
            .enumerate()
            .filter_map(|(ind, pos)| pos.reference().map(|pos| (ind, pos)))
            .filter(|(_, pos)| self.contributes(*pos))
    }
}

/// A scanner flavor: how reads contribute to loci and how finalized loci become values.
pub trait LocusModel {
    type Locus: Default;
    type Value: Copy;

    fn name(&self) -> &'static str;

    /// Models that compare loci against the reference sequence must be run with one.
    fn needs_reference(&self) -> bool {
        false
    }

    /// Value of loci without any contribution.
    fn default_value(&self) -> Self::Value;

    /// Flavor-specific record eligibility, applied after the read filter.
    fn is_eligible(&self, _record: &AlignmentRecord) -> bool {
        true
    }

    fn contribute(
        &mut self,
        ctx: &ChromosomeContext,
        read: &ScanRead,
        cache: &mut LocusCache<Self::Locus>,
    );

    /// Turn a drained locus into its value. `None` skips the locus, an error is logged and the
    /// locus is skipped as well.
    fn finalize(
        &mut self,
        ctx: &ChromosomeContext,
        position: u32,
        locus: Self::Locus,
    ) -> Result<Option<Self::Value>>;
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ScanState {
    #[default]
    Idle,
    InChromosome {
        tid: usize,
    },
    Done,
}

/// Single pass of a [LocusModel] over a coordinate-sorted record stream.
#[derive(Getters)]
pub struct ChromosomeScanner<M: LocusModel> {
    model: M,
    config: ScanConfig,
    chromosomes: Vec<Chromosome>,
    state: ScanState,
    stats: ScanStats,
    #[getter(skip)]
    trimmer: EdgeTrimmer,
    #[getter(skip)]
    cache: LocusCache<M::Locus>,
    #[getter(skip)]
    touched: Vec<bool>,
    #[getter(skip)]
    reference: Option<ReferenceSequence>,
    #[getter(skip)]
    entered: ScanStats,
    #[getter(skip)]
    layout: ReadLayout,
    #[getter(skip)]
    trimmed: TrimmedRead,
}

impl<M: LocusModel> ChromosomeScanner<M> {
    /// Scanner over records aligned to the given chromosomes, in the record stream order.
    pub fn new(model: M, config: ScanConfig, chromosomes: Vec<Chromosome>) -> Self {
        let trimmer = EdgeTrimmer::new(*config.trim());
        let cache = LocusCache::new(*config.window());
        let touched = vec![false; chromosomes.len()];
        Self {
            model,
            config,
            chromosomes,
            state: ScanState::Idle,
            stats: ScanStats::default(),
            trimmer,
            cache,
            touched,
            reference: None,
            entered: ScanStats::default(),
            layout: ReadLayout::default(),
            trimmed: TrimmedRead::default(),
        }
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Scan all records and emit every locus of every chromosome into the sink.
    pub fn run<S: LocusSink<M::Value>>(
        &mut self,
        records: impl IntoIterator<Item = Result<AlignmentRecord>>,
        sink: &mut S,
    ) -> Result<ScanStats> {
        ensure!(
            !self.model.needs_reference(),
            "The {} scanner requires a reference sequence",
            self.model.name()
        );
        self.scan(records, None, sink)
    }

    /// Same as [ChromosomeScanner::run], with the reference consumed in the chromosome order.
    pub fn run_with_reference<S: LocusSink<M::Value>>(
        &mut self,
        records: impl IntoIterator<Item = Result<AlignmentRecord>>,
        reference: &mut dyn ReferenceSequences,
        sink: &mut S,
    ) -> Result<ScanStats> {
        self.scan(records, Some(reference), sink)
    }

    fn scan<S: LocusSink<M::Value>>(
        &mut self,
        records: impl IntoIterator<Item = Result<AlignmentRecord>>,
        mut reference: Option<&mut dyn ReferenceSequences>,
        sink: &mut S,
    ) -> Result<ScanStats> {
        ensure!(
            self.state == ScanState::Idle,
            "The {} scanner can be run only once",
            self.model.name()
        );

        for record in records {
            let record = record?;
            self.stats.records += 1;
            self.stats.malformed_ops += *record.malformed_ops() as u64;

            if !self.config.filter().accepts(&record) || !self.model.is_eligible(&record) {
                self.stats.filtered += 1;
                continue;
            }
            let tid = record
                .reference_id()
                .ok_or_eyre(format!("Mapped record {} has no reference", record.name()))?;

            if self.state != (ScanState::InChromosome { tid }) {
                self.leave(sink)?;
                self.enter(tid, &record, &mut reference, sink)?;
            }
            self.process(&record);

            if self.cache.should_drain() {
                let bound = self.cache.drain_bound();
                self.drain(Some(bound), sink)?;
            }
        }
        self.leave(sink)?;
        self.sweep(sink)?;

        self.state = ScanState::Done;
        info!("{} scan finished: {}", self.model.name(), self.stats);
        Ok(self.stats)
    }

    fn enter<S: LocusSink<M::Value>>(
        &mut self,
        tid: usize,
        record: &AlignmentRecord,
        reference: &mut Option<&mut dyn ReferenceSequences>,
        sink: &mut S,
    ) -> Result<()> {
        let chromosome = self.chromosomes.get(tid).ok_or_eyre(format!(
            "Record {} refers to reference sequence #{tid}, but only {} are declared",
            record.name(),
            self.chromosomes.len()
        ))?;
        ensure!(
            !self.touched[tid],
            "Records for {} are not contiguous, the stream must be sorted by coordinate",
            chromosome.name()
        );

        self.reference = match reference {
            Some(reference) => Some(
                reference
                    .advance_to(chromosome.name(), *chromosome.length())
                    .wrap_err_with(|| {
                        format!("Failed to load the reference sequence for {chromosome}")
                    })?,
            ),
            None if self.model.needs_reference() => {
                bail!("The {} scanner requires a reference sequence", self.model.name())
            }
            None => None,
        };

        self.cache.reset(*chromosome.length());
        self.touched[tid] = true;
        sink.start_chromosome(chromosome, self.model.default_value())?;

        info!("Scanning {chromosome} [{}]", self.model.name());
        self.stats.chromosomes_scanned += 1;
        self.entered = self.stats;
        self.state = ScanState::InChromosome { tid };
        Ok(())
    }

    fn process(&mut self, record: &AlignmentRecord) {
        let ScanState::InChromosome { tid } = self.state else {
            return;
        };
        let chromosome = &self.chromosomes[tid];

        let mut layout = std::mem::take(&mut self.layout);
        let mut trimmed = std::mem::take(&mut self.trimmed);

        layout.remap(*record.start(), record.cigar(), record.read_length());
        if *layout.skipped_ops() > 0 {
            warn!(
                "Record {} at {}:{} has {} CIGAR operation(s) overrunning the read, truncated",
                record.name(),
                chromosome.name(),
                record.start(),
                layout.skipped_ops()
            );
            self.stats.malformed_ops += *layout.skipped_ops() as u64;
        }
        self.cache.observe_span(layout.reference_span());
        self.trimmer.trim_into(
            record.bases(),
            record.qualities(),
            layout.positions(),
            &mut trimmed,
        );

        let overlap = if *self.config.skip_mate_overlap() {
            overlap_start(record, *layout.end())
        } else {
            None
        };
        let read = ScanRead {
            record,
            layout: &layout,
            trimmed: &trimmed,
            overlap_start: overlap,
            strand: record.strand(),
        };
        let ctx = ChromosomeContext {
            chromosome,
            reference: self.reference.as_ref(),
        };
        self.model.contribute(&ctx, &read, &mut self.cache);
        self.stats.used += 1;

        self.layout = layout;
        self.trimmed = trimmed;
    }

    /// Drain the cache up to the bound, or completely if there is none.
    fn drain<S: LocusSink<M::Value>>(&mut self, upto: Option<u32>, sink: &mut S) -> Result<()> {
        let ScanState::InChromosome { tid } = self.state else {
            return Ok(());
        };
        let ctx = ChromosomeContext {
            chromosome: &self.chromosomes[tid],
            reference: self.reference.as_ref(),
        };
        let drained = drain_into(
            &mut self.model,
            &mut self.cache,
            &ctx,
            upto,
            sink,
            &mut self.stats,
        )?;
        debug!(
            "Drained {drained} loci of {} up to {}",
            ctx.chromosome.name(),
            self.cache.drain_frontier()
        );
        Ok(())
    }

    fn leave<S: LocusSink<M::Value>>(&mut self, sink: &mut S) -> Result<()> {
        let ScanState::InChromosome { tid } = self.state else {
            return Ok(());
        };
        self.drain(None, sink)?;

        let chromosome = &self.chromosomes[tid];
        let late = *self.cache.late();
        if late > 0 {
            warn!(
                "{late} contribution(s) to already finalized loci of {} were dropped, \
                 the cache window ({}) is too small for this data",
                chromosome.name(),
                self.cache.effective_window()
            );
            self.stats.late_contributions += late as u64;
        }
        sink.finish_chromosome(chromosome)?;

        info!(
            "Finished {}: {} records, {} loci emitted, {} failed",
            chromosome.name(),
            self.stats.used - self.entered.used,
            self.stats.loci_emitted - self.entered.loci_emitted,
            self.stats.loci_failed - self.entered.loci_failed
        );
        self.reference = None;
        self.state = ScanState::Idle;
        Ok(())
    }

    /// Emit default-valued results for chromosomes without eligible records.
    fn sweep<S: LocusSink<M::Value>>(&mut self, sink: &mut S) -> Result<()> {
        for (chromosome, touched) in self.chromosomes.iter().zip(self.touched.iter_mut()) {
            if *touched {
                continue;
            }
            sink.start_chromosome(chromosome, self.model.default_value())?;
            sink.finish_chromosome(chromosome)?;
            *touched = true;

            debug!("No eligible records for {chromosome}, emitted default values");
            self.stats.chromosomes_swept += 1;
        }
        Ok(())
    }
}

fn drain_into<M: LocusModel, S: LocusSink<M::Value>>(
    model: &mut M,
    cache: &mut LocusCache<M::Locus>,
    ctx: &ChromosomeContext,
    upto: Option<u32>,
    sink: &mut S,
    stats: &mut ScanStats,
) -> Result<usize> {
    let finalize = |position: u32, locus: M::Locus| -> Result<()> {
        match model.finalize(ctx, position, locus) {
            Ok(Some(value)) => {
                sink.emit(position, value)?;
                stats.loci_emitted += 1;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    "Failed to finalize {}:{position} [{}]: {err:#}",
                    ctx.chromosome.name(),
                    model.name()
                );
                stats.loci_failed += 1;
            }
        }
        Ok(())
    };

    match upto {
        Some(upto) => cache.drain(upto, finalize),
        None => cache.drain_all(finalize),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locus::DepthCounter;
    use crate::sink::DenseSink;

    /// Counts reads per position and fails on a configurable position.
    struct Depth {
        broken: u32,
    }

    impl LocusModel for Depth {
        type Locus = DepthCounter;
        type Value = u32;

        fn name(&self) -> &'static str {
            "depth"
        }

        fn default_value(&self) -> u32 {
            0
        }

        fn contribute(
            &mut self,
            _: &ChromosomeContext,
            read: &ScanRead,
            cache: &mut LocusCache<DepthCounter>,
        ) {
            for (_, pos) in read.aligned() {
                cache.fill(pos, |x| x.add());
            }
        }

        fn finalize(
            &mut self,
            _: &ChromosomeContext,
            position: u32,
            locus: DepthCounter,
        ) -> Result<Option<u32>> {
            ensure!(position != self.broken, "Broken locus");
            Ok(Some(locus.depth()))
        }
    }

    fn chromosomes() -> Result<Vec<Chromosome>> {
        Ok(vec![
            Chromosome::new("chr1", 10)?,
            Chromosome::new("chr2", 6)?,
            Chromosome::new("chr3", 4)?,
        ])
    }

    fn read(tid: usize, start: u32, cigar: &str, bases: &str) -> Result<AlignmentRecord> {
        AlignmentRecord::from_text(tid, start, cigar, bases)
    }

    fn scanner(broken: u32) -> Result<ChromosomeScanner<Depth>> {
        Ok(ChromosomeScanner::new(
            Depth { broken },
            ScanConfig::builder().with_window(2).build()?,
            chromosomes()?,
        ))
    }

    #[test]
    fn test_scan() -> Result<()> {
        let records = vec![
            read(0, 1, "3M", "ACG"),
            read(0, 2, "2M2D1M", "ACG"),
            read(0, 8, "2S3M", "AACGT"),
            Ok(read(0, 3, "2M", "AC")?.with_flags(lociscan_io_rs::bam::Flags::DUPLICATE)),
            read(2, 2, "3M", "TTT"),
        ];

        let mut sink = DenseSink::new();
        let mut scanner = scanner(0)?;
        let stats = scanner.run(records, &mut sink)?;

        assert_eq!(sink.get("chr1"), Some([1, 2, 2, 0, 0, 1, 0, 1, 1, 1].as_slice()));
        assert_eq!(sink.get("chr2"), Some([0; 6].as_slice()));
        assert_eq!(sink.get("chr3"), Some([0, 1, 1, 1].as_slice()));

        assert_eq!(*stats.records(), 5);
        assert_eq!(*stats.filtered(), 1);
        assert_eq!(*stats.used(), 4);
        assert_eq!(*stats.chromosomes_scanned(), 2);
        assert_eq!(*stats.chromosomes_swept(), 1);
        assert_eq!(*stats.loci_emitted(), 10);
        assert_eq!(*scanner.state(), ScanState::Done);

        // A scanner is single-use
        assert!(scanner.run(Vec::new(), &mut sink).is_err());
        Ok(())
    }

    #[test]
    fn test_failed_locus_is_skipped() -> Result<()> {
        let mut sink = DenseSink::new();
        let stats = scanner(2)?.run(vec![read(0, 1, "3M", "ACG")], &mut sink)?;
        assert_eq!(sink.get("chr1"), Some([1, 0, 1, 0, 0, 0, 0, 0, 0, 0].as_slice()));
        assert_eq!(*stats.loci_failed(), 1);
        assert_eq!(*stats.loci_emitted(), 2);
        Ok(())
    }

    #[test]
    fn test_fatal_streams() -> Result<()> {
        for records in [
            // Returns to a finished chromosome
            vec![read(0, 1, "2M", "AC"), read(1, 1, "2M", "AC"), read(0, 5, "2M", "AC")],
            // Unknown reference sequence
            vec![read(5, 1, "2M", "AC")],
            // Broken input
            vec![read(0, 1, "2M", "AC"), Err(eyre::eyre!("I/O error"))],
        ] {
            let mut sink = DenseSink::new();
            assert!(scanner(0)?.run(records, &mut sink).is_err());
        }
        Ok(())
    }

    #[test]
    fn test_drains_while_scanning() -> Result<()> {
        let chromosomes = vec![Chromosome::new("chr1", 1000)?];
        let mut scanner = ChromosomeScanner::new(
            Depth { broken: 0 },
            ScanConfig::builder().with_window(4).build()?,
            chromosomes,
        );

        let records = (0..100).map(|x| read(0, 1 + x * 5, "5M", "ACGTA"));
        let mut sink = DenseSink::new();
        let stats = scanner.run(records, &mut sink)?;

        let mut expected = vec![1u32; 500];
        expected.extend(vec![0; 500]);
        assert_eq!(sink.get("chr1"), Some(expected.as_slice()));
        assert_eq!(*stats.late_contributions(), 0);
        assert_eq!(*stats.loci_emitted(), 500);
        Ok(())
    }

    #[test]
    fn test_mate_overlap() -> Result<()> {
        use lociscan_io_rs::bam::Flags;

        let first = Flags::SEGMENTED | Flags::FIRST_SEGMENT;
        let last = Flags::SEGMENTED | Flags::LAST_SEGMENT;
        let records = || -> Result<Vec<Result<AlignmentRecord>>> {
            Ok(vec![
                Ok(read(0, 1, "5M", "ACGTA")?.with_flags(first).with_mate(0, 3)),
                Ok(read(0, 3, "5M", "GTACG")?.with_flags(last).with_mate(0, 1)),
            ])
        };

        for (skip, expected) in [
            (false, [1, 1, 2, 2, 2, 1, 1, 0, 0, 0]),
            (true, [1, 1, 1, 1, 1, 1, 1, 0, 0, 0]),
        ] {
            let mut scanner = ChromosomeScanner::new(
                Depth { broken: 0 },
                ScanConfig::builder()
                    .with_skip_mate_overlap(skip)
                    .build()?,
                chromosomes()?,
            );
            let mut sink = DenseSink::new();
            scanner.run(records()?, &mut sink)?;
            assert_eq!(sink.get("chr1"), Some(expected.as_slice()), "{skip}");
        }
        Ok(())
    }
}
