use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::info;

use lociscan_io_rs::bam;
use lociscan_io_rs::compression::encode;
use lociscan_io_rs::track::{self, TrackValue};

use crate::config::ScanConfig;
use crate::error_rate::{write_table, ErrorRateBatch, ErrorRateReport};
use crate::scanner::{ChromosomeScanner, LocusModel};
use crate::sink::TrackSink;
use crate::stats::ScanStats;

/// Scan a BAM file and save the model values as one track file per chromosome in `output`.
/// Returns the scan statistics and the written files.
pub fn scan_to_tracks<M>(
    model: M,
    config: ScanConfig,
    alignments: impl AsRef<Path>,
    output: impl Into<PathBuf>,
) -> Result<(ScanStats, Vec<PathBuf>)>
where
    M: LocusModel,
    M::Value: TrackValue,
{
    let alignments = alignments.as_ref();
    let reader = bam::Reader::from_path(alignments)?;
    let chromosomes = reader.chromosomes()?;

    let writer = track::Writer::new(output)?;
    info!(
        "Saving {} tracks for {} to {}",
        model.name(),
        alignments.display(),
        writer.directory().display()
    );

    let mut sink = TrackSink::new(writer);
    let mut scanner = ChromosomeScanner::new(model, config, chromosomes);
    let stats = scanner
        .run(reader, &mut sink)
        .wrap_err_with(|| format!("Failed to scan {}", alignments.display()))?;
    Ok((stats, sink.written().clone()))
}

/// Evaluate the error rates of all inputs and save them as a table, compressed if the output
/// path ends with `.gz`.
pub fn error_rate_table(
    batch: &ErrorRateBatch,
    inputs: &[(PathBuf, PathBuf)],
    output: impl AsRef<Path>,
) -> Result<Vec<ErrorRateReport>> {
    let output = output.as_ref();
    let reports = batch.run(inputs)?;

    let file = File::create(output)
        .wrap_err_with(|| format!("Failed to create {}", output.display()))?;
    let mut stream = BufWriter::new(encode::Stream::new(
        file,
        &encode::Config::infer_from_path(output),
    )?);
    write_table(
        &mut stream,
        reports.iter().map(|x| (x.label().as_str(), x.matrix())),
    )?;
    stream
        .into_inner()
        .map_err(|err| err.into_error())?
        .finish()
        .wrap_err_with(|| format!("Failed to finalize {}", output.display()))?;

    info!("Error rates for {} file(s) saved to {}", reports.len(), output.display());
    Ok(reports)
}
