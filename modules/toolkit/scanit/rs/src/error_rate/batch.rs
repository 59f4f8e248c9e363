use std::io::Read;
use std::path::{Path, PathBuf};

use derive_getters::{Dissolve, Getters};
use eyre::{Result, WrapErr};
use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use lociscan_core_rs::parallelism;
use lociscan_io_rs::bam;
use lociscan_io_rs::fasta::{FastaReference, ReferenceSequences};

use super::config::ErrorRateConfig;
use super::evaluator::ErrorRateModel;
use super::matrix::ErrorConfusionMatrix;
use crate::config::ScanConfig;
use crate::scanner::ChromosomeScanner;
use crate::sink::Discard;
use crate::stats::ScanStats;

/// Confusion matrix of a single alignment file.
#[derive(Clone, Debug, PartialEq, Dissolve, Getters)]
pub struct ErrorRateReport {
    label: String,
    matrix: ErrorConfusionMatrix,
    stats: ScanStats,
}

impl ErrorRateReport {
    /// Genome-wide matrix over all reports.
    pub fn merged<'a>(reports: impl IntoIterator<Item = &'a ErrorRateReport>) -> ErrorConfusionMatrix {
        let mut result = ErrorConfusionMatrix::default();
        for report in reports {
            result.merge(&report.matrix);
        }
        result
    }
}

/// Evaluates error rates of several alignment files in parallel, one scanner per file.
#[derive(Clone, Debug, Getters)]
pub struct ErrorRateBatch {
    scan: ScanConfig,
    config: ErrorRateConfig,
    threads: isize,
}

impl ErrorRateBatch {
    pub fn new(scan: ScanConfig, config: ErrorRateConfig) -> Self {
        Self {
            scan,
            config,
            threads: -1,
        }
    }

    /// Number of worker threads, see [parallelism::threads].
    pub fn with_threads(mut self, threads: isize) -> Self {
        self.threads = threads;
        self
    }

    /// Scan an open BAM stream against the reference.
    pub fn evaluate<R: Read>(
        &self,
        label: impl Into<String>,
        reader: bam::Reader<R>,
        reference: &mut dyn ReferenceSequences,
    ) -> Result<ErrorRateReport> {
        let label = label.into();
        let chromosomes = reader.chromosomes()?;
        let mut scanner = ChromosomeScanner::new(
            ErrorRateModel::new(self.config.clone()),
            self.scan.clone(),
            chromosomes,
        );
        let stats = scanner
            .run_with_reference(reader, reference, &mut Discard)
            .wrap_err_with(|| format!("Error-rate evaluation failed for {label}"))?;

        let model = scanner.into_model();
        info!(
            "{label}: {} loci accumulated, {} variant loci and {} low depth loci skipped",
            model.accumulated(),
            model.variants(),
            model.low_depth()
        );
        Ok(ErrorRateReport {
            label,
            matrix: model.into_matrix(),
            stats,
        })
    }

    /// Evaluate each (alignments, reference) pair of files. Reports keep the input order and are
    /// labeled by the alignment path.
    pub fn run(&self, inputs: &[(PathBuf, PathBuf)]) -> Result<Vec<ErrorRateReport>> {
        let threads = parallelism::threads(self.threads)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.min(inputs.len().max(1)))
            .build()
            .wrap_err("Failed to start the thread pool")?;

        pool.install(|| {
            inputs
                .par_iter()
                .map(|(alignments, reference)| self.evaluate_files(alignments, reference))
                .collect()
        })
    }

    fn evaluate_files(&self, alignments: &Path, reference: &Path) -> Result<ErrorRateReport> {
        let reader = bam::Reader::from_path(alignments)?;
        let mut reference = FastaReference::from_path(reference)?;
        self.evaluate(alignments.display().to_string(), reader, &mut reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lociscan_core_rs::ngs::Base;

    #[test]
    fn test_merged_reports() {
        let report = |label: &str, counts: [u32; Base::COUNT]| {
            let mut matrix = ErrorConfusionMatrix::default();
            matrix.add(Base::G, &counts);
            ErrorRateReport {
                label: label.to_string(),
                matrix,
                stats: ScanStats::default(),
            }
        };
        let reports = [report("a.bam", [1, 0, 0, 9, 0]), report("b.bam", [0, 0, 0, 10, 0])];

        let merged = ErrorRateReport::merged(&reports);
        assert_eq!(merged.eligible(Base::G), 20);
        assert_eq!(merged.errors(Base::G, Base::A), 1);
        assert_eq!(merged.rate(Base::G, Base::A), 0.05);
    }

    #[test]
    fn test_missing_inputs() -> Result<()> {
        let batch = ErrorRateBatch::new(ScanConfig::default(), ErrorRateConfig::default())
            .with_threads(2);
        let inputs = [(
            PathBuf::from("/nonexistent/reads.bam"),
            PathBuf::from("/nonexistent/genome.fa"),
        )];
        assert!(batch.run(&inputs).is_err());
        assert!(batch.run(&[])?.is_empty());
        Ok(())
    }
}
