use derive_getters::Getters;
use eyre::{OptionExt, Result};

use lociscan_core_rs::ngs::Base;

use super::config::ErrorRateConfig;
use super::matrix::ErrorConfusionMatrix;
use crate::cache::LocusCache;
use crate::locus::{BaseEvidence, EvidenceList};
use crate::scanner::{ChromosomeContext, LocusModel, ScanRead};

/// Outcome of evaluating a single locus.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum LocusVerdict {
    /// No reads reached the locus.
    #[default]
    Uncovered,
    /// The reference base is ambiguous.
    NoReference,
    LowDepth,
    /// Too many alternative calls to be sequencing errors.
    Variant,
    Accumulated,
}

/// Classify the locus and, unless it is skipped, add its filtered counts to the matrix.
pub fn accumulate(
    config: &ErrorRateConfig,
    reference: Base,
    evidence: &EvidenceList,
    matrix: &mut ErrorConfusionMatrix,
) -> LocusVerdict {
    if reference.is_n() {
        return LocusVerdict::NoReference;
    }
    if evidence.depth() < *config.min_depth() as usize {
        return LocusVerdict::LowDepth;
    }

    let counts = evidence.coverage_counts(config.filter());
    let combined = counts.combined();
    let total: u32 = Base::ACGT.iter().map(|x| combined[x.index()]).sum();
    if total == 0 {
        return LocusVerdict::LowDepth;
    }

    let alternative = total - combined[reference.index()];
    if alternative > *config.max_error_depth()
        && alternative as f32 / total as f32 > *config.max_allelic_fraction()
    {
        return LocusVerdict::Variant;
    }

    if *config.stranded() {
        matrix.add(reference, &counts.counts.forward);

        // Reverse strand reads are tallied in the orientation they were sequenced in
        let mut complemented = [0; Base::COUNT];
        for base in Base::ALL {
            complemented[base.complement().index()] = counts.counts.reverse[base.index()];
        }
        matrix.add(reference.complement(), &complemented);
    } else {
        matrix.add(reference, &combined);
    }
    LocusVerdict::Accumulated
}

/// Collects base evidence per locus and accumulates the confusion matrix when loci are drained.
#[derive(Clone, Debug, Getters)]
pub struct ErrorRateModel {
    config: ErrorRateConfig,
    matrix: ErrorConfusionMatrix,
    accumulated: u64,
    variants: u64,
    low_depth: u64,
}

impl ErrorRateModel {
    pub fn new(config: ErrorRateConfig) -> Self {
        Self {
            config,
            matrix: ErrorConfusionMatrix::default(),
            accumulated: 0,
            variants: 0,
            low_depth: 0,
        }
    }

    pub fn into_matrix(self) -> ErrorConfusionMatrix {
        self.matrix
    }
}

impl LocusModel for ErrorRateModel {
    type Locus = EvidenceList;
    type Value = LocusVerdict;

    fn name(&self) -> &'static str {
        "error-rate"
    }

    fn needs_reference(&self) -> bool {
        true
    }

    fn default_value(&self) -> LocusVerdict {
        LocusVerdict::Uncovered
    }

    fn contribute(
        &mut self,
        ctx: &ChromosomeContext,
        read: &ScanRead,
        cache: &mut LocusCache<EvidenceList>,
    ) {
        let bases = read.trimmed.bases();
        let length = read.trimmed.len();
        let mapq = *read.record.mapq();

        for (ind, position) in read.aligned() {
            if !self.config.in_scope(ctx.chromosome.name(), position) {
                continue;
            }
            let evidence = BaseEvidence::at(
                Base::from_ascii(bases[ind]),
                read.strand,
                read.trimmed.quality(ind).unwrap_or(u8::MAX),
                mapq,
                ind,
                length,
            );
            cache.fill(position, |x| x.push(evidence));
        }
    }

    fn finalize(
        &mut self,
        ctx: &ChromosomeContext,
        position: u32,
        locus: EvidenceList,
    ) -> Result<Option<LocusVerdict>> {
        let reference = ctx
            .reference
            .ok_or_eyre("Reference sequence is not loaded")?
            .base_at(position)?;

        let verdict = accumulate(&self.config, reference, &locus, &mut self.matrix);
        match verdict {
            LocusVerdict::Accumulated => self.accumulated += 1,
            LocusVerdict::Variant => self.variants += 1,
            LocusVerdict::LowDepth => self.low_depth += 1,
            LocusVerdict::Uncovered | LocusVerdict::NoReference => {}
        }
        Ok(Some(verdict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locus::EvidenceFilter;
    use lociscan_core_rs::loc::Strand;

    fn evidence(calls: &[(Base, Strand, u32)]) -> EvidenceList {
        let mut list = EvidenceList::default();
        for (base, strand, times) in calls {
            for _ in 0..*times {
                list.push(BaseEvidence::at(*base, *strand, 30, 60, 10, 50));
            }
        }
        list
    }

    #[test]
    fn test_unstranded_accumulation() -> eyre::Result<()> {
        let config = ErrorRateConfig::builder()
            .with_max_error_depth(3)
            .with_max_allelic_fraction(0.1)
            .build()?;
        let mut matrix = ErrorConfusionMatrix::default();

        let locus = evidence(&[(Base::A, Strand::Forward, 18), (Base::T, Strand::Reverse, 2)]);
        assert_eq!(
            accumulate(&config, Base::A, &locus, &mut matrix),
            LocusVerdict::Accumulated
        );
        assert_eq!(matrix.eligible(Base::A), 20);
        assert_eq!(matrix.errors(Base::A, Base::T), 2);
        Ok(())
    }

    #[test]
    fn test_verdicts() -> eyre::Result<()> {
        let config = ErrorRateConfig::default();
        for (reference, calls, expected) in [
            (Base::N, vec![(Base::A, Strand::Forward, 20)], LocusVerdict::NoReference),
            (Base::A, vec![(Base::A, Strand::Forward, 9)], LocusVerdict::LowDepth),
            (Base::A, vec![(Base::N, Strand::Forward, 12)], LocusVerdict::LowDepth),
            // 4 alternative calls, 20% allelic fraction
            (
                Base::C,
                vec![(Base::C, Strand::Forward, 16), (Base::G, Strand::Forward, 4)],
                LocusVerdict::Variant,
            ),
            // Many alternative calls, but a small fraction
            (
                Base::C,
                vec![(Base::C, Strand::Forward, 96), (Base::G, Strand::Forward, 4)],
                LocusVerdict::Accumulated,
            ),
            // High fraction, but few calls
            (
                Base::G,
                vec![(Base::G, Strand::Forward, 7), (Base::A, Strand::Forward, 3)],
                LocusVerdict::Accumulated,
            ),
        ] {
            let mut matrix = ErrorConfusionMatrix::default();
            assert_eq!(
                accumulate(&config, reference, &evidence(&calls), &mut matrix),
                expected,
                "{reference} {calls:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_stranded_accumulation() -> eyre::Result<()> {
        let config = ErrorRateConfig::builder().with_stranded(true).build()?;
        let mut matrix = ErrorConfusionMatrix::default();

        let locus = evidence(&[
            (Base::A, Strand::Forward, 10),
            (Base::G, Strand::Forward, 1),
            (Base::A, Strand::Reverse, 8),
            (Base::C, Strand::Reverse, 1),
        ]);
        assert_eq!(
            accumulate(&config, Base::A, &locus, &mut matrix),
            LocusVerdict::Accumulated
        );

        assert_eq!(matrix.eligible(Base::A), 11);
        assert_eq!(matrix.errors(Base::A, Base::G), 1);
        // Reverse strand reads see the T:A pair from the other side
        assert_eq!(matrix.eligible(Base::T), 9);
        assert_eq!(matrix.errors(Base::T, Base::G), 1);
        Ok(())
    }

    #[test]
    fn test_evidence_filter_applies() -> eyre::Result<()> {
        let config = ErrorRateConfig::builder()
            .with_filter(EvidenceFilter::new(0, 0, 20, 0))
            .build()?;
        let mut matrix = ErrorConfusionMatrix::default();

        // Every call is 10 bases away from the read start
        let locus = evidence(&[(Base::T, Strand::Forward, 15)]);
        assert_eq!(
            accumulate(&config, Base::T, &locus, &mut matrix),
            LocusVerdict::LowDepth
        );
        assert_eq!(matrix, ErrorConfusionMatrix::default());
        Ok(())
    }
}
