use std::path::Path;

use derive_getters::Getters;
use eyre::{ensure, Result, WrapErr};

use lociscan_collections_rs::region_set::RegionSet;
use lociscan_io_rs::{bed, vcf};

use crate::locus::EvidenceFilter;

/// Thresholds and regions of interest for error-rate evaluation.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ErrorRateConfig {
    /// Loci with fewer reads are ignored.
    min_depth: u32,
    /// Loci with more alternative reads than this and a large enough allelic fraction are
    /// treated as variants.
    max_error_depth: u32,
    max_allelic_fraction: f32,
    filter: EvidenceFilter,
    /// Count forward and reverse strand reads separately.
    stranded: bool,
    regions: Option<RegionSet>,
    /// Evaluate loci outside of the regions instead of inside.
    avoid: bool,
}

impl ErrorRateConfig {
    pub const DEFAULT_MIN_DEPTH: u32 = 10;
    pub const DEFAULT_MAX_ERROR_DEPTH: u32 = 3;
    pub const DEFAULT_MAX_ALLELIC_FRACTION: f32 = 0.1;

    pub fn builder() -> ErrorRateConfigBuilder {
        ErrorRateConfigBuilder::default()
    }

    /// Whether the 1-based locus is subject to evaluation.
    pub fn in_scope(&self, chromosome: &str, position: u32) -> bool {
        match &self.regions {
            None => true,
            Some(regions) => regions.contains_one_based(chromosome, position) != self.avoid,
        }
    }
}

impl Default for ErrorRateConfig {
    fn default() -> Self {
        Self {
            min_depth: Self::DEFAULT_MIN_DEPTH,
            max_error_depth: Self::DEFAULT_MAX_ERROR_DEPTH,
            max_allelic_fraction: Self::DEFAULT_MAX_ALLELIC_FRACTION,
            filter: EvidenceFilter::default(),
            stranded: false,
            regions: None,
            avoid: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorRateConfigBuilder {
    config: ErrorRateConfig,
}

impl ErrorRateConfigBuilder {
    pub fn with_min_depth(mut self, min_depth: u32) -> Self {
        self.config.min_depth = min_depth;
        self
    }

    pub fn with_max_error_depth(mut self, max_error_depth: u32) -> Self {
        self.config.max_error_depth = max_error_depth;
        self
    }

    pub fn with_max_allelic_fraction(mut self, fraction: f32) -> Self {
        self.config.max_allelic_fraction = fraction;
        self
    }

    pub fn with_filter(mut self, filter: EvidenceFilter) -> Self {
        self.config.filter = filter;
        self
    }

    pub fn with_stranded(mut self, stranded: bool) -> Self {
        self.config.stranded = stranded;
        self
    }

    pub fn with_regions(mut self, regions: RegionSet, avoid: bool) -> Self {
        self.config.regions = Some(regions);
        self.config.avoid = avoid;
        self
    }

    /// Regions of interest from a BED file.
    pub fn with_regions_from_bed(self, path: impl AsRef<Path>, avoid: bool) -> Result<Self> {
        let path = path.as_ref();
        let regions = bed::read_region_set(path)
            .wrap_err_with(|| format!("Failed to load regions from {}", path.display()))?;
        Ok(self.with_regions(regions, avoid))
    }

    /// Regions of interest made of single VCF positions.
    pub fn with_regions_from_vcf(self, path: impl AsRef<Path>, avoid: bool) -> Result<Self> {
        let path = path.as_ref();
        let regions = vcf::read_region_set(path)
            .wrap_err_with(|| format!("Failed to load sites from {}", path.display()))?;
        Ok(self.with_regions(regions, avoid))
    }

    pub fn build(self) -> Result<ErrorRateConfig> {
        let fraction = self.config.max_allelic_fraction;
        ensure!(
            (0.0..=1.0).contains(&fraction),
            "Maximum allelic fraction must be within [0, 1], got {fraction}"
        );
        Ok(self.config)
    }
}
