use derive_getters::Getters;
use eyre::{ensure, Result};

use lociscan_io_rs::bam::AlignmentRecord;

/// SAM flag and mapping quality based record filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Getters)]
pub struct ReadFilter {
    inflags: u16,
    exflags: u16,
    min_mapq: u8,
}

impl ReadFilter {
    /// Flags that are never accepted, whatever the configuration.
    pub const ALWAYS_EXCLUDED: u16 = 0x4 | 0x400;
    /// Unmapped, secondary, QC-fail, duplicate and supplementary records.
    pub const DEFAULT_EXFLAGS: u16 = 0x4 | 0x100 | 0x200 | 0x400 | 0x800;

    pub fn new(inflags: u16, exflags: u16, min_mapq: u8) -> Result<Self> {
        ensure!(
            inflags & exflags == 0,
            "Flags {:#x} are both required and excluded",
            inflags & exflags
        );
        ensure!(
            inflags & Self::ALWAYS_EXCLUDED == 0,
            "Unmapped and duplicate records can't be required"
        );
        Ok(Self {
            inflags,
            exflags,
            min_mapq,
        })
    }

    pub fn accepts(&self, record: &AlignmentRecord) -> bool {
        let flags = u16::from(*record.flags());
        record.is_mapped()
            && flags & self.inflags == self.inflags
            && flags & (self.exflags | Self::ALWAYS_EXCLUDED) == 0
            && *record.mapq() >= self.min_mapq
    }
}

impl Default for ReadFilter {
    fn default() -> Self {
        Self {
            inflags: 0,
            exflags: Self::DEFAULT_EXFLAGS,
            min_mapq: 0,
        }
    }
}

/// Edge trimming heuristics applied to every read before it contributes to loci.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Getters)]
pub struct TrimConfig {
    low_quality_tails: bool,
    low_quality_sentinel: u8,
    homopolymer_edges: bool,
}

impl TrimConfig {
    /// Illumina read segment quality control indicator (Q2, '#').
    pub const DEFAULT_SENTINEL: u8 = 2;

    pub fn new(low_quality_tails: bool, low_quality_sentinel: u8, homopolymer_edges: bool) -> Self {
        Self {
            low_quality_tails,
            low_quality_sentinel,
            homopolymer_edges,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, Self::DEFAULT_SENTINEL, false)
    }

    pub fn enabled() -> Self {
        Self::new(true, Self::DEFAULT_SENTINEL, true)
    }

    pub fn is_enabled(&self) -> bool {
        self.low_quality_tails || self.homopolymer_edges
    }
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ScanConfig {
    window: u32,
    filter: ReadFilter,
    trim: TrimConfig,
    skip_mate_overlap: bool,
}

impl ScanConfig {
    pub const DEFAULT_WINDOW: u32 = 256;

    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            filter: ReadFilter::default(),
            trim: TrimConfig::default(),
            skip_mate_overlap: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    window: Option<u32>,
    filter: Option<ReadFilter>,
    trim: Option<TrimConfig>,
    skip_mate_overlap: Option<bool>,
}

impl ScanConfigBuilder {
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_filter(mut self, filter: ReadFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_trim(mut self, trim: TrimConfig) -> Self {
        self.trim = Some(trim);
        self
    }

    pub fn with_skip_mate_overlap(mut self, skip: bool) -> Self {
        self.skip_mate_overlap = Some(skip);
        self
    }

    pub fn build(self) -> Result<ScanConfig> {
        let default = ScanConfig::default();
        let window = self.window.unwrap_or(default.window);
        ensure!(window > 0, "Cache window must be positive");

        Ok(ScanConfig {
            window,
            filter: self.filter.unwrap_or(default.filter),
            trim: self.trim.unwrap_or(default.trim),
            skip_mate_overlap: self.skip_mate_overlap.unwrap_or(default.skip_mate_overlap),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lociscan_io_rs::bam::Flags;

    fn record(flags: Flags, mapq: u8) -> Result<AlignmentRecord> {
        Ok(AlignmentRecord::from_text(0, 10, "4M", "ACGT")?
            .with_flags(flags)
            .with_mapq(mapq))
    }

    #[test]
    fn test_default_filter() -> Result<()> {
        let filter = ReadFilter::default();
        for (flags, expected) in [
            (Flags::empty(), true),
            (Flags::REVERSE_COMPLEMENTED, true),
            (Flags::SEGMENTED | Flags::FIRST_SEGMENT, true),
            (Flags::UNMAPPED, false),
            (Flags::SECONDARY, false),
            (Flags::QC_FAIL, false),
            (Flags::DUPLICATE, false),
            (Flags::SUPPLEMENTARY, false),
        ] {
            assert_eq!(filter.accepts(&record(flags, 60)?), expected, "{flags:?}");
        }
        Ok(())
    }

    #[test]
    fn test_custom_filter() -> Result<()> {
        // Duplicates are dropped even if the exclusion mask is empty
        let filter = ReadFilter::new(0x1, 0, 10)?;
        assert!(filter.accepts(&record(Flags::SEGMENTED, 10)?));
        assert!(!filter.accepts(&record(Flags::SEGMENTED, 9)?));
        assert!(!filter.accepts(&record(Flags::empty(), 60)?));
        assert!(!filter.accepts(&record(Flags::SEGMENTED | Flags::DUPLICATE, 60)?));
        assert!(!filter.accepts(&AlignmentRecord::default()));

        assert!(ReadFilter::new(0x10, 0x10, 0).is_err());
        assert!(ReadFilter::new(0x400, 0, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_scan_config_builder() -> Result<()> {
        let config = ScanConfig::builder().build()?;
        assert_eq!(config, ScanConfig::default());
        assert_eq!(*config.window(), 256);

        let config = ScanConfig::builder()
            .with_window(64)
            .with_trim(TrimConfig::enabled())
            .with_skip_mate_overlap(true)
            .build()?;
        assert_eq!(*config.window(), 64);
        assert!(config.trim().is_enabled());
        assert!(*config.skip_mate_overlap());

        assert!(ScanConfig::builder().with_window(0).build().is_err());
        Ok(())
    }
}
