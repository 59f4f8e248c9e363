use std::io::Write;

use eyre::Result;

use super::matrix::ErrorConfusionMatrix;

pub const HEADER: &str = "file\trefBase\taltBase\tEligible\tErrors\tErrorRate";

/// Write the tab-separated error-rate table, twelve substitutions per labeled matrix.
pub fn write_table<'a>(
    mut writer: impl Write,
    matrices: impl IntoIterator<Item = (&'a str, &'a ErrorConfusionMatrix)>,
) -> Result<()> {
    writeln!(writer, "{HEADER}")?;
    for (label, matrix) in matrices {
        for row in matrix.rows() {
            writeln!(
                writer,
                "{label}\t{}\t{}\t{}\t{}\t{}",
                row.reference(),
                row.alternative(),
                row.eligible(),
                row.errors(),
                row.rate()
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lociscan_core_rs::ngs::Base;

    #[test]
    fn test_write_table() -> Result<()> {
        let mut matrix = ErrorConfusionMatrix::default();
        matrix.add(Base::A, &[18, 2, 0, 0, 0]);

        let mut buffer = Vec::new();
        write_table(&mut buffer, [("sample.bam", &matrix)])?;
        let table = String::from_utf8(buffer)?;
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "sample.bam\tA\tT\t20\t2\t0.1");
        assert_eq!(lines[2], "sample.bam\tA\tC\t20\t0\t0");
        assert_eq!(lines[4], "sample.bam\tT\tA\t0\t0\tNaN");
        Ok(())
    }
}
