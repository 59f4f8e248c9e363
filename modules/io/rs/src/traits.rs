use eyre::Result;

/// Reader of structured records that reuses caller-owned buffers.
pub trait ReadRecord {
    /// The type of the records that will be read.
    type Record;

    /// Read a single record from the input into the provided buffer.
    /// Returns `true` if a record was read and `false` if the end of the input was reached.
    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool>;

    /// Read all remaining records, reusing the existing elements of `into` first. Returns the
    /// number of records read. Elements past the returned count are left in an unspecified state.
    fn read_to_end(&mut self, into: &mut Vec<Self::Record>) -> Result<usize>
    where
        Self::Record: Default,
    {
        let mut total = 0;
        for record in into.iter_mut() {
            if !self.read_record(record)? {
                return Ok(total);
            }
            total += 1;
        }

        loop {
            let mut record = Self::Record::default();
            if !self.read_record(&mut record)? {
                return Ok(total);
            }
            into.push(record);
            total += 1;
        }
    }
}

/// Writer of structured records.
pub trait WriteRecord {
    type Record;

    /// Write a single record.
    fn write_record(&mut self, record: &Self::Record) -> Result<()>;

    /// Write a slice of records, stopping at the first error.
    fn write_records(&mut self, records: &[Self::Record]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush and finalize the output. No records can be written afterwards.
    fn finish(&mut self) -> Result<()>;
}
