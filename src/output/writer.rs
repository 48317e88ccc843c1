//! CSV table writer

use super::table::Table;
use crate::error::Result;
use csv::Writer;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Buffered CSV writer for normalized tables
pub struct CsvTableWriter {
    writer: Writer<BufWriter<File>>,
    rows_written: u64,
}

impl CsvTableWriter {
    /// Create a writer at the given path, creating parent directories
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let writer = Writer::from_writer(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file));

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write the header and every data row.
    ///
    /// A table with no columns has no header to write; the file is
    /// left empty.
    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        if table.columns.is_empty() {
            return Ok(());
        }
        self.writer.write_record(&table.columns)?;
        for row in &table.rows {
            self.writer.write_record(row)?;
            self.rows_written += 1;
        }
        Ok(())
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and close, returning the number of data rows written
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush()?;
        info!(rows = self.rows_written, "CSV output flushed");
        Ok(self.rows_written)
    }
}
