//! CSV output for acquired samples
//!
//! One file per sensor, named `{start}_sensor{index}.csv`, holding one
//! `x,y,z` row per sample in acquisition order, with no header row.

use crate::ais2ih::Sample;
use crate::error::{Ais2ihError, Result};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Append-only CSV writer for one sensor's samples.
pub struct CsvWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    sample_count: usize,
}

impl fmt::Debug for CsvWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvWriter")
            .field("path", &self.path)
            .field("sample_count", &self.sample_count)
            .finish_non_exhaustive()
    }
}

impl CsvWriter {
    /// Create the output file for one sensor inside `dir`.
    ///
    /// # Arguments
    /// * `dir` - Output directory (must already exist)
    /// * `start_stamp` - Acquisition start timestamp, `%Y%m%d_%H%M%S`
    /// * `sensor_index` - Sensor the file belongs to
    pub fn create(dir: &Path, start_stamp: &str, sensor_index: usize) -> Result<Self> {
        let path = dir.join(format!("{start_stamp}_sensor{sensor_index}.csv"));
        let file = File::create(&path).map_err(|e| Ais2ihError::Storage(e.into()))?;
        Ok(Self {
            path,
            writer: csv::Writer::from_writer(file),
            sample_count: 0,
        })
    }

    /// Append one sample as an `x,y,z` record.
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        self.writer.write_record([
            sample.x.to_string(),
            sample.y.to_string(),
            sample.z.to_string(),
        ])?;
        self.sample_count += 1;
        Ok(())
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Ais2ihError::Storage(e.into()))
    }

    /// Records appended so far
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
