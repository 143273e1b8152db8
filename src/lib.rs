//! Multi-channel AIS2IH acceleration acquisition over Linux I2C
//!
//! This library drives up to four AIS2IH accelerometers, each on its own
//! `/dev/i2c-N` adapter, at the device's 1600 Hz output rate. Every sensor
//! gets its own pipeline thread: configure the device, poll the status
//! register, read 6-byte sample blocks, and append `x,y,z` rows to a
//! per-sensor CSV file until the sample target is reached. The coordinator
//! joins all pipelines; a fault in one sensor never touches the others.
//!
//! # Quick Start
//!
//! ## Collect from two sensors
//! ```no_run
//! use ais2ih_daq::{collect, AcquisitionConfig, PipelineOutcome};
//!
//! // 16000 samples per sensor (ten seconds at 1600 Hz) into ./acc_data
//! let config = AcquisitionConfig::new(2, 16000, "acc_data".into(), false);
//! for report in collect(&config) {
//!     match report.outcome {
//!         PipelineOutcome::Completed { samples, path } => {
//!             println!("sensor {}: {} samples -> {}", report.sensor_index, samples, path.display());
//!         }
//!         other => eprintln!("sensor {}: {:?}", report.sensor_index, other),
//!     }
//! }
//! ```
//!
//! ## Drive a single sensor directly
//! ```no_run
//! use ais2ih_daq::{Ais2ih, LinuxI2cBus};
//!
//! let mut sensor = Ais2ih::new(LinuxI2cBus::open(0)?);
//! sensor.configure()?;
//! loop {
//!     if sensor.data_ready()? {
//!         let sample = sensor.read_sample()?;
//!         println!("{},{},{}", sample.x, sample.y, sample.z);
//!         break;
//!     }
//! }
//! # Ok::<(), ais2ih_daq::Ais2ihError>(())
//! ```

pub mod ais2ih;
pub mod bus;
pub mod csv_format;
pub mod error;
pub mod pipeline;

// Re-export public API
pub use ais2ih::{decode_axis, Ais2ih, ConfigSnapshot, Sample, SAMPLE_BLOCK_SIZE, SAMPLE_RATE_HZ};
pub use bus::{I2cBus, LinuxI2cBus, SENSOR_ADDRESS};
pub use csv_format::CsvWriter;
pub use error::{Ais2ihError, Result};
pub use pipeline::{
    collect, collect_with, AcquisitionConfig, PipelineOutcome, PipelineReport,
    DEFAULT_SAMPLE_COUNT,
};
