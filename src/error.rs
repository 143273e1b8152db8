//! Error types for the AIS2IH acquisition pipelines

use thiserror::Error;

/// Error type for bus, configuration and storage failures.
///
/// Every failure is confined to the pipeline that hit it: the coordinator
/// keeps waiting for the other sensors regardless of what a sibling reports.
#[derive(Error, Debug)]
pub enum Ais2ihError {
    /// The I2C adapter for a sensor index could not be opened
    #[error("bus for sensor {index} unavailable: {reason}")]
    BusUnavailable { index: usize, reason: String },

    /// A bus transaction failed outright
    #[error("bus transaction failed: {0}")]
    Bus(String),

    /// A transaction moved fewer bytes than requested
    #[error("short transfer: expected {expected} bytes, transferred {actual}")]
    Transfer { expected: usize, actual: usize },

    /// The device setup sequence failed at one of its registers
    #[error("failed to configure {register}: {reason}")]
    Configuration {
        register: &'static str,
        reason: String,
    },

    /// Usage error in a driver call; never expected in correct operation
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Output file could not be created or written
    #[error("storage error: {0}")]
    Storage(#[from] csv::Error),
}

/// Result type for AIS2IH operations
pub type Result<T> = std::result::Result<T, Ais2ihError>;
