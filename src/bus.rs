//! I2C bus access for the sensors
//!
//! Each sensor index maps to its own `/dev/i2c-{index}` adapter with the
//! AIS2IH bound at slave address 0x19. The [`I2cBus`] trait is the seam the
//! register protocol driver talks through; tests substitute a scripted bus.

use crate::error::{Ais2ihError, Result};
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;

/// Fixed AIS2IH slave address
pub const SENSOR_ADDRESS: u16 = 0x19;

/// One physical communication channel to a sensor, already bound to the
/// device address. Transactions block the calling thread until the transfer
/// completes or fails; a failed transfer is not retried because the device's
/// register pointer state is ambiguous after a short exchange.
pub trait I2cBus {
    /// Write all of `bytes` as a single transaction.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read exactly `buf.len()` bytes as a single transaction.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Bus handle over a Linux `/dev/i2c-N` character device.
pub struct LinuxI2cBus {
    device: LinuxI2CDevice,
}

impl LinuxI2cBus {
    /// Open the adapter for one sensor index, binding the AIS2IH address.
    ///
    /// A failure here means the sensor is unavailable, not that the process
    /// is broken; the caller skips the corresponding pipeline.
    pub fn open(index: usize) -> Result<Self> {
        let path = format!("/dev/i2c-{index}");
        let device = LinuxI2CDevice::new(&path, SENSOR_ADDRESS).map_err(|e| {
            Ais2ihError::BusUnavailable {
                index,
                reason: e.to_string(),
            }
        })?;
        Ok(Self { device })
    }
}

impl I2cBus for LinuxI2cBus {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.device
            .write(bytes)
            .map_err(|e| Ais2ihError::Bus(e.to_string()))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.device
            .read(buf)
            .map_err(|e| Ais2ihError::Bus(e.to_string()))
    }
}
