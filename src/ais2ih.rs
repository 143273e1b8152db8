//! AIS2IH accelerometer driver over a register-addressed I2C bus

use crate::bus::I2cBus;
use crate::error::{Ais2ihError, Result};

// AIS2IH register addresses
pub const REG_WHO_AM_I: u8 = 0x0F;
pub const REG_CTRL1: u8 = 0x20;
pub const REG_CTRL2: u8 = 0x21;
pub const REG_CTRL6: u8 = 0x25;
pub const REG_STATUS: u8 = 0x27;
pub const REG_OUT_X_L: u8 = 0x28;
pub const REG_FIFO_CTRL: u8 = 0x2E;

// Configuration values written by `configure`
const CTRL1_ODR_1600HZ_HP: u8 = 0x97; // 1600 Hz output data rate, high-performance mode
const CTRL2_IF_ADD_INC: u8 = 0x04; // auto-increment register address on multi-byte access
const FIFO_CTRL_CONTINUOUS: u8 = 0xD0; // continuous mode, new samples overwrite on full
const CTRL6_FS_16G: u8 = 0x30; // full-scale +/-16 g

/// STATUS bit 0: a fresh sample is ready for retrieval
const STATUS_DRDY: u8 = 0x01;

/// Bytes in one sample block: [X_L, X_H, Y_L, Y_H, Z_L, Z_H]
pub const SAMPLE_BLOCK_SIZE: usize = 6;

/// Output data rate configured by [`Ais2ih::configure`], in samples per second
pub const SAMPLE_RATE_HZ: usize = 1600;

/// One decoded acceleration sample.
///
/// Each axis is the device's 14-bit left-justified reading brought down to
/// its effective range by an arithmetic right shift of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Sample {
    /// Decode a raw 6-byte output block into a sample.
    pub fn from_block(block: &[u8; SAMPLE_BLOCK_SIZE]) -> Self {
        Self {
            x: decode_axis(block[0], block[1]),
            y: decode_axis(block[2], block[3]),
            z: decode_axis(block[4], block[5]),
        }
    }
}

/// Combine a little-endian low/high register pair and drop the two empty
/// low bits (the device left-justifies 14 bits in the 16-bit field).
pub fn decode_axis(lo: u8, hi: u8) -> i16 {
    i16::from_le_bytes([lo, hi]) >> 2
}

/// Configuration read-back for diagnostics. Informational only; nothing in
/// the acquisition path depends on these values.
#[derive(Debug, Clone, Copy)]
pub struct ConfigSnapshot {
    pub who_am_i: u8,
    pub ctrl1: u8,
    pub ctrl2: u8,
    pub fifo_ctrl: u8,
    pub ctrl6: u8,
}

/// AIS2IH sensor interface over an open bus handle.
///
/// Owns the bus and the 6-byte scratch block for multi-byte reads; one
/// instance belongs to exactly one pipeline for its whole lifetime.
pub struct Ais2ih<B> {
    bus: B,
    scratch: [u8; SAMPLE_BLOCK_SIZE],
}

impl<B: I2cBus> Ais2ih<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            scratch: [0; SAMPLE_BLOCK_SIZE],
        }
    }

    /// Give the bus handle back, consuming the driver.
    pub fn release(self) -> B {
        self.bus
    }

    /// Write a single byte to a register as one [reg, value] transaction
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        self.bus.write(&[reg, value])
    }

    /// Read a single byte from a register: select the address, then read
    fn read_register(&mut self, reg: u8) -> Result<u8> {
        self.bus.write(&[reg])?;
        let mut value = [0u8; 1];
        self.bus.read(&mut value)?;
        Ok(value[0])
    }

    /// Read `len` consecutive register bytes into the scratch block.
    ///
    /// `len` must be in 1..=SAMPLE_BLOCK_SIZE; anything else is a caller
    /// bug and is rejected before any bus traffic.
    fn read_registers(&mut self, reg: u8, len: usize) -> Result<&[u8]> {
        if len == 0 || len > SAMPLE_BLOCK_SIZE {
            return Err(Ais2ihError::InvalidParameter(format!(
                "block read of {len} bytes (scratch holds {SAMPLE_BLOCK_SIZE})"
            )));
        }
        self.bus.write(&[reg])?;
        self.bus.read(&mut self.scratch[..len])?;
        Ok(&self.scratch[..len])
    }

    /// Run the device setup sequence.
    ///
    /// The writes are ordered and non-interruptible as a whole: the first
    /// failure aborts configuration with the register that broke it, and the
    /// caller must not proceed to acquisition.
    pub fn configure(&mut self) -> Result<()> {
        self.configure_register("CTRL1", REG_CTRL1, CTRL1_ODR_1600HZ_HP)?;
        self.configure_register("CTRL2", REG_CTRL2, CTRL2_IF_ADD_INC)?;
        self.configure_register("FIFO_CTRL", REG_FIFO_CTRL, FIFO_CTRL_CONTINUOUS)?;
        self.configure_register("CTRL6", REG_CTRL6, CTRL6_FS_16G)?;
        Ok(())
    }

    fn configure_register(&mut self, name: &'static str, reg: u8, value: u8) -> Result<()> {
        self.write_register(reg, value)
            .map_err(|e| Ais2ihError::Configuration {
                register: name,
                reason: e.to_string(),
            })
    }

    /// Read back the identity register and the four configured registers.
    pub fn config_snapshot(&mut self) -> Result<ConfigSnapshot> {
        Ok(ConfigSnapshot {
            who_am_i: self.read_register(REG_WHO_AM_I)?,
            ctrl1: self.read_register(REG_CTRL1)?,
            ctrl2: self.read_register(REG_CTRL2)?,
            fifo_ctrl: self.read_register(REG_FIFO_CTRL)?,
            ctrl6: self.read_register(REG_CTRL6)?,
        })
    }

    /// Whether a fresh sample is ready: STATUS bit 0 equals 1. All other
    /// status bits are ignored.
    pub fn data_ready(&mut self) -> Result<bool> {
        Ok((self.read_register(REG_STATUS)? & STATUS_DRDY) == STATUS_DRDY)
    }

    /// Read and decode one full 6-byte sample block starting at OUT_X_L.
    pub fn read_sample(&mut self) -> Result<Sample> {
        let data = self.read_registers(REG_OUT_X_L, SAMPLE_BLOCK_SIZE)?;
        Ok(Sample {
            x: decode_axis(data[0], data[1]),
            y: decode_axis(data[2], data[3]),
            z: decode_axis(data[4], data[5]),
        })
    }
}
