//! TSL2561 ambient light sensor over I²C.
//!
//! One sensor serves both plants.  It runs at 1× gain with the 13.7 ms
//! integration window, which keeps direct sunlight (well above the shading
//! threshold) inside the ADC range.  A saturated channel is reported as
//! [`SATURATED_LUX`] rather than a bogus low value.
//!
//! The driver is generic over [`embedded_hal::i2c::I2c`], so the ESP-IDF
//! `I2cDriver` plugs in on target and a scripted bus stands in on host.

use embedded_hal::i2c::I2c;

/// Default 7-bit address (ADDR pin floating).
pub const TSL2561_ADDR: u8 = 0x39;

const CMD: u8 = 0x80;
const CMD_WORD: u8 = 0x20;
const REG_CONTROL: u8 = 0x00;
const REG_TIMING: u8 = 0x01;
const REG_DATA0: u8 = 0x0C;
const REG_DATA1: u8 = 0x0E;

const POWER_ON: u8 = 0x03;
/// Gain 1×, integration 13.7 ms.
const TIMING_LOW_GAIN_13MS: u8 = 0x00;
/// Full-scale count at 13.7 ms integration.
const FULL_SCALE_13MS: u16 = 5047;

/// Datasheet coefficients assume 16× gain and 402 ms integration.
const SCALE_13MS_1X: f32 = 16.0 * (402.0 / 13.7);

/// Reported when either channel clips.
pub const SATURATED_LUX: f32 = 100_000.0;

/// Convert raw broadband (`ch0`) and infrared (`ch1`) counts to lux using
/// the T/FN/CL package approximation.
pub fn lux_from_channels(ch0: u16, ch1: u16) -> f32 {
    if ch0 >= FULL_SCALE_13MS || ch1 >= FULL_SCALE_13MS {
        return SATURATED_LUX;
    }
    if ch0 == 0 {
        return 0.0;
    }

    let c0 = f32::from(ch0) * SCALE_13MS_1X;
    let c1 = f32::from(ch1) * SCALE_13MS_1X;
    let ratio = c1 / c0;

    let lux = if ratio <= 0.50 {
        0.0304 * c0 - 0.062 * c0 * ratio.powf(1.4)
    } else if ratio <= 0.61 {
        0.0224 * c0 - 0.031 * c1
    } else if ratio <= 0.80 {
        0.0128 * c0 - 0.0153 * c1
    } else if ratio <= 1.30 {
        0.001_46 * c0 - 0.001_12 * c1
    } else {
        0.0
    };
    lux.max(0.0)
}

pub struct Tsl2561<I2C> {
    i2c: I2C,
    address: u8,
    powered: bool,
}

impl<I2C: I2c> Tsl2561<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            powered: false,
        }
    }

    /// Power the sensor up and select the integration window.  Verifies
    /// the control register echoes the power bits.
    pub fn power_on(&mut self) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[CMD | REG_CONTROL, POWER_ON])?;
        self.i2c
            .write(self.address, &[CMD | REG_TIMING, TIMING_LOW_GAIN_13MS])?;
        let mut control = [0u8; 1];
        self.i2c
            .write_read(self.address, &[CMD | REG_CONTROL], &mut control)?;
        self.powered = control[0] & POWER_ON == POWER_ON;
        Ok(())
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Read both ADC channels as `(broadband, infrared)`.
    pub fn read_channels(&mut self) -> Result<(u16, u16), I2C::Error> {
        let ch0 = self.read_word(REG_DATA0)?;
        let ch1 = self.read_word(REG_DATA1)?;
        Ok((ch0, ch1))
    }

    /// Read and convert.  Retries the power-up first if an earlier attempt
    /// failed (sensor hot-plugged or browned out).
    pub fn read_lux(&mut self) -> Result<f32, I2C::Error> {
        if !self.powered {
            self.power_on()?;
        }
        match self.read_channels() {
            Ok((ch0, ch1)) => Ok(lux_from_channels(ch0, ch1)),
            Err(e) => {
                self.powered = false;
                Err(e)
            }
        }
    }

    fn read_word(&mut self, reg: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[CMD | CMD_WORD | reg], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
}
