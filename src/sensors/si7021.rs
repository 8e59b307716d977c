//! Si7021 humidity / temperature driver.
//!
//! Minimal hold-master driver: one command byte, clock stretching until the
//! conversion finishes, two data bytes back.

use embedded_hal::i2c::I2c;
use log::info;

pub const ADDR: u8 = 0x40;

const CMD_MEASURE_RH_HOLD: u8 = 0xE5;
const CMD_MEASURE_TEMP_HOLD: u8 = 0xE3;

pub struct Si7021;

impl Si7021 {
    /// The chip acked its address during the bus scan; a hold-master
    /// humidity read doubles as the functional probe.
    pub fn probe<I: I2c>(i2c: &mut I) -> Option<Self> {
        let mut buf = [0u8; 2];
        if i2c.write_read(ADDR, &[CMD_MEASURE_RH_HOLD], &mut buf).is_err() {
            return None;
        }
        info!("si7021 found at 0x{ADDR:02x}");
        Some(Self)
    }

    pub fn humidity_pct<I: I2c>(&self, i2c: &mut I) -> Option<f32> {
        self.read_word(i2c, CMD_MEASURE_RH_HOLD)
            .map(humidity_from_code)
    }

    pub fn temperature_c<I: I2c>(&self, i2c: &mut I) -> Option<f32> {
        self.read_word(i2c, CMD_MEASURE_TEMP_HOLD)
            .map(temperature_from_code)
    }

    fn read_word<I: I2c>(&self, i2c: &mut I, cmd: u8) -> Option<u16> {
        let mut buf = [0u8; 2];
        i2c.write_read(ADDR, &[cmd], &mut buf).ok()?;
        Some(u16::from_be_bytes(buf))
    }
}

/// Datasheet conversion; codes near the rails can stray slightly outside
/// 0..100 and are clamped.
pub fn humidity_from_code(code: u16) -> f32 {
    (125.0 * f32::from(code) / 65536.0 - 6.0).clamp(0.0, 100.0)
}

pub fn temperature_from_code(code: u16) -> f32 {
    175.72 * f32::from(code) / 65536.0 - 46.85
}
