//! BME280 temperature / humidity / pressure driver.
//!
//! Register-level driver over any [`embedded_hal::i2c::I2c`] bus.  Uses the
//! Bosch integer compensation formulas; `t_fine` couples the three readings,
//! so one burst read produces all of them at once.

use embedded_hal::i2c::I2c;
use log::{info, warn};

pub const ADDR_PRIMARY: u8 = 0x76;
pub const ADDR_SECONDARY: u8 = 0x77;

const REG_CHIP_ID: u8 = 0xD0;
const CHIP_ID: u8 = 0x60;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_PRESS_MSB: u8 = 0xF7;
const REG_CALIB_00: u8 = 0x88;
const REG_CALIB_H1: u8 = 0xA1;
const REG_CALIB_26: u8 = 0xE1;

/// One compensated burst read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
}

/// Factory calibration, read once at probe time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    dig_t1: u16,
    dig_t2: i16,
    dig_t3: i16,
    dig_p1: u16,
    dig_p2: i16,
    dig_p3: i16,
    dig_p4: i16,
    dig_p5: i16,
    dig_p6: i16,
    dig_p7: i16,
    dig_p8: i16,
    dig_p9: i16,
    dig_h1: u8,
    dig_h2: i16,
    dig_h3: u8,
    dig_h4: i16,
    dig_h5: i16,
    dig_h6: i8,
}

impl Calibration {
    /// Assemble calibration words from the three raw register blocks.
    ///
    /// `block1` is 0x88..0x9F (temperature and pressure words, little
    /// endian), `h1` is the lone byte at 0xA1, `block2` is 0xE1..0xE7 with
    /// the packed 12-bit H4/H5 pair sharing byte 0xE5.
    pub fn parse(block1: &[u8; 26], h1: u8, block2: &[u8; 7]) -> Self {
        Self {
            dig_t1: u16::from_le_bytes([block1[0], block1[1]]),
            dig_t2: i16::from_le_bytes([block1[2], block1[3]]),
            dig_t3: i16::from_le_bytes([block1[4], block1[5]]),
            dig_p1: u16::from_le_bytes([block1[6], block1[7]]),
            dig_p2: i16::from_le_bytes([block1[8], block1[9]]),
            dig_p3: i16::from_le_bytes([block1[10], block1[11]]),
            dig_p4: i16::from_le_bytes([block1[12], block1[13]]),
            dig_p5: i16::from_le_bytes([block1[14], block1[15]]),
            dig_p6: i16::from_le_bytes([block1[16], block1[17]]),
            dig_p7: i16::from_le_bytes([block1[18], block1[19]]),
            dig_p8: i16::from_le_bytes([block1[20], block1[21]]),
            dig_p9: i16::from_le_bytes([block1[22], block1[23]]),
            dig_h1: h1,
            dig_h2: i16::from_le_bytes([block2[0], block2[1]]),
            dig_h3: block2[2],
            dig_h4: (i16::from(block2[3]) << 4) | (i16::from(block2[4]) & 0x0F),
            dig_h5: (i16::from(block2[5]) << 4) | (i16::from(block2[4]) >> 4),
            dig_h6: block2[6] as i8,
        }
    }
}

pub struct Bme280 {
    addr: u8,
    calib: Calibration,
}

impl Bme280 {
    /// Verify the chip id at `addr`, read calibration, and switch the chip
    /// to normal mode with 1× oversampling on every channel.
    pub fn probe<I: I2c>(i2c: &mut I, addr: u8) -> Option<Self> {
        let mut chip_id = [0u8];
        if i2c.write_read(addr, &[REG_CHIP_ID], &mut chip_id).is_err() || chip_id[0] != CHIP_ID {
            return None;
        }

        let mut block1 = [0u8; 26];
        let mut h1 = [0u8];
        let mut block2 = [0u8; 7];
        let read = i2c
            .write_read(addr, &[REG_CALIB_00], &mut block1)
            .and_then(|()| i2c.write_read(addr, &[REG_CALIB_H1], &mut h1))
            .and_then(|()| i2c.write_read(addr, &[REG_CALIB_26], &mut block2));
        if read.is_err() {
            warn!("bme280 at 0x{addr:02x}: calibration read failed");
            return None;
        }

        // Humidity oversampling must be written before ctrl_meas to take
        // effect.  0x27 = temp ×1, press ×1, normal mode.
        let configured = i2c
            .write(addr, &[REG_CTRL_HUM, 0x01])
            .and_then(|()| i2c.write(addr, &[REG_CTRL_MEAS, 0x27]));
        if configured.is_err() {
            warn!("bme280 at 0x{addr:02x}: configuration failed");
            return None;
        }

        info!("bme280 found at 0x{addr:02x}");
        Some(Self {
            addr,
            calib: Calibration::parse(&block1, h1[0], &block2),
        })
    }

    /// Burst-read the measurement registers and compensate.
    pub fn read<I: I2c>(&self, i2c: &mut I) -> Option<Reading> {
        let mut raw = [0u8; 8];
        i2c.write_read(self.addr, &[REG_PRESS_MSB], &mut raw).ok()?;

        let (adc_p, adc_t, adc_h) = split_raw(&raw);
        let (temperature_c, t_fine) = self.calib.compensate_temperature(adc_t);
        Some(Reading {
            temperature_c,
            humidity_pct: self.calib.compensate_humidity(adc_h, t_fine),
            pressure_hpa: self.calib.compensate_pressure(adc_p, t_fine),
        })
    }
}

/// Split the 8-byte burst into the 20-bit pressure, 20-bit temperature and
/// 16-bit humidity ADC words.
pub fn split_raw(raw: &[u8; 8]) -> (i32, i32, i32) {
    let adc_p = (i32::from(raw[0]) << 12) | (i32::from(raw[1]) << 4) | (i32::from(raw[2]) >> 4);
    let adc_t = (i32::from(raw[3]) << 12) | (i32::from(raw[4]) << 4) | (i32::from(raw[5]) >> 4);
    let adc_h = (i32::from(raw[6]) << 8) | i32::from(raw[7]);
    (adc_p, adc_t, adc_h)
}

impl Calibration {
    /// Returns (°C, t_fine).  t_fine feeds the other two compensations.
    fn compensate_temperature(&self, adc_t: i32) -> (f32, i32) {
        let var1 = (((adc_t >> 3) - (i32::from(self.dig_t1) << 1)) * i32::from(self.dig_t2)) >> 11;
        let d = (adc_t >> 4) - i32::from(self.dig_t1);
        let var2 = (((d * d) >> 12) * i32::from(self.dig_t3)) >> 14;
        let t_fine = var1 + var2;
        (((t_fine * 5 + 128) >> 8) as f32 / 100.0, t_fine)
    }

    fn compensate_pressure(&self, adc_p: i32, t_fine: i32) -> f32 {
        let mut var1 = i64::from(t_fine) - 128_000;
        let mut var2 = var1 * var1 * i64::from(self.dig_p6);
        var2 += (var1 * i64::from(self.dig_p5)) << 17;
        var2 += i64::from(self.dig_p4) << 35;
        var1 = ((var1 * var1 * i64::from(self.dig_p3)) >> 8) + ((var1 * i64::from(self.dig_p2)) << 12);
        var1 = (((1i64 << 47) + var1) * i64::from(self.dig_p1)) >> 33;
        if var1 == 0 {
            return 0.0;
        }
        let mut p: i64 = 1_048_576 - i64::from(adc_p);
        p = (((p << 31) - var2) * 3125) / var1;
        var1 = (i64::from(self.dig_p9) * (p >> 13) * (p >> 13)) >> 25;
        var2 = (i64::from(self.dig_p8) * p) >> 19;
        p = ((p + var1 + var2) >> 8) + (i64::from(self.dig_p7) << 4);
        // Q24.8 pascals; divide down to hPa.
        (p as f32) / 25_600.0
    }

    fn compensate_humidity(&self, adc_h: i32, t_fine: i32) -> f32 {
        let v = i64::from(t_fine - 76_800);
        let x1 =
            i64::from(adc_h) - ((i64::from(self.dig_h4) << 4) + ((i64::from(self.dig_h5) * v) >> 14));
        let x2 = ((((v * i64::from(self.dig_h6)) >> 10)
            * (((v * i64::from(self.dig_h3)) >> 11) + 32_768))
            >> 10)
            + 2_097_152;
        let mut h = (x1 * (((x2 * i64::from(self.dig_h2)) >> 10) + 8192)) >> 14;
        h -= ((((h >> 15) * (h >> 15)) >> 7) * i64::from(self.dig_h1)) >> 4;
        h = h.clamp(0, 419_430_400);
        (h >> 12) as f32 / 1024.0
    }
}
