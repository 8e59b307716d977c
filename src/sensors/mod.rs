//! Sensor subsystem — I²C bus scan and the aggregating [`SensorHub`].
//!
//! Chips not found at boot stay absent for the life of the process; every
//! read checks the capability and answers `None` instead of re-probing.

pub mod bme280;
pub mod si7021;

use embedded_hal::i2c::I2c;
use log::{debug, info};

use bme280::Bme280;
use si7021::Si7021;

/// I²C address of the SH1106 OLED controller.
pub const DISPLAY_ADDR: u8 = 0x3c;

/// Boot-time bus scan findings that are not sensors.
#[derive(Debug, Clone, Copy)]
pub struct ScanReport {
    pub display_found: bool,
}

/// Owns whichever environment chips answered the boot scan.
pub struct SensorHub {
    bme280: Option<Bme280>,
    si7021: Option<Si7021>,
}

impl SensorHub {
    /// Probe the bus for known devices.
    ///
    /// Probing is an empty write: chips ack their address even before
    /// configuration.  Address map of interest: 0x3c display, 0x40 Si7021,
    /// 0x76/0x77 BME280.
    pub fn scan<I: I2c>(i2c: &mut I) -> (Self, ScanReport) {
        info!("scanning i2c bus");

        let display_found = ack_probe(i2c, DISPLAY_ADDR);
        if display_found {
            info!("display found at 0x{DISPLAY_ADDR:02x}");
        }

        let si7021 = if ack_probe(i2c, si7021::ADDR) {
            Si7021::probe(i2c)
        } else {
            None
        };

        let mut bme280 = None;
        for addr in [bme280::ADDR_PRIMARY, bme280::ADDR_SECONDARY] {
            if ack_probe(i2c, addr) {
                bme280 = Bme280::probe(i2c, addr);
                if bme280.is_some() {
                    break;
                }
            }
        }

        info!(
            "end scanning i2c bus: display={display_found} si7021={} bme280={}",
            si7021.is_some(),
            bme280.is_some()
        );
        (Self { bme280, si7021 }, ScanReport { display_found })
    }

    /// Temperature in °C.  The BME280 wins when both chips are fitted.
    pub fn temperature_c<I: I2c>(&mut self, i2c: &mut I) -> Option<f32> {
        if let Some(bme) = &self.bme280 {
            return bme.read(i2c).map(|r| r.temperature_c);
        }
        self.si7021.as_ref().and_then(|s| s.temperature_c(i2c))
    }

    /// Relative humidity in percent.
    pub fn humidity_pct<I: I2c>(&mut self, i2c: &mut I) -> Option<f32> {
        if let Some(bme) = &self.bme280 {
            return bme.read(i2c).map(|r| r.humidity_pct);
        }
        self.si7021.as_ref().and_then(|s| s.humidity_pct(i2c))
    }

    /// Barometric pressure in hPa.  BME280 only.
    pub fn pressure_hpa<I: I2c>(&mut self, i2c: &mut I) -> Option<f32> {
        self.bme280.as_ref().and_then(|b| {
            let r = b.read(i2c)?;
            Some(r.pressure_hpa)
        })
    }
}

fn ack_probe<I: I2c>(i2c: &mut I, addr: u8) -> bool {
    let acked = i2c.write(addr, &[]).is_ok();
    if acked {
        debug!("i2c device at 0x{addr:02x}");
    }
    acked
}
