//! Board hardware adapter.
//!
//! Owns the single I²C bus plus the peripherals hanging off it, and
//! implements [`SensorPort`], [`DisplayPort`] and [`LedPort`] on top of
//! them.  The drivers are bus-agnostic and borrow the bus per call, so one
//! `I2cDriver` serves the OLED and both environment chips without any
//! bus-sharing ceremony.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real I²C and RMT peripherals.
//! - **all other targets**: fixed plausible readings and an in-memory LED
//!   framebuffer, enough to boot the binary logic on the host.

#[cfg(target_os = "espidf")]
use log::error;

use crate::app::ports::{DisplayPort, LedPort, SensorPort};
use crate::display::GlyphScale;
use crate::drivers::neopixel::NeoPixelStrip;

#[cfg(target_os = "espidf")]
use crate::drivers::oled::OledDisplay;
#[cfg(target_os = "espidf")]
use crate::sensors::{SensorHub, DISPLAY_ADDR};
#[cfg(target_os = "espidf")]
use esp_idf_hal::i2c::I2cDriver;

pub struct HardwareAdapter {
    strip: NeoPixelStrip,
    display_present: bool,
    #[cfg(target_os = "espidf")]
    i2c: I2cDriver<'static>,
    #[cfg(target_os = "espidf")]
    sensors: SensorHub,
    #[cfg(target_os = "espidf")]
    oled: Option<OledDisplay>,
}

#[cfg(target_os = "espidf")]
impl HardwareAdapter {
    /// Scan the bus, bring up whatever answered, and take ownership of the
    /// peripherals for the life of the process.
    pub fn new(mut i2c: I2cDriver<'static>, strip: NeoPixelStrip, flipped: bool) -> Self {
        let (sensors, report) = SensorHub::scan(&mut i2c);

        let oled = if report.display_found {
            let mut oled = OledDisplay::new(DISPLAY_ADDR);
            match oled.init(&mut i2c, flipped) {
                Ok(()) => Some(oled),
                Err(e) => {
                    error!("display init failed: {e}");
                    None
                }
            }
        } else {
            None
        };

        Self {
            strip,
            display_present: oled.is_some(),
            i2c,
            sensors,
            oled,
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl HardwareAdapter {
    pub fn new() -> Self {
        Self {
            strip: NeoPixelStrip::new(),
            display_present: false,
        }
    }
}

impl HardwareAdapter {
    pub fn display_present(&self) -> bool {
        self.display_present
    }
}

// ───────────────────────────────────────────────────────────────
// SensorPort
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl SensorPort for HardwareAdapter {
    fn temperature_c(&mut self) -> Option<f32> {
        self.sensors.temperature_c(&mut self.i2c)
    }

    fn humidity_pct(&mut self) -> Option<f32> {
        self.sensors.humidity_pct(&mut self.i2c)
    }

    fn pressure_hpa(&mut self) -> Option<f32> {
        self.sensors.pressure_hpa(&mut self.i2c)
    }

    fn distance_mm(&mut self) -> Option<i32> {
        // No ranging sensor on current boards; the presence policy keeps
        // its trigger interface for an external source.
        None
    }
}

#[cfg(not(target_os = "espidf"))]
impl SensorPort for HardwareAdapter {
    fn temperature_c(&mut self) -> Option<f32> {
        Some(21.5)
    }

    fn humidity_pct(&mut self) -> Option<f32> {
        Some(48.0)
    }

    fn pressure_hpa(&mut self) -> Option<f32> {
        Some(1013.2)
    }

    fn distance_mm(&mut self) -> Option<i32> {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// DisplayPort
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl DisplayPort for HardwareAdapter {
    fn clear(&mut self) {
        if let Some(oled) = &mut self.oled {
            if let Err(e) = oled.clear(&mut self.i2c) {
                error!("display clear failed: {e}");
            }
        }
    }

    fn draw_text(&mut self, col: u8, row: u8, scale: GlyphScale, text: &str) {
        if let Some(oled) = &mut self.oled {
            if let Err(e) = oled.draw_text(&mut self.i2c, col, row, scale, text) {
                error!("display draw failed: {e}");
            }
        }
    }

    fn set_flipped(&mut self, flipped: bool) {
        if let Some(oled) = &mut self.oled {
            if let Err(e) = oled.set_flipped(&mut self.i2c, flipped) {
                error!("display flip failed: {e}");
            }
        }
    }

    fn set_contrast(&mut self, contrast: u8) {
        if let Some(oled) = &mut self.oled {
            if let Err(e) = oled.set_contrast(&mut self.i2c, contrast) {
                error!("display contrast failed: {e}");
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl DisplayPort for HardwareAdapter {
    fn clear(&mut self) {
        log::trace!("display(sim): clear");
    }

    fn draw_text(&mut self, col: u8, row: u8, scale: GlyphScale, text: &str) {
        log::trace!("display(sim): ({col},{row}) {scale:?} {text:?}");
    }

    fn set_flipped(&mut self, flipped: bool) {
        log::trace!("display(sim): flipped={flipped}");
    }

    fn set_contrast(&mut self, contrast: u8) {
        log::trace!("display(sim): contrast={contrast}");
    }
}

// ───────────────────────────────────────────────────────────────
// LedPort
// ───────────────────────────────────────────────────────────────

impl LedPort for HardwareAdapter {
    fn set_pixel(&mut self, index: u8, r: u8, g: u8, b: u8) {
        self.strip.set_pixel(index, r, g, b);
    }

    fn pixel(&self, index: u8) -> (u8, u8, u8) {
        self.strip.pixel(index)
    }

    fn clear(&mut self) {
        self.strip.clear();
    }

    fn show(&mut self) {
        self.strip.show();
    }
}
