//! Mock hardware for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without an I²C bus or an RMT peripheral.

use roomsense::app::ports::{DisplayPort, LedPort, SensorPort, StorageError, StoragePort};
use roomsense::display::GlyphScale;
use roomsense::pins::LED_COUNT;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    SetPixel { index: u8, r: u8, g: u8, b: u8 },
    LedClear,
    Show,
    DisplayClear,
    DrawText { col: u8, row: u8, scale: GlyphScale, text: String },
    SetFlipped(bool),
    SetContrast(u8),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    pub pixels: [(u8, u8, u8); LED_COUNT],
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub pressure: Option<f32>,
    pub distance: Option<i32>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            pixels: [(0, 0, 0); LED_COUNT],
            temperature: None,
            humidity: None,
            pressure: None,
            distance: None,
        }
    }

    /// All three environment sensors answering plausible values.
    pub fn with_environment() -> Self {
        Self {
            temperature: Some(21.5),
            humidity: Some(48.0),
            pressure: Some(1013.2),
            ..Self::new()
        }
    }

    pub fn shows(&self) -> usize {
        self.calls.iter().filter(|c| **c == HwCall::Show).count()
    }

    pub fn drawn_texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_contrast(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::SetContrast(v) => Some(*v),
            _ => None,
        })
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPort for MockHardware {
    fn set_pixel(&mut self, index: u8, r: u8, g: u8, b: u8) {
        if let Some(px) = self.pixels.get_mut(usize::from(index)) {
            *px = (r, g, b);
        }
        self.calls.push(HwCall::SetPixel { index, r, g, b });
    }

    fn pixel(&self, index: u8) -> (u8, u8, u8) {
        self.pixels
            .get(usize::from(index))
            .copied()
            .unwrap_or((0, 0, 0))
    }

    fn clear(&mut self) {
        self.pixels = [(0, 0, 0); LED_COUNT];
        self.calls.push(HwCall::LedClear);
    }

    fn show(&mut self) {
        self.calls.push(HwCall::Show);
    }
}

impl DisplayPort for MockHardware {
    fn clear(&mut self) {
        self.calls.push(HwCall::DisplayClear);
    }

    fn draw_text(&mut self, col: u8, row: u8, scale: GlyphScale, text: &str) {
        self.calls.push(HwCall::DrawText {
            col,
            row,
            scale,
            text: text.to_owned(),
        });
    }

    fn set_flipped(&mut self, flipped: bool) {
        self.calls.push(HwCall::SetFlipped(flipped));
    }

    fn set_contrast(&mut self, contrast: u8) {
        self.calls.push(HwCall::SetContrast(contrast));
    }
}

impl SensorPort for MockHardware {
    fn temperature_c(&mut self) -> Option<f32> {
        self.temperature
    }

    fn humidity_pct(&mut self) -> Option<f32> {
        self.humidity
    }

    fn pressure_hpa(&mut self) -> Option<f32> {
        self.pressure
    }

    fn distance_mm(&mut self) -> Option<i32> {
        self.distance
    }
}

// ── MockStorage ───────────────────────────────────────────────

pub struct MockStorage {
    pub document: Option<Vec<u8>>,
    /// When set, every write fails with [`StorageError::IoError`].
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockStorage {
    pub fn empty() -> Self {
        Self {
            document: None,
            fail_writes: false,
        }
    }

    pub fn with(bytes: &[u8]) -> Self {
        Self {
            document: Some(bytes.to_vec()),
            fail_writes: false,
        }
    }
}

impl StoragePort for MockStorage {
    fn read_all(&self) -> Result<Vec<u8>, StorageError> {
        self.document.clone().ok_or(StorageError::NotFound)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.document = Some(data.to_vec());
        Ok(())
    }
}
