//! Display state machine.
//!
//! The panel shows exactly one thing at a time: a live sensor readout, a
//! block of caller-supplied text, or nothing.  Sensor readouts re-render on
//! a 30-second tick (every loop iteration for distance, which is treated as
//! latency-sensitive); freeform text is drawn once when it is set and never
//! refreshed until the mode changes.

use log::debug;

use crate::app::commands::DisplayCommand;
use crate::app::ports::{DisplayPort, SensorPort};

/// Sensor readouts refresh this often.
pub const RENDER_INTERVAL_MS: u64 = 30_000;

/// Glyph size for [`DisplayPort::draw_text`].  Large glyphs occupy a 2×2
/// cell block per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphScale {
    Large,
    Small,
}

/// Layout decision for freeform text, fixed at mode-set time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextScreen {
    pub lines: Vec<String>,
    pub scale: GlyphScale,
    pub start_row: u8,
}

/// Decide glyph scale and starting row for a block of text lines.
///
/// Small glyphs whenever any line exceeds 8 characters or more than 3 lines
/// were supplied; a single large line starts at row 3 so it sits vertically
/// centered, everything else is top-aligned.
pub fn plan_text_layout(lines: &[String]) -> TextScreen {
    let large = lines.len() <= 3 && lines.iter().all(|l| l.chars().count() <= 8);
    TextScreen {
        lines: lines.to_vec(),
        scale: if large { GlyphScale::Large } else { GlyphScale::Small },
        start_row: if lines.len() == 1 && large { 3 } else { 0 },
    }
}

impl TextScreen {
    /// Rows advance by 3 per line in large mode, 2 in small mode.
    fn row_step(&self) -> u8 {
        match self.scale {
            GlyphScale::Large => 3,
            GlyphScale::Small => 2,
        }
    }
}

/// What the panel is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayMode {
    Off,
    Temperature,
    Humidity,
    AirPressure,
    /// Reserved for a light sensor; no command selects it yet and the tick
    /// renders nothing for it.
    Lux,
    Text(TextScreen),
    Distance,
}

/// Owns the active [`DisplayMode`] and the render timer.
#[derive(Debug)]
pub struct DisplayEngine {
    mode: DisplayMode,
    last_render_ms: u64,
}

impl DisplayEngine {
    pub fn new() -> Self {
        Self {
            mode: DisplayMode::Temperature,
            last_render_ms: 0,
        }
    }

    pub fn mode(&self) -> &DisplayMode {
        &self.mode
    }

    /// Apply a `display …` command.
    ///
    /// Draw calls are suppressed when no panel was detected at startup, but
    /// the mode still changes so a later-attached debugger sees consistent
    /// state.  `flipped` is the in-memory config flag; `Flip` toggles it
    /// without persisting.
    pub fn apply(
        &mut self,
        cmd: DisplayCommand,
        hw: &mut impl DisplayPort,
        display_present: bool,
        flipped: &mut bool,
    ) {
        // Any display command invalidates the render timer so the new mode
        // is drawn on the next tick rather than up to 30 s later.
        self.last_render_ms = 0;

        match cmd {
            DisplayCommand::Temperature => self.mode = DisplayMode::Temperature,
            DisplayCommand::Humidity => self.mode = DisplayMode::Humidity,
            DisplayCommand::AirPressure => self.mode = DisplayMode::AirPressure,
            DisplayCommand::Distance => self.mode = DisplayMode::Distance,
            DisplayCommand::Off => {
                if display_present {
                    hw.clear();
                }
                self.mode = DisplayMode::Off;
            }
            DisplayCommand::Flip => {
                *flipped = !*flipped;
                if display_present {
                    hw.clear();
                    hw.set_flipped(*flipped);
                }
            }
            DisplayCommand::Text(lines) => {
                let screen = plan_text_layout(&lines);
                if display_present {
                    hw.clear();
                    let mut row = screen.start_row;
                    for line in &screen.lines {
                        hw.draw_text(0, row, screen.scale, line);
                        row += screen.row_step();
                    }
                }
                self.mode = DisplayMode::Text(screen);
            }
        }
    }

    /// Periodic render.  Call once per loop iteration; the engine decides
    /// whether anything is due.  The caller is responsible for the
    /// panel-present and lights-on gates.
    pub fn tick(&mut self, now_ms: u64, hw: &mut (impl SensorPort + DisplayPort)) {
        let due = now_ms.wrapping_sub(self.last_render_ms) >= RENDER_INTERVAL_MS
            || self.mode == DisplayMode::Distance;
        if !due {
            return;
        }

        match self.mode {
            DisplayMode::Temperature => {
                if let Some(t) = hw.temperature_c() {
                    draw_readout(hw, &format!("{t:.1} C"));
                }
            }
            DisplayMode::Humidity => {
                if let Some(h) = hw.humidity_pct() {
                    draw_readout(hw, &format!("{h:.1} %"));
                }
            }
            DisplayMode::AirPressure => {
                if let Some(p) = hw.pressure_hpa() {
                    draw_readout(hw, &format!("{} hPa", p as i32));
                }
            }
            DisplayMode::Distance => {
                if let Some(d) = hw.distance_mm() {
                    draw_readout(hw, &format!("{d} mm"));
                }
            }
            // Text is drawn once at apply time; Off and Lux render nothing.
            DisplayMode::Off | DisplayMode::Lux | DisplayMode::Text(_) => {}
        }

        debug!("display tick rendered {}", self.mode_name());
        self.last_render_ms = now_ms;
    }

    fn mode_name(&self) -> &'static str {
        match self.mode {
            DisplayMode::Off => "off",
            DisplayMode::Temperature => "temperature",
            DisplayMode::Humidity => "humidity",
            DisplayMode::AirPressure => "airpressure",
            DisplayMode::Lux => "lux",
            DisplayMode::Text(_) => "text",
            DisplayMode::Distance => "distance",
        }
    }
}

fn draw_readout(hw: &mut impl DisplayPort, text: &str) {
    hw.clear();
    hw.draw_text(1, 3, GlyphScale::Large, text);
}
