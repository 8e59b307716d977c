//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the process-wide mutable state: the configuration
//! document, the display engine, the presence policy, and the latched LED
//! colour.  All I/O flows through port traits injected at call sites,
//! making the entire service testable on the host.

use log::error;

use crate::app::commands::{Command, ConfigCommand, LedCommand};
use crate::app::ports::{DisplayPort, LedPort, SensorPort, StoragePort};
use crate::config::DeviceConfig;
use crate::display::DisplayEngine;
use crate::presence::PresencePolicy;

/// Actions the service cannot perform itself and hands back to the
/// platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRequest {
    /// Restart the device immediately.
    Reboot,
}

/// One explicit LED write: pixel index, colour, and whether to flush the
/// strip afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedSpec {
    pub index: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub flush: bool,
}

impl Default for LedSpec {
    fn default() -> Self {
        Self {
            index: 0,
            r: 0,
            g: 0,
            b: 0,
            flush: true,
        }
    }
}

impl LedSpec {
    /// Pixel 0 in the given colour, flushed.
    pub fn colour(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            ..Self::default()
        }
    }
}

pub struct AppService {
    config: DeviceConfig,
    display: DisplayEngine,
    presence: PresencePolicy,
    /// Pixel-0 colour restored by the presence policy when lights come
    /// back on.
    led_colour: (u8, u8, u8),
    display_present: bool,
}

impl AppService {
    pub fn new(config: DeviceConfig, display_present: bool) -> Self {
        Self {
            config,
            display: DisplayEngine::new(),
            presence: PresencePolicy::new(),
            led_colour: (0, 0, 0),
            display_present,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn lights_on(&self) -> bool {
        self.presence.is_on()
    }

    /// Process one inbound message from the command topic.
    ///
    /// Returns a [`SystemRequest`] when the command needs the platform
    /// layer (currently only `reboot`).  Everything unparseable is dropped
    /// before this point.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        hw: &mut (impl LedPort + DisplayPort),
        storage: &mut impl StoragePort,
    ) -> Option<SystemRequest> {
        match Command::parse(topic, payload)? {
            Command::Reboot => return Some(SystemRequest::Reboot),
            Command::Led(cmd) => self.handle_led(cmd, hw),
            Command::Config(cmd) => self.handle_config(cmd, storage),
            Command::Display(cmd) => {
                let mut flipped = self.config.flipped;
                self.display
                    .apply(cmd, hw, self.display_present, &mut flipped);
                self.config.flipped = flipped;
            }
        }
        None
    }

    fn handle_led(&mut self, cmd: LedCommand, hw: &mut impl LedPort) {
        let spec = LedSpec {
            index: cmd.index,
            r: cmd.r,
            g: cmd.g,
            b: cmd.b,
            flush: true,
        };
        self.apply_led(hw, spec, cmd.latch);
    }

    /// Write one pixel.  When `latch` is set the colour also becomes the
    /// one the presence policy restores.  The flush is skipped while
    /// lights are off so presence blanking wins over remote writes.
    pub fn apply_led(&mut self, hw: &mut impl LedPort, spec: LedSpec, latch: bool) {
        hw.set_pixel(spec.index, spec.r, spec.g, spec.b);
        if latch {
            self.led_colour = (spec.r, spec.g, spec.b);
        }
        if self.presence.is_on() && spec.flush {
            hw.show();
        }
    }

    fn handle_config(&mut self, cmd: ConfigCommand, storage: &mut impl StoragePort) {
        match cmd {
            ConfigCommand::Show => self.config.log_summary(),
            ConfigCommand::Write => {
                self.config.log_summary();
                if let Err(e) = self.config.persist(storage) {
                    error!("config write failed: {e}");
                }
            }
            ConfigCommand::Set(field, value) => self.config.set(field, &value),
        }
    }

    /// Drive the display's periodic render.  Skipped entirely without a
    /// panel or while the presence policy has the lights off.
    pub fn render_tick(&mut self, now_ms: u64, hw: &mut (impl SensorPort + DisplayPort)) {
        if self.display_present && self.presence.is_on() {
            self.display.tick(now_ms, hw);
        }
    }

    /// Feed a distance reading into the presence policy.
    pub fn presence_update(
        &mut self,
        distance_mm: i32,
        hw: &mut (impl LedPort + DisplayPort),
    ) -> bool {
        self.presence
            .update(distance_mm, &mut self.led_colour, hw, self.display_present)
    }

}
