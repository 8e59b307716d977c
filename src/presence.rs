//! Presence policy.
//!
//! Maps a distance reading onto a single on/off lighting decision and
//! mirrors it to the LED strip and the panel contrast.  Edge-triggered: a
//! reading that does not change the decision produces no writes and no log
//! line, so a stream of in-range readings is free.
//!
//! No ranging sensor is wired into the main loop on current boards; the
//! policy stays exposed so an external distance source can drive it.

use log::debug;

use crate::app::ports::{DisplayPort, LedPort};

/// Lights are on when something sits closer than this (millimetres).
pub const PRESENCE_RANGE_MM: i32 = 500;

/// Current lighting decision.  Starts on so an unprovisioned node is
/// visibly alive.
#[derive(Debug)]
pub struct PresencePolicy {
    light_on: bool,
}

impl PresencePolicy {
    pub fn new() -> Self {
        Self { light_on: true }
    }

    pub fn is_on(&self) -> bool {
        self.light_on
    }

    /// Feed one distance reading.
    ///
    /// `saved_colour` is the latched pixel-0 colour: snapshotted on the
    /// off-transition and restored on the on-transition.  Returns the
    /// decision after the update.
    pub fn update(
        &mut self,
        distance_mm: i32,
        saved_colour: &mut (u8, u8, u8),
        hw: &mut (impl LedPort + DisplayPort),
        display_present: bool,
    ) -> bool {
        let on = distance_mm > 0 && distance_mm < PRESENCE_RANGE_MM;
        if on == self.light_on {
            return self.light_on;
        }

        debug!("lights on? {on} at {distance_mm} mm");
        self.light_on = on;

        if on {
            let (r, g, b) = *saved_colour;
            hw.set_pixel(0, r, g, b);
            hw.show();
        } else {
            *saved_colour = hw.pixel(0);
            // Blank the strip, not the panel; the panel dims via contrast.
            LedPort::clear(hw);
            hw.show();
        }

        if display_present {
            hw.set_contrast(if on { 255 } else { 0 });
        }
        self.light_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::GlyphScale;

    #[derive(Default)]
    struct FakeRig {
        pixels: [(u8, u8, u8); 10],
        shows: usize,
        contrast: Vec<u8>,
        panel_clears: usize,
    }

    impl LedPort for FakeRig {
        fn set_pixel(&mut self, index: u8, r: u8, g: u8, b: u8) {
            self.pixels[index as usize] = (r, g, b);
        }

        fn pixel(&self, index: u8) -> (u8, u8, u8) {
            self.pixels[index as usize]
        }

        fn clear(&mut self) {
            self.pixels = [(0, 0, 0); 10];
        }

        fn show(&mut self) {
            self.shows += 1;
        }
    }

    impl DisplayPort for FakeRig {
        fn clear(&mut self) {
            self.panel_clears += 1;
        }
        fn draw_text(&mut self, _: u8, _: u8, _: GlyphScale, _: &str) {}
        fn set_flipped(&mut self, _: bool) {}

        fn set_contrast(&mut self, contrast: u8) {
            self.contrast.push(contrast);
        }
    }

    #[test]
    fn edge_triggered_sequence() {
        let mut policy = PresencePolicy::new();
        let mut saved = (10, 20, 30);
        let mut rig = FakeRig::default();
        rig.pixels[0] = (10, 20, 30);

        // 600: out of range, transition on -> off.  The strip blanks; the
        // panel dims via contrast, its framebuffer is untouched.
        assert!(!policy.update(600, &mut saved, &mut rig, true));
        let shows_after_off = rig.shows;
        assert_eq!(rig.pixels[0], (0, 0, 0));
        assert_eq!(rig.contrast, vec![0]);
        assert_eq!(rig.panel_clears, 0);

        // 400 then 10: one on-transition, second reading is a no-op.
        assert!(policy.update(400, &mut saved, &mut rig, true));
        assert!(policy.update(10, &mut saved, &mut rig, true));
        assert_eq!(rig.shows, shows_after_off + 1, "no second toggle while on");
        assert_eq!(rig.pixels[0], (10, 20, 30), "colour restored");
        assert_eq!(rig.contrast, vec![0, 255]);

        // 600: off again.
        assert!(!policy.update(600, &mut saved, &mut rig, true));
    }

    #[test]
    fn zero_distance_means_absent() {
        let mut policy = PresencePolicy::new();
        let mut saved = (0, 0, 0);
        let mut rig = FakeRig::default();

        assert!(!policy.update(0, &mut saved, &mut rig, true));
    }

    #[test]
    fn off_transition_snapshots_current_colour() {
        let mut policy = PresencePolicy::new();
        let mut saved = (0, 0, 0);
        let mut rig = FakeRig::default();
        rig.pixels[0] = (200, 100, 50);

        policy.update(1000, &mut saved, &mut rig, true);
        assert_eq!(saved, (200, 100, 50));

        policy.update(100, &mut saved, &mut rig, true);
        assert_eq!(rig.pixels[0], (200, 100, 50));
    }

    #[test]
    fn contrast_untouched_without_panel() {
        let mut policy = PresencePolicy::new();
        let mut saved = (0, 0, 0);
        let mut rig = FakeRig::default();

        policy.update(600, &mut saved, &mut rig, false);
        assert!(rig.contrast.is_empty());
    }
}
