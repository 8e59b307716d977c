//! WS2812B NeoPixel strip driver.
//!
//! Framebuffer of [`LED_COUNT`](crate::pins::LED_COUNT) GRB pixels; on
//! ESP-IDF the frame is shifted out through the RMT peripheral (the only
//! way to hit the 800 kHz timing without bit-banging with interrupts off).
//! On other targets the framebuffer alone is kept, which is all the tests
//! need.

use crate::pins::LED_COUNT;

#[cfg(target_os = "espidf")]
use anyhow::Context;
#[cfg(target_os = "espidf")]
use esp_idf_hal::{
    gpio,
    peripheral::Peripheral,
    rmt::{config::TransmitConfig, FixedLengthSignal, PinState, Pulse, RmtChannel, TxRmtDriver},
};
#[cfg(target_os = "espidf")]
use std::time::Duration;

/// 24 bits per pixel on the wire.
#[cfg(target_os = "espidf")]
const SIGNAL_LEN: usize = LED_COUNT * 24;

pub struct NeoPixelStrip {
    pixels: [(u8, u8, u8); LED_COUNT],
    #[cfg(target_os = "espidf")]
    tx: TxRmtDriver<'static>,
    #[cfg(target_os = "espidf")]
    one: (Pulse, Pulse),
    #[cfg(target_os = "espidf")]
    zero: (Pulse, Pulse),
}

impl NeoPixelStrip {
    #[cfg(target_os = "espidf")]
    pub fn new(
        pin: impl Peripheral<P = impl gpio::OutputPin + 'static> + 'static,
        channel: impl Peripheral<P = impl RmtChannel> + 'static,
    ) -> anyhow::Result<Self> {
        let config = TransmitConfig::new().clock_divider(1);
        let tx = TxRmtDriver::new(channel, pin, &config)
            .context("failed to initialize NeoPixel RMT driver")?;
        let ticks_hz = tx
            .counter_clock()
            .context("failed to read RMT counter clock")?;

        let pulse = |state: PinState, nanos: u64| {
            Pulse::new_with_duration(ticks_hz, state, &Duration::from_nanos(nanos))
                .with_context(|| format!("failed to construct {nanos} ns pulse"))
        };
        // WS2812B datasheet timing at 800 kHz.
        let zero = (pulse(PinState::High, 350)?, pulse(PinState::Low, 800)?);
        let one = (pulse(PinState::High, 700)?, pulse(PinState::Low, 600)?);

        Ok(Self {
            pixels: [(0, 0, 0); LED_COUNT],
            tx,
            one,
            zero,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            pixels: [(0, 0, 0); LED_COUNT],
        }
    }

    pub fn set_pixel(&mut self, index: u8, r: u8, g: u8, b: u8) {
        if let Some(px) = self.pixels.get_mut(usize::from(index)) {
            *px = (r, g, b);
        }
    }

    pub fn pixel(&self, index: u8) -> (u8, u8, u8) {
        self.pixels
            .get(usize::from(index))
            .copied()
            .unwrap_or((0, 0, 0))
    }

    pub fn clear(&mut self) {
        self.pixels = [(0, 0, 0); LED_COUNT];
    }

    /// Shift the framebuffer out to the strip.
    #[cfg(target_os = "espidf")]
    pub fn show(&mut self) {
        let mut signal = FixedLengthSignal::<SIGNAL_LEN>::new();
        for (px, (r, g, b)) in self.pixels.iter().copied().enumerate() {
            // GRB order, most significant bit first.
            let grb = (u32::from(g) << 16) | (u32::from(r) << 8) | u32::from(b);
            for bit in 0..24usize {
                let pulse = if grb & (1 << (23 - bit)) != 0 {
                    self.one
                } else {
                    self.zero
                };
                if let Err(e) = signal.set(px * 24 + bit, &pulse) {
                    log::error!("neopixel signal build failed: {e}");
                    return;
                }
            }
        }
        if let Err(e) = self.tx.start_blocking(&signal) {
            log::error!("neopixel transmit failed: {e}");
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn show(&mut self) {
        log::trace!("neopixel(sim): show {:?}", self.pixels);
    }
}
