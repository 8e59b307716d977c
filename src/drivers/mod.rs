//! Peripheral drivers: OLED panel, NeoPixel strip, camera.

pub mod camera;
pub mod neopixel;
pub mod oled;
