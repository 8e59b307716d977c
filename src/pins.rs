//! GPIO / peripheral pin assignments for the RoomSense node board.
//!
//! The wiring map.  ESP-IDF peripherals are claimed as typed singletons in
//! `main`, so the GPIO numbers here document the board rather than feed the
//! type system; keep the two in sync when rewiring.

// ---------------------------------------------------------------------------
// I²C bus (SH1106 OLED, BME280, Si7021)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// NeoPixel strip (WS2812B, GRB order, 800 kHz)
// ---------------------------------------------------------------------------

/// Data line for the WS2812B chain.
pub const NEOPIXEL_GPIO: i32 = 14;
/// Number of pixels on the strip.
pub const LED_COUNT: usize = 10;

// ---------------------------------------------------------------------------
// Camera (OV2640 on the camera-equipped board variant)
// ---------------------------------------------------------------------------

pub const CAM_PWDN_GPIO: i32 = 26;
pub const CAM_RESET_GPIO: i32 = -1;
pub const CAM_XCLK_GPIO: i32 = 32;
pub const CAM_SIOD_GPIO: i32 = 13;
pub const CAM_SIOC_GPIO: i32 = 12;
pub const CAM_Y9_GPIO: i32 = 39;
pub const CAM_Y8_GPIO: i32 = 36;
pub const CAM_Y7_GPIO: i32 = 23;
pub const CAM_Y6_GPIO: i32 = 18;
pub const CAM_Y5_GPIO: i32 = 15;
pub const CAM_Y4_GPIO: i32 = 4;
pub const CAM_Y3_GPIO: i32 = 14;
pub const CAM_Y2_GPIO: i32 = 5;
pub const CAM_VSYNC_GPIO: i32 = 27;
pub const CAM_HREF_GPIO: i32 = 25;
pub const CAM_PCLK_GPIO: i32 = 19;
