//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, display, LED strip, network, storage) implement
//! these traits.  The [`AppService`](super::service::AppService) consumes them
//! via generics, so the domain core never touches hardware directly.

use crate::display::GlyphScale;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain environment readings.
///
/// Each reading returns `None` when the backing sensor is absent or the
/// bus transaction failed; callers skip rendering / publishing that value.
pub trait SensorPort {
    fn temperature_c(&mut self) -> Option<f32>;
    fn humidity_pct(&mut self) -> Option<f32>;
    fn pressure_hpa(&mut self) -> Option<f32>;

    /// Distance to the nearest object in millimetres, if a ranging sensor
    /// is fitted.
    fn distance_mm(&mut self) -> Option<i32>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → OLED)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the character display.
///
/// Coordinates are in character cells, not pixels.  A large glyph occupies
/// a 2×2 cell block, so callers step rows accordingly.
pub trait DisplayPort {
    fn clear(&mut self);

    /// Draw `text` at column `col`, row `row` in the given scale.
    fn draw_text(&mut self, col: u8, row: u8, scale: GlyphScale, text: &str);

    /// Rotate the panel 180°.
    fn set_flipped(&mut self, flipped: bool);

    /// Panel contrast, 0 (dimmest) to 255.
    fn set_contrast(&mut self, contrast: u8);
}

// ───────────────────────────────────────────────────────────────
// LED port (driven adapter: domain → NeoPixel strip)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the addressable LED strip.
///
/// `set_pixel` only updates the framebuffer; nothing reaches the wire
/// until [`show`](LedPort::show) is called.
pub trait LedPort {
    fn set_pixel(&mut self, index: u8, r: u8, g: u8, b: u8);

    /// Read back the framebuffer value of a pixel.
    fn pixel(&self, index: u8) -> (u8, u8, u8);

    /// Set every pixel to black (framebuffer only).
    fn clear(&mut self);

    /// Push the framebuffer out to the strip.
    fn show(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Network link port (driven adapter: domain → WiFi)
// ───────────────────────────────────────────────────────────────

/// Station-mode WiFi link.
pub trait LinkPort {
    /// Start associating with the given access point.  Returns once the
    /// attempt has been kicked off; poll [`is_associated`](LinkPort::is_associated)
    /// for completion.
    fn begin(&mut self, ssid: &str, pass: &str) -> Result<(), CommsError>;

    fn is_associated(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ MQTT broker)
// ───────────────────────────────────────────────────────────────

/// Connection options handed to [`TransportPort::connect`].
#[derive(Debug, Clone, Copy)]
pub struct ConnectOptions<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    /// Topic the broker publishes `will_payload` on if we drop off.
    pub will_topic: &'a str,
    pub will_payload: &'a [u8],
}

/// A message delivered on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Broker-facing pub/sub transport.
pub trait TransportPort {
    fn is_connected(&self) -> bool;

    fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<(), CommsError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;

    /// Pop the next inbound message, if any arrived since the last poll.
    fn poll(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain → monotonic time)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source and blocking delay.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;

    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ flash filesystem)
// ───────────────────────────────────────────────────────────────

/// Persistent storage for the configuration document.
pub trait StoragePort {
    /// Read the whole stored document.
    fn read_all(&self) -> Result<Vec<u8>, StorageError>;

    /// Replace the stored document atomically.
    fn write_all(&mut self, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// No stored document exists (first boot).
    NotFound,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`LinkPort`] and [`TransportPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The WiFi link is down or never came up.
    LinkDown,
    /// The broker refused or never answered the connect.
    ConnectFailed,
    PublishFailed,
    SubscribeFailed,
    /// Operation requires a live broker session.
    NotConnected,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "document not found"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for CommsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LinkDown => write!(f, "WiFi link down"),
            Self::ConnectFailed => write!(f, "broker connect failed"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}
