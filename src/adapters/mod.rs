//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                       | Connects to                |
//! |------------|----------------------------------|----------------------------|
//! | `hardware` | SensorPort, DisplayPort, LedPort | I²C bus, RMT NeoPixel      |
//! | `spiffs`   | StoragePort                      | SPIFFS flash filesystem    |
//! | `wifi`     | LinkPort                         | ESP-IDF WiFi STA           |
//! | `mqtt`     | TransportPort                    | ESP-IDF MQTT client        |
//! | `time`     | Clock                            | ESP high-resolution timer  |
//! | `httpd`    | (camera endpoint)                | ESP-IDF HTTP server        |
//!
//! Every adapter carries a host-side simulation behind
//! `#[cfg(not(target_os = "espidf"))]` so the domain layer stays testable.

pub mod hardware;
pub mod httpd;
pub mod mqtt;
pub mod spiffs;
pub mod time;
pub mod wifi;
