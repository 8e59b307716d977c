//! RoomSense firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod display;
pub mod net;
pub mod presence;

pub mod error;
pub mod pins;

// Hardware-facing modules; each carries a host-side simulation behind
// cfg gates so the library builds for any target.
pub mod adapters;
pub mod drivers;
pub mod sensors;
