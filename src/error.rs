#![allow(dead_code)] // Init variants reserved for adapters not present on every board

//! Unified error types for the RoomSense firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level loop's error handling uniform.  All variants are `Copy` so they
//! can be passed around without allocation.

use core::fmt;

use crate::app::ports::{CommsError, StorageError};

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Persistent storage failed.
    Storage(StorageError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
