//! Persisted device configuration.
//!
//! One JSON document on flash holds everything a node needs to come up:
//! identity, WiFi credentials, broker coordinates, and room placement.
//! The document is loaded once at startup, mutated field-by-field over the
//! command channel, and written back only on an explicit `config write`.
//! Unsaved changes are lost on reboot.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::app::commands::ConfigField;
use crate::app::ports::{StorageError, StoragePort};

/// WiFi credentials (`network` group in the stored document).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub ssid: String,
    pub pass: String,
}

/// Broker coordinates (`mqtt` group).
///
/// No field invents a value: an absent `port` reads as 0 like every other
/// missing field, and a document without a broker address simply leaves
/// the node offline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub server: String,
    pub user: String,
    pub pass: String,
    pub port: u16,
}

/// Placement used to build telemetry topics (`location` group).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub site: String,
    pub room: String,
}

/// The full configuration document.
///
/// Every field defaults when missing from the stored copy, so a load never
/// yields a partially-applied document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub myname: String,
    pub flipped: bool,
    pub network: NetworkConfig,
    pub mqtt: MqttConfig,
    pub location: LocationConfig,
}

impl DeviceConfig {
    /// Load the document from storage.  Fails softly: any read or parse
    /// problem is logged and defaults are returned, never an error.
    pub fn load(storage: &impl StoragePort) -> Self {
        let bytes = match storage.read_all() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("cannot open config document: {e}");
                return Self::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(config) => config,
            Err(e) => {
                error!("failed to parse config document: {e}");
                Self::default()
            }
        }
    }

    /// Serialize the full document and replace the stored copy.
    ///
    /// On failure the previous persisted copy is untouched (the storage
    /// adapter writes to a scratch file and renames).
    pub fn persist(&self, storage: &mut impl StoragePort) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|_| StorageError::IoError)?;
        storage.write_all(&bytes)?;
        info!("written new config, takes full effect on reboot");
        Ok(())
    }

    /// Apply a `config <key> <value>` mutation in memory.
    pub fn set(&mut self, field: ConfigField, value: &str) {
        match field {
            ConfigField::Room => self.location.room = value.to_owned(),
            ConfigField::Site => self.location.site = value.to_owned(),
            ConfigField::MyName => self.myname = value.to_owned(),
            ConfigField::MqttUser => self.mqtt.user = value.to_owned(),
            ConfigField::MqttPass => self.mqtt.pass = value.to_owned(),
        }
    }

    /// Dump every field to the debug log.
    pub fn log_summary(&self) {
        debug!("myname = {}", self.myname);
        debug!("site = {}", self.location.site);
        debug!("room = {}", self.location.room);
        debug!("ssid = {}", self.network.ssid);
        debug!("pass = {}", self.network.pass);
        debug!("mqttserver = {}", self.mqtt.server);
        debug!("mqttuser = {}", self.mqtt.user);
        debug!("mqttpass = {}", self.mqtt.pass);
        debug!("mqttport = {}", self.mqtt.port);
        debug!("flipped = {}", self.flipped);
    }
}
