//! Publish and reconnect policy.
//!
//! Connectivity is best-effort: the node keeps working offline and a value
//! generated while disconnected is dropped, never queued.  Reconnect
//! attempts are throttled by a fixed cooldown so a dead broker cannot turn
//! the main loop into a connect storm.

use log::{debug, error, info};

use crate::app::events::{Measurement, Scalar};
use crate::app::ports::{Clock, CommsError, ConnectOptions, LinkPort, SensorPort, TransportPort};
use crate::config::DeviceConfig;

/// Minimum spacing between broker reconnect attempts.
pub const RECONNECT_COOLDOWN_MS: u64 = 5_000;

/// WiFi association retry bound.
pub const WIFI_MAX_ATTEMPTS: u32 = 20;
pub const WIFI_RETRY_DELAY_MS: u32 = 1_000;

/// Full topic for a published value.
pub fn value_topic(config: &DeviceConfig, name: &str) -> String {
    format!("/{}/{}/{}", config.location.site, config.location.room, name)
}

/// Lifecycle topic: carries `started` on connect and `stopped` as the
/// broker-delivered last will.
pub fn status_topic(config: &DeviceConfig) -> String {
    value_topic(config, "status")
}

/// Bounded blocking retry for WiFi association.
///
/// Callable outside the main loop, so startup and the reconnect path share
/// one policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u32,
}

impl RetryPolicy {
    pub fn wifi() -> Self {
        Self {
            max_attempts: WIFI_MAX_ATTEMPTS,
            delay_ms: WIFI_RETRY_DELAY_MS,
        }
    }

    /// Kick off association and poll until the link is up or attempts are
    /// exhausted.  Blocks for `max_attempts * delay_ms` in the worst case.
    pub fn associate(
        &self,
        config: &DeviceConfig,
        link: &mut impl LinkPort,
        clock: &mut impl Clock,
    ) -> Result<(), CommsError> {
        link.begin(&config.network.ssid, &config.network.pass)?;

        for _ in 0..self.max_attempts {
            if link.is_associated() {
                debug!("wifi associated with {}", config.network.ssid);
                return Ok(());
            }
            clock.delay_ms(self.delay_ms);
        }
        if link.is_associated() {
            return Ok(());
        }
        error!("cannot associate with {}", config.network.ssid);
        Err(CommsError::LinkDown)
    }
}

/// Broker session supervisor.
///
/// `last_attempt_ms` is `None` while connected (or before the first
/// attempt); it is stamped before every reconnect attempt and cleared only
/// on success, so a failed attempt waits out the full cooldown.
#[derive(Debug)]
pub struct PublishPolicy {
    last_attempt_ms: Option<u64>,
    retry: RetryPolicy,
}

impl PublishPolicy {
    pub fn new() -> Self {
        Self {
            last_attempt_ms: None,
            retry: RetryPolicy::wifi(),
        }
    }

    /// Check the session and reconnect if the cooldown allows.  Returns
    /// whether the transport is usable right now.
    pub fn ensure_connected(
        &mut self,
        now_ms: u64,
        config: &DeviceConfig,
        link: &mut impl LinkPort,
        transport: &mut impl TransportPort,
        clock: &mut impl Clock,
    ) -> bool {
        if transport.is_connected() {
            return true;
        }

        if let Some(last) = self.last_attempt_ms {
            if now_ms.wrapping_sub(last) < RECONNECT_COOLDOWN_MS {
                return false;
            }
        }
        self.last_attempt_ms = Some(now_ms);

        if !link.is_associated() && self.retry.associate(config, link, clock).is_err() {
            return false;
        }

        let status = status_topic(config);
        let options = ConnectOptions {
            client_id: &config.myname,
            username: &config.mqtt.user,
            password: &config.mqtt.pass,
            will_topic: &status,
            will_payload: b"stopped",
        };
        match transport.connect(&options) {
            Ok(()) => {
                info!("broker connected as {}", config.myname);
                if let Err(e) = transport.publish(&status, b"started") {
                    error!("status publish failed: {e}");
                }
                if let Err(e) = transport.subscribe(&config.myname) {
                    error!("command subscribe failed: {e}");
                }
                self.last_attempt_ms = None;
                true
            }
            Err(e) => {
                error!("broker connect failed: {e}");
                false
            }
        }
    }

    /// Publish one measurement, reconnecting opportunistically first.  A
    /// value that cannot be delivered is dropped.
    pub fn publish(
        &mut self,
        now_ms: u64,
        measurement: &Measurement,
        config: &DeviceConfig,
        link: &mut impl LinkPort,
        transport: &mut impl TransportPort,
        clock: &mut impl Clock,
    ) {
        let _ = self.ensure_connected(now_ms, config, link, transport, clock);

        let topic = value_topic(config, measurement.name);
        let payload = measurement.payload();
        debug!("publish [{topic}]: {payload}");

        if let Err(e) = transport.publish(&topic, payload.as_bytes()) {
            debug!("dropped {}: {e}", measurement.name);
        }
    }

    /// Publish the standard environment set from whatever sensors answered.
    pub fn publish_environment(
        &mut self,
        now_ms: u64,
        sensors: &mut impl SensorPort,
        config: &DeviceConfig,
        link: &mut impl LinkPort,
        transport: &mut impl TransportPort,
        clock: &mut impl Clock,
    ) {
        let readings = [
            ("temperature", sensors.temperature_c()),
            ("airpressure", sensors.pressure_hpa()),
            ("humidity", sensors.humidity_pct()),
        ];
        for (name, value) in readings {
            if let Some(v) = value {
                let m = Measurement::new(name, Scalar::Float(v));
                self.publish(now_ms, &m, config, link, transport, clock);
            }
        }
    }
}
