//! Broker session lifecycle against mock link and transport.
//!
//! Covers the bring-up announcement, the value topics, drop-not-queue
//! semantics while offline, and the reconnect cooldown under a dead broker.

use roomsense::app::ports::{
    Clock, CommsError, ConnectOptions, InboundMessage, LedPort, LinkPort, TransportPort,
};
use roomsense::app::service::AppService;
use roomsense::config::DeviceConfig;
use roomsense::net::{PublishPolicy, RECONNECT_COOLDOWN_MS};

use crate::mock_hw::{MockHardware, MockStorage};

// ── Network mocks ─────────────────────────────────────────────

struct StubLink;

impl LinkPort for StubLink {
    fn begin(&mut self, _ssid: &str, _pass: &str) -> Result<(), CommsError> {
        Ok(())
    }

    fn is_associated(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct RecordingBroker {
    accept: bool,
    connected: bool,
    connects: u32,
    will: Option<(String, Vec<u8>)>,
    published: Vec<(String, String)>,
    subscriptions: Vec<String>,
    inbound: Vec<InboundMessage>,
}

impl RecordingBroker {
    fn accepting() -> Self {
        Self {
            accept: true,
            ..Self::default()
        }
    }

    fn dead() -> Self {
        Self::default()
    }

    fn topics(&self) -> Vec<&str> {
        self.published.iter().map(|(t, _)| t.as_str()).collect()
    }
}

impl TransportPort for RecordingBroker {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<(), CommsError> {
        self.connects += 1;
        if !self.accept {
            return Err(CommsError::ConnectFailed);
        }
        self.will = Some((options.will_topic.to_owned(), options.will_payload.to_vec()));
        self.connected = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::NotConnected);
        }
        self.published
            .push((topic.to_owned(), String::from_utf8_lossy(payload).into_owned()));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::NotConnected);
        }
        self.subscriptions.push(topic.to_owned());
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        if self.inbound.is_empty() {
            None
        } else {
            Some(self.inbound.remove(0))
        }
    }
}

struct SimClock {
    now: u64,
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now += u64::from(ms);
    }
}

fn test_config() -> DeviceConfig {
    let mut config = DeviceConfig::default();
    config.myname = "node1".into();
    config.location.site = "hq".into();
    config.location.room = "lab".into();
    config
}

// ── Tests ─────────────────────────────────────────────────────

#[test]
fn bringup_announces_started_with_stopped_as_will() {
    let mut policy = PublishPolicy::new();
    let config = test_config();
    let mut broker = RecordingBroker::accepting();
    let mut clock = SimClock { now: 0 };

    assert!(policy.ensure_connected(0, &config, &mut StubLink, &mut broker, &mut clock));
    assert_eq!(
        broker.will,
        Some(("/hq/lab/status".to_owned(), b"stopped".to_vec()))
    );
    assert_eq!(
        broker.published,
        vec![("/hq/lab/status".to_owned(), "started".to_owned())]
    );
    assert_eq!(broker.subscriptions, vec!["node1".to_owned()]);
}

#[test]
fn environment_set_lands_on_location_topics() {
    let mut policy = PublishPolicy::new();
    let config = test_config();
    let mut hw = MockHardware::with_environment();
    let mut broker = RecordingBroker::accepting();
    let mut clock = SimClock { now: 0 };

    policy.publish_environment(0, &mut hw, &config, &mut StubLink, &mut broker, &mut clock);

    assert_eq!(
        broker.topics(),
        [
            "/hq/lab/status",
            "/hq/lab/temperature",
            "/hq/lab/airpressure",
            "/hq/lab/humidity",
        ]
    );
    assert_eq!(broker.published[1].1, "21.500");
    assert_eq!(broker.published[3].1, "48.000");
}

#[test]
fn offline_values_are_dropped_not_queued() {
    let mut policy = PublishPolicy::new();
    let config = test_config();
    let mut hw = MockHardware::with_environment();
    let mut broker = RecordingBroker::dead();
    let mut clock = SimClock { now: 0 };

    policy.publish_environment(0, &mut hw, &config, &mut StubLink, &mut broker, &mut clock);
    assert!(broker.published.is_empty());

    // The broker comes back: only fresh values flow, nothing replays.
    broker.accept = true;
    policy.publish_environment(
        RECONNECT_COOLDOWN_MS,
        &mut hw,
        &config,
        &mut StubLink,
        &mut broker,
        &mut clock,
    );
    assert_eq!(broker.published.len(), 4, "status + three fresh values");
}

#[test]
fn dead_broker_sees_one_connect_per_cooldown_window() {
    let mut policy = PublishPolicy::new();
    let config = test_config();
    let mut broker = RecordingBroker::dead();
    let mut clock = SimClock { now: 0 };

    for second in 0..=10u64 {
        policy.ensure_connected(
            second * 1_000,
            &config,
            &mut StubLink,
            &mut broker,
            &mut clock,
        );
    }
    // Attempts land at t = 0 s, 5 s, and 10 s only.
    assert_eq!(broker.connects, 3);
}

#[test]
fn inbound_command_reaches_the_hardware() {
    let mut app = AppService::new(test_config(), true);
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();
    let mut broker = RecordingBroker::accepting();
    broker.connected = true;
    broker.inbound.push(InboundMessage {
        topic: "node1".into(),
        payload: b"led 7 8 9".to_vec(),
    });

    while let Some(message) = broker.poll() {
        app.handle_message(&message.topic, &message.payload, &mut hw, &mut storage);
    }
    assert_eq!(hw.pixel(0), (7, 8, 9));
}
