//! MQTT transport adapter.
//!
//! Implements [`TransportPort`] over `esp_idf_svc::mqtt`.  The IDF client
//! delivers events on its own task; the callback here only flips the
//! connected flag and queues inbound messages — it never blocks and never
//! reconnects, because a reconnect from inside the event callback would
//! deadlock the client's own task.  The main loop drains the queue through
//! [`TransportPort::poll`].

use crate::app::ports::{CommsError, ConnectOptions, InboundMessage, TransportPort};

#[cfg(target_os = "espidf")]
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, LwtConfiguration, MqttClientConfiguration, QoS};
#[cfg(target_os = "espidf")]
use log::{debug, error, warn};

/// 10 ms polls while waiting for the broker handshake (2 s total).
#[cfg(target_os = "espidf")]
const CONNECT_WAIT_POLLS: u32 = 200;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

pub struct MqttTransport {
    server: String,
    port: u16,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(target_os = "espidf")]
    connected: Arc<AtomicBool>,
    #[cfg(target_os = "espidf")]
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    #[cfg(not(target_os = "espidf"))]
    connected: bool,
    #[cfg(not(target_os = "espidf"))]
    inbound: VecDeque<InboundMessage>,
}

impl MqttTransport {
    pub fn new(server: &str, port: u16) -> Self {
        Self {
            server: server.to_owned(),
            port,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(target_os = "espidf")]
            connected: Arc::new(AtomicBool::new(false)),
            #[cfg(target_os = "espidf")]
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            #[cfg(not(target_os = "espidf"))]
            connected: false,
            #[cfg(not(target_os = "espidf"))]
            inbound: VecDeque::new(),
        }
    }

    fn broker_url(&self) -> String {
        format!("mqtt://{}:{}", self.server, self.port)
    }
}

#[cfg(target_os = "espidf")]
impl TransportPort for MqttTransport {
    fn is_connected(&self) -> bool {
        self.client.is_some() && self.connected.load(Ordering::Acquire)
    }

    fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<(), CommsError> {
        // Tear down any previous session before handing the broker a new
        // client id.
        self.client = None;
        self.connected.store(false, Ordering::Release);

        let conf = MqttClientConfiguration {
            client_id: Some(options.client_id),
            username: Some(options.username),
            password: Some(options.password),
            lwt: Some(LwtConfiguration {
                topic: options.will_topic,
                payload: options.will_payload,
                qos: QoS::AtMostOnce,
                retain: false,
            }),
            ..MqttClientConfiguration::default()
        };

        let connected = Arc::clone(&self.connected);
        let inbound = Arc::clone(&self.inbound);
        let client = EspMqttClient::new(&self.broker_url(), &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    connected.store(true, Ordering::Release);
                }
                EventPayload::Disconnected => {
                    connected.store(false, Ordering::Release);
                }
                EventPayload::Received { topic, data, .. } => {
                    let Some(topic) = topic else { return };
                    let message = InboundMessage {
                        topic: topic.to_owned(),
                        payload: data.to_vec(),
                    };
                    match inbound.lock() {
                        Ok(mut queue) => queue.push_back(message),
                        Err(_) => warn!("inbound queue poisoned, message dropped"),
                    }
                }
                EventPayload::Error(e) => debug!("mqtt event error: {e}"),
                _ => {}
            }
        })
        .map_err(|e| {
            error!("mqtt client create failed: {e}");
            CommsError::ConnectFailed
        })?;

        self.client = Some(client);

        // The IDF client connects asynchronously; wait out the handshake
        // here so callers get synchronous connect semantics.
        for _ in 0..CONNECT_WAIT_POLLS {
            if self.connected.load(Ordering::Acquire) {
                return Ok(());
            }
            esp_idf_hal::delay::FreeRtos::delay_ms(10);
        }
        error!("mqtt: broker did not answer within the connect window");
        self.client = None;
        Err(CommsError::ConnectFailed)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        let Some(client) = &mut self.client else {
            return Err(CommsError::NotConnected);
        };
        client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|_| CommsError::PublishFailed)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        let Some(client) = &mut self.client else {
            return Err(CommsError::NotConnected);
        };
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| CommsError::SubscribeFailed)
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.inbound.lock().ok()?.pop_front()
    }
}

#[cfg(not(target_os = "espidf"))]
impl TransportPort for MqttTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<(), CommsError> {
        log::info!(
            "mqtt(sim): connected to {} as {}",
            self.broker_url(),
            options.client_id
        );
        self.connected = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::NotConnected);
        }
        log::trace!(
            "mqtt(sim): publish [{topic}]: {}",
            String::from_utf8_lossy(payload)
        );
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::NotConnected);
        }
        log::trace!("mqtt(sim): subscribe {topic}");
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.inbound.pop_front()
    }
}
