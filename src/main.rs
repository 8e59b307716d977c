//! RoomSense firmware — main entry point.
//!
//! Hexagonal layout: one [`AppService`] of pure logic in the middle, with
//! the I²C/RMT hardware adapter, SPIFFS storage, WiFi link, and MQTT
//! transport plugged in around it.  A single cooperative loop polls the
//! transport, feeds commands into the service, publishes the environment
//! set once a minute, and drives the display tick.

#![deny(unused_must_use)]

#[cfg(target_os = "espidf")]
use anyhow::Context;
#[cfg(target_os = "espidf")]
use log::{error, info, warn};

#[cfg(target_os = "espidf")]
use roomsense::adapters::hardware::HardwareAdapter;
#[cfg(target_os = "espidf")]
use roomsense::adapters::httpd;
#[cfg(target_os = "espidf")]
use roomsense::adapters::mqtt::MqttTransport;
#[cfg(target_os = "espidf")]
use roomsense::adapters::spiffs::SpiffsStorage;
#[cfg(target_os = "espidf")]
use roomsense::adapters::time::MonotonicClock;
#[cfg(target_os = "espidf")]
use roomsense::adapters::wifi::WifiLink;
#[cfg(target_os = "espidf")]
use roomsense::app::ports::{Clock, SensorPort, TransportPort};
#[cfg(target_os = "espidf")]
use roomsense::app::service::{AppService, LedSpec, SystemRequest};
#[cfg(target_os = "espidf")]
use roomsense::config::DeviceConfig;
#[cfg(target_os = "espidf")]
use roomsense::drivers::camera::Camera;
#[cfg(target_os = "espidf")]
use roomsense::drivers::neopixel::NeoPixelStrip;
#[cfg(target_os = "espidf")]
use roomsense::net::{PublishPolicy, RetryPolicy};

/// Spacing between environment publishes.
#[cfg(target_os = "espidf")]
const TRANSMISSION_INTERVAL_MS: u64 = 60_000;

/// Idle delay at the bottom of the loop.
#[cfg(target_os = "espidf")]
const LOOP_DELAY_MS: u32 = 50;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::FromValueType;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use std::sync::{Arc, Mutex};

    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("RoomSense v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut clock = MonotonicClock::new();

    // The strip is assumed to always be connected; red means "booting".
    // Wiring per `pins`: strip data on GPIO14, I2C on GPIO21/22.
    let strip = NeoPixelStrip::new(peripherals.pins.gpio14, peripherals.rmt.channel0)?;

    let mut storage = SpiffsStorage::mount().context("mounting spiffs")?;
    let config = DeviceConfig::load(&storage);
    config.log_summary();

    let i2c_config = I2cConfig::new().baudrate(100_u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    )?;
    let mut hw = HardwareAdapter::new(i2c, strip, config.flipped);
    let display_present = hw.display_present();

    let camera = Arc::new(Mutex::new(Camera::init()));
    let _httpd = match httpd::start(Arc::clone(&camera)) {
        Ok(server) => Some(server),
        Err(e) => {
            warn!("camera endpoint unavailable: {e}");
            None
        }
    };

    let mut app = AppService::new(config, display_present);
    app.apply_led(&mut hw, LedSpec::colour(255, 0, 0), true);
    clock.delay_ms(5_000);

    let mut link = WifiLink::new(peripherals.modem, sysloop, nvs)?;
    let mut transport = MqttTransport::new(&app.config().mqtt.server, app.config().mqtt.port);
    let mut policy = PublishPolicy::new();

    app.apply_led(&mut hw, LedSpec::colour(255, 128, 0), true);
    match RetryPolicy::wifi().associate(app.config(), &mut link, &mut clock) {
        Ok(()) => {
            app.apply_led(&mut hw, LedSpec::colour(0, 255, 0), true);
            clock.delay_ms(1_000);
            app.apply_led(&mut hw, LedSpec::colour(0, 0, 0), true);
        }
        Err(e) => {
            // Dim amber: running, but offline.  The publish policy keeps
            // retrying on its cooldown.
            error!("startup association failed: {e}");
            app.apply_led(&mut hw, LedSpec::colour(2, 1, 0), true);
        }
    }

    info!("entering main loop");
    let mut last_transmission_ms: u64 = 0;
    loop {
        let now_ms = clock.now_ms();
        let _ = policy.ensure_connected(now_ms, app.config(), &mut link, &mut transport, &mut clock);

        while let Some(message) = transport.poll() {
            if let Some(SystemRequest::Reboot) =
                app.handle_message(&message.topic, &message.payload, &mut hw, &mut storage)
            {
                warn!("reboot requested over command channel");
                unsafe { esp_idf_svc::sys::esp_restart() };
            }
        }

        if let Some(distance) = hw.distance_mm() {
            app.presence_update(distance, &mut hw);
        }

        if now_ms.wrapping_sub(last_transmission_ms) >= TRANSMISSION_INTERVAL_MS {
            last_transmission_ms = now_ms;
            policy.publish_environment(
                now_ms,
                &mut hw,
                app.config(),
                &mut link,
                &mut transport,
                &mut clock,
            );
        }

        app.render_tick(now_ms, &mut hw);
        clock.delay_ms(LOOP_DELAY_MS);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    // The firmware binary only makes sense on the device; host targets use
    // the library crate and its test suites.
    eprintln!("roomsense: build for an espidf target to produce firmware");
}
