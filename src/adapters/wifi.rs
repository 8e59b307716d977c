//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`].  The adapter only kicks off association and
//! answers "is the link up"; waiting and retrying is the
//! [`RetryPolicy`](crate::net::RetryPolicy)'s job, so this stays a thin
//! shim over the ESP-IDF WiFi driver.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real `esp_idf_svc::wifi::EspWifi` calls.
//! - **all other targets**: a flag that flips to associated on `begin`.

use crate::app::ports::{CommsError, LinkPort};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};
#[cfg(target_os = "espidf")]
use log::{error, info};

pub struct WifiLink {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    associated: bool,
}

#[cfg(target_os = "espidf")]
impl WifiLink {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> anyhow::Result<Self> {
        let wifi = EspWifi::new(modem, sysloop, Some(nvs))?;
        Ok(Self { wifi })
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiLink {
    pub fn new() -> Self {
        Self { associated: false }
    }
}

#[cfg(target_os = "espidf")]
impl LinkPort for WifiLink {
    fn begin(&mut self, ssid: &str, pass: &str) -> Result<(), CommsError> {
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| CommsError::LinkDown)?,
            password: pass.try_into().map_err(|_| CommsError::LinkDown)?,
            auth_method: if pass.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..ClientConfiguration::default()
        });

        let started = self
            .wifi
            .set_configuration(&config)
            .and_then(|()| self.wifi.start())
            .and_then(|()| self.wifi.connect());
        match started {
            Ok(()) => {
                info!("wifi: associating with {ssid}");
                Ok(())
            }
            Err(e) => {
                error!("wifi: begin failed: {e}");
                Err(CommsError::LinkDown)
            }
        }
    }

    fn is_associated(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }
}

#[cfg(not(target_os = "espidf"))]
impl LinkPort for WifiLink {
    fn begin(&mut self, ssid: &str, _pass: &str) -> Result<(), CommsError> {
        log::info!("wifi(sim): associated with {ssid}");
        self.associated = true;
        Ok(())
    }

    fn is_associated(&self) -> bool {
        self.associated
    }
}
