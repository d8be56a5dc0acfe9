//! Wi-Fi station link.

use core::time::Duration;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys::EspError;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use notify_button::{ConnectionInfo, Link};

#[derive(Debug)]
pub enum WifiError {
    /// SSID or password does not fit the driver's buffers.
    Credentials,
    Esp(EspError),
}

impl From<EspError> for WifiError {
    fn from(e: EspError) -> Self {
        WifiError::Esp(e)
    }
}

/// Station-only Wi-Fi with a bounded association wait.
pub struct EspWifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
    timeout: Duration,
}

impl EspWifiLink {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        timeout: Duration,
    ) -> Result<Self, EspError> {
        let wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), nvs)?, sysloop)?;
        Ok(Self { wifi, timeout })
    }
}

impl Link for EspWifiLink {
    type Error = WifiError;

    fn connect(&mut self, ssid: &str, password: &str) -> Result<ConnectionInfo, WifiError> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        // Client-only configuration also keeps the soft-AP off.
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| WifiError::Credentials)?,
            password: password.try_into().map_err(|_| WifiError::Credentials)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&config)?;
        if !self.wifi.is_started()? {
            self.wifi.start()?;
        }

        self.wifi.wifi_mut().connect()?;

        let wifi = &self.wifi;
        let joined = wifi.wifi_wait_while(|| wifi.is_connected().map(|up| !up), Some(self.timeout));
        if let Err(e) = joined {
            let _ = self.wifi.disconnect();
            return Err(WifiError::Esp(e));
        }

        self.wifi.wait_netif_up()?;

        let ip_info = self.wifi.wifi().sta_netif().get_ip_info()?;
        Ok(ConnectionInfo {
            ip: ip_info.ip,
            gateway: ip_info.subnet.gateway,
            netmask_bits: ip_info.subnet.mask.0,
        })
    }
}
