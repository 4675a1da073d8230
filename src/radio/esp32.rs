//! ESP-IDF station radio adapter.
//!
//! Implements [`StationRadio`] over the ESP-IDF WiFi driver so the
//! supervisor can run against real hardware. Host builds never compile
//! this module; they test against a scripted radio instead.

use super::{
    InterfaceConfig, PowerMode, RadioError, StationRadio, STATUS_CONNECTING, STATUS_CONNECT_FAILED,
    STATUS_GOT_IP, STATUS_IDLE,
};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::EspError;
use log::{info, warn};
use std::ffi::CString;
use std::net::Ipv4Addr;

impl From<EspError> for RadioError {
    fn from(error: EspError) -> Self {
        RadioError::Driver(error.to_string())
    }
}

/// Station radio backed by the ESP-IDF WiFi driver.
pub struct EspStationRadio<'a> {
    /// ESP-IDF WiFi driver.
    wifi: EspWifi<'a>,
    /// Set when the driver rejected the last connect request; surfaced
    /// through [`link_status`](StationRadio::link_status) as a negative
    /// code the way vendor station drivers report it.
    connect_failed: bool,
}

impl<'a> EspStationRadio<'a> {
    /// Wrap the WiFi peripheral as a station radio.
    pub fn new(modem: Modem, sysloop: EspSystemEventLoop) -> Result<Self, EspError> {
        let wifi = EspWifi::new(modem, sysloop, None)?;
        Ok(Self {
            wifi,
            connect_failed: false,
        })
    }
}

impl StationRadio for EspStationRadio<'_> {
    fn activate(&mut self, enable: bool) -> Result<(), RadioError> {
        if enable {
            if !self.wifi.is_started()? {
                // The driver refuses to start without a station configuration.
                self.wifi
                    .set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
                self.wifi.start()?;
            }
        } else if self.wifi.is_started()? {
            self.wifi.stop()?;
        }
        Ok(())
    }

    fn is_active(&self) -> Result<bool, RadioError> {
        Ok(self.wifi.is_started()?)
    }

    fn is_connected(&self) -> Result<bool, RadioError> {
        Ok(self.wifi.is_connected()?)
    }

    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), RadioError> {
        info!("connecting to wifi network: {}", ssid);

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| RadioError::InvalidCredentials)?,
            password: password
                .try_into()
                .map_err(|_| RadioError::InvalidCredentials)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&config)?;

        self.connect_failed = false;
        if let Err(error) = self.wifi.connect() {
            // A rejected connect is an expected outcome, not a fault; it
            // surfaces as a negative link status like on vendor drivers.
            warn!("wifi connect request rejected: {}", error);
            self.connect_failed = true;
        }
        Ok(())
    }

    fn link_status(&self) -> Result<i32, RadioError> {
        if self.wifi.is_connected()? {
            Ok(STATUS_GOT_IP)
        } else if self.connect_failed {
            Ok(STATUS_CONNECT_FAILED)
        } else if self.wifi.is_started()? {
            Ok(STATUS_CONNECTING)
        } else {
            Ok(STATUS_IDLE)
        }
    }

    fn interface_config(&self) -> Result<InterfaceConfig, RadioError> {
        let info = self.wifi.sta_netif().get_ip_info()?;
        Ok(InterfaceConfig {
            ip: info.ip,
            subnet: prefix_to_mask(info.subnet.mask.0),
            gateway: info.subnet.gateway,
            dns: info.dns.unwrap_or(Ipv4Addr::UNSPECIFIED),
        })
    }

    fn set_regulatory_code(&mut self, code: &str) -> Result<(), RadioError> {
        let code = CString::new(code)
            .map_err(|_| RadioError::Driver("country code contains NUL".to_string()))?;
        esp_idf_sys::esp!(unsafe { esp_idf_sys::esp_wifi_set_country_code(code.as_ptr(), true) })?;
        Ok(())
    }

    fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), RadioError> {
        let ps = match mode {
            PowerMode::Disabled => esp_idf_sys::wifi_ps_type_t_WIFI_PS_NONE,
            PowerMode::MinModem => esp_idf_sys::wifi_ps_type_t_WIFI_PS_MIN_MODEM,
            PowerMode::MaxModem => esp_idf_sys::wifi_ps_type_t_WIFI_PS_MAX_MODEM,
        };
        esp_idf_sys::esp!(unsafe { esp_idf_sys::esp_wifi_set_ps(ps) })?;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), RadioError> {
        if self.wifi.is_connected()? {
            self.wifi.disconnect()?;
        }
        if self.wifi.is_started()? {
            self.wifi.stop()?;
        }
        self.connect_failed = false;
        Ok(())
    }
}

/// Convert a CIDR prefix length to a dotted-quad subnet mask.
fn prefix_to_mask(prefix: u8) -> Ipv4Addr {
    let bits = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix.min(32)))
    };
    Ipv4Addr::from(bits)
}
