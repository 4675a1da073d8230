//! Station radio capability.
//!
//! The supervisor never talks to hardware directly; it drives a
//! [`StationRadio`], an injected capability covering the station-mode
//! surface of a WiFi driver. Tests substitute a scripted radio, firmware
//! plugs in the ESP-IDF adapter from [`esp32`].
//!
//! # Components
//!
//! - [`StationRadio`] - the capability trait (platform-independent)
//! - [`esp32`] - ESP-IDF driver adapter (ESP32 only)

#[cfg(feature = "esp32")]
pub mod esp32;

use std::fmt;
use std::net::Ipv4Addr;

/// Link status: interface idle, no connect request pending.
pub const STATUS_IDLE: i32 = 0;
/// Link status: connect request in progress.
pub const STATUS_CONNECTING: i32 = 1;
/// Link status: associated and an address has been assigned.
pub const STATUS_GOT_IP: i32 = 3;
/// Link status: the driver gave up on the connect request.
pub const STATUS_CONNECT_FAILED: i32 = -1;
/// Link status: no access point with the requested SSID was found.
pub const STATUS_NO_AP_FOUND: i32 = -2;
/// Link status: the access point rejected the credentials.
pub const STATUS_BAD_AUTH: i32 = -3;

/// Power-save policy for the station interface.
///
/// Trades link responsiveness for energy consumption. The default keeps
/// power save off, which is what latency-sensitive firmware wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerMode {
    /// Power save disabled; lowest latency, highest draw.
    #[default]
    Disabled,
    /// Minimum modem power save; the radio wakes for every DTIM beacon.
    MinModem,
    /// Maximum modem power save; the radio wakes on its listen interval.
    MaxModem,
}

/// Interface configuration reported by the driver once an address is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceConfig {
    /// Assigned IPv4 address.
    pub ip: Ipv4Addr,
    /// Subnet mask.
    pub subnet: Ipv4Addr,
    /// Default gateway.
    pub gateway: Ipv4Addr,
    /// Primary DNS server.
    pub dns: Ipv4Addr,
}

impl fmt::Display for InterfaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ip {}, subnet {}, gateway {}, dns {}",
            self.ip, self.subnet, self.gateway, self.dns
        )
    }
}

/// Errors reported by a station radio driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioError {
    /// SSID or password cannot be represented by the driver.
    InvalidCredentials,
    /// The underlying driver rejected an operation.
    Driver(String),
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "credentials not representable by the driver"),
            Self::Driver(msg) => write!(f, "driver error: {}", msg),
        }
    }
}

impl std::error::Error for RadioError {}

/// Station-mode surface of a WiFi radio driver.
///
/// The supervisor owns exactly one radio for its lifetime and is the only
/// caller; implementations may assume single-owner access and do not need
/// internal locking. All methods are quick register-level operations -
/// any waiting (connect polling, monitor pacing) happens in the
/// supervisor at its cooperative suspension points.
pub trait StationRadio {
    /// Bring the station interface up (`true`) or down (`false`).
    fn activate(&mut self, enable: bool) -> Result<(), RadioError>;

    /// Whether the station interface is currently up.
    fn is_active(&self) -> Result<bool, RadioError>;

    /// Whether the link is established and an address is assigned.
    fn is_connected(&self) -> Result<bool, RadioError>;

    /// Issue a connect request for the given network.
    ///
    /// Returns as soon as the request is accepted; progress is observed
    /// through [`link_status`](Self::link_status) and
    /// [`is_connected`](Self::is_connected).
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), RadioError>;

    /// Vendor link status code. Negative values (see the `STATUS_*`
    /// constants) denote unrecoverable connect failures such as bad
    /// credentials or no access point found.
    fn link_status(&self) -> Result<i32, RadioError>;

    /// Current interface configuration (address, subnet, gateway, DNS).
    fn interface_config(&self) -> Result<InterfaceConfig, RadioError>;

    /// Apply a regulatory country code constraining channels and power.
    fn set_regulatory_code(&mut self, code: &str) -> Result<(), RadioError>;

    /// Apply a power-save policy.
    fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), RadioError>;

    /// Return the radio to a clean power-on state, dropping any
    /// association and configuration left over from a previous boot.
    fn reset(&mut self) -> Result<(), RadioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_signs() {
        // The supervisor's retry loop keys on the sign of the status code.
        assert!(STATUS_IDLE >= 0);
        assert!(STATUS_CONNECTING >= 0);
        assert!(STATUS_GOT_IP >= 0);
        assert!(STATUS_CONNECT_FAILED < 0);
        assert!(STATUS_NO_AP_FOUND < 0);
        assert!(STATUS_BAD_AUTH < 0);
    }

    #[test]
    fn test_power_mode_default_disables_power_save() {
        assert_eq!(PowerMode::default(), PowerMode::Disabled);
    }

    #[test]
    fn test_interface_config_display() {
        let config = InterfaceConfig {
            ip: Ipv4Addr::new(192, 168, 1, 100),
            subnet: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::new(192, 168, 1, 1),
            dns: Ipv4Addr::new(1, 1, 1, 1),
        };
        assert_eq!(
            config.to_string(),
            "ip 192.168.1.100, subnet 255.255.255.0, gateway 192.168.1.1, dns 1.1.1.1"
        );
    }

    #[test]
    fn test_radio_error_display() {
        assert_eq!(
            RadioError::Driver("timeout".to_string()).to_string(),
            "driver error: timeout"
        );
        assert_eq!(
            RadioError::InvalidCredentials.to_string(),
            "credentials not representable by the driver"
        );
    }
}
