//! WiFi station supervision for ESP32-class devices.
//!
//! This library keeps a station interface connected: an initial
//! timeout-bounded connect, then a perpetual monitor loop that detects
//! link loss, re-establishes the connection and notifies the host
//! application through optional callbacks - all without ever crashing
//! the host process.
//!
//! The core is platform-independent and tested on the host against a
//! scripted radio; the ESP-IDF driver adapter is enabled with the
//! `esp32` feature.
//!
//! # Example
//!
//! ```ignore
//! use wifi_keeper::{
//!     ConnectionSupervisor, EspStationRadio, DEFAULT_CONNECT_TIMEOUT,
//!     DEFAULT_MONITOR_INTERVAL,
//! };
//!
//! let credentials = wifi_keeper::load_credentials()?
//!     .expect("no credentials configured");
//! let radio = EspStationRadio::new(peripherals.modem, sysloop)?;
//! let mut supervisor = ConnectionSupervisor::new(radio, credentials)?;
//!
//! supervisor
//!     .start(
//!         DEFAULT_CONNECT_TIMEOUT,
//!         DEFAULT_MONITOR_INTERVAL,
//!         Some(Box::new(|ip| log::info!("back online at {:?}", ip))),
//!         None,
//!     )
//!     .await;
//! ```

pub mod config;
pub mod radio;
pub mod supervisor;

// Re-export commonly used items
pub use config::{
    load_credentials, save_credentials, CredentialsError, StoreError, WifiCredentials,
};
pub use radio::{InterfaceConfig, PowerMode, RadioError, StationRadio};
pub use supervisor::{
    ConnectionSupervisor, FailureCallback, ReconnectCallback, SupervisorError, SupervisorOptions,
    SupervisorState, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MONITOR_INTERVAL, LINK_POLL_INTERVAL,
};

#[cfg(feature = "esp32")]
pub use radio::esp32::EspStationRadio;
