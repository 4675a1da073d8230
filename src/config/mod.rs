//! Supervisor configuration.
//!
//! Credential types and their durable storage. The supervisor itself only
//! consumes [`WifiCredentials`]; loading and saving the record is the
//! host application's job at startup and on demand.
//!
//! # Components
//!
//! - [`credentials`](self) - validated SSID/password pair (host-testable)
//! - [`store`](self) - JSON record at `configuration/wifi.json`

mod credentials;
mod store;

pub use credentials::{CredentialsError, WifiCredentials, MAX_PASSWORD_LEN, MAX_SSID_LEN};
pub use store::{
    default_credentials_path, load_credentials, load_credentials_from, save_credentials,
    save_credentials_to, StoreError,
};
