//! WiFi credential validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum SSID length per IEEE 802.11 standard.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum password length for WPA2.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Credentials for joining a network in station mode.
///
/// Fixed for the lifetime of a supervisor session. Both fields are zeroed
/// when the value is dropped. An empty password means an open network.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct WifiCredentials {
    ssid: String,
    password: String,
}

impl WifiCredentials {
    /// Create validated credentials.
    pub fn new(
        ssid: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let credentials = Self {
            ssid: ssid.into(),
            password: password.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Credentials for an open network (no password).
    pub fn open(ssid: impl Into<String>) -> Result<Self, CredentialsError> {
        Self::new(ssid, String::new())
    }

    /// Validate SSID and password lengths.
    pub fn validate(&self) -> Result<(), CredentialsError> {
        if self.ssid.is_empty() {
            return Err(CredentialsError::SsidEmpty);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(CredentialsError::SsidTooLong {
                len: self.ssid.len(),
                max: MAX_SSID_LEN,
            });
        }
        if self.password.len() > MAX_PASSWORD_LEN {
            return Err(CredentialsError::PasswordTooLong {
                len: self.password.len(),
                max: MAX_PASSWORD_LEN,
            });
        }
        Ok(())
    }

    /// Network SSID.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Network password; empty for open networks.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Whether this is an open network (no password).
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep the password out of logs and panic messages.
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"****")
            .finish()
    }
}

/// Errors that can occur validating credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// SSID is empty.
    SsidEmpty,
    /// SSID exceeds maximum length.
    SsidTooLong { len: usize, max: usize },
    /// Password exceeds maximum length.
    PasswordTooLong { len: usize, max: usize },
}

impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len, max } => {
                write!(f, "SSID too long: {} bytes (max {})", len, max)
            }
            Self::PasswordTooLong { len, max } => {
                write!(f, "password too long: {} bytes (max {})", len, max)
            }
        }
    }
}

impl std::error::Error for CredentialsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credentials() {
        let credentials = WifiCredentials::new("TestNetwork", "password123").unwrap();
        assert_eq!(credentials.ssid(), "TestNetwork");
        assert_eq!(credentials.password(), "password123");
        assert!(!credentials.is_open());
    }

    #[test]
    fn test_open_network() {
        let credentials = WifiCredentials::open("OpenNetwork").unwrap();
        assert!(credentials.is_open());
        assert!(credentials.validate().is_ok());
    }

    #[test]
    fn test_empty_ssid() {
        let result = WifiCredentials::new("", "password123");
        assert_eq!(result, Err(CredentialsError::SsidEmpty));
    }

    #[test]
    fn test_ssid_too_long() {
        let long_ssid = "a".repeat(33);
        let result = WifiCredentials::new(long_ssid, "password123");
        assert!(matches!(result, Err(CredentialsError::SsidTooLong { .. })));
    }

    #[test]
    fn test_ssid_max_length() {
        let max_ssid = "a".repeat(32);
        assert!(WifiCredentials::new(max_ssid, "password123").is_ok());
    }

    #[test]
    fn test_short_password_accepted() {
        // Some deployments use pre-WPA2 keys shorter than 8 bytes; length
        // policy is left to the access point, which rejects bad keys with
        // a negative link status at connect time.
        assert!(WifiCredentials::new("TestNetwork", "secret").is_ok());
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(65);
        let result = WifiCredentials::new("TestNetwork", long_password);
        assert!(matches!(
            result,
            Err(CredentialsError::PasswordTooLong { .. })
        ));
    }

    #[test]
    fn test_password_max_length() {
        let max_password = "a".repeat(64);
        assert!(WifiCredentials::new("TestNetwork", max_password).is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = WifiCredentials::new("TestNetwork", "password123").unwrap();
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("TestNetwork"));
        assert!(!debug.contains("password123"));
    }
}
