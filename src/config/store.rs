//! Durable credential storage.
//!
//! Credentials live as a small JSON record at a fixed logical path,
//! `configuration/wifi.json`, relative to the device filesystem root. A
//! missing record is the normal first-boot condition and is not a fault;
//! a record that exists but cannot be parsed is reported as
//! [`StoreError::Malformed`] so corrupt storage is never silently
//! ignored.

use super::credentials::{CredentialsError, WifiCredentials};
use log::{debug, info};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory holding configuration records.
const CONFIG_DIR: &str = "configuration";

/// File name of the credential record.
const CONFIG_FILE: &str = "wifi.json";

/// Default location of the credential record.
pub fn default_credentials_path() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load credentials from a specific path.
///
/// Returns `Ok(None)` if no record exists yet.
pub fn load_credentials_from(path: &Path) -> Result<Option<WifiCredentials>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!("no credential record at {:?}", path);
            return Ok(None);
        }
        Err(error) => return Err(StoreError::Io(error)),
    };

    let credentials: WifiCredentials =
        serde_json::from_str(&raw).map_err(|error| StoreError::Malformed(error.to_string()))?;
    credentials.validate().map_err(StoreError::Invalid)?;
    Ok(Some(credentials))
}

/// Load credentials from the default path.
pub fn load_credentials() -> Result<Option<WifiCredentials>, StoreError> {
    load_credentials_from(&default_credentials_path())
}

/// Save credentials to a specific path, creating the parent directory if
/// needed.
pub fn save_credentials_to(
    credentials: &WifiCredentials,
    path: &Path,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }
    }

    let raw = serde_json::to_string(credentials)
        .map_err(|error| StoreError::Malformed(error.to_string()))?;
    fs::write(path, raw).map_err(StoreError::Io)?;

    info!("credentials saved to {:?}", path);
    Ok(())
}

/// Save credentials to the default path.
pub fn save_credentials(credentials: &WifiCredentials) -> Result<(), StoreError> {
    save_credentials_to(credentials, &default_credentials_path())
}

/// Errors that can occur reading or writing the credential record.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure other than a missing record.
    Io(io::Error),
    /// The record exists but is not a valid credential document.
    Malformed(String),
    /// The record parsed but holds invalid credentials.
    Invalid(CredentialsError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "credential store I/O error: {}", error),
            Self::Malformed(msg) => write!(f, "malformed credential record: {}", msg),
            Self::Invalid(error) => write!(f, "stored credentials invalid: {}", error),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU32, Ordering};

    // Counter to ensure unique test files even in parallel execution
    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn unique_record_path() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let pid = std::process::id();
        env::temp_dir()
            .join(format!("wifi-keeper-test-{}-{}", pid, id))
            .join("wifi.json")
    }

    #[test]
    fn test_roundtrip() {
        let path = unique_record_path();

        let credentials = WifiCredentials::new("MyNetwork", "MyPassword").unwrap();
        save_credentials_to(&credentials, &path).expect("Failed to save");

        let loaded = load_credentials_from(&path)
            .expect("Failed to load")
            .expect("Record should exist");
        assert_eq!(credentials, loaded);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_record_is_not_a_fault() {
        let path = unique_record_path();
        let loaded = load_credentials_from(&path).expect("Missing record should not fail");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_malformed_record_is_a_fault() {
        let path = unique_record_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let result = load_credentials_from(&path);
        assert!(matches!(result, Err(StoreError::Malformed(_))));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_record_is_a_fault() {
        let path = unique_record_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"ssid":"","password":"secret"}"#).unwrap();

        let result = load_credentials_from(&path);
        assert!(matches!(result, Err(StoreError::Invalid(_))));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let path = unique_record_path();
        assert!(!path.parent().unwrap().exists());

        let credentials = WifiCredentials::open("OpenNet").unwrap();
        save_credentials_to(&credentials, &path).expect("Failed to save");
        assert!(path.exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_default_path() {
        let path = default_credentials_path();
        assert_eq!(path, Path::new("configuration").join("wifi.json"));
    }
}
