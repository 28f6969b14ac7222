use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

const DEFAULT_IDENTITY_API: &str = "https://auth.spacestation14.com";
const DEFAULT_IDENTITY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {1}: {0}")]
    IoError(std::io::Error, PathBuf),
    #[error("Parse error in {1}: {0}")]
    ParseError(json5::Error, PathBuf),
}

/// Read a JSON5 file and deserialize its contents
pub(crate) fn load_json5<T, P>(filename: P) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = filename.as_ref();
    let mut file = File::open(path).map_err(|e| ConfigError::IoError(e, path.to_owned()))?;
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| ConfigError::IoError(e, path.to_owned()))?;

    json5::from_str(&text).map_err(|e| ConfigError::ParseError(e, path.to_owned()))
}

/// Settings for ban enforcement and the notices shown to banned clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BanConfig {
    #[serde(default)]
    pub notice: NoticeConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl BanConfig {
    /// Load configuration from a file
    pub fn load_file<P: AsRef<Path>>(filename: P) -> Result<Self, ConfigError> {
        load_json5(filename)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NoticeConfig {
    /// Where banned players can appeal. May be empty.
    #[serde(default)]
    pub appeal_link: String,
}

impl NoticeConfig {
    /// The appeal link, if one is configured
    pub fn appeal_link(&self) -> Option<&str> {
        let link = self.appeal_link.trim();
        if link.is_empty() {
            None
        } else {
            Some(link)
        }
    }
}

/// Settings for looking up admin display names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IdentityConfig {
    #[serde(default = "default_identity_api")]
    pub api_url: String,
    #[serde(default = "default_identity_timeout")]
    pub timeout_ms: u64,
}

fn default_identity_api() -> String {
    DEFAULT_IDENTITY_API.to_string()
}

fn default_identity_timeout() -> u64 {
    DEFAULT_IDENTITY_TIMEOUT_MS
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_url: default_identity_api(),
            timeout_ms: default_identity_timeout(),
        }
    }
}

impl IdentityConfig {
    /// Upper bound on a single display name lookup
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
