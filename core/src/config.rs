use crate::model::DEFAULT_MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEV_BASE_URL: &str = "http://localhost:8000";
pub const API_BASE_ENV: &str = "PLANWIZARD_API_BASE";
pub const CONFIG_PATH_ENV: &str = "PLANWIZARD_CONFIG";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading client config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing client config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("base url {0:?} must start with http:// or https://")]
    InvalidBaseUrl(String),
    #[error("timeout must be at least one second")]
    ZeroTimeout,
}

/// Where the backend lives and how long to wait for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_upload_bytes: u64,
    pub download_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            download_dir: None,
        }
    }
}

// Debug builds talk to the local dev server; release builds take the deployed
// URL baked in at compile time.
fn default_base_url() -> String {
    if cfg!(debug_assertions) {
        DEV_BASE_URL.into()
    } else {
        option_env!("PLANWIZARD_API_BASE")
            .unwrap_or(DEV_BASE_URL)
            .into()
    }
}

impl ClientConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.display().to_string(),
            source,
        })?;
        let config: ClientConfig =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path_ref.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs,
            ..Default::default()
        }
    }

    /// Resolves the config from `PLANWIZARD_CONFIG` and `PLANWIZARD_API_BASE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = match lookup(CONFIG_PATH_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = config.with_base_url(lookup(API_BASE_ENV));
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"base_url: https://plans.example.com/\ntimeout_secs: 30\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = ClientConfig::load(&path).unwrap();
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(
            cfg.endpoint("/api/process"),
            "https://plans.example.com/api/process"
        );
    }

    #[test]
    fn config_load_rejects_bad_base_url() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"base_url: plans.example.com\n").unwrap();
        let path = temp.into_temp_path();
        assert!(matches!(
            ClientConfig::load(&path),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn env_override_wins_over_default() {
        let vars = HashMap::from([(API_BASE_ENV, "http://10.0.0.5:8000".to_string())]);
        let cfg = ClientConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(cfg.base_url, "http://10.0.0.5:8000");
        assert_eq!(cfg.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn from_args_builds_endpoint() {
        let cfg = ClientConfig::from_args("http://localhost:8000", 5);
        assert_eq!(cfg.endpoint("api/download/PDF"), "http://localhost:8000/api/download/PDF");
    }
}
