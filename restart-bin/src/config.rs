use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use restart_common::DEFAULT_CONTAINER_LABEL;
use restart_portainer::{ClientConfig, Credentials, DEFAULT_RESTART_GRACE_SECS, DEFAULT_TIMEOUT};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const CONFIG_DIR: &str = ".factom-restart";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing required config value: {0}")]
    Missing(&'static str),

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("Cannot determine home directory; pass --config")]
    NoHomeDir,
}

/// `~/.factom-restart/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Values given on the command line or through the environment. They win
/// over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
    pub restart_grace_secs: u64,
    pub label: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            restart_grace_secs: DEFAULT_RESTART_GRACE_SECS,
            label: DEFAULT_CONTAINER_LABEL.to_string(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("restart_grace_secs", &self.restart_grace_secs)
            .field("label", &self.label)
            .finish()
    }
}

impl AppConfig {
    /// Reads `path`. A missing file yields the defaults so everything can
    /// come from flags or the environment instead.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(username) = overrides.username {
            self.username = username;
        }
        if let Some(password) = overrides.password {
            self.password = password;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("endpoint"));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Missing("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Missing("password"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.endpoint.trim())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_restart_grace_secs(self.restart_grace_secs)
            .with_label(self.label.clone())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            "endpoint: https://portainer.example.com\n\
             username: admin\n\
             password: secret\n\
             timeout_secs: 10\n\
             restart_grace_secs: 30\n\
             label: role=node\n",
        );

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.endpoint, "https://portainer.example.com");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert!(config.validate().is_ok());

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.restart_grace_secs, 30);
        assert_eq!(client.label, "role=node");
    }

    #[test]
    fn test_load_applies_defaults() {
        let file = write_config("endpoint: http://p\nusername: u\npassword: p\n");

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.restart_grace_secs, 5);
        assert_eq!(config.label, "name=factomd");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.yaml")).unwrap();

        assert!(config.endpoint.is_empty());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("endpoint"))
        ));
    }

    #[test]
    fn test_empty_file_falls_back_to_defaults() {
        let file = write_config("\n");
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.label, "name=factomd");
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let file = write_config("endpoint: [unterminated\n");
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = write_config("endpoint: http://file\nusername: file-user\npassword: file-pw\n");
        let mut config = AppConfig::load(file.path()).unwrap();

        config.apply_overrides(Overrides {
            endpoint: Some("http://flag".to_string()),
            username: None,
            password: Some("flag-pw".to_string()),
        });

        assert_eq!(config.endpoint, "http://flag");
        assert_eq!(config.username, "file-user");
        assert_eq!(config.password, "flag-pw");
    }

    #[test]
    fn test_validate_requires_credentials() {
        let mut config = AppConfig {
            endpoint: "http://p".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("username"))
        ));

        config.username = "u".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("password"))
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let file = write_config("endpoint: http://p\nusername: u\npassword: p\ntimeout_secs: 0\n");
        let config = AppConfig::load(file.path()).unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_debug_hides_password() {
        let config = AppConfig {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(".factom-restart/config.yaml"));
        }
    }
}
