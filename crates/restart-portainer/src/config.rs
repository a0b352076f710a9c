use std::fmt;
use std::time::Duration;

use restart_common::DEFAULT_CONTAINER_LABEL;

/// Per-request HTTP timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Seconds Docker waits for a container to stop before killing it on restart.
pub const DEFAULT_RESTART_GRACE_SECS: u64 = 5;

/// Connection settings for a [`PortainerClient`](crate::PortainerClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Portainer base URL, e.g. `https://portainer.example.com`.
    pub base_url: String,
    pub timeout: Duration,
    pub restart_grace_secs: u64,
    /// Docker label selector applied to container listing.
    pub label: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            restart_grace_secs: DEFAULT_RESTART_GRACE_SECS,
            label: DEFAULT_CONTAINER_LABEL.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_restart_grace_secs(mut self, secs: u64) -> Self {
        self.restart_grace_secs = secs;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("http://portainer.local/");
        assert_eq!(config.base_url, "http://portainer.local");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.restart_grace_secs, 5);
        assert_eq!(config.label, "name=factomd");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("admin", "hunter2");
        let dbg = format!("{:?}", creds);
        assert!(dbg.contains("admin"));
        assert!(!dbg.contains("hunter2"));
    }
}
