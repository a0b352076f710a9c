use reqwest::Client;
use restart_common::AuthError;

use crate::config::{ClientConfig, Credentials};
use crate::session::{self, Session};

/// Portainer API client bound to one authenticated session.
///
/// The client is immutable after login and safe to share between tasks
/// behind an `Arc`; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct PortainerClient {
    pub(crate) http: Client,
    pub(crate) session: Session,
    pub(crate) config: ClientConfig,
}

impl PortainerClient {
    /// Logs in with `credentials` and returns a client carrying the token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the server is unreachable, rejects the
    /// credentials, or answers without a token. There is no retry.
    pub async fn login(config: ClientConfig, credentials: &Credentials) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let session = session::login(&http, &config.base_url, credentials).await?;

        Ok(Self {
            http,
            session,
            config,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
