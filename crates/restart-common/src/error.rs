use thiserror::Error;

/// Login against the management API failed. Always fatal for a run.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login request failed: {0}")]
    Transport(String),

    #[error("Login rejected: {0}")]
    Rejected(String),

    #[error("Malformed login response: {0}")]
    Malformed(String),

    #[error("Portainer server didn't return JWT token")]
    MissingToken,
}

/// Why an endpoint could not be reached during container discovery.
///
/// Both causes surface as the same connection error, but are kept apart so a
/// silent endpoint can be told from one that never answered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("empty response received from Portainer API")]
    EmptyBody,
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Can not connect to remote host ({0})")]
    Connection(ConnectionFailure),

    #[error("No containers with label '{label}'")]
    NoMatchingContainers { label: String },

    #[error("Portainer API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode Portainer response: {0}")]
    Decode(String),
}

impl DiscoveryError {
    /// True when the endpoint answered but has nothing to restart.
    pub fn is_no_match(&self) -> bool {
        matches!(self, DiscoveryError::NoMatchingContainers { .. })
    }
}

#[derive(Error, Debug)]
pub enum RestartError {
    #[error("Restart request failed: {0}")]
    Transport(String),

    #[error("Restart rejected with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Restart task aborted: {0}")]
    Aborted(String),
}
