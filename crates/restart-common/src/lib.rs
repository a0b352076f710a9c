// Shared types for the restart workspace: wire models, outcomes and the
// capability trait the orchestrator drives.

use std::fmt::Display;

use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};

pub mod error;

pub use error::{AuthError, ConnectionFailure, DiscoveryError, RestartError};

/// Label selector used when listing containers on an endpoint.
pub const DEFAULT_CONTAINER_LABEL: &str = "name=factomd";

/// A host registered with Portainer.
///
/// `containers` is not part of the wire format; it is filled in after
/// discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "Id", alias = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "PublicURL", alias = "publicURL", default)]
    pub public_url: String,
    #[serde(skip)]
    pub containers: Vec<Container>,
}

impl Endpoint {
    pub fn new(id: i64, name: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            public_url: public_url.into(),
            containers: Vec::new(),
        }
    }

    /// Endpoints without a public URL are never contacted.
    pub fn is_reachable(&self) -> bool {
        !self.public_url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "Id", alias = "ID", alias = "id")]
    pub id: String,
    #[serde(rename = "Image", alias = "image", default)]
    pub image: String,
    #[serde(rename = "State", alias = "state", default)]
    pub state: String,
}

impl Container {
    pub fn new(id: impl Into<String>, image: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            state: state.into(),
        }
    }

    /// Tag part of the image reference, if any.
    pub fn tag(&self) -> Option<&str> {
        let (_, tag) = self.image.rsplit_once(':')?;
        // "registry:5000/repo" has a port, not a tag
        if tag.is_empty() || tag.contains('/') {
            None
        } else {
            Some(tag)
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    DryRun,
    Live,
}

impl RunMode {
    pub fn from_live_flag(live: bool) -> Self {
        if live {
            RunMode::Live
        } else {
            RunMode::DryRun
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, RunMode::Live)
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::DryRun => write!(f, "dry-run"),
            RunMode::Live => write!(f, "live"),
        }
    }
}

#[derive(Debug)]
pub enum OutcomeStatus {
    Restarted,
    /// Dry-run placeholder; no request was sent.
    WouldRestart,
    Failed(RestartError),
}

/// Result of handling one container during a run.
#[derive(Debug)]
pub struct RestartOutcome {
    pub endpoint_id: i64,
    pub endpoint_name: String,
    pub container_id: String,
    pub status: OutcomeStatus,
}

impl RestartOutcome {
    pub fn success(&self) -> bool {
        !matches!(self.status, OutcomeStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&RestartError> {
        match &self.status {
            OutcomeStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for RestartOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            OutcomeStatus::Failed(err) => write!(
                f,
                "ERROR {} ({}): {}",
                self.endpoint_name, self.container_id, err
            ),
            _ => write!(f, "OK {} ({})", self.endpoint_name, self.container_id),
        }
    }
}

/// Endpoint left out of the restart pass because discovery did not yield
/// any containers for it.
#[derive(Debug)]
pub struct SkippedEndpoint {
    pub endpoint_id: i64,
    pub endpoint_name: String,
    pub reason: DiscoveryError,
}

impl Display for SkippedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SKIP {}", self.endpoint_name)
    }
}

/// The subset of the Portainer API the restart run needs.
#[async_trait]
pub trait ContainerApi: Send + Sync {
    async fn list_endpoints(&self) -> Result<Vec<Endpoint>, DiscoveryError>;

    async fn list_containers(&self, endpoint_id: i64) -> Result<Vec<Container>, DiscoveryError>;

    async fn restart_container(
        &self,
        endpoint_id: i64,
        container_id: &str,
    ) -> Result<(), RestartError>;
}
