use std::fmt::Display;
use std::sync::Arc;

use futures::future::join_all;
use restart_common::{
    ContainerApi, DiscoveryError, Endpoint, OutcomeStatus, RestartError, RestartOutcome, RunMode,
    SkippedEndpoint, DEFAULT_CONTAINER_LABEL,
};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

mod report;

pub use report::RunReport;

pub use restart_common as common;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to list Portainer endpoints")]
    EndpointDiscovery {
        #[from]
        source: DiscoveryError,
    },
}
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Authenticated,
    Discovering,
    Restarting,
    Done,
}

impl Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::Authenticated => write!(f, "authenticated"),
            RunPhase::Discovering => write!(f, "discovering"),
            RunPhase::Restarting => write!(f, "restarting"),
            RunPhase::Done => write!(f, "done"),
        }
    }
}

/// Container addressed by one restart task.
struct Target {
    endpoint_id: i64,
    endpoint_name: String,
    container_id: String,
}

impl Target {
    fn into_outcome(self, status: OutcomeStatus) -> RestartOutcome {
        RestartOutcome {
            endpoint_id: self.endpoint_id,
            endpoint_name: self.endpoint_name,
            container_id: self.container_id,
            status,
        }
    }
}

fn log_outcome(outcome: &RestartOutcome) {
    if outcome.success() {
        info!("{}", outcome);
    } else {
        error!("{}", outcome);
    }
}

/// Drives one restart run: discovery, then a dry-run or live restart pass.
#[derive(Clone)]
pub struct Orchestrator {
    api: Arc<dyn ContainerApi>,
    mode: RunMode,
    label: String,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ContainerApi>, mode: RunMode) -> Self {
        Self {
            api,
            mode,
            label: DEFAULT_CONTAINER_LABEL.to_string(),
        }
    }

    /// Label reported when an endpoint comes back with no containers.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Runs discovery and the restart pass.
    ///
    /// Only a failure to list endpoints is returned as an error. Everything
    /// past that point is absorbed per endpoint or per container and shows
    /// up in the report.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub async fn run(&self) -> Result<RunReport> {
        debug!(phase = %RunPhase::Discovering, "Run phase");
        let mut endpoints = self.api.list_endpoints().await.map_err(|e| {
            error!(error = %e, "Endpoint discovery failed");
            Error::EndpointDiscovery { source: e }
        })?;
        info!(count = endpoints.len(), "Fetched endpoints");

        let skipped = self.discover_containers(&mut endpoints).await;

        debug!(phase = %RunPhase::Restarting, "Run phase");
        if self.mode.is_live() {
            warn!("RESTARTING NOW");
        } else {
            info!("SIMULATING RESTART (DRY-RUN)");
        }
        for skip in &skipped {
            warn!("{}", skip);
        }

        let outcomes = match self.mode {
            RunMode::DryRun => Self::simulate(&endpoints),
            RunMode::Live => self.restart_all(&endpoints).await,
        };

        debug!(phase = %RunPhase::Done, "Run phase");
        Ok(RunReport {
            mode: self.mode,
            outcomes,
            skipped,
        })
    }

    /// Fills `containers` for every reachable endpoint, one endpoint at a
    /// time. Endpoints whose discovery fails or finds nothing are returned
    /// as skipped.
    async fn discover_containers(&self, endpoints: &mut [Endpoint]) -> Vec<SkippedEndpoint> {
        let mut skipped = Vec::new();

        for endpoint in endpoints.iter_mut().filter(|e| e.is_reachable()) {
            debug!(
                endpoint = %endpoint.name,
                public_url = %endpoint.public_url,
                endpoint_id = endpoint.id,
                "Trying connecting to endpoint"
            );

            let discovered = self
                .api
                .list_containers(endpoint.id)
                .await
                .and_then(|containers| {
                    if containers.is_empty() {
                        Err(DiscoveryError::NoMatchingContainers {
                            label: self.label.clone(),
                        })
                    } else {
                        Ok(containers)
                    }
                });

            match discovered {
                Ok(containers) => {
                    for container in &containers {
                        let tag = container.tag().unwrap_or("<untagged>");
                        if container.is_running() {
                            debug!(endpoint = %endpoint.name, container_id = %container.id, %tag, "container is {}", container.state);
                        } else {
                            warn!(endpoint = %endpoint.name, container_id = %container.id, %tag, "container is {}", container.state);
                        }
                    }
                    endpoint.containers = containers;
                }
                Err(e) => {
                    if e.is_no_match() {
                        warn!(endpoint = %endpoint.name, endpoint_id = endpoint.id, "{}", e);
                    } else {
                        error!(endpoint = %endpoint.name, endpoint_id = endpoint.id, "{}", e);
                    }
                    skipped.push(SkippedEndpoint {
                        endpoint_id: endpoint.id,
                        endpoint_name: endpoint.name.clone(),
                        reason: e,
                    });
                }
            }
        }

        skipped
    }

    fn targets(endpoints: &[Endpoint]) -> impl Iterator<Item = Target> + '_ {
        endpoints
            .iter()
            .filter(|e| e.is_reachable())
            .flat_map(|e| {
                e.containers.iter().map(move |c| Target {
                    endpoint_id: e.id,
                    endpoint_name: e.name.clone(),
                    container_id: c.id.clone(),
                })
            })
    }

    fn simulate(endpoints: &[Endpoint]) -> Vec<RestartOutcome> {
        Self::targets(endpoints)
            .map(|target| {
                let outcome = target.into_outcome(OutcomeStatus::WouldRestart);
                log_outcome(&outcome);
                outcome
            })
            .collect()
    }

    /// Spawns one task per container and waits for all of them.
    async fn restart_all(&self, endpoints: &[Endpoint]) -> Vec<RestartOutcome> {
        let mut targets = Vec::new();
        let mut tasks = Vec::new();

        for target in Self::targets(endpoints) {
            let api = self.api.clone();
            let endpoint_id = target.endpoint_id;
            let endpoint_name = target.endpoint_name.clone();
            let container_id = target.container_id.clone();

            tasks.push(tokio::spawn(async move {
                match api.restart_container(endpoint_id, &container_id).await {
                    Ok(()) => {
                        info!("OK {} ({})", endpoint_name, container_id);
                        OutcomeStatus::Restarted
                    }
                    Err(e) => {
                        error!("ERROR {} ({})", endpoint_name, container_id);
                        error!("{}", e);
                        OutcomeStatus::Failed(e)
                    }
                }
            }));
            targets.push(target);
        }

        debug!(tasks = tasks.len(), "Dispatched restart tasks");
        let results = join_all(tasks).await;

        targets
            .into_iter()
            .zip(results)
            .map(|(target, result)| {
                let status = result.unwrap_or_else(|e| {
                    error!(
                        "ERROR {} ({}): restart task aborted",
                        target.endpoint_name, target.container_id
                    );
                    OutcomeStatus::Failed(RestartError::Aborted(e.to_string()))
                });
                target.into_outcome(status)
            })
            .collect()
    }
}
