use async_trait::async_trait;
use reqwest::Method;
use restart_common::{
    ConnectionFailure, Container, ContainerApi, DiscoveryError, Endpoint, RestartError,
};
use tracing::debug;

use crate::PortainerClient;

const ENDPOINTS_PATH: &str = "/api/endpoints";

fn containers_path(endpoint_id: i64) -> String {
    format!("/api/endpoints/{}/docker/containers/json", endpoint_id)
}

fn restart_path(endpoint_id: i64, container_id: &str) -> String {
    format!(
        "/api/endpoints/{}/docker/containers/{}/restart",
        endpoint_id, container_id
    )
}

/// Docker `filters` query value selecting containers by label.
fn label_filter(label: &str) -> String {
    serde_json::json!({ "label": [label] }).to_string()
}

fn transport(err: reqwest::Error) -> DiscoveryError {
    DiscoveryError::Connection(ConnectionFailure::Transport(err.to_string()))
}

#[async_trait]
impl ContainerApi for PortainerClient {
    async fn list_endpoints(&self) -> Result<Vec<Endpoint>, DiscoveryError> {
        let response = self
            .send(Method::GET, ENDPOINTS_PATH, &[], None)
            .await
            .map_err(transport)?;

        if !response.is_success() {
            return Err(DiscoveryError::Api {
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }

        let endpoints: Vec<Endpoint> = serde_json::from_slice(&response.body)
            .map_err(|e| DiscoveryError::Decode(e.to_string()))?;
        debug!(count = endpoints.len(), "Fetched Portainer endpoints");
        Ok(endpoints)
    }

    async fn list_containers(&self, endpoint_id: i64) -> Result<Vec<Container>, DiscoveryError> {
        let filters = label_filter(&self.config.label);
        let response = self
            .send(
                Method::GET,
                &containers_path(endpoint_id),
                &[("all", "1"), ("filters", filters.as_str())],
                None,
            )
            .await
            .map_err(transport)?;

        // An agent that is down behind Portainer tends to answer with nothing
        if response.body.is_empty() {
            return Err(DiscoveryError::Connection(ConnectionFailure::EmptyBody));
        }
        if !response.is_success() {
            return Err(DiscoveryError::Api {
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }

        let containers: Vec<Container> = serde_json::from_slice(&response.body)
            .map_err(|e| DiscoveryError::Decode(e.to_string()))?;
        if containers.is_empty() {
            return Err(DiscoveryError::NoMatchingContainers {
                label: self.config.label.clone(),
            });
        }

        debug!(endpoint_id, count = containers.len(), "Fetched containers");
        Ok(containers)
    }

    async fn restart_container(
        &self,
        endpoint_id: i64,
        container_id: &str,
    ) -> Result<(), RestartError> {
        let grace = self.config.restart_grace_secs.to_string();
        let response = self
            .send(
                Method::POST,
                &restart_path(endpoint_id, container_id),
                &[("t", grace.as_str())],
                None,
            )
            .await
            .map_err(|e| RestartError::Transport(e.to_string()))?;

        // Docker answers 204 with no body; anything 2xx counts
        if !response.is_success() {
            return Err(RestartError::Status {
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }
        Ok(())
    }
}
