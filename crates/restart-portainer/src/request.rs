use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::trace;

use crate::PortainerClient;

/// Status and fully-read body of a Portainer response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Best-effort human readable error text: Portainer's `message` field
    /// when present, the raw body otherwise.
    pub fn error_message(&self) -> String {
        match serde_json::from_slice::<ApiErrorBody>(&self.body) {
            Ok(err) => err.message,
            Err(_) => String::from_utf8_lossy(&self.body).trim().to_string(),
        }
    }
}

impl PortainerClient {
    /// Sends an authenticated request to `base_url + path`.
    ///
    /// The status code is returned as-is; callers decide what counts as a
    /// failure. Only transport problems (connect, timeout, body read) are
    /// errors here.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse, reqwest::Error> {
        let url = format!("{}{}", self.session.base_url(), path);
        trace!(%method, %url, "Portainer request");

        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(self.session.token());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        trace!(%status, len = body.len(), "Portainer response");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_field() {
        let resp = RawResponse {
            status: StatusCode::NOT_FOUND,
            body: br#"{"message":"Endpoint not found","details":"x"}"#.to_vec(),
        };
        assert!(!resp.is_success());
        assert_eq!(resp.error_message(), "Endpoint not found");

        let plain = RawResponse {
            status: StatusCode::BAD_GATEWAY,
            body: b"bad gateway\n".to_vec(),
        };
        assert_eq!(plain.error_message(), "bad gateway");
    }
}
