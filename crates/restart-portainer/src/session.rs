use std::fmt;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use restart_common::AuthError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Credentials;

const AUTH_PATH: &str = "/api/auth";

/// Authenticated Portainer session. Never renewed: once the token expires,
/// later calls fail.
#[derive(Clone)]
pub struct Session {
    base_url: String,
    token: String,
}

impl Session {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

// Older Portainer releases answer with {JWT, Err}, newer ones with {jwt} on
// success and {message, details} on failure.
#[derive(Deserialize, Default)]
struct AuthResponse {
    #[serde(alias = "JWT", alias = "Jwt", default)]
    jwt: String,
    #[serde(alias = "Err", default)]
    err: String,
    #[serde(default)]
    message: String,
}

/// Exchanges credentials for a bearer token.
pub(crate) async fn login(
    http: &Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<Session, AuthError> {
    let url = format!("{}{}", base_url, AUTH_PATH);
    debug!(%url, username = %credentials.username, "Authenticating against Portainer");

    let request = AuthRequest {
        username: &credentials.username,
        password: &credentials.password,
    };

    let response = http
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|e| AuthError::Transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| AuthError::Transport(e.to_string()))?;

    let auth: AuthResponse = match serde_json::from_slice(&body) {
        Ok(auth) => auth,
        Err(_) if !status.is_success() => {
            return Err(AuthError::Rejected(format!(
                "{}: {}",
                status,
                String::from_utf8_lossy(&body).trim()
            )));
        }
        Err(e) => return Err(AuthError::Malformed(e.to_string())),
    };

    if !auth.err.is_empty() {
        return Err(AuthError::Rejected(auth.err));
    }
    if auth.jwt.is_empty() {
        if !auth.message.is_empty() {
            return Err(AuthError::Rejected(auth.message));
        }
        return Err(AuthError::MissingToken);
    }

    info!("Successfully logged in as {}", credentials.username);

    Ok(Session {
        base_url: base_url.to_string(),
        token: auth.jwt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_request_wire_format() {
        let req = AuthRequest {
            username: "admin",
            password: "secret",
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Username": "admin", "Password": "secret"})
        );
    }

    #[test]
    fn test_auth_response_accepts_both_spellings() {
        let legacy: AuthResponse = serde_json::from_str(r#"{"JWT": "abc", "Err": ""}"#).unwrap();
        assert_eq!(legacy.jwt, "abc");

        let current: AuthResponse = serde_json::from_str(r#"{"jwt": "xyz"}"#).unwrap();
        assert_eq!(current.jwt, "xyz");
        assert!(current.err.is_empty());

        let failed: AuthResponse =
            serde_json::from_str(r#"{"message": "Invalid credentials", "details": "x"}"#).unwrap();
        assert!(failed.jwt.is_empty());
        assert_eq!(failed.message, "Invalid credentials");
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session {
            base_url: "http://p".to_string(),
            token: "very-secret".to_string(),
        };
        assert!(!format!("{:?}", session).contains("very-secret"));
        assert_eq!(session.token(), "very-secret");
    }
}
