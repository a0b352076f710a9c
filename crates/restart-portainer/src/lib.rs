//! # Portainer client
//!
//! Minimal client for the parts of the Portainer API a restart run needs:
//! login, endpoint listing, label-filtered container listing and container
//! restart.
//!
//! ```no_run
//! use restart_common::ContainerApi;
//! use restart_portainer::{ClientConfig, Credentials, PortainerClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PortainerClient::login(
//!     ClientConfig::new("https://portainer.example.com"),
//!     &Credentials::new("admin", "secret"),
//! )
//! .await?;
//!
//! for endpoint in client.list_endpoints().await? {
//!     println!("{} -> {}", endpoint.name, endpoint.public_url);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod discovery;
mod request;
mod session;

pub use client::PortainerClient;
pub use config::{ClientConfig, Credentials, DEFAULT_RESTART_GRACE_SECS, DEFAULT_TIMEOUT};
pub use request::RawResponse;
pub use session::Session;
