use std::path::PathBuf;

use clap::Parser;

use crate::config::{default_config_path, ConfigError, Overrides};

/// Restart factomd containers on every Portainer endpoint.
///
/// Runs as a dry run unless `--live` is given.
#[derive(Parser, Debug)]
#[command(name = "factom-restart", version, about)]
pub struct Cli {
    /// Path to config.yaml [default: ~/.factom-restart/config.yaml]
    #[arg(short = 'c', long = "config", env = "FACTOM_RESTART_CONFIG")]
    pub config: Option<PathBuf>,

    /// Restart containers for real instead of simulating
    #[arg(long)]
    pub live: bool,

    /// Portainer base URL
    #[arg(long, env = "FACTOM_RESTART_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "FACTOM_RESTART_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "FACTOM_RESTART_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => default_config_path().ok_or(ConfigError::NoHomeDir),
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dry_run_is_default() {
        let cli = Cli::try_parse_from(["factom-restart", "-c", "/tmp/config.yaml"]).unwrap();
        assert!(!cli.live);
        assert_eq!(
            cli.config_path().unwrap(),
            PathBuf::from("/tmp/config.yaml")
        );
    }

    #[test]
    fn test_live_and_overrides() {
        let cli = Cli::try_parse_from([
            "factom-restart",
            "--live",
            "--endpoint",
            "https://portainer.example.com",
            "--username",
            "admin",
            "--no-color",
        ])
        .unwrap();

        assert!(cli.live);
        assert!(cli.no_color);
        let overrides = cli.overrides();
        assert_eq!(
            overrides.endpoint.as_deref(),
            Some("https://portainer.example.com")
        );
        assert_eq!(overrides.username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["factom-restart", "--restart-everything"]).is_err());
    }
}
