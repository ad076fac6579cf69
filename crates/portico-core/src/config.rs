//! Server configuration read from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level Portico configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PorticoConfig {
    /// Interface the HTTP server binds to.
    pub host: IpAddr,
    /// HTTP server port.
    pub port: u16,
    /// Seed the four default clusters (ids 1-4) at boot.
    pub seed_default_clusters: bool,
    /// Reject cluster names that already exist (case-insensitive).
    pub unique_cluster_names: bool,
}

impl Default for PorticoConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            seed_default_clusters: true,
            unique_cluster_names: true,
        }
    }
}

impl PorticoConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = match std::env::var("PORTICO_HOST") {
            Ok(raw) => {
                let trimmed = raw.trim().trim_matches('"').trim_matches('\'');
                trimmed
                    .parse::<IpAddr>()
                    .map_err(|_| Error::Config(format!("PORTICO_HOST is not an IP address: {trimmed}")))?
            }
            Err(_) => defaults.host,
        };

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let seed_default_clusters = env_flag("PORTICO_SEED_CLUSTERS")
            .unwrap_or(defaults.seed_default_clusters);
        let unique_cluster_names = env_flag("PORTICO_UNIQUE_CLUSTER_NAMES")
            .unwrap_or(defaults.unique_cluster_names);

        Ok(Self {
            host,
            port,
            seed_default_clusters,
            unique_cluster_names,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_flag(&v))
}

/// Parse a boolean environment value. Unrecognised values yield `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_default_bind_addr() {
        let config = PorticoConfig::default();
        assert_eq!(config.bind_addr().port(), 5000);
        assert!(config.seed_default_clusters);
        assert!(config.unique_cluster_names);
    }
}
