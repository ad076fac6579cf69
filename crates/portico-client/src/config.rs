//! Client configuration read from the environment.

use std::time::Duration;

/// Where the API lives and how often the network page refreshes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without the `/api` suffix.
    pub api_url: String,
    /// Poll interval for `/api/network` and `/api/clusters`.
    pub refresh_interval: Duration,
    /// Age after which cached query results count as stale.
    pub stale_time: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            refresh_interval: Duration::from_secs(10),
            stale_time: Duration::from_secs(8),
        }
    }
}

impl ClientConfig {
    /// `PORTICO_API_URL` and `PORTICO_REFRESH_SECS`; unset or unparsable
    /// values keep the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_url = std::env::var("PORTICO_API_URL")
            .ok()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.api_url);
        let refresh_interval = std::env::var("PORTICO_REFRESH_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.refresh_interval);
        Self {
            api_url,
            refresh_interval,
            stale_time: defaults.stale_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.api_url, "http://localhost:5000");
        assert_eq!(c.refresh_interval, Duration::from_secs(10));
        assert_eq!(c.stale_time, Duration::from_secs(8));
    }
}
