//! Process flags for the service binary. Database settings come from the
//! environment (see `items_core::config`).

use std::time::Duration;

use clap::Parser;

use crate::analyze::DEFAULT_FAILURE_RATE;
use crate::store::ConnectOpts;

#[derive(Parser, Debug, Clone)]
#[command(name = "items-server")]
#[command(about = "HTTP API over the items table")]
#[command(version)]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Upper bound on pooled database connections.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds to wait for a free connection before failing the request.
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Share of `/analyze` calls that report failure, in [0, 1].
    #[arg(long, env = "ANALYSIS_FAILURE_RATE", default_value_t = DEFAULT_FAILURE_RATE)]
    pub analysis_failure_rate: f64,

    /// Enable debug logging for this crate.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("--max-connections must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.analysis_failure_rate) {
            return Err("--analysis-failure-rate must be within [0, 1]".to_string());
        }
        Ok(())
    }

    pub fn connect_opts(&self) -> ConnectOpts {
        ConnectOpts {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "items-server",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--acquire-timeout-secs",
            "2",
        ])
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_opts().acquire_timeout, Duration::from_secs(2));
    }

    #[test]
    fn rejects_failure_rate_above_one() {
        let config =
            ServerConfig::try_parse_from(["items-server", "--analysis-failure-rate", "1.5"]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_connections() {
        let config =
            ServerConfig::try_parse_from(["items-server", "--max-connections", "0"]).unwrap();
        assert!(config.validate().is_err());
    }
}
