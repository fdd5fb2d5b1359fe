//! Service configuration.
//!
//! Every option can be given on the command line or through the environment.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the reviewer service.
#[derive(Debug, Clone, Parser)]
#[command(name = "pr-reviewer")]
#[command(about = "Assigns pull request reviewers from the author's team")]
#[command(version)]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "PR_REVIEWER_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Path to the SQLite database file (created if missing)
    #[arg(long, env = "PR_REVIEWER_DATABASE_PATH", default_value = "pr-reviewer.db")]
    pub database_path: PathBuf,

    /// Maximum number of pooled database connections
    #[arg(long, env = "PR_REVIEWER_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds a single request may run before it is aborted
    #[arg(long, env = "PR_REVIEWER_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[arg(long, env = "PR_REVIEWER_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Log filter directive, e.g. `info` or `pr_reviewer_lib=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    /// Reject values that would make the server unusable.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be at least 1".into());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1".into());
        }
        if self.shutdown_timeout_secs == 0 {
            return Err("shutdown_timeout_secs must be at least 1".into());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
