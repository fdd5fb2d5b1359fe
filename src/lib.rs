//! pr-reviewer - assigns pull request reviewers from the author's team.
//!
//! The library exposes the domain models, the SQLite storage layer, the use
//! cases (teams, users, reviewer assignment) and the HTTP server that wraps
//! them. The binary in `main.rs` only parses configuration and calls [`run`].

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use anyhow::Context;
use config::Config;
use services::server::{self, AppState};

/// Open the database, serve the API and block until shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;

    let pool = db::initialize(&config.database_path, config.max_connections)
        .await
        .with_context(|| {
            format!(
                "Failed to initialize database at {}",
                config.database_path.display()
            )
        })?;

    let app = server::router(AppState::new(pool.clone()), config.request_timeout());

    server::serve(
        config.listen_addr,
        app,
        server::shutdown_signal(),
        config.shutdown_timeout(),
    )
    .await
    .map_err(anyhow::Error::msg)?;

    pool.close().await;
    log::info!("[db] Connection pool closed");

    Ok(())
}
