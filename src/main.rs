use clap::Parser;
use pr_reviewer_lib::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    log::info!(
        "Starting pr-reviewer {} (database: {})",
        env!("CARGO_PKG_VERSION"),
        config.database_path.display()
    );

    pr_reviewer_lib::run(config).await
}
