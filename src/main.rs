use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

use fixture_analytics::api::{self, AppState};
use fixture_analytics::config::Config;
use fixture_analytics::db::Database;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    let state = AppState {
        db,
        admin_key: config.admin_key.clone(),
        max_goals: config.max_goals,
    };
    info!("Scoreline grid bound: 0..={} goals per side", config.max_goals);

    let app = api::router(state);
    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Fixture API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
