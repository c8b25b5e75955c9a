//! Folio API Server
//!
//! Main entry point for the ledger service. With a database configured the
//! ledger is rebuilt from it at startup and every commit is written back;
//! without one the ledger lives in memory.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::{AppState, create_router};
use folio_core::ledger::{Ledger, LedgerState};
use folio_db::{LedgerRepository, connect_with_pool};
use folio_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=debug,tower_http=debug".into()),
        )
        .with(config.log.json.then(|| fmt::layer().json()))
        .with((!config.log.json).then(fmt::layer))
        .init();

    let ledger = match &config.database {
        Some(database) => {
            let db = connect_with_pool(
                &database.url,
                database.max_connections,
                database.min_connections,
            )
            .await?;
            info!("Connected to database");

            let repository = LedgerRepository::new(db);
            let state = repository.load(config.ledger.clone()).await?;
            info!(
                accounts = state.chart().len(),
                entries = state.journal().len(),
                "Ledger loaded"
            );
            Ledger::with_sink(state, Arc::new(repository))
        }
        None => {
            warn!("No database configured, ledger changes will not survive a restart");
            Ledger::new(LedgerState::new(config.ledger.clone()))
        }
    };

    let app = create_router(AppState::new(Arc::new(ledger)));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
