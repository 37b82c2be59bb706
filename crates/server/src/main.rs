mod seed;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use api::{router, AppState};
use auth::{AuthService, SessionCodec};
use jokes_core::AppConfig;
use storage::{Database, MemoryDatabase};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing()?;

    let (config, overrides) =
        AppConfig::load_with_env().context("Failed to load configuration")?;
    for key in &overrides {
        info!(key = %key, "configuration overridden from environment");
    }

    let codec = SessionCodec::new(&config.session.secret)?;

    let db: Arc<dyn Database> = match &config.database.path {
        Some(path) => {
            info!(path = %path.display(), "opening database snapshot");
            Arc::new(MemoryDatabase::open(path).await?)
        }
        None => {
            info!("using in-memory database");
            Arc::new(MemoryDatabase::new())
        }
    };

    let auth_service = AuthService::new(db.clone(), codec);

    if config.database.seed {
        seed::seed_database(&auth_service, db.as_ref()).await?;
    }

    let state = Arc::new(AppState::new(db, auth_service));
    let app = router(state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
