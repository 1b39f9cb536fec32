//! Backend entry-point: loads settings, prepares storage and serves the REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rewards_backend::inbound::http::health::HealthState;
use rewards_backend::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

async fn apply_migrations(database_url: String) -> std::io::Result<()> {
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    info!(applied, "schema up to date");
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let mut config = ServerConfig::new(settings.bind_addr()?)
        .with_transaction_timeout(settings.transaction_timeout());

    if let Some(pool_config) = settings.pool_config() {
        if settings.run_migrations {
            apply_migrations(pool_config.database_url().to_owned()).await?;
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|err| std::io::Error::other(format!("database pool failed: {err}")))?;
        config = config.with_db_pool(pool);
    } else if settings.run_migrations {
        warn!("run_migrations ignored: no database_url configured");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}
