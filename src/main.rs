use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use prmcms_rls::auth::{ConfigEnvironment, PrincipalResolver};
use prmcms_rls::database::{DatabaseManager, PgRoleStore};
use prmcms_rls::handlers::AppState;
use prmcms_rls::policy::Authorizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = prmcms_rls::config::config();
    tracing::info!("Starting PRMCMS policy service in {:?} mode", config.environment);

    if prmcms_rls::is_development!() && config.dev_override_active() {
        tracing::warn!("Development override active: every policy except webhook logs admits all rows");
    }
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; every request will resolve as anonymous");
    }

    // An incomplete registry is a deployment defect, refuse to start
    let authorizer = Authorizer::standard().context("policy registry is incomplete")?;

    let pool = DatabaseManager::pool().await.context("failed to connect to DATABASE_URL")?;
    let roles = Arc::new(PgRoleStore::new(pool.clone()));
    let resolver = PrincipalResolver::new(
        roles,
        Arc::new(ConfigEnvironment),
        config.security.jwt_secret.clone(),
    );

    let state = AppState::new(resolver, authorizer, Some(pool));
    let app = prmcms_rls::build_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("PRMCMS policy service listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
