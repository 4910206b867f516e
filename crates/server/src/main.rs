mod seed;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use api::{router, AppState};
use auth::{db, migrations, AdminService, AuthService};
use keystone_core::{init_tracing, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let (config, overrides) = AppConfig::load_with_env().context("failed to load configuration")?;
    init_tracing(&config.log);

    if !overrides.is_empty() {
        tracing::info!(keys = ?overrides, "configuration overridden from environment");
    }

    let pool = db::connect(
        &config.database.url,
        config.database.max_connections,
        Duration::from_secs(config.database.acquire_timeout_seconds),
    )
    .await
    .context("failed to open database")?;
    tracing::info!(url = %config.database.url, "database pool created");

    let applied = migrations::run_migrations(&pool).await.context("failed to run migrations")?;
    tracing::info!(applied, "migrations up to date");

    let secret = config.auth.jwt_secret.clone();
    let expiry = config.auth.token_expiry_seconds;
    let state = Arc::new(AppState::new(
        AuthService::new(pool.clone(), secret.clone(), expiry),
        AdminService::new(pool, secret, expiry),
    ));

    seed::seed_database(&state.admin_service, &config.seed)
        .await
        .context("failed to seed first super admin")?;

    let app = router::router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
