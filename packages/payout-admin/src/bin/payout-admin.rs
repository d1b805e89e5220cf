//! Payout fee admin binary.
//!
//! Reads `payout-admin.toml` (optional) and `PAYOUT_ADMIN_*` environment
//! variables, e.g. `PAYOUT_ADMIN_MIRROR_URL`, `PAYOUT_ADMIN_API_KEY`.

use payout_admin::{create_router, AppState, Config};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config().inspect_err(|e| {
        error!(error = %e, "FATAL: invalid configuration, fix PAYOUT_ADMIN_* or payout-admin.toml");
    })?;

    if config.api_key().is_none() {
        warn!("PAYOUT_ADMIN_API_KEY not set, /admin is unprotected (dev mode)");
    }
    if config.mirror_url().is_none() {
        info!("No mirror configured, reconcile is disabled");
    }

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(config)?);
    info!(fees = ?state.store.snapshot()?, currency = %state.config.currency, "Payout fee schedule loaded");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Payout fee admin listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Payout fee admin stopped");
    Ok(())
}

fn load_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("payout-admin").required(false))
        .add_source(config::Environment::with_prefix("PAYOUT_ADMIN"))
        .build()?
        .try_deserialize()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received"),
        _ = terminate => info!("SIGTERM received"),
    }
}
