mod api;
mod app;
mod auth;
mod config;
mod dto;
mod error;
mod middleware;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use docgate_core::{spawn_reclaimer, AdmissionController};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::store::{MemoryUserStore, User, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docgate_web=debug,docgate_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;

    let limiter_config = config.rate_limit.limiter_config();
    let limiter = Arc::new(AdmissionController::new(limiter_config)?);
    tracing::info!(
        "Rate limit: one request per {:?} per client, idle clients reclaimed after {:?}",
        limiter_config.refill_interval,
        limiter_config.staleness_threshold
    );

    let users = MemoryUserStore::new();
    for user in &config.users {
        if !users.insert(User::new(user.username.clone(), user.password_hash.clone())) {
            tracing::warn!("Duplicate configured user ignored: {}", user.username);
        }
    }

    let shutdown = CancellationToken::new();
    let reclaimer = spawn_reclaimer(limiter.clone(), shutdown.clone());

    let state = AppState {
        config: Arc::new(config),
        limiter,
        users: Arc::new(users),
    };
    let app = app::build_app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("docgate-web listening on http://{}", bind_addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
    .await?;

    shutdown.cancel();
    reclaimer.await?;
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for Ctrl-C: {e}");
            }
            tracing::info!("Shutdown signal received");
        }
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
