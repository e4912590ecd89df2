//! Scoreboard Back binary entrypoint wiring the HTTP routes to the configured state store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scoreboard_back::{
    config::AppConfig,
    dao::state_store::{StateStore, memory::MemoryStateStore},
    routes,
    state::{AppState, SharedState, clock::SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = build_store()?;

    // A dead store is not fatal: every request reports it and /healthcheck shows degraded.
    match store.health_check().await {
        Ok(()) => info!(backend = store.backend(), "state store reachable"),
        Err(err) => warn!(backend = store.backend(), error = %err, "state store unreachable at startup"),
    }

    let app_state = AppState::new(store, Arc::new(SystemClock), config);
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the REST key-value store when its credentials are present, the in-memory store otherwise.
fn build_store() -> anyhow::Result<Arc<dyn StateStore>> {
    #[cfg(feature = "kv-store")]
    {
        use scoreboard_back::dao::state_store::rest_kv::{KvConfig, RestKvStore};

        match KvConfig::from_env() {
            Ok(config) => {
                let base_url = config.base_url.clone();
                let store = RestKvStore::connect(config).context("building key-value client")?;
                info!(%base_url, "using REST key-value state store");
                return Ok(Arc::new(store));
            }
            Err(err) => info!(reason = %err, "REST key-value store not configured"),
        }
    }

    info!("using in-memory state store; state is lost on restart");
    Ok(Arc::new(MemoryStateStore::new()))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
