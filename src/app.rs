/*
 * Responsibility
 * - Load Config -> build dependencies -> assemble the Router
 * - Apply middleware (request id / trace / timeout, auth per route group)
 * - Start axum::serve() and the cache janitor; stop both on shutdown
 */
use std::{panic, process, sync::Arc, time::Duration, time::Instant};

use anyhow::Result;
use axum::{Router, routing::get};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health};
use crate::config::Config;
use crate::middleware;
use crate::repos::InMemoryVideoRepository;
use crate::services::auth::{LocalValidationCache, build_auth_gate, janitor::spawn_janitor};
use crate::state::{AppState, ServiceMeta};

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,media_service=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting media service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let cache = Arc::new(LocalValidationCache::new());
    let gate = build_auth_gate(&config, Arc::clone(&cache)).await?;

    let shutdown = CancellationToken::new();
    let janitor = spawn_janitor(cache, config.cache_sweep_interval, shutdown.child_token());

    let state = AppState::new(
        gate,
        Arc::new(InMemoryVideoRepository::new()),
        ServiceMeta {
            version: config.app_version.clone(),
            public_key_path: config.public_key_path.clone(),
            started_at: Instant::now(),
        },
    );
    let app = build_router(state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    janitor.shutdown().await;
    tracing::info!("media service stopped");

    Ok(())
}

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    middleware::http::apply(router, request_timeout)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("received SIGINT, shutting down"),
            Err(e) => tracing::error!(error = %e, "failed to listen for SIGINT"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("received SIGTERM, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
