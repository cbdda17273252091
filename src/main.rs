// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use metatx_gateway::{
    api::router,
    config::{GatewayConfig, LOG_FORMAT_ENV},
    ledger::EvmLedger,
    state::AppState,
};

#[tokio::main]
async fn main() {
    init_tracing();

    // Load configuration (panics if required variables are absent - the
    // gateway cannot run without a ledger endpoint and signing authority)
    let config = GatewayConfig::from_env().expect("Failed to load configuration");

    // Build the ledger client and make sure the endpoint serves the
    // configured chain before accepting traffic
    let ledger = EvmLedger::new(&config).expect("Failed to initialize ledger client");
    ledger
        .verify_chain()
        .await
        .expect("Ledger chain verification failed");

    tracing::info!(
        chain = %ledger.chain().name,
        rpc = %ledger.chain().rpc_url,
        registry = %config.registry,
        "connected to ledger"
    );

    // Initialize application state
    let state = AppState::new(Arc::new(ledger));
    let app = router(state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Metatx gateway listening on http://{addr} (docs at /docs)");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.cancel();
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .expect("HTTP server failed");
}

/// Initialize the tracing subscriber from `RUST_LOG` and `LOG_FORMAT`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format == "json")
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
