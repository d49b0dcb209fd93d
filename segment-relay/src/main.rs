//! Segment Relay - receives Segment webhooks and emits StatsD counters.
//!
//! Startup is all-or-nothing: configuration, the event allow-list and the
//! StatsD socket must all be ready before the listener is bound.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use segment_relay::{router, AppState, Config, EventProcessor, EventWhitelist, StatsdSink};

/// Filter used when `RUST_LOG` is unset: our own events plus request traces.
const DEFAULT_LOG_FILTER: &str = "segment_relay=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "segment_relay_starting");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        environment = %config.environment,
        signature_algorithm = %config.signature_algorithm,
        events_config_path = %config.events_config_path,
        statsd_addr = %config.statsd_addr,
        "config_loaded"
    );

    let whitelist = EventWhitelist::load(&config.events_config_path)
        .context("Failed to load event allow-list")?;
    info!(events = whitelist.len(), "allowlist_loaded");

    let sink = StatsdSink::connect(&config.statsd_addr)
        .context("Failed to set up StatsD sink")?;

    let processor = EventProcessor::new(
        Arc::new(whitelist),
        Arc::new(sink),
        config.environment.clone(),
    );
    let state = AppState::new(&config.shared_secret, config.signature_algorithm, processor);

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "segment_relay_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("segment_relay_shutdown_complete");

    Ok(())
}

/// JSON logs, one flattened object per event, filtered by `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();
}

/// Resolve once SIGINT or SIGTERM arrives. In-flight requests are drained
/// by `axum::serve` after this returns.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "sigint_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    info!(signal = received, "segment_relay_shutting_down");
}
