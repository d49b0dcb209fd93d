//! Web server module for handling Segment webhooks.
//!
//! - `POST /api/:source` authenticates, decodes and processes one event
//! - `GET /health` reports liveness
//!
//! Request tracing and panic recovery are applied as tower layers.

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub use handlers::{health, segment_webhook, AppState, GatewayError, HealthResponse, SIGNATURE_HEADER};
pub use signature::{verify_signature, SignatureAlgorithm};

/// Build the relay router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/:source", post(segment_webhook))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
