//! Webhook endpoint handlers.
//!
//! The Segment handler reads the body once as `Bytes`; the same buffer is
//! verified against `x-signature` and then decoded. Whether the event turns
//! into a metric is never reflected in the response.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::event::WebhookPayload;
use crate::processor::EventProcessor;
use crate::web::signature::{verify_signature, SignatureAlgorithm};

/// Header carrying the hex-encoded body MAC.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub secret: Arc<[u8]>,
    pub algorithm: SignatureAlgorithm,
    pub processor: EventProcessor,
}

impl AppState {
    pub fn new(secret: &str, algorithm: SignatureAlgorithm, processor: EventProcessor) -> Self {
        Self {
            secret: Arc::from(secret.as_bytes()),
            algorithm,
            processor,
        }
    }
}

/// Request failures and the response each one renders.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::MissingSignature => (StatusCode::BAD_REQUEST, Json(json!({}))).into_response(),
            GatewayError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized" })),
            )
                .into_response(),
            GatewayError::Decode(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Segment Webhook
// =============================================================================

/// Segment webhook endpoint, `POST /api/:source`.
///
/// This endpoint:
/// 1. Rejects requests without `x-signature` (400)
/// 2. Verifies the body MAC (401 on mismatch)
/// 3. Decodes the payload (500 with the decode error)
/// 4. Hands it to the processor and returns 200 `{}`
pub async fn segment_webhook(
    State(state): State<AppState>,
    Path(source): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let signature = match headers.get(SIGNATURE_HEADER) {
        Some(value) if !value.is_empty() => value,
        _ => {
            warn!(source = %source, "segment_signature_missing");
            return Err(GatewayError::MissingSignature);
        }
    };

    let signature = signature.to_str().map_err(|_| {
        warn!(source = %source, "segment_signature_not_ascii");
        GatewayError::Unauthorized
    })?;

    if !verify_signature(state.algorithm, &state.secret, &body, signature) {
        warn!(
            source = %source,
            algorithm = %state.algorithm,
            body_length = body.len(),
            signature_length = signature.len(),
            "segment_signature_invalid"
        );
        return Err(GatewayError::Unauthorized);
    }

    let payload = WebhookPayload::from_slice(&body).map_err(|e| {
        error!(source = %source, error = %e, body_length = body.len(), "segment_payload_invalid");
        GatewayError::Decode(e)
    })?;

    info!(
        source = %source,
        event_type = %payload.event_type,
        event = %payload.event,
        "segment_webhook_received"
    );

    let outcome = state.processor.process(&payload, &source);
    info!(source = %source, outcome = ?outcome, "segment_webhook_processed");

    Ok(Json(json!({})))
}
