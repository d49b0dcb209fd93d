//! Segment Relay - turns Segment webhooks into StatsD counters.
//!
//! This library provides the modules behind the `segment-relay` binary:
//! signature verification, payload decoding, allow-list filtering, event
//! name normalization and the metrics sink port.
//!
//! ## Architecture
//!
//! ```text
//! Segment → POST /api/:source → verify x-signature → decode → EventProcessor → StatsD
//! ```

pub mod allowlist;
pub mod config;
pub mod event;
pub mod metrics;
pub mod normalize;
pub mod processor;
pub mod web;

// Re-export commonly used types
pub use allowlist::{AllowlistError, EventWhitelist};
pub use config::{Config, ConfigError};
pub use event::{EventType, WebhookPayload};
pub use metrics::{MetricsSink, RecordingSink, StatsdSink};
pub use normalize::normalize_event_name;
pub use processor::{EventProcessor, Outcome};
pub use web::{router, AppState, SignatureAlgorithm};
