//! Event processing - turns an authenticated webhook into a counter.
//!
//! ## Flow
//!
//! ```text
//! WebhookPayload → type filter → allow-list → normalize → tags → MetricsSink
//! ```
//!
//! Filtering is silent: skipped events are not errors and are invisible to
//! the HTTP caller.

use std::sync::Arc;

use tracing::{debug, info};

use crate::allowlist::EventWhitelist;
use crate::event::{EventType, WebhookPayload};
use crate::metrics::MetricsSink;
use crate::normalize::normalize_event_name;

/// Prefix for every emitted counter.
pub const METRIC_PREFIX: &str = "segment.event";

/// Result of processing one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A counter was handed to the metrics sink
    Emitted,
    /// The payload was valid but not eligible for a metric
    Skipped,
}

/// Decides whether a payload produces a metric and emits it.
///
/// Holds only immutable shared state, so one instance serves every request.
#[derive(Clone)]
pub struct EventProcessor {
    whitelist: Arc<EventWhitelist>,
    sink: Arc<dyn MetricsSink>,
    environment: String,
}

impl EventProcessor {
    pub fn new(
        whitelist: Arc<EventWhitelist>,
        sink: Arc<dyn MetricsSink>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            whitelist,
            sink,
            environment: environment.into(),
        }
    }

    /// Process a decoded payload received on the `source` integration path.
    pub fn process(&self, payload: &WebhookPayload, source: &str) -> Outcome {
        if payload.event_type != EventType::Track {
            debug!(
                source = %source,
                event_type = %payload.event_type,
                "segment_event_skipped_type"
            );
            return Outcome::Skipped;
        }

        // The allow-list is matched against the raw name, before normalization.
        if !self.whitelist.contains(&payload.event) {
            debug!(
                source = %source,
                event = %payload.event,
                "segment_event_skipped_unlisted"
            );
            return Outcome::Skipped;
        }

        let name = metric_name(&payload.event);
        let tags = self.build_tags(payload, source);

        self.sink.increment(&name, &tags);

        info!(
            source = %source,
            event = %payload.event,
            metric = %name,
            "segment_event_emitted"
        );

        Outcome::Emitted
    }

    /// Tags in a fixed order; empty values are still emitted.
    fn build_tags(&self, payload: &WebhookPayload, source: &str) -> Vec<String> {
        let type_name = payload.event_type.as_str();
        [
            ("environment", self.environment.as_str()),
            ("source", source),
            ("event", payload.event.as_str()),
            ("userId", payload.user_id.as_str()),
            ("channel", payload.channel.as_str()),
            ("type", type_name),
        ]
        .iter()
        .map(|(key, value)| format!("{}:{}", key, tag_value(value)))
        .collect()
    }
}

/// Replace characters that delimit lines, fields or tags in a StatsD datagram.
fn tag_value(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '|' | ',' | '#' => '_',
            c => c,
        })
        .collect()
}

/// Metric name for a raw event name, e.g. `segment.event.viewed_dashboard`.
pub fn metric_name(event: &str) -> String {
    format!("{}.{}", METRIC_PREFIX, normalize_event_name(event))
}
