//! Metrics output port.
//!
//! The relay only ever increments counters, fire-and-forget. `MetricsSink`
//! is the seam: production uses [`StatsdSink`] (DogStatsD through
//! `cadence`), tests and dry runs use [`RecordingSink`].

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Mutex;

use cadence::prelude::*;
use cadence::{MetricError, QueuingMetricSink, StatsdClient, UdpMetricSink};
use thiserror::Error;
use tracing::{info, warn};

/// Counter sink. Implementations must never block or fail the caller.
pub trait MetricsSink: Send + Sync {
    /// Increment the counter `name` by one with the given `key:value` tags.
    fn increment(&self, name: &str, tags: &[String]);
}

/// Errors raised while setting up the StatsD sink.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid statsd address {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("statsd address {0} did not resolve to any socket address")]
    NoAddress(String),

    #[error("failed to open statsd socket: {0}")]
    Socket(#[from] std::io::Error),

    #[error("failed to create statsd client: {0}")]
    Client(#[from] MetricError),
}

// =============================================================================
// StatsD
// =============================================================================

/// DogStatsD client; datagrams are queued and sent from a background thread.
pub struct StatsdSink {
    client: StatsdClient,
    target: SocketAddr,
}

impl StatsdSink {
    /// Resolve `addr`, bind an ephemeral non-blocking socket and build the client.
    pub fn connect(addr: &str) -> Result<Self, MetricsError> {
        let target = addr
            .to_socket_addrs()
            .map_err(|source| MetricsError::Resolve {
                addr: addr.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| MetricsError::NoAddress(addr.to_string()))?;

        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;

        let udp = UdpMetricSink::from(target, socket)?;
        let client = StatsdClient::builder("", QueuingMetricSink::from(udp))
            .with_error_handler(|e| warn!(error = %e, "statsd_send_failed"))
            .build();

        info!(statsd_addr = %target, "statsd_sink_connected");

        Ok(Self { client, target })
    }
}

impl MetricsSink for StatsdSink {
    fn increment(&self, name: &str, tags: &[String]) {
        let mut metric = self.client.count_with_tags(name, 1i64);
        for tag in tags {
            metric = match tag.split_once(':') {
                Some((key, value)) => metric.with_tag(key, value),
                None => metric.with_tag_value(tag),
            };
        }

        if let Err(e) = metric.try_send() {
            warn!(
                error = %e,
                metric = %name,
                statsd_addr = %self.target,
                "statsd_enqueue_failed"
            );
        }
    }
}

// =============================================================================
// Recording
// =============================================================================

/// A counter increment captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMetric {
    pub name: String,
    pub tags: Vec<String>,
}

/// In-memory sink that keeps every increment it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    recorded: Mutex<Vec<RecordedMetric>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn recorded(&self) -> Vec<RecordedMetric> {
        self.recorded
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl MetricsSink for RecordingSink {
    fn increment(&self, name: &str, tags: &[String]) {
        if let Ok(mut guard) = self.recorded.lock() {
            guard.push(RecordedMetric {
                name: name.to_string(),
                tags: tags.to_vec(),
            });
        }
    }
}
