//! TelemetryRelay - newline-delimited pose forwarding over TCP

use std::time::Duration;

use contracts::TelemetryConfig;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::TelemetryError;
use crate::metrics::{RelayMetrics, RelayMetricsSnapshot};

/// Outcome of a `send` that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written and flushed to the sink
    Sent,
    /// No sink connected; nothing was written
    Skipped,
}

/// Best-effort forwarder of pose messages to a single sink.
///
/// All writes go through one lock, so messages reach the sink in the order
/// their `send` calls acquired it and lines never interleave. A write or
/// flush failure drops the sink; later sends are no-ops until a new relay is
/// connected.
pub struct TelemetryRelay<W = TcpStream> {
    name: String,
    sink: Mutex<Option<W>>,
    metrics: RelayMetrics,
}

impl TelemetryRelay<TcpStream> {
    /// Connect to the actuator controller described by `config`.
    #[instrument(name = "telemetry_connect", skip(config), fields(addr = %config.address()))]
    pub async fn connect(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let addr = config.address();
        let stream = connect_with_timeout(&addr, config.connect_timeout()).await?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "failed to set TCP_NODELAY");
        }
        info!(sink = %addr, "telemetry sink connected");
        Ok(Self::with_sink(addr, stream))
    }

    /// Connect if telemetry is enabled, otherwise (or on failure) return a
    /// disconnected relay. Never fails.
    pub async fn connect_optional(config: &TelemetryConfig) -> Self {
        if !config.enabled {
            debug!("telemetry disabled");
            return Self::disconnected(config.address());
        }
        match Self::connect(config).await {
            Ok(relay) => relay,
            Err(e) => {
                warn!(error = %e, "telemetry sink unavailable, pose messages will be dropped");
                Self::disconnected(config.address())
            }
        }
    }
}

impl<W> TelemetryRelay<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Relay with no sink; every `send` is skipped.
    pub fn disconnected(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink: Mutex::new(None),
            metrics: RelayMetrics::new(),
        }
    }

    /// Relay writing to an already connected sink.
    pub fn with_sink(name: impl Into<String>, sink: W) -> Self {
        Self {
            name: name.into(),
            sink: Mutex::new(Some(sink)),
            metrics: RelayMetrics::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn is_connected(&self) -> bool {
        self.sink.lock().await.is_some()
    }

    pub fn metrics(&self) -> RelayMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Forward one message as a single line.
    ///
    /// A trailing newline on `message` is tolerated; an embedded one is
    /// rejected before touching the sink.
    #[instrument(name = "telemetry_send", skip(self, message), fields(sink = %self.name, len = message.len()))]
    pub async fn send(&self, message: &str) -> Result<Delivery, TelemetryError> {
        let line = message.strip_suffix('\n').unwrap_or(message);
        if line.contains('\n') {
            return Err(TelemetryError::InvalidMessage);
        }

        let mut guard = self.sink.lock().await;
        let Some(sink) = guard.as_mut() else {
            self.metrics.inc_skipped();
            return Ok(Delivery::Skipped);
        };

        let mut framed = Vec::with_capacity(line.len() + 1);
        framed.extend_from_slice(line.as_bytes());
        framed.push(b'\n');

        let result = match sink.write_all(&framed).await {
            Ok(()) => sink.flush().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.metrics.inc_sent();
                Ok(Delivery::Sent)
            }
            Err(source) => {
                *guard = None;
                self.metrics.inc_failed();
                warn!(error = %source, "telemetry write failed, sink dropped");
                Err(TelemetryError::SinkWrite {
                    sink_name: self.name.clone(),
                    source,
                })
            }
        }
    }

    /// Shut down and drop the sink. Idempotent.
    pub async fn close(&self) {
        let mut guard = self.sink.lock().await;
        if let Some(mut sink) = guard.take() {
            if let Err(e) = sink.shutdown().await {
                debug!(sink = %self.name, error = %e, "error while closing telemetry sink");
            }
            info!(sink = %self.name, "telemetry sink closed");
        }
    }
}

async fn connect_with_timeout(addr: &str, limit: Duration) -> Result<TcpStream, TelemetryError> {
    match tokio::time::timeout(limit, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(TelemetryError::connect(addr, e.to_string())),
        Err(_) => Err(TelemetryError::connect(
            addr,
            format!("timed out after {}ms", limit.as_millis()),
        )),
    }
}
