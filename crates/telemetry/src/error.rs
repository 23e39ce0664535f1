//! Telemetry error types

use thiserror::Error;

/// Telemetry relay errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Could not reach the actuator controller
    #[error("failed to connect to '{addr}': {message}")]
    Connect { addr: String, message: String },

    /// Write or flush failed; the sink has been dropped
    #[error("sink '{sink_name}' write error: {source}")]
    SinkWrite {
        sink_name: String,
        #[source]
        source: std::io::Error,
    },

    /// Message would break newline framing
    #[error("message contains an embedded newline")]
    InvalidMessage,
}

impl TelemetryError {
    pub fn connect(addr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            addr: addr.into(),
            message: message.into(),
        }
    }
}

impl From<TelemetryError> for contracts::ContractError {
    fn from(err: TelemetryError) -> Self {
        match err {
            TelemetryError::Connect { addr, message } => Self::SinkConnection {
                sink_name: addr,
                message,
            },
            TelemetryError::SinkWrite { sink_name, source } => {
                Self::sink_write(sink_name, source.to_string())
            }
            invalid @ TelemetryError::InvalidMessage => Self::Other(invalid.to_string()),
        }
    }
}
