//! Logging infrastructure for the RIC bridge
//!
//! Subscriber setup on top of `tracing-subscriber`, plus helpers that log
//! every agent frame and RMR message in a uniform, structured shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Maximum number of payload bytes rendered by trace-level hex dumps.
const HEX_DUMP_LIMIT: usize = 256;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    #[serde(alias = "warning")]
    Warn,
    /// Error level - least verbose
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "err" => Ok(LogLevel::Error),
            _ => Err(format!("unknown log level: {s}")),
        }
    }
}

/// Initialize the tracing subscriber with the specified log level.
///
/// `RUST_LOG` takes precedence over `level` when it is set. Calling this
/// more than once is harmless; later calls are ignored.
///
/// # Example
///
/// ```
/// use ricbridge_common::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    init_logging_with_filter(&level.to_string());
}

/// Initialize logging with a custom filter directive.
///
/// # Example
///
/// ```
/// use ricbridge_common::logging::init_logging_with_filter;
///
/// // Info everywhere, debug for the agent transport
/// init_logging_with_filter("info,ricbridge_agent=debug");
/// ```
pub fn init_logging_with_filter(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .try_init();
}

/// Protocol direction for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Incoming/received message
    Rx,
    /// Outgoing/transmitted message
    Tx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rx => write!(f, "RX"),
            Direction::Tx => write!(f, "TX"),
        }
    }
}

/// Log a protocol message at debug level with a hex dump at trace level.
///
/// # Arguments
///
/// * `protocol` - Protocol name (e.g. "AGENT", "RMR", "E2SM")
/// * `direction` - Message direction
/// * `msg_type` - Message type description
/// * `data` - Raw message bytes
pub fn log_protocol_message(protocol: &str, direction: Direction, msg_type: &str, data: &[u8]) {
    tracing::debug!(
        protocol = protocol,
        direction = %direction,
        msg_type = msg_type,
        len = data.len(),
        "{} {} message",
        direction,
        protocol
    );
    tracing::trace!(
        protocol = protocol,
        hex = %HexDump(data),
        "{} payload",
        protocol
    );
}

/// Log a frame exchanged with the external decision agent.
pub fn log_agent_frame(direction: Direction, msg_type: &str, body: &[u8]) {
    log_protocol_message("AGENT", direction, msg_type, body);
}

/// Log an RMR message by its numeric type.
pub fn log_rmr_message(direction: Direction, mtype: i32, payload: &[u8]) {
    log_protocol_message("RMR", direction, &mtype.to_string(), payload);
}

/// Hex rendering of a byte slice, truncated after a fixed number of bytes.
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > HEX_DUMP_LIMIT {
            write!(
                f,
                "{}... ({} bytes)",
                hex::encode(&self.0[..HEX_DUMP_LIMIT]),
                self.0.len()
            )
        } else {
            write!(f, "{}", hex::encode(self.0))
        }
    }
}
