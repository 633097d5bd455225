//! Error types for the RIC bridge

use thiserror::Error;

use crate::config::ConfigError;
use crate::e2ap::E2apError;
use crate::framing::FramingError;

/// Workspace-wide error type.
///
/// Component crates define their own narrower enums; this one is what
/// glue code and tests use when several components are involved.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Length-prefixed framing errors on the agent channel.
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// E2AP encode/decode errors raised by the external codec.
    #[error("E2AP error: {0}")]
    E2ap(#[from] E2apError),

    /// Protocol-level errors (unexpected message, bad field).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Network I/O errors.
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}
