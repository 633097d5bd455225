//! Common types and utilities for the RIC bridge
//!
//! This crate provides the pieces shared by every bridge crate: the error
//! taxonomy, logging setup, configuration loading, the length-prefixed
//! frame codec spoken with the external agent, and the E2AP value types
//! exchanged with the external E2AP codec.

pub mod config;
pub mod e2ap;
pub mod error;
pub mod framing;
pub mod logging;

pub use config::{
    load_config, load_config_from_str, AgentSettings, BridgeConfig, ConfigError,
    ConfigValidationError, IngressSettings, XappSettings,
};
pub use e2ap::{E2apCodec, E2apError, RicControlRequest, RicIndication, RicRequestId};
pub use error::Error;
pub use framing::{
    encode_frame, read_frame, write_frame, FramingError, FRAME_HEADER_LEN, MAX_FRAME_BYTES,
};
pub use logging::{
    init_logging, init_logging_with_filter, log_agent_frame, log_protocol_message,
    log_rmr_message, Direction, HexDump, LogLevel,
};
