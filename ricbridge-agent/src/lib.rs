//! Decision-agent transport for the RIC bridge
//!
//! - [`client`]: the persistent framed TCP client used for KPI publishing,
//!   recommendation round trips and pushed control commands
//! - [`ingress`]: the one-shot config ingress server of the legacy path
//! - [`control_writer`]: the CSV sink fed by the ingress server
//! - [`message`]: frame envelopes and inbound classification

pub mod client;
pub mod control_writer;
pub mod ingress;
pub mod message;

pub use client::{AgentClient, AgentError, Connector, ControlCommandHandler, TcpConnector};
pub use control_writer::{ControlFileWriter, ControlKind, ControlWriteError};
pub use ingress::{ConfigHandler, ConfigIngressServer, IngressError};
pub use message::{classify_inbound, interpret_reply, is_no_action, InboundMessage, OutboundMessage};
