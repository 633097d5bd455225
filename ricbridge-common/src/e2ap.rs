//! E2AP value types and the external codec seam
//!
//! The E2AP PDU encoder/decoder is generated from the ASN.1 definitions
//! and lives outside this workspace. The bridge only needs two procedures
//! from it (RIC INDICATION and RIC CONTROL REQUEST), so the codec is seen
//! through the narrow [`E2apCodec`] trait and the plain value types below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by an E2AP codec implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum E2apError {
    /// Encoding the PDU failed.
    #[error("E2AP encode failed: {0}")]
    Encode(String),

    /// Decoding the PDU failed.
    #[error("E2AP decode failed: {0}")]
    Decode(String),

    /// The PDU decoded but is not the expected initiating message.
    #[error("E2AP PDU is not a {expected}")]
    UnexpectedProcedure { expected: &'static str },

    /// A mandatory IE is absent.
    #[error("E2AP {procedure} is missing IE {ie}")]
    MissingIe {
        procedure: &'static str,
        ie: &'static str,
    },
}

/// RICrequestID IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RicRequestId {
    /// RIC Requestor ID (0..65535)
    pub requestor_id: u32,
    /// RIC Instance ID (0..65535)
    pub instance_id: u32,
}

impl RicRequestId {
    pub fn new(requestor_id: u32, instance_id: u32) -> Self {
        Self {
            requestor_id,
            instance_id,
        }
    }
}

/// RIC INDICATION fields used by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RicIndication {
    pub request_id: RicRequestId,
    /// RANfunctionID (0..4095)
    pub ran_function_id: u16,
    pub action_id: u8,
    pub sequence_number: Option<u32>,
    /// RICindicationHeader, an opaque E2SM-encoded buffer
    pub header: Vec<u8>,
    /// RICindicationMessage, an opaque E2SM-encoded buffer
    pub message: Vec<u8>,
}

/// RIC CONTROL REQUEST fields used by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RicControlRequest {
    pub request_id: RicRequestId,
    /// RANfunctionID (0..4095)
    pub ran_function_id: u16,
    pub call_process_id: Option<Vec<u8>>,
    /// RICcontrolHeader
    pub header: Vec<u8>,
    /// RICcontrolMessage; this deployment carries ASCII JSON here
    pub message: Vec<u8>,
    pub ack_requested: bool,
}

/// Narrow view of the generated E2AP PDU codec.
///
/// Implementations own any ASN.1 allocations internally; the value types
/// handed back are plain owned data.
pub trait E2apCodec: Send + Sync {
    /// Decodes an E2AP PDU that must carry a RIC INDICATION.
    fn decode_indication(&self, pdu: &[u8]) -> Result<RicIndication, E2apError>;

    /// Encodes a RIC CONTROL REQUEST initiating message.
    fn encode_control_request(&self, request: &RicControlRequest) -> Result<Vec<u8>, E2apError>;

    /// Decodes an E2AP PDU that must carry a RIC CONTROL REQUEST.
    fn decode_control_request(&self, pdu: &[u8]) -> Result<RicControlRequest, E2apError>;
}
