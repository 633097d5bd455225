//! E2SM encode/decode entry points

use thiserror::Error;

use crate::hello_world::HelloWorldIndicationMessage;
use crate::kpm::KpmIndicationMessage;
use crate::per::{decode_from_bytes, encode_to_bytes, PerError};

/// Errors from E2SM encoding or decoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum E2smError {
    #[error("E2SM-KPM encode error: {0}")]
    KpmEncode(PerError),

    #[error("E2SM-KPM decode error: {0}")]
    KpmDecode(PerError),

    #[error("E2SM-HelloWorld encode error: {0}")]
    HelloWorldEncode(PerError),

    #[error("E2SM-HelloWorld decode error: {0}")]
    HelloWorldDecode(PerError),

    /// Neither service model accepted the payload.
    #[error("payload is neither KPM ({kpm}) nor HelloWorld ({hello_world})")]
    Undecodable { kpm: PerError, hello_world: PerError },
}

/// Encodes an E2SM-KPM indication message to APER octets.
pub fn encode_kpm_indication(message: &KpmIndicationMessage) -> Result<Vec<u8>, E2smError> {
    encode_to_bytes(message)
        .map(|bytes| bytes.to_vec())
        .map_err(E2smError::KpmEncode)
}

/// Decodes an E2SM-KPM indication message from APER octets.
pub fn decode_kpm_indication(data: &[u8]) -> Result<KpmIndicationMessage, E2smError> {
    decode_from_bytes(data).map_err(E2smError::KpmDecode)
}

/// Encodes an E2SM HelloWorld indication message to APER octets.
pub fn encode_hello_world_indication(
    message: &HelloWorldIndicationMessage,
) -> Result<Vec<u8>, E2smError> {
    encode_to_bytes(message)
        .map(|bytes| bytes.to_vec())
        .map_err(E2smError::HelloWorldEncode)
}

/// Decodes an E2SM HelloWorld indication message from APER octets.
pub fn decode_hello_world_indication(
    data: &[u8],
) -> Result<HelloWorldIndicationMessage, E2smError> {
    decode_from_bytes(data).map_err(E2smError::HelloWorldDecode)
}
