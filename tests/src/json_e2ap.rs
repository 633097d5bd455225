//! In-memory E2AP codec
//!
//! Stands in for the generated E2AP PDU codec: each PDU is the JSON form of
//! the value type, tagged with its procedure.

use ricbridge_common::{E2apCodec, E2apError, RicControlRequest, RicIndication};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "procedure", content = "value", rename_all = "camelCase")]
enum JsonPdu {
    RicIndication(RicIndication),
    RicControlRequest(RicControlRequest),
}

/// [`E2apCodec`] over JSON-encoded PDUs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonE2apCodec;

impl JsonE2apCodec {
    pub fn encode_indication(&self, indication: &RicIndication) -> Result<Vec<u8>, E2apError> {
        encode(&JsonPdu::RicIndication(indication.clone()))
    }

    fn decode(&self, pdu: &[u8]) -> Result<JsonPdu, E2apError> {
        serde_json::from_slice(pdu).map_err(|e| E2apError::Decode(e.to_string()))
    }
}

fn encode(pdu: &JsonPdu) -> Result<Vec<u8>, E2apError> {
    serde_json::to_vec(pdu).map_err(|e| E2apError::Encode(e.to_string()))
}

impl E2apCodec for JsonE2apCodec {
    fn decode_indication(&self, pdu: &[u8]) -> Result<RicIndication, E2apError> {
        match self.decode(pdu)? {
            JsonPdu::RicIndication(indication) => Ok(indication),
            JsonPdu::RicControlRequest(_) => Err(E2apError::UnexpectedProcedure {
                expected: "RICindication",
            }),
        }
    }

    fn encode_control_request(&self, request: &RicControlRequest) -> Result<Vec<u8>, E2apError> {
        encode(&JsonPdu::RicControlRequest(request.clone()))
    }

    fn decode_control_request(&self, pdu: &[u8]) -> Result<RicControlRequest, E2apError> {
        match self.decode(pdu)? {
            JsonPdu::RicControlRequest(request) => Ok(request),
            JsonPdu::RicIndication(_) => Err(E2apError::UnexpectedProcedure {
                expected: "RICcontrolRequest",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{hello_world_payload, ric_indication};

    #[test]
    fn test_procedure_mismatch_is_reported() {
        let codec = JsonE2apCodec;
        let pdu = codec
            .encode_indication(&ric_indication(hello_world_payload("x")))
            .unwrap();
        assert_eq!(
            codec.decode_control_request(&pdu),
            Err(E2apError::UnexpectedProcedure {
                expected: "RICcontrolRequest"
            })
        );
        assert!(matches!(codec.decode_indication(b"\x00\x01"), Err(E2apError::Decode(_))));
    }
}
