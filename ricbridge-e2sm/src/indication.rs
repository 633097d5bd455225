//! E2SM indication decoder
//!
//! Tries KPM first and falls back to HelloWorld. The first service model
//! that decodes wins; when neither does, the caller gets an empty string
//! and nothing is forwarded.

use tracing::{debug, info, warn};

use crate::codec::{decode_hello_world_indication, decode_kpm_indication, E2smError};
use crate::hello_world::HelloWorldIndicationMessage;
use crate::kpm::KpmIndicationMessage;
use crate::projection::{project_hello_world, project_kpm};

/// Result of a successful decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedIndication {
    Kpm(KpmIndicationMessage),
    HelloWorld(HelloWorldIndicationMessage),
}

impl DecodedIndication {
    /// Service model name as reported in the projection.
    pub fn service_model(&self) -> &'static str {
        match self {
            DecodedIndication::Kpm(_) => "KPM",
            DecodedIndication::HelloWorld(_) => "HelloWorld",
        }
    }
}

/// Decodes an indication message payload as KPM, then as HelloWorld.
///
/// A HelloWorld message of an unknown format counts as a failed attempt,
/// since there is nothing to extract from it.
pub fn decode_indication(payload: &[u8]) -> Result<DecodedIndication, E2smError> {
    let kpm_err = match decode_kpm_indication(payload) {
        Ok(message) => return Ok(DecodedIndication::Kpm(message)),
        Err(E2smError::KpmDecode(e)) => e,
        Err(other) => return Err(other),
    };
    debug!(error = %kpm_err, "Payload is not E2SM-KPM, trying HelloWorld");

    match decode_hello_world_indication(payload) {
        Ok(message @ HelloWorldIndicationMessage::Format1 { .. }) => {
            Ok(DecodedIndication::HelloWorld(message))
        }
        Ok(HelloWorldIndicationMessage::Unknown { extension_index }) => {
            Err(E2smError::Undecodable {
                kpm: kpm_err,
                hello_world: crate::per::PerError::InvalidChoiceIndex {
                    index: extension_index + 1,
                    max: 0,
                },
            })
        }
        Err(E2smError::HelloWorldDecode(hw_err)) => Err(E2smError::Undecodable {
            kpm: kpm_err,
            hello_world: hw_err,
        }),
        Err(other) => Err(other),
    }
}

/// Decodes and projects an indication message payload to compact JSON.
///
/// Returns an empty string when the payload is neither KPM nor
/// HelloWorld. Raw or hex-encoded payloads are never returned.
pub fn indication_to_json(meid: &str, payload: &[u8]) -> String {
    let projected = match decode_indication(payload) {
        Ok(DecodedIndication::Kpm(message)) => {
            if let KpmIndicationMessage::Format1(f1) = &message {
                info!(
                    meid,
                    pm_containers = f1.pm_containers.len(),
                    measurements = f1.pm_info.as_ref().map_or(0, Vec::len),
                    ues = f1.matched_ues.as_ref().map_or(0, Vec::len),
                    "Decoded KPM indication Format1"
                );
            } else {
                info!(meid, "Decoded KPM indication of unsupported format");
            }
            project_kpm(meid, &message)
        }
        Ok(DecodedIndication::HelloWorld(message)) => {
            info!(meid, len = message.message().map_or(0, <[u8]>::len), "Decoded HelloWorld indication");
            match project_hello_world(&message) {
                Some(projected) => projected,
                None => return String::new(),
            }
        }
        Err(e) => {
            warn!(meid, len = payload.len(), "E2SM decode failed: {}", e);
            return String::new();
        }
    };

    projected.unwrap_or_else(|e| {
        warn!(meid, "Failed to render KPI document: {}", e);
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_hello_world_indication, encode_kpm_indication};
    use crate::kpm::{
        KpmIndicationFormat1, MeasurementType, MeasurementValue, PerUePmItem, PmContainer,
        PmInfoItem,
    };

    fn sample_format1() -> KpmIndicationMessage {
        KpmIndicationMessage::Format1(KpmIndicationFormat1 {
            pm_containers: vec![PmContainer::default()],
            cell_object_id: "CELL_1".to_string(),
            pm_info: Some(vec![
                PmInfoItem::new(
                    MeasurementType::Name("DRB.Thp".to_string()),
                    MeasurementValue::Integer(42),
                ),
                PmInfoItem::new(MeasurementType::Id(7), MeasurementValue::Real(3.5)),
            ]),
            matched_ues: Some(vec![PerUePmItem {
                ue_id: vec![0x00, 0x00, 0x00, 0x2a],
                pm_info: Some(vec![PmInfoItem::new(
                    MeasurementType::Name("RRU.PrbUsedDl".to_string()),
                    MeasurementValue::Integer(17),
                )]),
            }]),
        })
    }

    #[test]
    fn test_kpm_format1_projection() {
        let payload = encode_kpm_indication(&sample_format1()).unwrap();
        let json = indication_to_json("gnb:131-133-31000000", &payload);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["serviceModel"], "KPM");
        assert_eq!(value["format"], "F1");
        assert_eq!(value["cellObjectID"], "CELL_1");
        assert_eq!(value["node_id"], 2);
        assert_eq!(value["pmContainers"], 1);

        assert!(json.contains(r#""measurements":[{"name":"DRB.Thp","value":42},{"id":7,"value":3.500000}]"#));

        let ues = value["ues"].as_array().unwrap();
        assert_eq!(ues.len(), 1);
        assert_eq!(ues[0]["ueId"], "0000002a");
        assert_eq!(ues[0]["node_id"], 3);
        assert_eq!(ues[0]["measurements"][0]["name"], "RRU.PrbUsedDl");
    }

    #[test]
    fn test_hello_world_fallback() {
        let payload =
            encode_hello_world_indication(&HelloWorldIndicationMessage::format1("Hello\tRIC")).unwrap();
        assert!(matches!(
            decode_indication(&payload),
            Ok(DecodedIndication::HelloWorld(_))
        ));
        assert_eq!(
            indication_to_json("gnb:1", &payload),
            r#"{"serviceModel":"HelloWorld","indicationMessage":"Hello\tRIC"}"#
        );
    }

    #[test]
    fn test_undecodable_payload_yields_empty_string() {
        for payload in [&[][..], &[0xff, 0xff, 0xff][..], &[0x00, 0x09, b'x'][..]] {
            assert!(matches!(
                decode_indication(payload),
                Err(E2smError::Undecodable { .. })
            ));
            assert_eq!(indication_to_json("gnb:1", payload), "");
        }
    }

    #[test]
    fn test_random_payloads_never_panic() {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        for _ in 0..20_000 {
            let len = (next() % 64) as usize;
            let payload: Vec<u8> = (0..len).map(|_| next() as u8).collect();
            let json = indication_to_json("gnb:1", &payload);
            if !json.is_empty() {
                assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
            }
        }
    }

    #[test]
    fn test_huge_choice_extension_is_a_decode_error() {
        // Extension alternative with index 2^64 - 1.
        let mut encoder = crate::per::AperEncoder::new();
        encoder.write_bit(true);
        encoder.encode_normally_small_non_negative(u64::MAX).unwrap();
        let payload = encoder.into_bytes();

        assert!(decode_indication(&payload).is_err());
        assert_eq!(indication_to_json("gnb:1", &payload), "");
    }

    #[test]
    fn test_service_model_names() {
        let kpm = decode_indication(&encode_kpm_indication(&sample_format1()).unwrap()).unwrap();
        assert_eq!(kpm.service_model(), "KPM");
    }
}
