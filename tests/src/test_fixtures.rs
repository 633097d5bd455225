//! Test fixtures
//!
//! Synthetic E2SM payloads built with the APER encoder, and the E2AP
//! values that carry them.

use ricbridge_common::{RicIndication, RicRequestId};
use ricbridge_e2sm::{
    encode_hello_world_indication, encode_kpm_indication, HelloWorldIndicationMessage,
    KpmIndicationFormat1, KpmIndicationMessage, L3RrcMeasurements, MeasQuantityResults,
    MeasResultNr, MeasurementType, MeasurementValue, PerUePmItem, PmContainer, PmInfoItem,
    RrcEvent, ServingCellMeasurements, ServingCellResult,
};

/// MEID of the test gNB
pub const GNB_MEID: &str = "gnb:131-133-31000000";

/// A Format1 indication with two cell-level measurements and one UE.
pub fn kpm_format1() -> KpmIndicationMessage {
    KpmIndicationMessage::Format1(KpmIndicationFormat1 {
        pm_containers: vec![PmContainer::default(), PmContainer::default()],
        cell_object_id: "CELL_1".to_string(),
        pm_info: Some(vec![
            PmInfoItem::new(
                MeasurementType::Name("DRB.UEThpDl".to_string()),
                MeasurementValue::Integer(1200),
            ),
            PmInfoItem::new(
                MeasurementType::Name("RRU.PrbUsedDl".to_string()),
                MeasurementValue::Real(0.75),
            ),
        ]),
        matched_ues: Some(vec![PerUePmItem {
            ue_id: vec![0x01, 0xab],
            pm_info: Some(vec![
                PmInfoItem::new(MeasurementType::Id(12), MeasurementValue::NoValue),
                rrc_measurement(80, 20),
            ]),
        }]),
    })
}

/// APER bytes of [`kpm_format1`].
pub fn kpm_payload() -> Vec<u8> {
    encode_kpm_indication(&kpm_format1()).unwrap_or_default()
}

/// APER bytes of a HelloWorld indication carrying `text`.
pub fn hello_world_payload(text: &str) -> Vec<u8> {
    encode_hello_world_indication(&HelloWorldIndicationMessage::format1(text)).unwrap_or_default()
}

/// An A3 event report with one NR serving cell.
pub fn rrc_measurement(rsrp: u8, rsrq: u8) -> PmInfoItem {
    PmInfoItem::new(
        MeasurementType::Name("L3.RRC".to_string()),
        MeasurementValue::Rrc(L3RrcMeasurements {
            rrc_event: RrcEvent::A3,
            serving_cells: Some(ServingCellMeasurements::Nr(vec![ServingCellResult {
                serv_cell_id: 0,
                result: MeasResultNr {
                    phys_cell_id: Some(1),
                    ssb_cell: Some(MeasQuantityResults {
                        rsrp: Some(rsrp),
                        rsrq: Some(rsrq),
                        sinr: None,
                    }),
                },
            }])),
            neighbor_cells: None,
        }),
    )
}

/// RIC INDICATION wrapping an E2SM message.
pub fn ric_indication(message: Vec<u8>) -> RicIndication {
    RicIndication {
        request_id: RicRequestId::new(1, 1),
        ran_function_id: 2,
        action_id: 1,
        sequence_number: Some(7),
        header: Vec::new(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads_are_not_empty() {
        assert!(!kpm_payload().is_empty());
        assert!(!hello_world_payload("hi").is_empty());
    }
}
