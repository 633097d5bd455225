//! JSON projection of decoded indications
//!
//! Turns a decoded KPM or HelloWorld message into the compact KPI document
//! forwarded to the agent. Only the fields the agent acts on are kept; the
//! key order is the field order of the projection structs below.

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::hello_world::HelloWorldIndicationMessage;
use crate::kpm::{
    KpmIndicationFormat1, KpmIndicationMessage, L3RrcMeasurements, MeasQuantityResults,
    MeasResultNr, MeasurementType, MeasurementValue, NeighborCellMeasurements, PerUePmItem,
    PmInfoItem, RrcEvent, ServingCellMeasurements, MAX_CELL_REPORT,
};

/// Cell object id reported when no concrete cell applies.
pub const NO_CELL_SENTINEL: &str = "NRCellCU";

/// Application node id of a gNB.
pub const GNB_NODE_ID: u32 = 2;

/// Application node id attached to UE entries.
pub const UE_NODE_ID: u32 = 3;

/// Derives the application node id of an indication.
///
/// The MEID prefix wins (`gnb:` or `ue:`/`UE:`); otherwise the numeric part
/// of the cell object id is used when it is a single digit. Anything else
/// yields `None` and the key is left out of the projection.
pub fn derive_node_id(meid: &str, cell_id: &str) -> Option<u32> {
    if meid.starts_with("gnb:") {
        return Some(GNB_NODE_ID);
    }
    if meid.starts_with("ue:") || meid.starts_with("UE:") {
        return Some(UE_NODE_ID);
    }

    if matches!(cell_id, "" | NO_CELL_SENTINEL | "unknown" | "N/A") {
        return None;
    }

    let numeric: String = match cell_id.strip_prefix("CELL_") {
        // leading digit run, so `CELL_2abc` is cell 2
        Some(rest) => rest.chars().take_while(char::is_ascii_digit).collect(),
        None => cell_id.chars().filter(char::is_ascii_digit).collect(),
    };
    numeric.parse::<u32>().ok().filter(|n| *n <= 9)
}

/// Measurement value as it appears under `"value"`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ProjectedValue {
    Integer(i64),
    /// Printed with six decimals; non-finite values become `null`.
    Real(f64),
    Null,
}

impl Serialize for ProjectedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            ProjectedValue::Integer(v) => serializer.serialize_i64(v),
            ProjectedValue::Real(v) if v.is_finite() => RawValue::from_string(format!("{v:.6}"))
                .map_err(S::Error::custom)?
                .serialize(serializer),
            ProjectedValue::Real(_) | ProjectedValue::Null => serializer.serialize_unit(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct SignalQuality {
    #[serde(skip_serializing_if = "Option::is_none")]
    rsrp: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rsrq: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sinr: Option<u8>,
}

/// `{rsrp?, rsrq?, sinr?}`, or `None` when no quantity is present.
fn signal_quality(results: &MeasQuantityResults) -> Option<SignalQuality> {
    if results.rsrp.is_none() && results.rsrq.is_none() && results.sinr.is_none() {
        return None;
    }
    Some(SignalQuality {
        rsrp: results.rsrp,
        rsrq: results.rsrq,
        sinr: results.sinr,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServingCell {
    serv_cell_id: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal_quality: Option<SignalQuality>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryCell {
    phys_cell_id: u16,
    rsrp: u8,
    rsrq: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NeighborCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    phys_cell_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal_quality: Option<SignalQuality>,
}

impl From<&MeasResultNr> for NeighborCell {
    fn from(cell: &MeasResultNr) -> Self {
        Self {
            phys_cell_id: cell.phys_cell_id,
            signal_quality: cell.ssb_cell.as_ref().and_then(signal_quality),
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Measurement<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<ProjectedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rrc_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    serving_cells: Option<Vec<ServingCell>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    serving_cell: Option<PrimaryCell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    neighbor_cells: Option<Vec<NeighborCell>>,
}

#[derive(Debug, Serialize)]
struct Ue<'a> {
    node_id: u32,
    #[serde(rename = "ueId", skip_serializing_if = "Option::is_none")]
    ue_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    measurements: Vec<Measurement<'a>>,
}

/// The KPM document; the unknown-format stub leaves everything after
/// `format` unset.
#[derive(Debug, Serialize)]
struct KpmDocument<'a> {
    #[serde(rename = "serviceModel")]
    service_model: &'static str,
    format: &'static str,
    #[serde(rename = "cellObjectID", skip_serializing_if = "Option::is_none")]
    cell_object_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_id: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    measurements: Vec<Measurement<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ues: Vec<Ue<'a>>,
    #[serde(rename = "pmContainers", skip_serializing_if = "Option::is_none")]
    pm_containers: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HelloWorldDocument {
    service_model: &'static str,
    indication_message: String,
}

fn rrc_event_name(event: RrcEvent) -> String {
    match event {
        RrcEvent::B1 => "b1".to_string(),
        RrcEvent::A3 => "a3".to_string(),
        RrcEvent::A5 => "a5".to_string(),
        RrcEvent::Periodic => "periodic".to_string(),
        RrcEvent::Extension(n) => (n + 4).to_string(),
    }
}

fn project_rrc(entry: &mut Measurement<'_>, rrc: &L3RrcMeasurements) {
    entry.rrc_event = Some(rrc_event_name(rrc.rrc_event));

    match &rrc.serving_cells {
        Some(ServingCellMeasurements::Nr(cells)) if !cells.is_empty() => {
            entry.serving_cells = Some(
                cells
                    .iter()
                    .map(|cell| ServingCell {
                        serv_cell_id: cell.serv_cell_id,
                        signal_quality: cell.result.ssb_cell.as_ref().and_then(signal_quality),
                    })
                    .collect(),
            );
        }
        Some(ServingCellMeasurements::EutraPCell(pcell)) => {
            entry.serving_cell = Some(PrimaryCell {
                phys_cell_id: pcell.phys_cell_id,
                rsrp: pcell.rsrp,
                rsrq: pcell.rsrq,
            });
        }
        _ => {}
    }

    if let Some(NeighborCellMeasurements::Nr(cells)) = &rrc.neighbor_cells {
        if !cells.is_empty() {
            entry.neighbor_cells = Some(
                cells
                    .iter()
                    .take(MAX_CELL_REPORT)
                    .map(NeighborCell::from)
                    .collect(),
            );
        }
    }
}

fn measurement(item: &PmInfoItem) -> Measurement<'_> {
    let mut entry = Measurement::default();
    match &item.measurement {
        MeasurementType::Name(name) if !name.is_empty() => entry.name = Some(name),
        MeasurementType::Id(id) => entry.id = Some(*id),
        _ => {}
    }

    match &item.value {
        MeasurementValue::Integer(v) => entry.value = Some(ProjectedValue::Integer(*v)),
        MeasurementValue::Real(v) => entry.value = Some(ProjectedValue::Real(*v)),
        MeasurementValue::NoValue => entry.value = Some(ProjectedValue::Null),
        MeasurementValue::Rrc(rrc) => project_rrc(&mut entry, rrc),
        MeasurementValue::Unknown => {}
    }
    entry
}

fn measurement_list(items: &Option<Vec<PmInfoItem>>) -> Vec<Measurement<'_>> {
    items.iter().flatten().map(measurement).collect()
}

/// Projects one PM-Info item.
pub fn project_measurement(item: &PmInfoItem) -> serde_json::Result<String> {
    serde_json::to_string(&measurement(item))
}

/// Projects a KPM Format1 message for the node named by `meid`.
pub fn project_kpm_format1(meid: &str, format1: &KpmIndicationFormat1) -> serde_json::Result<String> {
    let cell_id = format1.cell_object_id.as_str();
    let document = KpmDocument {
        service_model: "KPM",
        format: "F1",
        cell_object_id: (!cell_id.is_empty() && cell_id != NO_CELL_SENTINEL).then_some(cell_id),
        node_id: derive_node_id(meid, cell_id),
        measurements: measurement_list(&format1.pm_info),
        ues: format1
            .matched_ues
            .iter()
            .flatten()
            .map(|ue: &PerUePmItem| Ue {
                node_id: UE_NODE_ID,
                ue_id: (!ue.ue_id.is_empty()).then(|| hex::encode(&ue.ue_id)),
                measurements: measurement_list(&ue.pm_info),
            })
            .collect(),
        pm_containers: Some(format1.pm_containers.len()),
    };
    serde_json::to_string(&document)
}

/// Projects any decoded KPM message; unknown formats give a stub.
pub fn project_kpm(meid: &str, message: &KpmIndicationMessage) -> serde_json::Result<String> {
    match message {
        KpmIndicationMessage::Format1(format1) => project_kpm_format1(meid, format1),
        KpmIndicationMessage::Unknown { .. } => serde_json::to_string(&KpmDocument {
            service_model: "KPM",
            format: "unknown",
            cell_object_id: None,
            node_id: None,
            measurements: Vec::new(),
            ues: Vec::new(),
            pm_containers: None,
        }),
    }
}

/// Projects a HelloWorld Format1 message; other formats have no projection.
///
/// Payload bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn project_hello_world(
    message: &HelloWorldIndicationMessage,
) -> Option<serde_json::Result<String>> {
    let payload = message.message()?;
    Some(serde_json::to_string(&HelloWorldDocument {
        service_model: "HelloWorld",
        indication_message: String::from_utf8_lossy(payload).into_owned(),
    }))
}
