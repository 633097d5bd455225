//! E2SM-KPM indication message (Format 1 subset)
//!
//! Only the components the bridge projects are modelled. Performance and
//! RAN containers are carried as opaque octets; every extensible type
//! accepts (and skips) extension additions from newer peers.

use crate::per::{
    AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult,
};

/// maxCellingNBDU
pub const MAX_PM_CONTAINERS: usize = 512;
/// maxnoofPMInfo
pub const MAX_PM_INFO: usize = 65535;
/// maxnoofUEList
pub const MAX_MATCHED_UES: usize = 65535;
/// maxNrofServingCells
pub const MAX_SERVING_CELLS: usize = 32;
/// maxCellReport
pub const MAX_CELL_REPORT: usize = 8;

const CELL_OBJECT_ID_SIZE: Constraint = Constraint::extensible(1, 400);
const MEAS_NAME_SIZE: Constraint = Constraint::extensible(1, 150);
const MEAS_ID: Constraint = Constraint::extensible(1, 65536);
const SERV_CELL_INDEX: Constraint = Constraint::new(0, 31);
const NR_PHYS_CELL_ID: Constraint = Constraint::new(0, 1007);
const QUANTITY_RANGE: Constraint = Constraint::new(0, 127);
const EUTRA_PHYS_CELL_ID: Constraint = Constraint::new(0, 503);
const EUTRA_RSRP_RANGE: Constraint = Constraint::new(0, 97);
const EUTRA_RSRQ_RANGE: Constraint = Constraint::new(0, 34);

fn encode_list<T: AperEncode>(
    encoder: &mut AperEncoder,
    items: &[T],
    max: usize,
) -> PerResult<()> {
    encoder.encode_constrained_length(items.len(), 1, max)?;
    items.iter().try_for_each(|item| item.encode_aper(encoder))
}

fn decode_list<T: AperDecode>(decoder: &mut AperDecoder, max: usize) -> PerResult<Vec<T>> {
    let count = decoder.decode_constrained_length(1, max)?;
    (0..count).map(|_| T::decode_aper(decoder)).collect()
}

fn skip_extensions(decoder: &mut AperDecoder, extended: bool) -> PerResult<()> {
    if extended {
        decoder.skip_extension_additions()?;
    }
    Ok(())
}

fn encode_optional_list<T: AperEncode>(
    encoder: &mut AperEncoder,
    items: &Option<Vec<T>>,
    max: usize,
) -> PerResult<()> {
    match items {
        Some(items) => encode_list(encoder, items, max),
        None => Ok(()),
    }
}

/// E2SM-KPM-IndicationMessage
#[derive(Debug, Clone, PartialEq)]
pub enum KpmIndicationMessage {
    Format1(KpmIndicationFormat1),
    /// An alternative added by a later version of the service model
    Unknown { extension_index: usize },
}

impl AperEncode for KpmIndicationMessage {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            Self::Format1(format1) => {
                encoder.encode_choice_index(0, 1, true)?;
                format1.encode_aper(encoder)
            }
            Self::Unknown { extension_index } => Err(PerError::InvalidChoiceIndex {
                index: *extension_index,
                max: 0,
            }),
        }
    }
}

impl AperDecode for KpmIndicationMessage {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(1, true)? {
            0 => Ok(Self::Format1(KpmIndicationFormat1::decode_aper(decoder)?)),
            index => {
                decoder.skip_open_type()?;
                Ok(Self::Unknown {
                    extension_index: index - 1,
                })
            }
        }
    }
}

/// E2SM-KPM-IndicationMessage-Format1
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KpmIndicationFormat1 {
    pub pm_containers: Vec<PmContainer>,
    pub cell_object_id: String,
    pub pm_info: Option<Vec<PmInfoItem>>,
    pub matched_ues: Option<Vec<PerUePmItem>>,
}

impl AperEncode for KpmIndicationFormat1 {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.pm_info.is_some(), self.matched_ues.is_some()]);
        encode_list(encoder, &self.pm_containers, MAX_PM_CONTAINERS)?;
        encoder.encode_octet_string(self.cell_object_id.as_bytes(), Some(&CELL_OBJECT_ID_SIZE))?;
        encode_optional_list(encoder, &self.pm_info, MAX_PM_INFO)?;
        encode_optional_list(encoder, &self.matched_ues, MAX_MATCHED_UES)
    }
}

impl AperDecode for KpmIndicationFormat1 {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, present) = decoder.decode_sequence_preamble(true, 2)?;
        let pm_containers = decode_list(decoder, MAX_PM_CONTAINERS)?;
        let cell_object_id = decoder.decode_printable_string(Some(&CELL_OBJECT_ID_SIZE))?;
        let pm_info = if present[0] {
            Some(decode_list(decoder, MAX_PM_INFO)?)
        } else {
            None
        };
        let matched_ues = if present[1] {
            Some(decode_list(decoder, MAX_MATCHED_UES)?)
        } else {
            None
        };
        skip_extensions(decoder, extended)?;
        Ok(Self {
            pm_containers,
            cell_object_id,
            pm_info,
            matched_ues,
        })
    }
}

/// PM-Containers-Item; only its presence is of interest
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PmContainer {
    pub performance_container: Option<Vec<u8>>,
    pub ran_container: Option<Vec<u8>>,
}

impl AperEncode for PmContainer {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(
            true,
            &[
                self.performance_container.is_some(),
                self.ran_container.is_some(),
            ],
        );
        if let Some(container) = &self.performance_container {
            encoder.encode_octet_string(container, None)?;
        }
        if let Some(container) = &self.ran_container {
            encoder.encode_octet_string(container, None)?;
        }
        Ok(())
    }
}

impl AperDecode for PmContainer {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, present) = decoder.decode_sequence_preamble(true, 2)?;
        let performance_container = if present[0] {
            Some(decoder.decode_octet_string(None)?)
        } else {
            None
        };
        let ran_container = if present[1] {
            Some(decoder.decode_octet_string(None)?)
        } else {
            None
        };
        skip_extensions(decoder, extended)?;
        Ok(Self {
            performance_container,
            ran_container,
        })
    }
}

/// PM-Info-Item
#[derive(Debug, Clone, PartialEq)]
pub struct PmInfoItem {
    pub measurement: MeasurementType,
    pub value: MeasurementValue,
}

impl PmInfoItem {
    pub fn new(measurement: MeasurementType, value: MeasurementValue) -> Self {
        Self { measurement, value }
    }
}

impl AperEncode for PmInfoItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        self.measurement.encode_aper(encoder)?;
        self.value.encode_aper(encoder)
    }
}

impl AperDecode for PmInfoItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let measurement = MeasurementType::decode_aper(decoder)?;
        let value = MeasurementValue::decode_aper(decoder)?;
        skip_extensions(decoder, extended)?;
        Ok(Self { measurement, value })
    }
}

/// MeasurementType
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementType {
    Name(String),
    Id(u32),
    Unknown,
}

impl AperEncode for MeasurementType {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            Self::Name(name) => {
                encoder.encode_choice_index(0, 2, true)?;
                encoder.encode_octet_string(name.as_bytes(), Some(&MEAS_NAME_SIZE))
            }
            Self::Id(id) => {
                encoder.encode_choice_index(1, 2, true)?;
                encoder.encode_integer(i64::from(*id), Some(&MEAS_ID))
            }
            Self::Unknown => Err(PerError::InvalidChoiceIndex { index: 2, max: 1 }),
        }
    }
}

impl AperDecode for MeasurementType {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(2, true)? {
            0 => Ok(Self::Name(decoder.decode_printable_string(Some(&MEAS_NAME_SIZE))?)),
            1 => {
                let id = decoder.decode_integer(Some(&MEAS_ID))?;
                u32::try_from(id)
                    .map(Self::Id)
                    .map_err(|_| PerError::ConstraintViolation {
                        value: id,
                        min: MEAS_ID.min,
                        max: MEAS_ID.max,
                    })
            }
            _ => {
                decoder.skip_open_type()?;
                Ok(Self::Unknown)
            }
        }
    }
}

/// MeasurementValue
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementValue {
    Integer(i64),
    Real(f64),
    NoValue,
    Rrc(L3RrcMeasurements),
    Unknown,
}

impl AperEncode for MeasurementValue {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            Self::Integer(value) => {
                encoder.encode_choice_index(0, 4, true)?;
                encoder.encode_integer(*value, None)
            }
            Self::Real(value) => {
                encoder.encode_choice_index(1, 4, true)?;
                encoder.encode_real(*value)
            }
            Self::NoValue => encoder.encode_choice_index(2, 4, true),
            Self::Rrc(rrc) => {
                encoder.encode_choice_index(3, 4, true)?;
                rrc.encode_aper(encoder)
            }
            Self::Unknown => Err(PerError::InvalidChoiceIndex { index: 4, max: 3 }),
        }
    }
}

impl AperDecode for MeasurementValue {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(4, true)? {
            0 => Ok(Self::Integer(decoder.decode_integer(None)?)),
            1 => Ok(Self::Real(decoder.decode_real()?)),
            2 => Ok(Self::NoValue),
            3 => Ok(Self::Rrc(L3RrcMeasurements::decode_aper(decoder)?)),
            _ => {
                decoder.skip_open_type()?;
                Ok(Self::Unknown)
            }
        }
    }
}

/// RRCEvent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrcEvent {
    B1,
    A3,
    A5,
    Periodic,
    /// Value added by a later version, by position in the extension list
    Extension(usize),
}

impl RrcEvent {
    const ROOT: [RrcEvent; 4] = [RrcEvent::B1, RrcEvent::A3, RrcEvent::A5, RrcEvent::Periodic];

    fn index(self) -> usize {
        match self {
            RrcEvent::B1 => 0,
            RrcEvent::A3 => 1,
            RrcEvent::A5 => 2,
            RrcEvent::Periodic => 3,
            RrcEvent::Extension(n) => Self::ROOT.len() + n,
        }
    }
}

/// L3-RRC-Measurements
#[derive(Debug, Clone, PartialEq)]
pub struct L3RrcMeasurements {
    pub rrc_event: RrcEvent,
    pub serving_cells: Option<ServingCellMeasurements>,
    pub neighbor_cells: Option<NeighborCellMeasurements>,
}

impl AperEncode for L3RrcMeasurements {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(
            true,
            &[self.serving_cells.is_some(), self.neighbor_cells.is_some()],
        );
        encoder.encode_enumerated(self.rrc_event.index(), RrcEvent::ROOT.len(), true)?;
        if let Some(serving) = &self.serving_cells {
            serving.encode_aper(encoder)?;
        }
        if let Some(neighbors) = &self.neighbor_cells {
            neighbors.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for L3RrcMeasurements {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, present) = decoder.decode_sequence_preamble(true, 2)?;
        let index = decoder.decode_enumerated(RrcEvent::ROOT.len(), true)?;
        let rrc_event = RrcEvent::ROOT
            .get(index)
            .copied()
            .unwrap_or_else(|| RrcEvent::Extension(index - RrcEvent::ROOT.len()));
        let serving_cells = if present[0] {
            Some(ServingCellMeasurements::decode_aper(decoder)?)
        } else {
            None
        };
        let neighbor_cells = if present[1] {
            Some(NeighborCellMeasurements::decode_aper(decoder)?)
        } else {
            None
        };
        skip_extensions(decoder, extended)?;
        Ok(Self {
            rrc_event,
            serving_cells,
            neighbor_cells,
        })
    }
}

/// ServingCellMeasurements
#[derive(Debug, Clone, PartialEq)]
pub enum ServingCellMeasurements {
    /// nr-measResultServingMOList
    Nr(Vec<ServingCellResult>),
    /// eutra-measResultPCell
    EutraPCell(EutraPCellResult),
    Unknown,
}

impl AperEncode for ServingCellMeasurements {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            Self::Nr(cells) => {
                encoder.encode_choice_index(0, 2, true)?;
                encode_list(encoder, cells, MAX_SERVING_CELLS)
            }
            Self::EutraPCell(pcell) => {
                encoder.encode_choice_index(1, 2, true)?;
                pcell.encode_aper(encoder)
            }
            Self::Unknown => Err(PerError::InvalidChoiceIndex { index: 2, max: 1 }),
        }
    }
}

impl AperDecode for ServingCellMeasurements {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(2, true)? {
            0 => Ok(Self::Nr(decode_list(decoder, MAX_SERVING_CELLS)?)),
            1 => Ok(Self::EutraPCell(EutraPCellResult::decode_aper(decoder)?)),
            _ => {
                decoder.skip_open_type()?;
                Ok(Self::Unknown)
            }
        }
    }
}

/// MeasResultServMO
#[derive(Debug, Clone, PartialEq)]
pub struct ServingCellResult {
    pub serv_cell_id: u8,
    pub result: MeasResultNr,
}

impl AperEncode for ServingCellResult {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.serv_cell_id), &SERV_CELL_INDEX)?;
        self.result.encode_aper(encoder)
    }
}

impl AperDecode for ServingCellResult {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let serv_cell_id = decoder.decode_constrained_whole_number(&SERV_CELL_INDEX)? as u8;
        let result = MeasResultNr::decode_aper(decoder)?;
        skip_extensions(decoder, extended)?;
        Ok(Self {
            serv_cell_id,
            result,
        })
    }
}

/// MeasResultNR, reduced to the SSB cell results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeasResultNr {
    pub phys_cell_id: Option<u16>,
    pub ssb_cell: Option<MeasQuantityResults>,
}

impl AperEncode for MeasResultNr {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(
            true,
            &[self.phys_cell_id.is_some(), self.ssb_cell.is_some()],
        );
        if let Some(pci) = self.phys_cell_id {
            encoder.encode_constrained_whole_number(i64::from(pci), &NR_PHYS_CELL_ID)?;
        }
        if let Some(ssb) = &self.ssb_cell {
            ssb.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for MeasResultNr {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, present) = decoder.decode_sequence_preamble(true, 2)?;
        let phys_cell_id = if present[0] {
            Some(decoder.decode_constrained_whole_number(&NR_PHYS_CELL_ID)? as u16)
        } else {
            None
        };
        let ssb_cell = if present[1] {
            Some(MeasQuantityResults::decode_aper(decoder)?)
        } else {
            None
        };
        skip_extensions(decoder, extended)?;
        Ok(Self {
            phys_cell_id,
            ssb_cell,
        })
    }
}

/// MeasQuantityResults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasQuantityResults {
    pub rsrp: Option<u8>,
    pub rsrq: Option<u8>,
    pub sinr: Option<u8>,
}

impl AperEncode for MeasQuantityResults {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        let fields = [self.rsrp, self.rsrq, self.sinr];
        encoder.encode_sequence_preamble(false, &fields.map(|f| f.is_some()));
        for value in fields.into_iter().flatten() {
            encoder.encode_constrained_whole_number(i64::from(value), &QUANTITY_RANGE)?;
        }
        Ok(())
    }
}

impl AperDecode for MeasQuantityResults {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (_, present) = decoder.decode_sequence_preamble(false, 3)?;
        let mut fields = [None; 3];
        for (slot, present) in fields.iter_mut().zip(present) {
            if present {
                *slot = Some(decoder.decode_constrained_whole_number(&QUANTITY_RANGE)? as u8);
            }
        }
        let [rsrp, rsrq, sinr] = fields;
        Ok(Self { rsrp, rsrq, sinr })
    }
}

/// MeasResultPCell (E-UTRA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EutraPCellResult {
    pub phys_cell_id: u16,
    pub rsrp: u8,
    pub rsrq: u8,
}

impl AperEncode for EutraPCellResult {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.phys_cell_id), &EUTRA_PHYS_CELL_ID)?;
        encoder.encode_constrained_whole_number(i64::from(self.rsrp), &EUTRA_RSRP_RANGE)?;
        encoder.encode_constrained_whole_number(i64::from(self.rsrq), &EUTRA_RSRQ_RANGE)
    }
}

impl AperDecode for EutraPCellResult {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let phys_cell_id = decoder.decode_constrained_whole_number(&EUTRA_PHYS_CELL_ID)? as u16;
        let rsrp = decoder.decode_constrained_whole_number(&EUTRA_RSRP_RANGE)? as u8;
        let rsrq = decoder.decode_constrained_whole_number(&EUTRA_RSRQ_RANGE)? as u8;
        skip_extensions(decoder, extended)?;
        Ok(Self {
            phys_cell_id,
            rsrp,
            rsrq,
        })
    }
}

/// MeasResultNeighCells
#[derive(Debug, Clone, PartialEq)]
pub enum NeighborCellMeasurements {
    /// measResultListNR
    Nr(Vec<MeasResultNr>),
    Unknown,
}

impl AperEncode for NeighborCellMeasurements {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            Self::Nr(cells) => {
                encoder.encode_choice_index(0, 1, true)?;
                encode_list(encoder, cells, MAX_CELL_REPORT)
            }
            Self::Unknown => Err(PerError::InvalidChoiceIndex { index: 1, max: 0 }),
        }
    }
}

impl AperDecode for NeighborCellMeasurements {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(1, true)? {
            0 => Ok(Self::Nr(decode_list(decoder, MAX_CELL_REPORT)?)),
            _ => {
                decoder.skip_open_type()?;
                Ok(Self::Unknown)
            }
        }
    }
}

/// PerUE-PM-Item
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerUePmItem {
    pub ue_id: Vec<u8>,
    pub pm_info: Option<Vec<PmInfoItem>>,
}

impl AperEncode for PerUePmItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.pm_info.is_some()]);
        encoder.encode_octet_string(&self.ue_id, None)?;
        encode_optional_list(encoder, &self.pm_info, MAX_PM_INFO)
    }
}

impl AperDecode for PerUePmItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, present) = decoder.decode_sequence_preamble(true, 1)?;
        let ue_id = decoder.decode_octet_string(None)?;
        let pm_info = if present[0] {
            Some(decode_list(decoder, MAX_PM_INFO)?)
        } else {
            None
        };
        skip_extensions(decoder, extended)?;
        Ok(Self { ue_id, pm_info })
    }
}
