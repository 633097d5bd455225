//! E2SM indication codec for the RIC bridge
//!
//! This crate decodes the E2SM payload carried in a RIC INDICATION and
//! projects it into the compact JSON document sent to the decision agent:
//!
//! - `per`: Aligned PER primitives
//! - `kpm`, `hello_world`: the service-model message types
//! - `codec`: encode/decode entry points
//! - `projection`: JSON rendering through serde
//! - `indication`: KPM-then-HelloWorld decode attempts
//!
//! # Example
//!
//! ```
//! use ricbridge_e2sm::{encode_hello_world_indication, indication_to_json, HelloWorldIndicationMessage};
//!
//! let payload = encode_hello_world_indication(&HelloWorldIndicationMessage::format1("ping")).unwrap();
//! let json = indication_to_json("gnb:1", &payload);
//! assert_eq!(json, r#"{"serviceModel":"HelloWorld","indicationMessage":"ping"}"#);
//! ```

pub mod codec;
pub mod hello_world;
pub mod indication;
pub mod kpm;
pub mod per;
pub mod projection;

pub use codec::{
    decode_hello_world_indication, decode_kpm_indication, encode_hello_world_indication,
    encode_kpm_indication, E2smError,
};
pub use hello_world::HelloWorldIndicationMessage;
pub use indication::{decode_indication, indication_to_json, DecodedIndication};
pub use kpm::{
    EutraPCellResult, KpmIndicationFormat1, KpmIndicationMessage, L3RrcMeasurements,
    MeasQuantityResults, MeasResultNr, MeasurementType, MeasurementValue,
    NeighborCellMeasurements, PerUePmItem, PmContainer, PmInfoItem, RrcEvent,
    ServingCellMeasurements, ServingCellResult,
};
pub use per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError};
pub use projection::derive_node_id;
