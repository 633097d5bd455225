//! Agent protocol messages
//!
//! Every frame body exchanged with the decision agent is a JSON object
//! carrying a `"type"` field. Outbound envelopes embed the projected KPI
//! document as raw JSON so its key order is preserved on the wire.

use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

/// Outbound `type` of a KPI publish.
pub const TYPE_KPI: &str = "kpi";
/// Outbound `type` of a recommendation request.
pub const TYPE_RECOMMENDATION_REQUEST: &str = "recommendation_request";
/// Inbound `type` of a reactive control command.
pub const TYPE_CONTROL: &str = "control";

/// Inbound types of the superseded config path.
const LEGACY_CONFIG_TYPES: [&str; 4] = ["config", "qos", "handover", "energy"];

/// Marker in a recommendation reply meaning "do nothing".
const NO_ACTION_MARKER: &str = "no_action";

/// KPI payload embedded in an outbound envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum KpiPayload {
    Json(Box<RawValue>),
    Text(String),
}

impl KpiPayload {
    /// Embeds `kpi` verbatim when it is valid JSON, otherwise as a string.
    fn new(kpi: &str) -> Self {
        match RawValue::from_string(kpi.to_string()) {
            Ok(raw) => KpiPayload::Json(raw),
            Err(_) => KpiPayload::Text(kpi.to_string()),
        }
    }
}

/// Outbound frame sent to the agent.
#[derive(Debug, Serialize)]
pub struct OutboundMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    meid: &'a str,
    kpi: KpiPayload,
}

impl<'a> OutboundMessage<'a> {
    /// `{"type":"kpi","meid":...,"kpi":...}`
    pub fn kpi(meid: &'a str, kpi: &str) -> Self {
        Self {
            kind: TYPE_KPI,
            meid,
            kpi: KpiPayload::new(kpi),
        }
    }

    /// `{"type":"recommendation_request","meid":...,"kpi":...}`
    pub fn recommendation_request(meid: &'a str, kpi: &str) -> Self {
        Self {
            kind: TYPE_RECOMMENDATION_REQUEST,
            meid,
            kpi: KpiPayload::new(kpi),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Serializes the frame body.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Classification of a frame received from the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Reactive control command for the node named by `meid`
    Control { meid: String, cmd: String },
    /// Control frame lacking a usable command
    InvalidControl { reason: &'static str },
    /// Push for the superseded config path; logged only
    LegacyConfig { kind: String },
    /// Anything else, including non-JSON text
    Unclassified,
}

/// Classifies an inbound frame body.
///
/// The parse is tolerant: any JSON object with a string `type` is
/// accepted, extra fields are ignored. A command given as an object is
/// re-serialized to a compact string.
pub fn classify_inbound(body: &str) -> InboundMessage {
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body.trim()) else {
        return InboundMessage::Unclassified;
    };
    let Some(kind) = fields.get("type").and_then(Value::as_str) else {
        return InboundMessage::Unclassified;
    };

    if kind == TYPE_CONTROL {
        let meid = fields
            .get("meid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let cmd = match fields.get("cmd").or_else(|| fields.get("command")) {
            Some(Value::String(cmd)) => cmd.clone(),
            Some(cmd @ Value::Object(_)) => cmd.to_string(),
            Some(_) => {
                return InboundMessage::InvalidControl {
                    reason: "command is neither a string nor an object",
                }
            }
            None => {
                return InboundMessage::InvalidControl {
                    reason: "missing cmd/command field",
                }
            }
        };
        if cmd.trim().is_empty() {
            return InboundMessage::InvalidControl {
                reason: "empty command",
            };
        }
        return InboundMessage::Control { meid, cmd };
    }

    if LEGACY_CONFIG_TYPES.iter().any(|legacy| kind.contains(legacy)) {
        return InboundMessage::LegacyConfig {
            kind: kind.to_string(),
        };
    }
    InboundMessage::Unclassified
}

/// Returns true when a recommendation reply carries no command.
///
/// Empty bodies, `{}` and anything mentioning `no_action` qualify.
pub fn is_no_action(reply: &str) -> bool {
    let reply = reply.trim();
    reply.is_empty() || reply == "{}" || reply.contains(NO_ACTION_MARKER)
}

/// Turns a raw reply into the command to relay, if any.
pub fn interpret_reply(reply: &str) -> Option<String> {
    if is_no_action(reply) {
        None
    } else {
        Some(reply.trim().to_string())
    }
}
