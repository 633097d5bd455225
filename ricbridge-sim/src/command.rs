//! Control command vocabulary
//!
//! Commands arrive as the JSON text of a RIC CONTROL REQUEST message, e.g.
//! `{"cmd":"set-mcs","node":1,"mcs":15}`. Parsing validates every field so a
//! command that reaches the simulation loop can always be applied.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::ran::{McsSetting, NodeId, MAX_MCS};

/// Errors raised while parsing a control command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command is not a JSON object")]
    NotAnObject,

    #[error("Command has no \"cmd\" field")]
    MissingCmd,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{cmd}: missing field \"{field}\"")]
    MissingField { cmd: &'static str, field: &'static str },

    #[error("{cmd}: field \"{field}\" must be {expected}")]
    WrongType {
        cmd: &'static str,
        field: &'static str,
        expected: &'static str,
    },

    #[error("{cmd}: field \"{field}\" out of range: {value}")]
    OutOfRange {
        cmd: &'static str,
        field: &'static str,
        value: f64,
    },
}

/// A validated control command.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Relative position change of a node.
    MoveEnb { node: NodeId, dx: f64, dy: f64, dz: f64 },
    SetMcs {
        node: Option<NodeId>,
        dl: Option<McsSetting>,
        ul: Option<McsSetting>,
    },
    SetBandwidth { node: Option<NodeId>, bandwidth: u8 },
    SetFlowRate {
        node: Option<NodeId>,
        app: u32,
        rate_mbps: f64,
    },
    SetEnbTxPower { node: NodeId, dbm: f64 },
    SetBler { bler: f64 },
    Stop,
    /// A well-formed command outside the vocabulary; never applied.
    Unknown { cmd: String },
}

impl ControlCommand {
    /// Parses and validates the JSON text of a command.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(fields) = value else {
            return Err(CommandError::NotAnObject);
        };
        let cmd = fields
            .get("cmd")
            .and_then(Value::as_str)
            .ok_or(CommandError::MissingCmd)?;
        let args = Args { cmd: "", fields: &fields };

        match cmd {
            "move-enb" => parse_move_enb(args.named("move-enb")),
            "set-mcs" => parse_set_mcs(args.named("set-mcs")),
            "set-bandwidth" => parse_set_bandwidth(args.named("set-bandwidth")),
            "set-flow-rate" => parse_set_flow_rate(args.named("set-flow-rate")),
            "set-enb-txpower" => parse_set_tx_power(args.named("set-enb-txpower")),
            "set-bler" => parse_set_bler(args.named("set-bler")),
            "stop" => Ok(Self::Stop),
            other => Ok(Self::Unknown {
                cmd: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::MoveEnb { .. } => "move-enb",
            Self::SetMcs { .. } => "set-mcs",
            Self::SetBandwidth { .. } => "set-bandwidth",
            Self::SetFlowRate { .. } => "set-flow-rate",
            Self::SetEnbTxPower { .. } => "set-enb-txpower",
            Self::SetBler { .. } => "set-bler",
            Self::Stop => "stop",
            Self::Unknown { cmd } => cmd,
        }
    }
}

/// Field accessor for one command object.
#[derive(Clone, Copy)]
struct Args<'a> {
    cmd: &'static str,
    fields: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    fn named(self, cmd: &'static str) -> Self {
        Self { cmd, ..self }
    }

    fn missing(&self, field: &'static str) -> CommandError {
        CommandError::MissingField { cmd: self.cmd, field }
    }

    fn out_of_range(&self, field: &'static str, value: f64) -> CommandError {
        CommandError::OutOfRange {
            cmd: self.cmd,
            field,
            value,
        }
    }

    /// A number, or a string holding one.
    fn number(&self, field: &'static str) -> Result<Option<f64>, CommandError> {
        let Some(value) = self.fields.get(field) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.map(Some).ok_or(CommandError::WrongType {
            cmd: self.cmd,
            field,
            expected: "a number",
        })
    }

    fn required_number(&self, field: &'static str) -> Result<f64, CommandError> {
        self.number(field)?.ok_or_else(|| self.missing(field))
    }

    /// First of `fields` that is present.
    fn number_alias(&self, fields: &[&'static str]) -> Result<Option<f64>, CommandError> {
        for field in fields {
            if let Some(value) = self.number(field)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Non-negative integer, rounded to the nearest value.
    fn index(&self, field: &'static str) -> Result<Option<u32>, CommandError> {
        match self.number(field)? {
            None => Ok(None),
            Some(v) if v.is_finite() && v >= 0.0 && v <= f64::from(u32::MAX) => {
                Ok(Some((v + 0.5) as u32))
            }
            Some(v) => Err(self.out_of_range(field, v)),
        }
    }

    fn required_index(&self, field: &'static str) -> Result<u32, CommandError> {
        self.index(field)?.ok_or_else(|| self.missing(field))
    }

    fn bool(&self, field: &'static str) -> Result<Option<bool>, CommandError> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Number(n)) => Ok(Some(n.as_f64().map_or(false, |v| v != 0.0))),
            Some(_) => Err(CommandError::WrongType {
                cmd: self.cmd,
                field,
                expected: "a boolean",
            }),
        }
    }

    /// Fixed MCS in 0..=28; the fractional part is discarded.
    fn mcs(&self, field: &'static str, value: f64) -> Result<u8, CommandError> {
        let truncated = value.trunc();
        if !(0.0..=f64::from(MAX_MCS)).contains(&truncated) {
            return Err(self.out_of_range(field, value));
        }
        Ok(truncated as u8)
    }

    /// Per-direction MCS; a negative value selects adaptive MCS.
    fn direction(&self, field: &'static str) -> Result<Option<McsSetting>, CommandError> {
        match self.number(field)? {
            None => Ok(None),
            Some(v) if v < 0.0 => Ok(Some(McsSetting::Adaptive)),
            Some(v) => Ok(Some(McsSetting::Fixed(self.mcs(field, v)?))),
        }
    }
}

fn parse_move_enb(args: Args<'_>) -> Result<ControlCommand, CommandError> {
    let node = args.required_index("node")?;
    let dx = args
        .number_alias(&["dx", "x"])?
        .ok_or_else(|| args.missing("dx"))?;
    let dy = args
        .number_alias(&["dy", "y"])?
        .ok_or_else(|| args.missing("dy"))?;
    let dz = args.number_alias(&["dz", "z"])?.unwrap_or(0.0);
    for (field, value) in [("dx", dx), ("dy", dy), ("dz", dz)] {
        if !value.is_finite() {
            return Err(args.out_of_range(field, value));
        }
    }
    Ok(ControlCommand::MoveEnb { node, dx, dy, dz })
}

fn parse_set_mcs(args: Args<'_>) -> Result<ControlCommand, CommandError> {
    let node = args.index("node")?;

    if let Some(mcs) = args.number("mcs")? {
        let node = node.ok_or_else(|| args.missing("node"))?;
        let fixed = McsSetting::Fixed(args.mcs("mcs", mcs)?);
        return Ok(ControlCommand::SetMcs {
            node: Some(node),
            dl: Some(fixed),
            ul: Some(fixed),
        });
    }

    if args.bool("fixed")? == Some(false) {
        return Ok(ControlCommand::SetMcs {
            node,
            dl: Some(McsSetting::Adaptive),
            ul: Some(McsSetting::Adaptive),
        });
    }

    let dl = args.direction("dl")?;
    let ul = args.direction("ul")?;
    if dl.is_none() && ul.is_none() {
        return Err(args.missing("mcs"));
    }
    Ok(ControlCommand::SetMcs { node, dl, ul })
}

fn parse_set_bandwidth(args: Args<'_>) -> Result<ControlCommand, CommandError> {
    let node = args.index("node")?;
    let bandwidth = args.required_number("bandwidth")?;
    if !(1.0..=255.0).contains(&bandwidth) {
        return Err(args.out_of_range("bandwidth", bandwidth));
    }
    Ok(ControlCommand::SetBandwidth {
        node,
        bandwidth: bandwidth as u8,
    })
}

fn parse_set_flow_rate(args: Args<'_>) -> Result<ControlCommand, CommandError> {
    let node = args.index("node")?;
    let app = args.required_index("app")?;
    let rate_mbps = args.required_number("rateMbps")?;
    if !(rate_mbps.is_finite() && rate_mbps > 0.0) {
        return Err(args.out_of_range("rateMbps", rate_mbps));
    }
    Ok(ControlCommand::SetFlowRate {
        node,
        app,
        rate_mbps,
    })
}

fn parse_set_tx_power(args: Args<'_>) -> Result<ControlCommand, CommandError> {
    let node = args.required_index("node")?;
    let dbm = args
        .number_alias(&["txPowerDbm", "dbm"])?
        .ok_or_else(|| args.missing("txPowerDbm"))?;
    if !dbm.is_finite() {
        return Err(args.out_of_range("txPowerDbm", dbm));
    }
    Ok(ControlCommand::SetEnbTxPower { node, dbm })
}

fn parse_set_bler(args: Args<'_>) -> Result<ControlCommand, CommandError> {
    let bler = args.required_number("bler")?;
    if !(bler > 0.0 && bler < 1.0) {
        return Err(args.out_of_range("bler", bler));
    }
    Ok(ControlCommand::SetBler { bler })
}
