//! Legacy control-file writer
//!
//! Translates config pushes into the CSV files polled by the simulator:
//!
//! | `type`             | file                      | row                              |
//! |--------------------|---------------------------|----------------------------------|
//! | `qos`              | `qos_actions.csv`         | `timestamp_ms,ueId,percentage`   |
//! | `handover` / `ts`  | `ts_actions_for_ns3.csv`  | `timestamp_ms,imsi,targetCellId` |
//! | `energy` / `es`    | `es_actions_for_ns3.csv`  | `timestamp_ms,cellId,hoAllowed`  |
//!
//! Every push rewrites its file from scratch.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::ingress::ConfigHandler;

pub const QOS_FILE: &str = "qos_actions.csv";
pub const HANDOVER_FILE: &str = "ts_actions_for_ns3.csv";
pub const ENERGY_FILE: &str = "es_actions_for_ns3.csv";

/// Control-file writer errors.
#[derive(Debug, Error)]
pub enum ControlWriteError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Unknown control type '{0}'")]
    UnknownType(String),

    #[error("No valid {0} commands")]
    NoCommands(ControlKind),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Kind of legacy control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Qos,
    Handover,
    Energy,
}

impl ControlKind {
    /// Maps a push `type` to its kind; `ts` and `es` are aliases.
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "qos" => Some(ControlKind::Qos),
            "handover" | "ts" => Some(ControlKind::Handover),
            "energy" | "es" => Some(ControlKind::Energy),
            _ => None,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ControlKind::Qos => QOS_FILE,
            ControlKind::Handover => HANDOVER_FILE,
            ControlKind::Energy => ENERGY_FILE,
        }
    }

    fn fields(self) -> [&'static str; 2] {
        match self {
            ControlKind::Qos => ["ueId", "percentage"],
            ControlKind::Handover => ["imsi", "targetCellId"],
            ControlKind::Energy => ["cellId", "hoAllowed"],
        }
    }
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ControlKind::Qos => "QoS",
            ControlKind::Handover => "handover",
            ControlKind::Energy => "energy",
        };
        f.write_str(name)
    }
}

/// Writes legacy control files under one directory.
#[derive(Debug, Clone)]
pub struct ControlFileWriter {
    base_dir: PathBuf,
}

impl ControlFileWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, kind: ControlKind) -> PathBuf {
        self.base_dir.join(kind.file_name())
    }

    /// Writes one config push, returning the number of rows written.
    ///
    /// Accepts `{"type":..., "commands":[...]}` or a single command object
    /// carrying `type` next to its fields. Invalid commands are skipped.
    pub fn write_control(&self, config_json: &str) -> Result<usize, ControlWriteError> {
        let document: Value = serde_json::from_str(config_json)?;
        let kind_name = document
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ControlWriteError::MissingField("type"))?;
        let kind = ControlKind::from_type(kind_name)
            .ok_or_else(|| ControlWriteError::UnknownType(kind_name.to_string()))?;

        let commands: Vec<&Map<String, Value>> = match document.get("commands") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
            Some(_) => {
                return Err(ControlWriteError::InvalidValue {
                    field: "commands",
                    value: "not an array".to_string(),
                })
            }
            None => document.as_object().into_iter().collect(),
        };

        let timestamp = timestamp_ms();
        let mut csv = String::new();
        let mut rows = 0;
        for command in commands {
            match csv_row(kind, command) {
                Ok([first, second]) => {
                    info!(kind = %kind, "{}={}, {}={}", kind.fields()[0], first, kind.fields()[1], second);
                    let _ = writeln!(csv, "{timestamp},{first},{second}");
                    rows += 1;
                }
                Err(e) => warn!(kind = %kind, "Skipping invalid command: {}", e),
            }
        }
        if rows == 0 {
            return Err(ControlWriteError::NoCommands(kind));
        }

        fs::create_dir_all(&self.base_dir).map_err(|source| ControlWriteError::Io {
            path: self.base_dir.clone(),
            source,
        })?;
        let path = self.path_for(kind);
        fs::write(&path, csv).map_err(|source| ControlWriteError::Io {
            path: path.clone(),
            source,
        })?;
        info!(kind = %kind, rows, path = %path.display(), "Control file written");
        Ok(rows)
    }
}

impl ConfigHandler for ControlFileWriter {
    fn handle_config(&self, json: &str) -> bool {
        match self.write_control(json) {
            Ok(_) => true,
            Err(e @ ControlWriteError::Io { .. }) => {
                error!("{}", e);
                false
            }
            Err(e) => {
                warn!("Control push not written: {}", e);
                false
            }
        }
    }
}

fn csv_row(kind: ControlKind, command: &Map<String, Value>) -> Result<[String; 2], ControlWriteError> {
    let [first, second] = kind.fields();
    let first_value = field_text(command, first)?;
    let second_value = field_text(command, second)?;

    if kind == ControlKind::Qos {
        let percentage = second_value.parse::<f64>().ok().filter(|p| (0.0..=1.0).contains(p));
        if percentage.is_none() {
            return Err(ControlWriteError::InvalidValue {
                field: second,
                value: second_value,
            });
        }
    }
    Ok([first_value, second_value])
}

/// Renders a scalar field as CSV text. Booleans become `1`/`0`.
fn field_text(command: &Map<String, Value>, field: &'static str) -> Result<String, ControlWriteError> {
    let text = match command.get(field) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => u8::from(*b).to_string(),
        Some(other) => {
            return Err(ControlWriteError::InvalidValue {
                field,
                value: other.to_string(),
            })
        }
        None => return Err(ControlWriteError::MissingField(field)),
    };
    if text.is_empty() || text.contains([',', '\n', '\r']) {
        return Err(ControlWriteError::InvalidValue { field, value: text });
    }
    Ok(text)
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
