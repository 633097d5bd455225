//! A1 policy handling
//!
//! Only one case is served: CREATE of policy type `1`, answered with the
//! request document minus `operation`, plus `handler_id` and
//! `status: "OK"`.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

/// Policy type served by this xApp.
pub const SUPPORTED_POLICY_TYPE: &str = "1";
/// Operation served by this xApp.
pub const SUPPORTED_OPERATION: &str = "CREATE";

/// A1 policy request errors.
#[derive(Debug, Error)]
pub enum A1PolicyError {
    #[error("Invalid A1 policy JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("A1 policy request is not a JSON object")]
    NotAnObject,

    #[error("A1 policy request is missing '{0}'")]
    MissingField(&'static str),

    #[error("A1 policy field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// A parsed A1 policy request.
#[derive(Debug, Clone, PartialEq)]
pub struct A1PolicyRequest {
    pub operation: String,
    /// Normalized to a string even when sent as an integer
    pub policy_type_id: String,
    pub policy_instance_id: String,
    document: Map<String, Value>,
}

impl A1PolicyRequest {
    pub fn parse(payload: &[u8]) -> Result<Self, A1PolicyError> {
        let Value::Object(document) = serde_json::from_slice::<Value>(payload)? else {
            return Err(A1PolicyError::NotAnObject);
        };

        let operation = match document.get("operation") {
            Some(Value::String(op)) => op.clone(),
            Some(_) => {
                return Err(A1PolicyError::WrongType {
                    field: "operation",
                    expected: "a string",
                })
            }
            None => return Err(A1PolicyError::MissingField("operation")),
        };
        let policy_type_id = id_field(&document, "policy_type_id")?;
        let policy_instance_id = id_field(&document, "policy_instance_id")?;

        Ok(Self {
            operation,
            policy_type_id,
            policy_instance_id,
            document,
        })
    }

    pub fn is_supported(&self) -> bool {
        self.policy_type_id == SUPPORTED_POLICY_TYPE && self.operation == SUPPORTED_OPERATION
    }

    /// Builds the acknowledgement document.
    pub fn acknowledgement(&self, handler_id: &str) -> Value {
        let mut ack = self.document.clone();
        ack.remove("operation");
        ack.insert("handler_id".to_string(), Value::String(handler_id.to_string()));
        ack.insert("status".to_string(), Value::String("OK".to_string()));
        Value::Object(ack)
    }
}

fn id_field(document: &Map<String, Value>, field: &'static str) -> Result<String, A1PolicyError> {
    match document.get(field) {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) if id.is_i64() || id.is_u64() => Ok(id.to_string()),
        Some(_) => Err(A1PolicyError::WrongType {
            field,
            expected: "a string or an integer",
        }),
        None => Err(A1PolicyError::MissingField(field)),
    }
}

/// Answers A1 policy requests on behalf of one xApp instance.
#[derive(Debug, Clone)]
pub struct A1PolicyHandler {
    handler_id: String,
}

impl A1PolicyHandler {
    pub fn new(handler_id: impl Into<String>) -> Self {
        Self {
            handler_id: handler_id.into(),
        }
    }

    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    /// Returns the acknowledgement payload for a supported request, or
    /// `None` when the request is valid but not served.
    pub fn handle(&self, payload: &[u8]) -> Result<Option<Vec<u8>>, A1PolicyError> {
        let request = A1PolicyRequest::parse(payload)?;
        if !request.is_supported() {
            debug!(
                operation = %request.operation,
                policy_type_id = %request.policy_type_id,
                "A1 policy request not served"
            );
            return Ok(None);
        }

        info!(
            policy_instance_id = %request.policy_instance_id,
            handler_id = %self.handler_id,
            "Acknowledging A1 policy CREATE"
        );
        Ok(Some(serde_json::to_vec(&request.acknowledgement(&self.handler_id))?))
    }
}
