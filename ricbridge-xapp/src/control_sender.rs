//! RIC CONTROL REQUEST sender
//!
//! Relays an agent command to the RAN: the command text becomes the
//! RICcontrolMessage of a RIC CONTROL REQUEST, which is encoded with the
//! E2AP codec and sent over RMR to the command's MEID.

use std::sync::Arc;

use async_trait::async_trait;
use ricbridge_agent::ControlCommandHandler;
use ricbridge_common::{log_rmr_message, Direction, E2apCodec, RicControlRequest, RicRequestId, XappSettings};
use tracing::{info, warn};

use crate::rmr::{RicMessage, RmrTransport, RIC_CONTROL_REQ};

/// Delivers a command to the RAN node named by `meid`.
#[async_trait]
pub trait ControlSender: Send + Sync {
    async fn send_control(&self, cmd_json: &str, meid: &str) -> bool;
}

/// [`ControlSender`] producing E2AP RIC CONTROL REQUESTs over RMR.
pub struct RmrControlSender {
    transport: Arc<dyn RmrTransport>,
    codec: Arc<dyn E2apCodec>,
    request_id: RicRequestId,
    ran_function_id: u16,
}

impl RmrControlSender {
    pub fn new(
        transport: Arc<dyn RmrTransport>,
        codec: Arc<dyn E2apCodec>,
        request_id: RicRequestId,
        ran_function_id: u16,
    ) -> Self {
        Self {
            transport,
            codec,
            request_id,
            ran_function_id,
        }
    }

    pub fn from_settings(
        settings: &XappSettings,
        transport: Arc<dyn RmrTransport>,
        codec: Arc<dyn E2apCodec>,
    ) -> Self {
        Self::new(
            transport,
            codec,
            RicRequestId::new(settings.control_requestor_id, settings.control_instance_id),
            settings.control_ran_function_id,
        )
    }

    /// Builds the control request carrying `cmd_json`.
    pub fn build_request(&self, cmd_json: &str) -> RicControlRequest {
        RicControlRequest {
            request_id: self.request_id,
            ran_function_id: self.ran_function_id,
            call_process_id: None,
            header: Vec::new(),
            message: cmd_json.as_bytes().to_vec(),
            ack_requested: false,
        }
    }
}

#[async_trait]
impl ControlSender for RmrControlSender {
    async fn send_control(&self, cmd_json: &str, meid: &str) -> bool {
        let request = self.build_request(cmd_json);
        let pdu = match self.codec.encode_control_request(&request) {
            Ok(pdu) => pdu,
            Err(e) => {
                warn!(meid, "Failed to encode RIC control request: {}", e);
                return false;
            }
        };

        log_rmr_message(Direction::Tx, RIC_CONTROL_REQ, &pdu);
        let message = RicMessage::new(RIC_CONTROL_REQ, pdu).with_meid(meid);
        match self.transport.send(message).await {
            Ok(()) => {
                info!(meid, "Sent RIC control request: {}", cmd_json);
                true
            }
            Err(e) => {
                warn!(meid, "Failed to send RIC control request: {}", e);
                false
            }
        }
    }
}

/// Commands pushed by the agent go straight to the RAN.
#[async_trait]
impl ControlCommandHandler for RmrControlSender {
    async fn on_control_command(&self, meid: &str, cmd: &str) -> bool {
        self.send_control(cmd, meid).await
    }
}
