//! RIC CONTROL REQUEST executor
//!
//! Runs on whatever task receives E2AP traffic. A request is decoded, its
//! control message parsed into a [`ControlCommand`] and validated here; the
//! mutation itself is queued on the run-now scheduler and applied later by
//! the simulation loop.

use std::sync::Arc;

use ricbridge_common::{E2apCodec, E2apError, RicControlRequest};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::command::{CommandError, ControlCommand};
use crate::ran::{NodeId, RanError, RanModel};
use crate::scheduler::{RunNowScheduler, SchedulerClosed};

/// Errors raised while accepting a control request.
#[derive(Debug, Error)]
pub enum ControlRequestError {
    #[error("Failed to decode RIC control request: {0}")]
    Decode(#[from] E2apError),

    #[error("RIC control request has an empty control message")]
    EmptyMessage,

    #[error("Control message is not valid UTF-8")]
    NotUtf8,

    #[error("Invalid control command: {0}")]
    Command(#[from] CommandError),

    #[error(transparent)]
    SchedulerClosed(#[from] SchedulerClosed),
}

/// Accepts control requests and schedules their commands.
pub struct ControlExecutor {
    codec: Arc<dyn E2apCodec>,
    scheduler: RunNowScheduler,
}

impl ControlExecutor {
    pub fn new(codec: Arc<dyn E2apCodec>, scheduler: RunNowScheduler) -> Self {
        Self { codec, scheduler }
    }

    /// Decodes an E2AP PDU carrying a RIC CONTROL REQUEST and schedules it.
    pub fn handle_pdu(&self, pdu: &[u8]) -> Result<ControlCommand, ControlRequestError> {
        let request = self.codec.decode_control_request(pdu)?;
        self.handle_request(&request)
    }

    /// Schedules the command carried by an already decoded request.
    pub fn handle_request(
        &self,
        request: &RicControlRequest,
    ) -> Result<ControlCommand, ControlRequestError> {
        info!(
            requestor_id = request.request_id.requestor_id,
            instance_id = request.request_id.instance_id,
            ran_function_id = request.ran_function_id,
            "Received RIC control request"
        );

        let text = control_text(&request.message)?;
        debug!("Control message: {}", text);
        self.submit(text)
    }

    /// Parses `text`, and if it is a valid command, queues one task that
    /// applies it. Nothing is queued on error.
    pub fn submit(&self, text: &str) -> Result<ControlCommand, ControlRequestError> {
        let command = ControlCommand::parse(text).map_err(|e| {
            warn!("Rejected control command: {}", e);
            e
        })?;
        if let ControlCommand::Unknown { cmd } = &command {
            warn!(cmd = %cmd, "Ignoring unknown control command");
            return Err(CommandError::UnknownCommand(cmd.clone()).into());
        }

        let scheduled = command.clone();
        self.scheduler.schedule_now(move |ran: &mut dyn RanModel| {
            if let Err(e) = apply(&scheduled, ran) {
                warn!(cmd = scheduled.name(), "Control command not applied: {}", e);
            }
        })?;
        info!(cmd = command.name(), "Scheduled control command");
        Ok(command)
    }
}

/// Control message bytes as text, without a trailing NUL.
fn control_text(message: &[u8]) -> Result<&str, ControlRequestError> {
    let message = message.strip_suffix(&[0u8]).unwrap_or(message);
    if message.is_empty() {
        return Err(ControlRequestError::EmptyMessage);
    }
    std::str::from_utf8(message).map_err(|_| ControlRequestError::NotUtf8)
}

/// Applies a validated command to the simulation.
pub fn apply(command: &ControlCommand, ran: &mut dyn RanModel) -> Result<(), RanError> {
    match *command {
        ControlCommand::MoveEnb { node, dx, dy, dz } => {
            let (node, from) = match ran.position(node) {
                Some(position) => (node, position),
                None => {
                    let fallback = ran.first_mobile_node().ok_or(RanError::NoMobility)?;
                    warn!(node, fallback, "Node has no mobility model, moving first mobile node");
                    let position = ran.position(fallback).ok_or(RanError::NoMobility)?;
                    (fallback, position)
                }
            };
            let to = from.offset(dx, dy, dz);
            ran.set_position(node, to)?;
            info!(node, x = to.x, y = to.y, z = to.z, "Moved node");
        }
        ControlCommand::SetMcs { node, dl, ul } => {
            let enb = match node {
                Some(node) => named_enb(ran, node)?,
                None => first_enb(ran)?,
            };
            ran.set_mcs(enb, dl, ul)?;
            info!(node = enb, ?dl, ?ul, "Set MCS");
        }
        ControlCommand::SetBandwidth { node, bandwidth } => {
            let enb = match node.map(|node| named_enb(ran, node)) {
                Some(Ok(enb)) => enb,
                Some(Err(e)) => {
                    let enb = first_enb(ran)?;
                    warn!(fallback = enb, "{}, setting bandwidth on the first eNB", e);
                    enb
                }
                None => first_enb(ran)?,
            };
            ran.set_bandwidth(enb, bandwidth)?;
            info!(node = enb, bandwidth, "Set bandwidth");
        }
        ControlCommand::SetFlowRate {
            node,
            app,
            rate_mbps,
        } => {
            let (node, app) = ran.set_flow_rate(node, app, rate_mbps)?;
            info!(node, app, rate_mbps, "Set flow rate");
        }
        ControlCommand::SetEnbTxPower { node, dbm } => {
            ran.set_tx_power(node, dbm)?;
            info!(node, dbm, "Set eNB TX power");
        }
        ControlCommand::SetBler { bler } => {
            ran.set_target_bler(bler);
            info!(bler, "Set target BLER");
        }
        ControlCommand::Stop => {
            info!("Stopping simulation");
            ran.stop();
        }
        ControlCommand::Unknown { .. } => {}
    }
    Ok(())
}

/// `node` itself, provided it exists and carries an eNB device.
fn named_enb(ran: &dyn RanModel, node: NodeId) -> Result<NodeId, RanError> {
    if node >= ran.node_count() {
        return Err(RanError::NoSuchNode(node));
    }
    if !ran.has_enb(node) {
        return Err(RanError::NoEnbDevice(node));
    }
    Ok(node)
}

fn first_enb(ran: &dyn RanModel) -> Result<NodeId, RanError> {
    ran.enb_nodes().first().copied().ok_or(RanError::NoEnb)
}
