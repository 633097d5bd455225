//! RMR message model and transport seam
//!
//! The RIC message router and its xApp runtime are external; the bridge
//! sees them only through [`RmrTransport`].

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// RIC health check request
pub const RIC_HEALTH_CHECK_REQ: i32 = 100;
/// RIC health check response
pub const RIC_HEALTH_CHECK_RESP: i32 = 101;
/// RIC subscription response
pub const RIC_SUB_RESP: i32 = 12011;
/// RIC control request
pub const RIC_CONTROL_REQ: i32 = 12040;
/// RIC indication
pub const RIC_INDICATION: i32 = 12050;
/// A1 policy request
pub const A1_POLICY_REQ: i32 = 20010;
/// A1 policy response
pub const A1_POLICY_RESP: i32 = 20011;

/// Largest message the dispatcher accepts.
pub const MAX_RMR_RECV_SIZE: usize = 65536;

/// Subscription id meaning "none".
pub const NO_SUBSCRIPTION: i32 = -1;

/// Payload of a health check response.
pub const HEALTH_CHECK_ACK: &[u8] = b"HELLOWORLD OK\n";

/// RMR transport errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RmrError {
    #[error("RMR send failed: {0}")]
    Send(String),

    #[error("RMR receive failed: {0}")]
    Receive(String),
}

/// Message kinds the dispatcher distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RicMessageKind {
    HealthCheckReq,
    Indication,
    SubResp,
    A1PolicyReq,
    Unknown(i32),
}

impl From<i32> for RicMessageKind {
    fn from(mtype: i32) -> Self {
        match mtype {
            RIC_HEALTH_CHECK_REQ => RicMessageKind::HealthCheckReq,
            RIC_INDICATION => RicMessageKind::Indication,
            RIC_SUB_RESP => RicMessageKind::SubResp,
            A1_POLICY_REQ => RicMessageKind::A1PolicyReq,
            other => RicMessageKind::Unknown(other),
        }
    }
}

/// One RMR message buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicMessage {
    pub mtype: i32,
    pub sub_id: i32,
    /// Managed element id, when the sender set one
    pub meid: Option<String>,
    pub payload: Bytes,
    /// Length reported by the transport
    pub len: usize,
}

impl RicMessage {
    pub fn new(mtype: i32, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            mtype,
            sub_id: NO_SUBSCRIPTION,
            meid: None,
            len: payload.len(),
            payload,
        }
    }

    pub fn with_meid(mut self, meid: impl Into<String>) -> Self {
        self.meid = Some(meid.into());
        self
    }

    pub fn with_sub_id(mut self, sub_id: i32) -> Self {
        self.sub_id = sub_id;
        self
    }

    pub fn kind(&self) -> RicMessageKind {
        RicMessageKind::from(self.mtype)
    }

    /// Replaces the payload and its length.
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
        self.len = self.payload.len();
    }

    /// Turns the message into a reply of type `mtype` with no subscription.
    pub fn make_reply(&mut self, mtype: i32, payload: impl Into<Bytes>) {
        self.mtype = mtype;
        self.sub_id = NO_SUBSCRIPTION;
        self.set_payload(payload);
    }
}

/// Message delivery over RMR.
#[async_trait]
pub trait RmrTransport: Send + Sync {
    /// Waits for the next message; `None` once the transport is closed.
    async fn receive(&self) -> Result<Option<RicMessage>, RmrError>;

    /// Sends a message routed by its type and MEID.
    async fn send(&self, message: RicMessage) -> Result<(), RmrError>;

    /// Sends a message back to the endpoint it came from.
    async fn return_to_sender(&self, message: RicMessage) -> Result<(), RmrError>;
}
