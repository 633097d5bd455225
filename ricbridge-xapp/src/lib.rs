//! xApp side of the RIC bridge
//!
//! Receives RMR messages, answers health checks and A1 policy requests,
//! turns RIC indications into KPI documents for the decision agent, and
//! relays the agent's recommendations back to the RAN as RIC CONTROL
//! REQUESTs.
//!
//! The RMR transport and the E2AP codec are external and plugged in
//! through [`RmrTransport`] and [`ricbridge_common::E2apCodec`].

pub mod a1;
pub mod control_sender;
pub mod dispatcher;
pub mod link;
pub mod receiver;
pub mod rmr;
pub mod worker_pool;

pub use a1::{A1PolicyError, A1PolicyHandler, A1PolicyRequest};
pub use control_sender::{ControlSender, RmrControlSender};
pub use dispatcher::{MessageDispatcher, SubscriptionHandler};
pub use link::AgentLink;
pub use receiver::{ReceiverStats, XappReceiver};
pub use rmr::{
    RicMessage, RicMessageKind, RmrError, RmrTransport, A1_POLICY_REQ, A1_POLICY_RESP,
    HEALTH_CHECK_ACK, MAX_RMR_RECV_SIZE, NO_SUBSCRIPTION, RIC_CONTROL_REQ, RIC_HEALTH_CHECK_REQ,
    RIC_HEALTH_CHECK_RESP, RIC_INDICATION, RIC_SUB_RESP,
};
pub use worker_pool::{PoolStats, RecommendationJob, RecommendationPool};
