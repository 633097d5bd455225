//! RIC message dispatcher
//!
//! Each inbound RMR message is handled on its own, with no state carried
//! between messages:
//!
//! | type               | handling                                              | resend |
//! |--------------------|-------------------------------------------------------|--------|
//! | `RIC_HEALTH_CHECK_REQ` | rewritten in place into the health check response | yes    |
//! | `RIC_INDICATION`   | E2SM decode, KPI publish, recommendation job queued   | no     |
//! | `RIC_SUB_RESP`     | handed to the subscription handler                    | no     |
//! | `A1_POLICY_REQ`    | acknowledged in place when served                     | when acknowledged |
//! | anything else      | logged                                                | no     |

use std::sync::Arc;

use async_trait::async_trait;
use ricbridge_common::{log_rmr_message, Direction, E2apCodec, XappSettings};
use ricbridge_e2sm::indication_to_json;
use tracing::{debug, error, info, warn};

use crate::a1::A1PolicyHandler;
use crate::control_sender::ControlSender;
use crate::link::AgentLink;
use crate::rmr::{
    RicMessage, RicMessageKind, A1_POLICY_RESP, HEALTH_CHECK_ACK, MAX_RMR_RECV_SIZE,
    RIC_HEALTH_CHECK_RESP,
};
use crate::worker_pool::RecommendationPool;

/// Receives subscription responses.
#[async_trait]
pub trait SubscriptionHandler: Send + Sync {
    async fn manage_subscription_response(&self, mtype: i32, meid: Option<&str>, payload: &[u8]);
}

/// Per-type handling of inbound RMR messages.
pub struct MessageDispatcher {
    codec: Arc<dyn E2apCodec>,
    agent: Arc<dyn AgentLink>,
    a1: A1PolicyHandler,
    subscriptions: Option<Arc<dyn SubscriptionHandler>>,
    recommendations: Option<RecommendationPool>,
    workers: usize,
    queue_capacity: usize,
}

impl MessageDispatcher {
    pub fn new(settings: &XappSettings, codec: Arc<dyn E2apCodec>, agent: Arc<dyn AgentLink>) -> Self {
        Self {
            codec,
            agent,
            a1: A1PolicyHandler::new(settings.xapp_id.clone()),
            subscriptions: None,
            recommendations: None,
            workers: settings.recommendation_workers,
            queue_capacity: settings.recommendation_queue,
        }
    }

    pub fn set_subscription_handler(&mut self, handler: Arc<dyn SubscriptionHandler>) {
        self.subscriptions = Some(handler);
    }

    /// Registers the control sender and starts the recommendation workers.
    ///
    /// Without a control sender indications are only published.
    pub fn set_control_sender(&mut self, sender: Arc<dyn ControlSender>) {
        self.recommendations = Some(RecommendationPool::new(
            self.workers,
            self.queue_capacity,
            Arc::clone(&self.agent),
            sender,
        ));
    }

    pub fn recommendations(&self) -> Option<&RecommendationPool> {
        self.recommendations.as_ref()
    }

    /// Handles one message; returns true when `message` was rewritten into
    /// a reply that must be returned to the sender.
    pub async fn dispatch(&self, message: &mut RicMessage) -> bool {
        if message.len > MAX_RMR_RECV_SIZE {
            error!(
                len = message.len,
                max = MAX_RMR_RECV_SIZE,
                "RMR message too large, ignoring"
            );
            return false;
        }
        log_rmr_message(Direction::Rx, message.mtype, &message.payload);

        match message.kind() {
            RicMessageKind::HealthCheckReq => {
                message.make_reply(RIC_HEALTH_CHECK_RESP, HEALTH_CHECK_ACK);
                debug!("Answering health check");
                true
            }
            RicMessageKind::Indication => {
                self.handle_indication(message).await;
                false
            }
            RicMessageKind::SubResp => {
                info!(meid = ?message.meid, "Received subscription response");
                match &self.subscriptions {
                    Some(handler) => {
                        handler
                            .manage_subscription_response(
                                message.mtype,
                                message.meid.as_deref(),
                                &message.payload,
                            )
                            .await
                    }
                    None => error!("No subscription handler assigned"),
                }
                false
            }
            RicMessageKind::A1PolicyReq => self.handle_a1_policy(message),
            RicMessageKind::Unknown(mtype) => {
                error!(mtype, "Unknown message type received from RMR");
                false
            }
        }
    }

    async fn handle_indication(&self, message: &RicMessage) {
        let Some(meid) = message.meid.as_deref() else {
            error!("RIC indication without MEID, ignoring");
            return;
        };
        info!(meid, len = message.len, "Received RIC indication");

        let indication = match self.codec.decode_indication(&message.payload) {
            Ok(indication) => indication,
            Err(e) => {
                warn!(meid, "Failed to decode RIC indication: {}", e);
                return;
            }
        };

        let kpi_json = indication_to_json(meid, &indication.message);
        if kpi_json.is_empty() {
            warn!(meid, "E2SM decode failed, nothing forwarded");
            return;
        }

        self.agent.send_kpi(meid, &kpi_json).await;
        if let Some(pool) = &self.recommendations {
            pool.submit(meid, &kpi_json);
        }
    }

    fn handle_a1_policy(&self, message: &mut RicMessage) -> bool {
        info!("Received A1 policy request");
        match self.a1.handle(&message.payload) {
            Ok(Some(ack)) => {
                message.make_reply(A1_POLICY_RESP, ack);
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!("Rejected A1 policy request: {}", e);
                false
            }
        }
    }

    /// Stops the recommendation workers after they drain their queue.
    pub async fn shutdown(&mut self) {
        if let Some(mut pool) = self.recommendations.take() {
            pool.shutdown().await;
        }
    }
}
