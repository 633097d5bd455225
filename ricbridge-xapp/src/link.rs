//! The dispatcher's view of the decision agent
//!
//! Decouples dispatch from the transport so the indication path can be
//! driven against any agent implementation.

use async_trait::async_trait;
use ricbridge_agent::{AgentClient, Connector};

/// Operations the xApp needs from the decision agent.
#[async_trait]
pub trait AgentLink: Send + Sync {
    /// Publishes a decoded KPI document; best effort.
    async fn send_kpi(&self, meid: &str, kpi_json: &str) -> bool;

    /// Requests a recommendation; `None` means no command.
    async fn get_recommendation(&self, meid: &str, kpi_json: &str) -> Option<String>;
}

#[async_trait]
impl<C: Connector> AgentLink for AgentClient<C> {
    async fn send_kpi(&self, meid: &str, kpi_json: &str) -> bool {
        AgentClient::send_kpi(self, meid, kpi_json).await
    }

    async fn get_recommendation(&self, meid: &str, kpi_json: &str) -> Option<String> {
        AgentClient::get_recommendation(self, meid, kpi_json).await
    }
}
