use std::future::Future;

use agentdesk_api::{ActionResponse, AgentId, AgentRecord, SupportMember};
use agentdesk_api_client::{ApiClient, ClientError};

use crate::actions::ActionRequest;

/// The remote side of the dashboard. [`ApiClient`] is the production
/// implementation; tests substitute an in-memory one.
pub trait AdminBackend {
    fn fetch_agents(&self) -> impl Future<Output = Result<Vec<AgentRecord>, ClientError>> + Send;

    fn fetch_roster(
        &self,
    ) -> impl Future<Output = Result<Vec<SupportMember>, ClientError>> + Send;

    /// Issue exactly one request for an action.
    fn submit(
        &self,
        request: &ActionRequest,
    ) -> impl Future<Output = Result<ActionResponse, ClientError>> + Send;

    fn agreement_url(&self, id: AgentId)
    -> impl Future<Output = Result<String, ClientError>> + Send;
}

impl AdminBackend for ApiClient {
    async fn fetch_agents(&self) -> Result<Vec<AgentRecord>, ClientError> {
        self.list_agents().await
    }

    async fn fetch_roster(&self) -> Result<Vec<SupportMember>, ClientError> {
        self.list_sales_support().await
    }

    async fn submit(&self, request: &ActionRequest) -> Result<ActionResponse, ClientError> {
        match request {
            ActionRequest::Update(req) => self.update_agent(req).await,
            ActionRequest::Assign(req) => self.assign_support(req).await,
            ActionRequest::Approve(req) => self.approve(req).await,
            ActionRequest::Reject(req) => self.reject(req).await,
            ActionRequest::ChangeStatus(req) => self.change_status(req).await,
            ActionRequest::SendAgreement(req) => self.send_agreement(req).await,
        }
    }

    async fn agreement_url(&self, id: AgentId) -> Result<String, ClientError> {
        self.agreement_download_url(id).await
    }
}
