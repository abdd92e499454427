use std::collections::VecDeque;
use std::sync::Mutex;

use agentdesk_api::{ActionResponse, AgentId, AgentRecord, ApplicationStatus, SupportMember};
use agentdesk_api_client::ClientError;
use agentdesk_core::testing;
use agentdesk_dashboard::{
    Action, ActionError, ActionOutcome, ActionRequest, AdminBackend, Dashboard, NoticeLevel,
};

/// In-memory backend: records every submitted request and answers from a
/// queue of canned results.
#[derive(Default)]
struct FakeBackend {
    agents: Vec<AgentRecord>,
    roster: Vec<SupportMember>,
    fail_listing: bool,
    replies: Mutex<VecDeque<Result<ActionResponse, ClientError>>>,
    sent: Mutex<Vec<ActionRequest>>,
}

impl FakeBackend {
    fn seeded() -> Self {
        Self {
            agents: testing::roster_records(),
            roster: testing::support_roster(),
            ..Self::default()
        }
    }

    fn reply(self, result: Result<ActionResponse, ClientError>) -> Self {
        self.replies.lock().unwrap().push_back(result);
        self
    }

    fn sent(&self) -> Vec<ActionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl AdminBackend for FakeBackend {
    async fn fetch_agents(&self) -> Result<Vec<AgentRecord>, ClientError> {
        if self.fail_listing {
            return Err(ClientError::Http {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(self.agents.clone())
    }

    async fn fetch_roster(&self) -> Result<Vec<SupportMember>, ClientError> {
        Ok(self.roster.clone())
    }

    async fn submit(&self, request: &ActionRequest) -> Result<ActionResponse, ClientError> {
        self.sent.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ActionResponse::default()))
    }

    async fn agreement_url(&self, id: AgentId) -> Result<String, ClientError> {
        Ok(format!("https://files.example.com/agreements/{id}.pdf?sig=abc"))
    }
}

async fn loaded(backend: &FakeBackend) -> Dashboard {
    let mut dash = Dashboard::default();
    let loaded = dash.reload(backend).await.unwrap();
    assert_eq!(loaded, 4);
    dash
}

#[tokio::test]
async fn reload_fills_store_and_member_presets() {
    let backend = FakeBackend::seeded();
    let dash = loaded(&backend).await;
    assert_eq!(dash.roster().len(), 2);
    assert!(dash.presets().get("support-10").is_some());
    assert_eq!(dash.visible().len(), 4);
}

#[tokio::test]
async fn failed_reload_keeps_previous_store() {
    let backend = FakeBackend::seeded();
    let mut dash = loaded(&backend).await;

    let broken = FakeBackend {
        fail_listing: true,
        ..FakeBackend::seeded()
    };
    let err = dash.reload(&broken).await.unwrap_err();
    assert!(matches!(err, ActionError::Client(ClientError::Http { status: 503, .. })));
    assert_eq!(dash.store().len(), 4);
    assert_eq!(dash.notice().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn reject_then_server_failure_rolls_back() {
    let backend = FakeBackend::seeded().reply(Err(ClientError::Http {
        status: 500,
        message: "Request failed".to_string(),
    }));
    let mut dash = loaded(&backend).await;
    let before = dash.store().get(AgentId(1)).unwrap().clone();

    let outcome = dash
        .perform(
            &backend,
            AgentId(1),
            Action::Reject {
                reason: "Incomplete documentation".to_string(),
                notes: "Missing IC back".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(dash.store().get(AgentId(1)), Some(&before));
    assert_eq!(backend.sent().len(), 1);
    assert_eq!(dash.notice().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn approve_success_keeps_optimistic_values() {
    let backend = FakeBackend::seeded();
    let mut dash = loaded(&backend).await;

    let outcome = dash
        .perform(&backend, AgentId(4), Action::Approve { notes: None })
        .await
        .unwrap();
    assert!(outcome.is_success());

    let chen = dash.store().get(AgentId(4)).unwrap();
    assert_eq!(chen.application_status, ApplicationStatus::Approved);
    assert_eq!(chen.application_notes.as_deref(), Some("Application approved"));
    assert!(chen.updated_at.is_some());

    let notice = dash.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Agent #4 approved");
}

#[tokio::test]
async fn validation_failure_sends_nothing() {
    let backend = FakeBackend::seeded();
    let mut dash = loaded(&backend).await;

    let err = dash
        .perform(
            &backend,
            AgentId(1),
            Action::ApproveWithDocument {
                document: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::Validation(_)));
    assert!(backend.sent().is_empty());
}

#[tokio::test]
async fn send_agreement_reconciles_with_returned_record() {
    let mut server = testing::roster_records().remove(0);
    server.agreement_sent = true;
    server.agreement_url = Some("agreements/1.pdf".to_string());
    let backend = FakeBackend::seeded().reply(Ok(ActionResponse {
        agent: Some(server.clone()),
        message: None,
        file_type: Some("pdf".to_string()),
    }));
    let mut dash = loaded(&backend).await;

    let outcome = dash
        .perform(&backend, AgentId(1), Action::SendAgreement)
        .await
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::Succeeded(_)));
    assert_eq!(dash.store().get(AgentId(1)), Some(&server));
    assert_eq!(dash.notice().unwrap().message, "Agent #1 agreement sent (pdf)");
}

#[tokio::test]
async fn agreement_url_does_not_mutate() {
    let backend = FakeBackend::seeded();
    let dash = loaded(&backend).await;
    let before = dash.store().clone();

    let url = dash.agreement_url(&backend, AgentId(2)).await.unwrap();
    assert!(url.contains("/agreements/2.pdf"));
    assert_eq!(dash.store(), &before);

    assert!(matches!(
        dash.agreement_url(&backend, AgentId(99)).await,
        Err(ActionError::UnknownAgent(_))
    ));
}
