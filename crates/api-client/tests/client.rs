use std::time::Duration;

use agentdesk_api_client::agentdesk_api::*;
use agentdesk_api_client::{ApiClient, ClientError};
use agentdesk_core::testing::FakeServer;
use serde_json::json;

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Some(Duration::from_secs(5))).expect("client")
}

#[tokio::test]
async fn list_agents_normalizes_records() {
    let server = FakeServer::reply(
        200,
        r#"[{"id":"1","full_name":"Alice","application_status":"pending","sales_support_id":""},
            {"id":2,"full_name":"Bob","application_status":"approved","sales_support_id":7}]"#,
    )
    .expect("server");

    let agents = client(server.base_url()).list_agents().await.expect("list agents");
    let seen = server.requests().remove(0);

    assert_eq!(seen.line, "GET /admin/agents HTTP/1.1");
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].id, AgentId(1));
    assert_eq!(agents[0].sales_support_id, None);
    assert_eq!(agents[1].sales_support_id, Some(SupportId(7)));
}

#[tokio::test]
async fn one_odd_record_does_not_fail_the_list() {
    let server = FakeServer::reply(
        200,
        r#"[{"id":1,"full_name":"Alice","gender":"other"},
            {"id":"two","full_name":"No id"},
            {"id":3,"full_name":"Chen","application_status":"under_review","tags":["x"]}]"#,
    )
    .expect("server");

    let agents = client(server.base_url()).list_agents().await.expect("list agents");

    let ids: Vec<_> = agents.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![AgentId(1), AgentId(3)]);
    assert_eq!(agents[0].gender, None);
    assert_eq!(agents[1].application_status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn reject_posts_expected_body() {
    let server = FakeServer::reply(200, r#"{"message":"rejected"}"#).expect("server");
    let req = RejectRequest {
        id: AgentId(1),
        reviewed_by: "admin".to_string(),
        rejection_reason: "Incomplete documentation".to_string(),
        application_notes: "IC photo blurred".to_string(),
    };

    let resp = client(server.base_url()).reject(&req).await.expect("reject");
    let seen = server.requests().remove(0);

    assert_eq!(seen.method(), "POST");
    assert_eq!(seen.path(), "/admin/agents/reject");
    assert_eq!(seen.header("content-type"), Some("application/json"));
    assert_eq!(
        seen.json(),
        json!({
            "id": 1,
            "reviewed_by": "admin",
            "rejection_reason": "Incomplete documentation",
            "application_notes": "IC photo blurred"
        })
    );
    assert_eq!(resp.message.as_deref(), Some("rejected"));
    assert!(resp.agent.is_none());
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let server = FakeServer::reply(200, "[]").expect("server");
    let mut api = client(server.base_url());
    api.set_auth("secret-token".to_string());

    api.list_sales_support().await.expect("roster");
    let seen = server.requests().remove(0);

    assert_eq!(seen.header("authorization"), Some("Bearer secret-token"));
}

#[tokio::test]
async fn update_returns_authoritative_agent() {
    let server =
        FakeServer::reply(200, r#"{"agent":{"id":5,"full_name":"Server Name"}}"#).expect("server");
    let mut form = EditForm::default();
    form.set(ProfileField::FullName, "Local Name");
    let req = UpdateAgentRequest::from_form(AgentId(5), &form, "admin");

    let resp = client(server.base_url()).update_agent(&req).await.expect("update");
    let seen = server.requests().remove(0);

    assert_eq!(seen.line, "PUT /admin/agents/update HTTP/1.1");
    assert_eq!(seen.json()["updated_by"], "admin");
    assert_eq!(
        resp.agent.and_then(|a| a.full_name).as_deref(),
        Some("Server Name")
    );
}

#[tokio::test]
async fn http_error_extracts_message_and_validation_errors() {
    let server = FakeServer::reply(
        422,
        r#"{"message":"Invalid input","errors":["email is taken"]}"#,
    )
    .expect("server");
    let req = SendAgreementRequest {
        id: AgentId(3),
        sent_by: "admin".to_string(),
    };

    let err = client(server.base_url()).send_agreement(&req).await.unwrap_err();

    match err {
        ClientError::Http { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Invalid input\nValidation errors: email is taken");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn object_validation_errors_keep_the_message() {
    let server = FakeServer::reply(
        400,
        r#"{"message":"Email already registered","errors":[{"field":"email","msg":"taken"}]}"#,
    )
    .expect("server");
    let req = SendAgreementRequest {
        id: AgentId(3),
        sent_by: "admin".to_string(),
    };

    let err = client(server.base_url()).send_agreement(&req).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.to_string(),
        r#"HTTP 400: Email already registered
Validation errors: {"field":"email","msg":"taken"}"#
    );
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_generic_message() {
    let server = FakeServer::reply(500, "<html>oops</html>").expect("server");

    let err = client(server.base_url()).list_sales_support().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "HTTP 500: Request failed");
}

#[tokio::test]
async fn malformed_success_body_is_reported() {
    let server = FakeServer::reply(200, "not json").expect("server");

    let err = client(server.base_url()).list_agents().await.unwrap_err();

    assert!(matches!(err, ClientError::Malformed(_)));
}

#[tokio::test]
async fn empty_success_body_is_an_empty_action_response() {
    let server = FakeServer::reply(200, "").expect("server");
    let req = StatusChangeRequest {
        id: AgentId(2),
        status: AccountStatus::Suspended,
        reason: "chargeback".to_string(),
        updated_by: "admin".to_string(),
    };

    let resp = client(server.base_url()).change_status(&req).await.expect("status");
    let seen = server.requests().remove(0);

    assert_eq!(seen.path(), "/admin/agents/status");
    assert_eq!(seen.json()["status"], "suspended");
    assert_eq!(resp, ActionResponse::default());
}

#[tokio::test]
async fn agreement_download_returns_url() {
    let server =
        FakeServer::reply(200, r#"{"download_url":"https://files.example/agreement.pdf"}"#)
            .expect("server");

    let url = client(server.base_url())
        .agreement_download_url(AgentId(9))
        .await
        .expect("download url");
    let seen = server.requests().remove(0);

    assert_eq!(seen.line, "POST /admin/agents/agreement-download HTTP/1.1");
    assert_eq!(seen.json(), json!({ "id": 9 }));
    assert_eq!(url, "https://files.example/agreement.pdf");
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .list_agents()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
