use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use agentdesk_api::*;

use crate::error::{ClientError, Result};

/// Message shown when a failed response carries no usable error body.
const GENERIC_FAILURE: &str = "Request failed";

/// Typed HTTP client for the agentdesk admin API.
///
/// One method per endpoint; each issues exactly one request and never
/// retries.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new client for `base_url`. `timeout: None` leaves the
    /// transport default in place.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = (!token.is_empty()).then_some(token);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_token.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {path}");
        let resp = self
            .authorize(self.client.get(self.url(path)))
            .send()
            .await
            .inspect_err(|e| warn!("GET {path} failed: {e}"))?;
        parse_response(path, resp).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("{method} {path}");
        let resp = self
            .authorize(self.client.request(method.clone(), self.url(path)))
            .json(body)
            .send()
            .await
            .inspect_err(|e| warn!("{method} {path} failed: {e}"))?;
        parse_optional_response(path, resp).await
    }

    // ── Listing ───────────────────────────────────────────────────────────

    /// Entries that cannot be read as a record are skipped, not fatal.
    pub async fn list_agents(&self) -> Result<Vec<AgentRecord>> {
        let values: Vec<serde_json::Value> = self.get(paths::AGENTS).await?;
        Ok(records_from_values(values))
    }

    pub async fn list_sales_support(&self) -> Result<Vec<SupportMember>> {
        self.get(paths::SALES_SUPPORT).await
    }

    // ── Profile ───────────────────────────────────────────────────────────

    pub async fn update_agent(&self, req: &UpdateAgentRequest) -> Result<ActionResponse> {
        self.send_json(reqwest::Method::PUT, paths::UPDATE, req)
            .await
    }

    pub async fn assign_support(&self, req: &AssignSupportRequest) -> Result<ActionResponse> {
        self.send_json(reqwest::Method::PUT, paths::UPDATE, req)
            .await
    }

    // ── Review ────────────────────────────────────────────────────────────

    pub async fn approve(&self, req: &ApproveRequest) -> Result<ActionResponse> {
        self.send_json(reqwest::Method::POST, paths::APPROVE, req)
            .await
    }

    pub async fn reject(&self, req: &RejectRequest) -> Result<ActionResponse> {
        self.send_json(reqwest::Method::POST, paths::REJECT, req)
            .await
    }

    pub async fn change_status(&self, req: &StatusChangeRequest) -> Result<ActionResponse> {
        self.send_json(reqwest::Method::POST, paths::STATUS, req)
            .await
    }

    // ── Agreements ────────────────────────────────────────────────────────

    pub async fn send_agreement(&self, req: &SendAgreementRequest) -> Result<ActionResponse> {
        self.send_json(reqwest::Method::POST, paths::SEND_AGREEMENT, req)
            .await
    }

    pub async fn agreement_download_url(&self, id: AgentId) -> Result<String> {
        let path = paths::AGREEMENT_DOWNLOAD;
        debug!("POST {path}");
        let resp = self
            .authorize(self.client.post(self.url(path)))
            .json(&AgreementDownloadRequest { id })
            .send()
            .await
            .inspect_err(|e| warn!("POST {path} failed: {e}"))?;
        let body: AgreementDownloadResponse = parse_response(path, resp).await?;
        Ok(body.download_url)
    }
}

/// Turn a non-2xx response into [`ClientError::Http`], best-effort parsing
/// the body for a message.
async fn check_status(path: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|body| body.summary())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    warn!("{path} returned {status}: {message}");
    Err(ClientError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Parse a 2xx JSON body.
async fn parse_response<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> Result<T> {
    let resp = check_status(path, resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Malformed(format!("{path}: {e}")))
}

/// Like [`parse_response`], but an empty 2xx body yields `T::default()`.
async fn parse_optional_response<T: DeserializeOwned + Default>(
    path: &str,
    resp: reqwest::Response,
) -> Result<T> {
    let resp = check_status(path, resp).await?;
    let bytes = resp.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Malformed(format!("{path}: {e}")))
}
