//! Request/response types for the agentdesk admin API.
//!
//! This crate is the single source of truth for the JSON contracts the
//! dashboard exchanges with the backend. Field names match the wire format.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

// Re-export the record model for convenience
pub use agentdesk_core::{
    AccountStatus, AgentId, AgentRecord, ApplicationStatus, EditForm, Gender, ProfileField,
    SupportId, SupportMember, records_from_values,
};

// ─── Paths ───────────────────────────────────────────────────────────────────

pub mod paths {
    pub const AGENTS: &str = "/admin/agents";
    pub const SALES_SUPPORT: &str = "/admin/sales-support";
    pub const UPDATE: &str = "/admin/agents/update";
    pub const APPROVE: &str = "/admin/agents/approve";
    pub const REJECT: &str = "/admin/agents/reject";
    pub const STATUS: &str = "/admin/agents/status";
    pub const SEND_AGREEMENT: &str = "/admin/agents/send-agreement";
    pub const AGREEMENT_DOWNLOAD: &str = "/admin/agents/agreement-download";
}

// ─── Profile updates ─────────────────────────────────────────────────────────

/// `PUT /admin/agents/update` with the full editable profile.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpdateAgentRequest {
    pub id: AgentId,
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, String>,
    pub updated_by: String,
}

impl UpdateAgentRequest {
    pub fn from_form(id: AgentId, form: &EditForm, updated_by: &str) -> Self {
        Self {
            id,
            fields: form
                .iter()
                .map(|(field, value)| (field.key(), value.to_string()))
                .collect(),
            updated_by: updated_by.to_string(),
        }
    }
}

/// Assignment goes through the profile update endpoint. `None` unassigns
/// (serialized as `null`).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssignSupportRequest {
    pub id: AgentId,
    pub sales_support_id: Option<SupportId>,
    pub updated_by: String,
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// `POST /admin/agents/approve`. The agreement fields are only present for
/// approve-with-document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApproveRequest {
    pub id: AgentId,
    pub reviewed_by: String,
    pub application_notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement_pdf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement_filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RejectRequest {
    pub id: AgentId,
    pub reviewed_by: String,
    pub rejection_reason: String,
    pub application_notes: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusChangeRequest {
    pub id: AgentId,
    pub status: AccountStatus,
    pub reason: String,
    pub updated_by: String,
}

// ─── Agreements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendAgreementRequest {
    pub id: AgentId,
    pub sent_by: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AgreementDownloadRequest {
    pub id: AgentId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgreementDownloadResponse {
    pub download_url: String,
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// Success body shared by every state-changing endpoint. All fields are
/// optional; `agent` carries the authoritative record when the backend
/// returns one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionResponse {
    #[serde(default, deserialize_with = "lenient_record")]
    pub agent: Option<AgentRecord>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// An `agent` payload that does not parse as a record is treated as absent:
/// the action still succeeded, there is just nothing to reconcile against.
fn lenient_record<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AgentRecord>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Best-effort shape of a non-2xx body.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "error_entries")]
    pub errors: Vec<String>,
}

/// Validation errors may be strings, objects, or a single value instead of a
/// list. Strings are kept as is; anything else is rendered as compact JSON.
fn error_entries<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let render = |value: serde_json::Value| match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(render)
            .collect(),
        other => vec![render(other)],
    })
}

impl ApiErrorBody {
    /// Human-readable message: `message`, else `error`, with any validation
    /// errors appended. `None` when the body carries nothing usable.
    pub fn summary(&self) -> Option<String> {
        let head = self
            .message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string);
        match (head, self.errors.is_empty()) {
            (None, true) => None,
            (head, true) => head,
            (head, false) => Some(format!(
                "{}\nValidation errors: {}",
                head.unwrap_or_else(|| "Request failed".to_string()),
                self.errors.join(", ")
            )),
        }
    }
}
