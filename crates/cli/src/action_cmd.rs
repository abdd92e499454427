use std::path::Path;

use agentdesk_core::{AccountStatus, AgentId, EditForm, ProfileField, SupportId};
use agentdesk_dashboard::{Action, AgreementDocument};
use agentdesk_runtime_config::DashboardConfig;
use anyhow::{Context, Result, anyhow};

use crate::session::Session;

async fn run(config: &DashboardConfig, id: AgentId, action: Action) -> Result<()> {
    let mut session = Session::open(config).await?;
    let outcome = session
        .dashboard
        .perform(&session.client, id, action)
        .await?;
    session.report(outcome)
}

pub async fn run_approve(
    config: &DashboardConfig,
    id: AgentId,
    notes: Option<String>,
    document: Option<&Path>,
) -> Result<()> {
    let action = match document {
        Some(path) => {
            let document = AgreementDocument::from_path(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Action::ApproveWithDocument {
                document: Some(document),
                notes,
            }
        }
        None => Action::Approve { notes },
    };
    run(config, id, action).await
}

pub async fn run_reject(
    config: &DashboardConfig,
    id: AgentId,
    reason: String,
    notes: Option<String>,
) -> Result<()> {
    let action = Action::Reject {
        reason,
        notes: notes.unwrap_or_default(),
    };
    run(config, id, action).await
}

/// Parse `field=value` assignments against the editable profile fields.
fn parse_assignments(raw: &[String]) -> Result<Vec<(ProfileField, String)>> {
    raw.iter()
        .map(|item| {
            let (field, value) = item
                .split_once('=')
                .ok_or_else(|| anyhow!("--set expects FIELD=VALUE, got {item:?}"))?;
            let field: ProfileField = field.trim().parse().map_err(|e: String| anyhow!(e))?;
            Ok((field, value.to_string()))
        })
        .collect()
}

pub async fn run_edit(config: &DashboardConfig, id: AgentId, sets: &[String]) -> Result<()> {
    let assignments = parse_assignments(sets)?;
    if assignments.is_empty() {
        return Err(anyhow!("nothing to change; pass at least one --set FIELD=VALUE"));
    }

    let mut session = Session::open(config).await?;
    let record = session
        .dashboard
        .store()
        .get(id)
        .ok_or_else(|| anyhow!("agent #{id} not found"))?;
    let mut form = EditForm::from_record(record);
    for (field, value) in assignments {
        form.set(field, value);
    }
    if form.changed_fields(record).is_empty() {
        println!("Agent #{id} already has these values.");
        return Ok(());
    }

    let outcome = session
        .dashboard
        .perform(&session.client, id, Action::Edit { form })
        .await?;
    session.report(outcome)
}

pub async fn run_status(
    config: &DashboardConfig,
    id: AgentId,
    target: AccountStatus,
    reason: String,
) -> Result<()> {
    run(config, id, Action::ChangeStatus { target, reason }).await
}

/// `none` (or `unassigned`) clears the assignment.
pub fn parse_support(raw: &str) -> Result<Option<SupportId>> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "none" | "unassigned" => Ok(None),
        other => other.parse().map(Some).map_err(|e: String| anyhow!(e)),
    }
}

pub async fn run_assign(config: &DashboardConfig, id: AgentId, support: &str) -> Result<()> {
    let support = parse_support(support)?;
    run(config, id, Action::AssignSupport { support }).await
}

pub async fn run_send_agreement(config: &DashboardConfig, id: AgentId) -> Result<()> {
    run(config, id, Action::SendAgreement).await
}

pub async fn run_agreement_url(config: &DashboardConfig, id: AgentId) -> Result<()> {
    let session = Session::open(config).await?;
    let url = session.dashboard.agreement_url(&session.client, id).await?;
    println!("{url}");
    Ok(())
}
