use agentdesk_core::{AgentRecord, PresetCount, ProfileField};
use anyhow::{Context, Result};

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let head: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

/// One line per record, fixed columns.
pub fn render_table(records: &[&AgentRecord]) -> String {
    let mut out = format!(
        "{:>5}  {:<24}  {:<28}  {:<9}  {:<9}  {:<16}  {:<10}\n",
        "ID", "NAME", "EMAIL", "STATUS", "ACCOUNT", "SUPPORT", "CREATED"
    );
    for r in records {
        let created = r.created_at.as_deref().map(|c| c.get(..10).unwrap_or(c));
        out.push_str(&format!(
            "{:>5}  {:<24}  {:<28}  {:<9}  {:<9}  {:<16}  {:<10}\n",
            r.id,
            clip(text(&r.full_name), 24),
            clip(text(&r.email), 28),
            r.application_status,
            r.account_status.map(|s| s.as_str()).unwrap_or("-"),
            clip(text(&r.sales_support_name), 16),
            created.unwrap_or("-"),
        ));
    }
    out.push_str(&format!("{} record(s)", records.len()));
    out
}

pub fn render_json(records: &[&AgentRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize records")
}

pub fn render_views(counts: &[PresetCount], current: &str) -> String {
    counts
        .iter()
        .map(|c| {
            let marker = if c.name == current { "*" } else { " " };
            format!("{marker} {} {:<24} {:<20} {:>5}", c.icon, c.name, c.label, c.count)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every field of one record, profile first.
pub fn render_detail(r: &AgentRecord) -> String {
    let mut lines = vec![format!("Agent #{}", r.id)];
    for field in ProfileField::ALL {
        lines.push(format!(
            "  {:<16} {}",
            field.label(),
            r.profile_value(field).unwrap_or("-")
        ));
    }
    let workflow = [
        ("Application", Some(r.application_status.to_string())),
        ("Account", r.account_status.map(|s| s.to_string())),
        ("Reviewed at", r.reviewed_at.clone()),
        ("Reviewed by", r.reviewed_by.clone()),
        ("Reject reason", r.rejection_reason.clone()),
        ("Notes", r.application_notes.clone()),
        ("Sales support", r.sales_support_name.clone()),
        ("Agreement sent", Some(if r.agreement_sent { "yes" } else { "no" }.to_string())),
        ("Agreement", r.agreement_url.clone()),
        ("IC front", r.icfront_s3.clone()),
        ("IC back", r.icback_s3.clone()),
        ("Created", r.created_at.clone()),
        ("Updated", r.updated_at.clone()),
    ];
    for (label, value) in workflow {
        lines.push(format!("  {:<16} {}", label, value.as_deref().unwrap_or("-")));
    }
    lines.join("\n")
}
