//! Interactive walk through pending applications.

use agentdesk_core::{AgentId, REJECTION_REASONS};
use agentdesk_dashboard::Action;
use agentdesk_runtime_config::DashboardConfig;
use anyhow::{Context, Result};
use dialoguer::{Input, Select};

use crate::output;
use crate::session::Session;

const CHOICES: [&str; 4] = ["Approve", "Reject", "Skip", "Quit"];

fn prompt_reject() -> Result<Option<Action>> {
    let mut items: Vec<&str> = REJECTION_REASONS.to_vec();
    items.push("(cancel)");
    let picked = Select::new()
        .with_prompt("Rejection reason")
        .items(&items)
        .default(0)
        .interact()
        .context("failed to select rejection reason")?;
    let Some(reason) = REJECTION_REASONS.get(picked) else {
        return Ok(None);
    };
    let notes: String = Input::new()
        .with_prompt("Notes (optional)")
        .allow_empty(true)
        .interact_text()
        .context("failed to read notes")?;
    Ok(Some(Action::Reject {
        reason: reason.to_string(),
        notes,
    }))
}

pub async fn run_review(config: &DashboardConfig) -> Result<()> {
    let mut session = Session::open(config).await?;
    session.dashboard.apply_preset("pending")?;
    let queue: Vec<AgentId> = session.dashboard.visible().iter().map(|r| r.id).collect();
    if queue.is_empty() {
        println!("No pending applications.");
        return Ok(());
    }

    let total = queue.len();
    let mut reviewed = 0usize;
    for (index, id) in queue.into_iter().enumerate() {
        let Some(record) = session.dashboard.store().get(id) else {
            continue;
        };
        println!();
        println!("[{}/{total}] {}", index + 1, output::render_detail(record));

        let choice = Select::new()
            .with_prompt("Decision")
            .items(&CHOICES)
            .default(2)
            .interact()
            .context("failed to read decision")?;
        let action = match CHOICES[choice] {
            "Approve" => Action::Approve { notes: None },
            "Reject" => match prompt_reject()? {
                Some(action) => action,
                None => continue,
            },
            "Quit" => break,
            _ => continue,
        };

        let outcome = session.dashboard.perform(&session.client, id, action).await?;
        // A failed action is reported and the walk continues.
        match session.report(outcome) {
            Ok(()) => reviewed += 1,
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }

    println!();
    println!("Reviewed {reviewed} of {total} pending application(s).");
    Ok(())
}
