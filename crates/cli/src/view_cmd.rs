use std::path::PathBuf;

use agentdesk_core::{AgentId, FilterKey, SortKey};
use agentdesk_dashboard::Dashboard;
use agentdesk_runtime_config::DashboardConfig;
use anyhow::{Context, Result, anyhow};
use chrono::Utc;

use crate::output;
use crate::session::Session;

/// Search, filter and sort options shared by `list` and `export`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ViewArgs {
    /// Start from a named view preset (see `agentdesk views`)
    #[arg(long)]
    pub view: Option<String>,

    /// Free-text search over name, email, agent code, national id, phone
    /// and sales support
    #[arg(long, short)]
    pub search: Option<String>,

    /// Filter as key=value (repeatable), e.g. application_status=pending
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Sort column (repeatable; the same key twice sorts descending)
    #[arg(long = "sort", value_name = "KEY")]
    pub sorts: Vec<String>,
}

fn parse_filter(raw: &str) -> Result<(FilterKey, &str)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("filter must be KEY=VALUE, got {raw:?}"))?;
    let key: FilterKey = key.trim().parse()?;
    Ok((key, value.trim()))
}

impl ViewArgs {
    /// Preset first (it clears search), then filters, search and sorts.
    pub fn apply(&self, dashboard: &mut Dashboard) -> Result<()> {
        if let Some(view) = &self.view {
            dashboard.apply_preset(view)?;
        }
        for raw in &self.filters {
            let (key, value) = parse_filter(raw)?;
            dashboard.set_filter(key, value)?;
        }
        if let Some(search) = &self.search {
            dashboard.set_search(search.clone());
        }
        for raw in &self.sorts {
            let key: SortKey = raw.parse().map_err(|e: String| anyhow!(e))?;
            dashboard.toggle_sort(key);
        }
        Ok(())
    }
}

pub async fn run_list(config: &DashboardConfig, args: &ViewArgs, json: bool) -> Result<()> {
    let mut session = Session::open(config).await?;
    args.apply(&mut session.dashboard)?;
    let view = session.dashboard.visible();
    if json {
        println!("{}", output::render_json(&view)?);
    } else {
        println!("{}", output::render_table(&view));
    }
    Ok(())
}

pub async fn run_views(config: &DashboardConfig) -> Result<()> {
    let session = Session::open(config).await?;
    let counts = session.dashboard.preset_counts();
    println!(
        "{}",
        output::render_views(&counts, session.dashboard.current_view())
    );

    let choices = [
        FilterKey::UserType,
        FilterKey::Territory,
        FilterKey::Tier,
        FilterKey::CertificationLevel,
    ]
    .into_iter()
    .map(|key| (key, session.dashboard.filter_choices(key)))
    .filter(|(_, values)| !values.is_empty())
    .collect::<Vec<_>>();
    if !choices.is_empty() {
        println!();
        for (key, values) in choices {
            println!("{}: {}", key.as_str(), values.join(", "));
        }
    }
    Ok(())
}

pub async fn run_show(config: &DashboardConfig, id: AgentId, json: bool) -> Result<()> {
    let session = Session::open(config).await?;
    let record = session
        .dashboard
        .store()
        .get(id)
        .ok_or_else(|| anyhow!("agent #{id} not found"))?;
    if json {
        println!("{}", output::render_json(&[record])?);
    } else {
        println!("{}", output::render_detail(record));
    }
    Ok(())
}

pub async fn run_export(config: &DashboardConfig, args: &ViewArgs, out: PathBuf) -> Result<()> {
    let mut session = Session::open(config).await?;
    args.apply(&mut session.dashboard)?;
    let (filename, csv) = session.dashboard.export_csv(Utc::now())?;
    std::fs::create_dir_all(&out)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    let path = out.join(filename);
    std::fs::write(&path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Exported {} record(s) to {}", session.dashboard.visible().len(), path.display());
    Ok(())
}
