mod action_cmd;
mod config;
mod output;
mod review;
mod session;
mod view_cmd;

use agentdesk_core::{AccountStatus, AgentId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::view_cmd::ViewArgs;

#[derive(Parser)]
#[command(name = "agentdesk", about = "agentdesk - review and manage agent onboarding")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List agent records matching the given view, filters and search
    List {
        #[command(flatten)]
        view: ViewArgs,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show view presets with their record counts
    Views,

    /// Show every field of one record
    Show {
        id: AgentId,

        #[arg(long)]
        json: bool,
    },

    /// Approve an application, optionally uploading a signed agreement PDF
    Approve {
        id: AgentId,

        #[arg(long)]
        notes: Option<String>,

        /// Agreement PDF to attach
        #[arg(long)]
        document: Option<PathBuf>,
    },

    /// Reject an application
    Reject {
        id: AgentId,

        /// One of the fixed rejection reasons
        #[arg(long)]
        reason: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Edit profile fields
    Edit {
        id: AgentId,

        /// FIELD=VALUE, repeatable (e.g. --set city=Ipoh)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        sets: Vec<String>,
    },

    /// Change account status (active, inactive, suspended)
    Status {
        id: AgentId,

        status: AccountStatus,

        /// Justification, required
        #[arg(long)]
        reason: String,
    },

    /// Assign a sales support member, or `none` to unassign
    Assign { id: AgentId, support: String },

    /// Send the agreement to an agent
    SendAgreement { id: AgentId },

    /// Print a download link for an agent's agreement
    AgreementUrl { id: AgentId },

    /// Export the filtered view to CSV
    Export {
        #[command(flatten)]
        view: ViewArgs,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Walk through pending applications interactively
    Review,

    /// Show or set configuration
    Config {
        /// Set the server URL
        #[arg(long)]
        server: Option<String>,

        /// Set the API key
        #[arg(long)]
        api_key: Option<String>,

        /// Request timeout in seconds (0 = transport default)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Name recorded as reviewer on actions
        #[arg(long)]
        reviewer: Option<String>,

        /// Refuse a second action on a record while one is pending
        #[arg(long)]
        guard_in_flight: Option<bool>,

        /// Largest agreement upload accepted, in bytes
        #[arg(long)]
        max_document_bytes: Option<u64>,

        /// Notes sent with a plain approve
        #[arg(long)]
        approve_notes: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    if let Commands::Config {
        server,
        api_key,
        timeout_secs,
        reviewer,
        guard_in_flight,
        max_document_bytes,
        approve_notes,
    } = command
    {
        let update = config::ConfigUpdate {
            server,
            api_key,
            timeout_secs,
            reviewer,
            guard_in_flight,
            max_document_bytes,
            approve_notes,
        };
        return if update.is_empty() {
            config::show_config()
        } else {
            config::set_config(update)
        };
    }

    let cfg = config::load_config()?;
    match command {
        Commands::List { view, json } => view_cmd::run_list(&cfg, &view, json).await,
        Commands::Views => view_cmd::run_views(&cfg).await,
        Commands::Show { id, json } => view_cmd::run_show(&cfg, id, json).await,
        Commands::Approve {
            id,
            notes,
            document,
        } => action_cmd::run_approve(&cfg, id, notes, document.as_deref()).await,
        Commands::Reject { id, reason, notes } => {
            action_cmd::run_reject(&cfg, id, reason, notes).await
        }
        Commands::Edit { id, sets } => action_cmd::run_edit(&cfg, id, &sets).await,
        Commands::Status { id, status, reason } => {
            action_cmd::run_status(&cfg, id, status, reason).await
        }
        Commands::Assign { id, support } => action_cmd::run_assign(&cfg, id, &support).await,
        Commands::SendAgreement { id } => action_cmd::run_send_agreement(&cfg, id).await,
        Commands::AgreementUrl { id } => action_cmd::run_agreement_url(&cfg, id).await,
        Commands::Export { view, out } => view_cmd::run_export(&cfg, &view, out).await,
        Commands::Review => review::run_review(&cfg).await,
        Commands::Config { .. } => Ok(()),
    }
}
