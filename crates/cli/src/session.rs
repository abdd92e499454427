use agentdesk_api_client::ApiClient;
use agentdesk_dashboard::{ActionOutcome, Dashboard, DashboardSettings, NoticeLevel};
use agentdesk_runtime_config::DashboardConfig;
use anyhow::{Context, Result, bail};

/// HTTP client for the configured server.
pub fn make_client(config: &DashboardConfig) -> Result<ApiClient> {
    let mut client = ApiClient::new(&config.server.url, config.server.timeout())
        .context("Failed to create HTTP client")?;
    client.set_auth(config.server.api_key.clone());
    Ok(client)
}

/// A connected dashboard with the roster and records loaded.
pub struct Session {
    pub client: ApiClient,
    pub dashboard: Dashboard,
}

impl Session {
    pub async fn open(config: &DashboardConfig) -> Result<Self> {
        let client = make_client(config)?;
        let mut dashboard = Dashboard::new(DashboardSettings::from(config));
        dashboard
            .reload(&client)
            .await
            .with_context(|| format!("Failed to fetch agents from {}", client.base_url()))?;
        Ok(Self { client, dashboard })
    }

    /// Print the dashboard notice; a rolled-back action becomes an error.
    pub fn report(&mut self, outcome: ActionOutcome) -> Result<()> {
        let notice = self.dashboard.notice().cloned();
        self.dashboard.clear_notice();
        match (outcome, notice) {
            (ActionOutcome::Succeeded(_), Some(notice)) => {
                println!("{}", notice.message);
                Ok(())
            }
            (ActionOutcome::Succeeded(_), None) => Ok(()),
            (ActionOutcome::RolledBack { .. }, Some(notice))
                if notice.level == NoticeLevel::Error =>
            {
                bail!("{}", notice.message)
            }
            (ActionOutcome::RolledBack { error, .. }, _) => Err(error.into()),
        }
    }
}
