//! Runtime configuration types.
//!
//! The CLI reads and writes `agentdesk.toml` using these types; the dashboard
//! crate consumes the `[actions]` section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "agentdesk.toml";

pub const ENV_SERVER_URL: &str = "AGENTDESK_SERVER_URL";
pub const ENV_API_KEY: &str = "AGENTDESK_API_KEY";

/// Top-level configuration (persisted as `agentdesk.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub reviewer: ReviewerSettings,
    #[serde(default)]
    pub actions: ActionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Bearer token; empty means requests go out unauthenticated.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds. `0` keeps the transport default.
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            api_key: String::new(),
            timeout_secs: 0,
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewerSettings {
    /// Sent as `reviewed_by` / `updated_by` / `sent_by`.
    #[serde(default = "default_reviewer")]
    pub name: String,
}

impl Default for ReviewerSettings {
    fn default() -> Self {
        Self {
            name: default_reviewer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionSettings {
    /// Refuse a second action on a record while one is outstanding.
    #[serde(default = "default_true")]
    pub guard_in_flight: bool,
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
    /// Notes sent with a plain approval when none are given.
    #[serde(default = "default_approve_notes")]
    pub approve_notes: String,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            guard_in_flight: true,
            max_document_bytes: default_max_document_bytes(),
            approve_notes: default_approve_notes(),
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_server_url() -> String {
    "https://api.agentdesk.local/dev".to_string()
}
fn default_reviewer() -> String {
    "admin".to_string()
}
fn default_max_document_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_approve_notes() -> String {
    "Application approved".to_string()
}

/// Apply environment overrides on top of the loaded file.
/// Returns true when any field was updated.
pub fn apply_env_overrides(
    config: &mut DashboardConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> bool {
    let mut changed = false;

    if let Some(url) = lookup(ENV_SERVER_URL).filter(|v| !v.trim().is_empty()) {
        config.server.url = url.trim().to_string();
        changed = true;
    }

    if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        config.server.api_key = key.trim().to_string();
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.reviewer.name, "admin");
        assert!(cfg.actions.guard_in_flight);
        assert_eq!(cfg.actions.max_document_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.actions.approve_notes, "Application approved");
        assert_eq!(cfg.server.timeout(), None);
    }

    #[test]
    fn partial_toml_fills_missing_fields() {
        let cfg: DashboardConfig = toml::from_str(
            r#"
[server]
url = "https://admin.example.com/prod"
timeout_secs = 20

[actions]
guard_in_flight = false
"#,
        )
        .expect("parse toml");

        assert_eq!(cfg.server.url, "https://admin.example.com/prod");
        assert_eq!(cfg.server.timeout(), Some(Duration::from_secs(20)));
        assert!(!cfg.actions.guard_in_flight);
        assert_eq!(cfg.actions.max_document_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.reviewer, ReviewerSettings::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg: DashboardConfig = toml::from_str(
            r#"
[reviewer]
name = "ops-lead"
team = "north"
"#,
        )
        .expect("parse toml");
        assert_eq!(cfg.reviewer.name, "ops-lead");
    }

    #[test]
    fn env_overrides_replace_server_settings() {
        let mut cfg = DashboardConfig::default();
        let changed = apply_env_overrides(&mut cfg, |key| match key {
            ENV_SERVER_URL => Some(" http://localhost:3000 ".to_string()),
            ENV_API_KEY => Some(String::new()),
            _ => None,
        });
        assert!(changed);
        assert_eq!(cfg.server.url, "http://localhost:3000");
        assert!(cfg.server.api_key.is_empty());

        let before = cfg.clone();
        assert!(!apply_env_overrides(&mut cfg, |_| None));
        assert_eq!(cfg, before);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut cfg = DashboardConfig::default();
        cfg.reviewer.name = "qa".to_string();
        let encoded = toml::to_string(&cfg).expect("serialize config");
        let decoded: DashboardConfig = toml::from_str(&encoded).expect("parse config");
        assert_eq!(decoded, cfg);
    }
}
