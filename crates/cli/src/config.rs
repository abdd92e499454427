use agentdesk_runtime_config::{CONFIG_FILE_NAME, DashboardConfig, apply_env_overrides};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/agentdesk/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("agentdesk"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

fn read_config_file(path: &Path) -> Result<DashboardConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config at {}", path.display()))
}

/// The config as stored on disk, defaults when the file does not exist.
fn load_file_config() -> Result<DashboardConfig> {
    let path = config_path()?;
    if path.exists() {
        read_config_file(&path)
    } else {
        Ok(DashboardConfig::default())
    }
}

/// Effective config: file contents plus environment overrides.
pub fn load_config() -> Result<DashboardConfig> {
    let mut config = load_file_config()?;
    if apply_env_overrides(&mut config, |key| std::env::var(key).ok()) {
        tracing::debug!("Applied environment overrides to config");
    }
    Ok(config)
}

pub fn save_config(config: &DashboardConfig) -> Result<()> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;

    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    let path = config_path()?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

/// Shows at most a quarter of the key, capped at 8 characters.
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let shown = (key.chars().count() / 4).min(8);
    let prefix: String = key.chars().take(shown).collect();
    format!("{prefix}...")
}

/// Print current config.
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let path = config_path()?;
    println!("Config file: {}", path.display());
    println!();
    println!("[server]");
    println!("  url          = {}", config.server.url);
    println!("  api_key      = {}", mask_key(&config.server.api_key));
    println!(
        "  timeout_secs = {}",
        match config.server.timeout_secs {
            0 => "(transport default)".to_string(),
            secs => secs.to_string(),
        }
    );
    println!();
    println!("[reviewer]");
    println!("  name = {}", config.reviewer.name);
    println!();
    println!("[actions]");
    println!("  guard_in_flight    = {}", config.actions.guard_in_flight);
    println!("  max_document_bytes = {}", config.actions.max_document_bytes);
    println!("  approve_notes      = {}", config.actions.approve_notes);
    Ok(())
}

#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub server: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub reviewer: Option<String>,
    pub guard_in_flight: Option<bool>,
    pub max_document_bytes: Option<u64>,
    pub approve_notes: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.server.is_none()
            && self.api_key.is_none()
            && self.timeout_secs.is_none()
            && self.reviewer.is_none()
            && self.guard_in_flight.is_none()
            && self.max_document_bytes.is_none()
            && self.approve_notes.is_none()
    }

    fn apply(self, config: &mut DashboardConfig) {
        if let Some(url) = self.server {
            config.server.url = url;
        }
        if let Some(key) = self.api_key {
            config.server.api_key = key;
        }
        if let Some(secs) = self.timeout_secs {
            config.server.timeout_secs = secs;
        }
        if let Some(name) = self.reviewer {
            config.reviewer.name = name;
        }
        if let Some(guard) = self.guard_in_flight {
            config.actions.guard_in_flight = guard;
        }
        if let Some(limit) = self.max_document_bytes {
            config.actions.max_document_bytes = limit;
        }
        if let Some(notes) = self.approve_notes {
            config.actions.approve_notes = notes;
        }
    }
}

/// Update config with provided values. Environment overrides are not
/// written back.
pub fn set_config(update: ConfigUpdate) -> Result<()> {
    let mut config = load_file_config()?;
    update.apply(&mut config);
    save_config(&config)?;
    println!("Configuration updated.");
    show_config()
}
