use std::collections::HashMap;

use agentdesk_core::export::{export_filename, render_csv};
use agentdesk_core::{
    ALL_PRESET, AgentId, AgentRecord, FilterKey, PresetCount, PresetRegistry, SortKey,
    SupportMember, ViewQuery, distinct_values, evaluate,
};
use agentdesk_runtime_config::DashboardConfig;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::backend::AdminBackend;
use crate::error::{ActionError, ViewError};
use crate::modal::ActiveModal;
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// The last user-visible outcome, shown until replaced or cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Knobs the coordinator reads; usually derived from `agentdesk.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    /// Sent as `reviewed_by` / `updated_by` / `sent_by`.
    pub reviewer: String,
    pub guard_in_flight: bool,
    pub max_document_bytes: u64,
    pub approve_notes: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for DashboardSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            reviewer: config.reviewer.name.clone(),
            guard_in_flight: config.actions.guard_in_flight,
            max_document_bytes: config.actions.max_document_bytes,
            approve_notes: config.actions.approve_notes.clone(),
        }
    }
}

/// All client-side state of the review dashboard.
///
/// The visible list is never stored; [`Dashboard::visible`] recomputes it
/// from the store and the current query on every call.
#[derive(Debug)]
pub struct Dashboard {
    pub(crate) store: RecordStore,
    pub(crate) roster: Vec<SupportMember>,
    pub(crate) presets: PresetRegistry,
    pub(crate) query: ViewQuery,
    pub(crate) current_view: String,
    pub(crate) modal: ActiveModal,
    pub(crate) notice: Option<Notice>,
    pub(crate) in_flight: HashMap<AgentId, usize>,
    pub(crate) settings: DashboardSettings,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardSettings::default())
    }
}

impl Dashboard {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            store: RecordStore::default(),
            roster: Vec::new(),
            presets: PresetRegistry::default(),
            query: ViewQuery::default(),
            current_view: ALL_PRESET.to_string(),
            modal: ActiveModal::None,
            notice: None,
            in_flight: HashMap::new(),
            settings,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn roster(&self) -> &[SupportMember] {
        &self.roster
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn current_view(&self) -> &str {
        &self.current_view
    }

    pub fn modal(&self) -> &ActiveModal {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ActiveModal {
        &mut self.modal
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn is_in_flight(&self, id: AgentId) -> bool {
        self.in_flight.get(&id).is_some_and(|n| *n > 0)
    }

    // ── Notices ───────────────────────────────────────────────────────

    pub fn flash_success(&mut self, msg: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Success,
            message: msg.into(),
        });
    }

    pub fn flash_error(&mut self, msg: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            message: msg.into(),
        });
    }

    pub fn flash_info(&mut self, msg: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            message: msg.into(),
        });
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // ── Loading ───────────────────────────────────────────────────────

    /// Replace the store wholesale with a fetched list.
    pub fn load_records(&mut self, records: Vec<AgentRecord>) {
        let dropped = self.store.replace(records);
        if dropped > 0 {
            warn!("Ignored {dropped} duplicate agent record(s)");
        }
    }

    /// Replace the support roster and regenerate the per-member presets.
    pub fn set_roster(&mut self, roster: Vec<SupportMember>) {
        self.presets = PresetRegistry::new(&roster);
        self.roster = roster;
    }

    /// Fetch roster and records. A roster failure keeps the previous roster;
    /// a record failure leaves the store untouched.
    pub async fn reload<B: AdminBackend>(&mut self, backend: &B) -> Result<usize, ActionError> {
        match backend.fetch_roster().await {
            Ok(roster) => self.set_roster(roster),
            Err(e) => warn!("Failed to fetch sales support roster: {e}"),
        }

        match backend.fetch_agents().await {
            Ok(records) => {
                self.load_records(records);
                info!("Loaded {} agent record(s)", self.store.len());
                Ok(self.store.len())
            }
            Err(e) => {
                self.flash_error(format!("Failed to fetch agents data: {e}"));
                Err(e.into())
            }
        }
    }

    /// Presigned download link for a record's agreement. Never mutates.
    pub async fn agreement_url<B: AdminBackend>(
        &self,
        backend: &B,
        id: AgentId,
    ) -> Result<String, ActionError> {
        if !self.store.contains(id) {
            return Err(ActionError::UnknownAgent(id));
        }
        Ok(backend.agreement_url(id).await?)
    }

    // ── View ──────────────────────────────────────────────────────────

    /// Filtered, sorted view. "Now" is read once per call.
    pub fn visible(&self) -> Vec<&AgentRecord> {
        self.visible_at(Utc::now())
    }

    pub fn visible_at(&self, now: DateTime<Utc>) -> Vec<&AgentRecord> {
        evaluate(self.store.records(), &self.query, now)
    }

    /// Per-preset counts over the full store.
    pub fn preset_counts(&self) -> Vec<PresetCount> {
        self.presets.counts(self.store.records(), Utc::now())
    }

    /// Replace the filter set with the preset's, clear search, keep sort.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), ViewError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| ViewError::UnknownPreset(name.to_string()))?;
        self.query.filters = preset.resolve();
        self.query.search.clear();
        self.current_view = preset.name.clone();
        Ok(())
    }

    /// Back to "all records, no search, no sort".
    pub fn reset(&mut self) {
        self.query = ViewQuery::default();
        self.current_view = ALL_PRESET.to_string();
    }

    /// Values present in the store for a filter key, for choice lists.
    pub fn filter_choices(&self, key: FilterKey) -> Vec<String> {
        distinct_values(self.store.records(), key)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search = term.into();
    }

    /// Set one filter key; an empty value clears it.
    pub fn set_filter(&mut self, key: FilterKey, value: &str) -> Result<(), ViewError> {
        self.query.filters.set(key, value)?;
        Ok(())
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.query.sort.toggle(key);
    }

    /// CSV of the current view plus its download filename.
    pub fn export_csv(&self, now: DateTime<Utc>) -> Result<(String, String), ViewError> {
        let view = self.visible_at(now);
        if view.is_empty() {
            return Err(ViewError::NothingToExport);
        }
        Ok((export_filename(now.date_naive()), render_csv(&view)))
    }
}
