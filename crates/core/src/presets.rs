//! View presets: named shortcuts to partial filter sets.
//!
//! Applying a preset replaces the whole filter set with the preset's partial
//! set (every key the preset leaves out is cleared). Counts are computed
//! against the full record store with the same predicate the engine uses.

use chrono::{DateTime, Utc};

use crate::agent::{AccountStatus, AgentRecord, ApplicationStatus, Gender, SupportMember};
use crate::filter::{DateRange, FilterSet, SupportFilter};

/// Name of the preset selected after a reset.
pub const ALL_PRESET: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPreset {
    pub name: String,
    pub label: String,
    pub icon: &'static str,
    pub filters: FilterSet,
}

impl ViewPreset {
    fn fixed(name: &str, label: &str, icon: &'static str, filters: FilterSet) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            icon,
            filters,
        }
    }

    /// The filter set in effect after applying this preset. Keys the preset
    /// leaves unset stay unconstrained, so the partial set already is its
    /// merge over the empty baseline.
    pub fn resolve(&self) -> FilterSet {
        self.filters.clone()
    }

    pub fn count(&self, records: &[AgentRecord], now: DateTime<Utc>) -> usize {
        records
            .iter()
            .filter(|record| self.filters.matches(record, now))
            .count()
    }
}

/// A preset together with its live record count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetCount {
    pub name: String,
    pub label: String,
    pub icon: &'static str,
    pub count: usize,
}

/// Ordered list of presets. Static presets come first, followed by one per
/// support-staff member; rebuild the registry when the roster changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetRegistry {
    presets: Vec<ViewPreset>,
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl PresetRegistry {
    pub fn new(roster: &[SupportMember]) -> Self {
        let status = |s: ApplicationStatus| FilterSet {
            application_status: Some(s),
            ..FilterSet::default()
        };
        let account = |s: AccountStatus| FilterSet {
            account_status: Some(s),
            ..FilterSet::default()
        };
        let gender = |g: Gender| FilterSet {
            gender: Some(g),
            ..FilterSet::default()
        };

        let mut presets = vec![
            ViewPreset::fixed(ALL_PRESET, "All Agents", "▣", FilterSet::default()),
            ViewPreset::fixed("pending", "Pending Review", "⏳", status(ApplicationStatus::Pending)),
            ViewPreset::fixed("approved", "Approved", "✓", status(ApplicationStatus::Approved)),
            ViewPreset::fixed("rejected", "Rejected", "✗", status(ApplicationStatus::Rejected)),
            ViewPreset::fixed("active", "Active Accounts", "●", account(AccountStatus::Active)),
            ViewPreset::fixed("inactive", "Inactive Accounts", "○", account(AccountStatus::Inactive)),
            ViewPreset::fixed("suspended", "Suspended Accounts", "⊘", account(AccountStatus::Suspended)),
            ViewPreset::fixed("male", "Male Agents", "♂", gender(Gender::Male)),
            ViewPreset::fixed("female", "Female Agents", "♀", gender(Gender::Female)),
            ViewPreset::fixed(
                "recent",
                "Last 7 Days",
                "📅",
                FilterSet {
                    date_range: Some(DateRange::Last7Days),
                    ..FilterSet::default()
                },
            ),
            ViewPreset::fixed(
                "unassigned",
                "Unassigned",
                "◌",
                FilterSet {
                    sales_support: Some(SupportFilter::Unassigned),
                    ..FilterSet::default()
                },
            ),
        ];

        presets.extend(roster.iter().map(|member| ViewPreset {
            name: format!("support-{}", member.id),
            label: member.name.clone(),
            icon: "👤",
            filters: FilterSet {
                sales_support: Some(SupportFilter::Member(member.id)),
                ..FilterSet::default()
            },
        }));

        Self { presets }
    }

    pub fn get(&self, name: &str) -> Option<&ViewPreset> {
        self.presets.iter().find(|preset| preset.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewPreset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn counts(&self, records: &[AgentRecord], now: DateTime<Utc>) -> Vec<PresetCount> {
        self.presets
            .iter()
            .map(|preset| PresetCount {
                name: preset.name.clone(),
                label: preset.label.clone(),
                icon: preset.icon,
                count: preset.count(records, now),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::SupportId;
    use crate::filter::FilterKey;
    use crate::testing;

    fn count_of(counts: &[PresetCount], name: &str) -> usize {
        counts
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.count)
            .unwrap_or_else(|| panic!("missing preset {name}"))
    }

    #[test]
    fn pending_scenario_counts() {
        let records = vec![
            testing::record(1, "Alice", ApplicationStatus::Pending),
            testing::record(2, "Bob", ApplicationStatus::Approved),
        ];
        let counts = PresetRegistry::default().counts(&records, Utc::now());
        assert_eq!(count_of(&counts, "pending"), 1);
        assert_eq!(count_of(&counts, ALL_PRESET), 2);
    }

    #[test]
    fn resolve_clears_keys_outside_the_preset() {
        let registry = PresetRegistry::default();
        let pending = registry.get("pending").unwrap().resolve();
        assert_eq!(
            pending.active(),
            vec![(FilterKey::ApplicationStatus, "pending".to_string())]
        );
        assert!(registry.get(ALL_PRESET).unwrap().resolve().is_empty());
    }

    #[test]
    fn roster_generates_one_preset_per_member() {
        let registry = PresetRegistry::new(&testing::support_roster());
        let base = PresetRegistry::default().len();
        assert_eq!(registry.len(), base + 2);

        let farid = registry.get("support-10").unwrap();
        assert_eq!(farid.label, "Farid");
        assert_eq!(
            farid.filters.sales_support,
            Some(SupportFilter::Member(SupportId(10)))
        );

        let counts = registry.counts(&testing::roster_records(), Utc::now());
        assert_eq!(count_of(&counts, "support-10"), 1);
        assert_eq!(count_of(&counts, "support-11"), 1);
        assert_eq!(count_of(&counts, "unassigned"), 2);
    }

    #[test]
    fn static_presets_keep_their_order() {
        let names: Vec<_> = PresetRegistry::default()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "all", "pending", "approved", "rejected", "active", "inactive", "suspended",
                "male", "female", "recent", "unassigned"
            ]
        );
    }

    #[test]
    fn all_count_equals_store_size() {
        let records = testing::roster_records();
        let counts = PresetRegistry::default().counts(&records, Utc::now());
        assert_eq!(count_of(&counts, ALL_PRESET), records.len());
        assert_eq!(count_of(&counts, "male"), 2);
        assert_eq!(count_of(&counts, "active"), 1);
    }

    #[test]
    fn recent_count_includes_the_exact_cutoff_instant() {
        use chrono::{Duration, TimeZone};

        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let cutoff = now - Duration::days(7);
        let stamp = |id, at: DateTime<Utc>| {
            let mut rec = testing::record(id, "Agent", ApplicationStatus::Pending);
            rec.created_at = Some(at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true));
            rec
        };
        let records = vec![
            stamp(1, cutoff),
            stamp(2, cutoff - Duration::milliseconds(1)),
            stamp(3, cutoff + Duration::milliseconds(1)),
            stamp(4, now),
        ];

        let counts = PresetRegistry::default().counts(&records, now);
        assert_eq!(count_of(&counts, "recent"), 3);
        let recent = PresetRegistry::default().get("recent").unwrap().resolve();
        assert!(recent.matches(&records[0], now));
        assert!(!recent.matches(&records[1], now));
    }
}
