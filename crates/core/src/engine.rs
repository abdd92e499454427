//! Filter/Sort engine.
//!
//! [`evaluate`] is a pure function of its inputs: it never mutates the record
//! slice and holds no state between calls. Callers re-run it whenever the
//! store, search term, filters or sort change.

use chrono::{DateTime, Utc};

use crate::agent::AgentRecord;
use crate::filter::{FilterKey, FilterSet};
use crate::sort::SortDirective;

/// Everything that shapes the visible list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub filters: FilterSet,
    pub sort: SortDirective,
}

impl ViewQuery {
    /// True when the query imposes nothing and keeps store order.
    pub fn is_baseline(&self) -> bool {
        self == &Self::default()
    }
}

/// Case-insensitive substring search over the fixed searchable fields.
/// An empty term matches every record.
pub fn matches_search(record: &AgentRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [
        &record.full_name,
        &record.email,
        &record.agent_code,
        &record.national_id,
        &record.phone,
        &record.sales_support_name,
    ]
    .into_iter()
    .filter_map(|field| field.as_deref())
    .any(|value| value.to_lowercase().contains(&needle))
}

/// Produce the ordered, filtered view of `records`.
///
/// Without a sort key the store order is preserved. The sort itself is
/// stable, so ties also keep store order.
pub fn evaluate<'a>(
    records: &'a [AgentRecord],
    query: &ViewQuery,
    now: DateTime<Utc>,
) -> Vec<&'a AgentRecord> {
    let mut view: Vec<&AgentRecord> = records
        .iter()
        .filter(|record| matches_search(record, &query.search))
        .filter(|record| query.filters.matches(record, now))
        .collect();

    if query.sort.key.is_some() {
        view.sort_by(|lhs, rhs| query.sort.compare(lhs, rhs));
    }
    view
}

/// Sorted, de-duplicated, non-empty values of a free-text filter field, for
/// populating filter choices. Enum-valued keys yield their fixed variants.
pub fn distinct_values(records: &[AgentRecord], key: FilterKey) -> Vec<String> {
    let pick = |record: &AgentRecord| -> Option<String> {
        match key {
            FilterKey::ApplicationStatus => Some(record.application_status.to_string()),
            FilterKey::AccountStatus => record.account_status.map(|s| s.to_string()),
            FilterKey::Gender => record.gender.map(|g| g.to_string()),
            FilterKey::UserType => record.user_type.clone(),
            FilterKey::SalesSupportId => record.sales_support_id.map(|id| id.to_string()),
            FilterKey::DateRange => None,
            FilterKey::Territory => record.territory.clone(),
            FilterKey::Tier => record.tier.clone(),
            FilterKey::CertificationLevel => record.certification_level.clone(),
        }
    };
    let mut values: Vec<String> = records.iter().filter_map(pick).collect();
    values.sort();
    values.dedup();
    values
}
