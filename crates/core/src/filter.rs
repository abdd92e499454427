//! Filter Set: the structured equality/range constraints over agent records.
//!
//! Every key is either unset ("no constraint") or holds a typed value. The
//! search term is deliberately not part of the set; see [`crate::ViewQuery`].

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::agent::{AccountStatus, AgentRecord, ApplicationStatus, Gender, SupportId};
use crate::validate::ValidationError;

/// Keys of the fixed filter enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    ApplicationStatus,
    AccountStatus,
    Gender,
    UserType,
    SalesSupportId,
    DateRange,
    Territory,
    Tier,
    CertificationLevel,
}

impl FilterKey {
    pub const ALL: [Self; 9] = [
        Self::ApplicationStatus,
        Self::AccountStatus,
        Self::Gender,
        Self::UserType,
        Self::SalesSupportId,
        Self::DateRange,
        Self::Territory,
        Self::Tier,
        Self::CertificationLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationStatus => "application_status",
            Self::AccountStatus => "account_status",
            Self::Gender => "gender",
            Self::UserType => "user_type",
            Self::SalesSupportId => "sales_support_id",
            Self::DateRange => "date_range",
            Self::Territory => "territory",
            Self::Tier => "tier",
            Self::CertificationLevel => "certification_level",
        }
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| ValidationError::InvalidFilter {
                key: s.to_string(),
                reason: "unknown filter key".to_string(),
            })
    }
}

/// Relative created-at window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Last7Days,
    Last30Days,
    Last90Days,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last7Days => "7days",
            Self::Last30Days => "30days",
            Self::Last90Days => "90days",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::Last90Days => 90,
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7days" => Ok(Self::Last7Days),
            "30days" => Ok(Self::Last30Days),
            "90days" => Ok(Self::Last90Days),
            other => Err(format!("unknown date range: {other:?}")),
        }
    }
}

/// Sales-support constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportFilter {
    /// Records with no support member assigned.
    Unassigned,
    Member(SupportId),
}

impl SupportFilter {
    pub fn as_string(&self) -> String {
        match self {
            Self::Unassigned => "unassigned".to_string(),
            Self::Member(id) => id.to_string(),
        }
    }
}

impl FromStr for SupportFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("unassigned") {
            Ok(Self::Unassigned)
        } else {
            s.parse().map(Self::Member)
        }
    }
}

/// The current combination of filter constraints. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub application_status: Option<ApplicationStatus>,
    pub account_status: Option<AccountStatus>,
    pub gender: Option<Gender>,
    pub user_type: Option<String>,
    pub sales_support: Option<SupportFilter>,
    pub date_range: Option<DateRange>,
    pub territory: Option<String>,
    pub tier: Option<String>,
    pub certification_level: Option<String>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Set a key from its wire value. An empty value clears the key.
    pub fn set(&mut self, key: FilterKey, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            self.clear(key);
            return Ok(());
        }
        let invalid = |reason: String| ValidationError::InvalidFilter {
            key: key.as_str().to_string(),
            reason,
        };
        match key {
            FilterKey::ApplicationStatus => {
                self.application_status = Some(value.parse().map_err(invalid)?)
            }
            FilterKey::AccountStatus => self.account_status = Some(value.parse().map_err(invalid)?),
            FilterKey::Gender => self.gender = Some(value.parse().map_err(invalid)?),
            FilterKey::SalesSupportId => self.sales_support = Some(value.parse().map_err(invalid)?),
            FilterKey::DateRange => self.date_range = Some(value.parse().map_err(invalid)?),
            FilterKey::UserType => self.user_type = Some(value.to_string()),
            FilterKey::Territory => self.territory = Some(value.to_string()),
            FilterKey::Tier => self.tier = Some(value.to_string()),
            FilterKey::CertificationLevel => self.certification_level = Some(value.to_string()),
        }
        Ok(())
    }

    /// Builder-style [`FilterSet::set`], for statically known values.
    pub fn with(mut self, key: FilterKey, value: &str) -> Result<Self, ValidationError> {
        self.set(key, value)?;
        Ok(self)
    }

    pub fn clear(&mut self, key: FilterKey) {
        match key {
            FilterKey::ApplicationStatus => self.application_status = None,
            FilterKey::AccountStatus => self.account_status = None,
            FilterKey::Gender => self.gender = None,
            FilterKey::UserType => self.user_type = None,
            FilterKey::SalesSupportId => self.sales_support = None,
            FilterKey::DateRange => self.date_range = None,
            FilterKey::Territory => self.territory = None,
            FilterKey::Tier => self.tier = None,
            FilterKey::CertificationLevel => self.certification_level = None,
        }
    }

    /// Wire value of a key, or `None` when unconstrained.
    pub fn get(&self, key: FilterKey) -> Option<String> {
        match key {
            FilterKey::ApplicationStatus => self.application_status.map(|v| v.to_string()),
            FilterKey::AccountStatus => self.account_status.map(|v| v.to_string()),
            FilterKey::Gender => self.gender.map(|v| v.to_string()),
            FilterKey::UserType => self.user_type.clone(),
            FilterKey::SalesSupportId => self.sales_support.map(|v| v.as_string()),
            FilterKey::DateRange => self.date_range.map(|v| v.as_str().to_string()),
            FilterKey::Territory => self.territory.clone(),
            FilterKey::Tier => self.tier.clone(),
            FilterKey::CertificationLevel => self.certification_level.clone(),
        }
    }

    /// Active `(key, value)` pairs in enumeration order.
    pub fn active(&self) -> Vec<(FilterKey, String)> {
        FilterKey::ALL
            .iter()
            .filter_map(|key| self.get(*key).map(|value| (*key, value)))
            .collect()
    }

    /// Whether a record satisfies every active constraint. `now` anchors the
    /// date-range cutoff.
    pub fn matches(&self, record: &AgentRecord, now: DateTime<Utc>) -> bool {
        if let Some(status) = self.application_status {
            if record.application_status != status {
                return false;
            }
        }
        if let Some(status) = self.account_status {
            if record.account_status != Some(status) {
                return false;
            }
        }
        if let Some(gender) = self.gender {
            if record.gender != Some(gender) {
                return false;
            }
        }
        if !text_eq(self.user_type.as_deref(), record.user_type.as_deref())
            || !text_eq(self.territory.as_deref(), record.territory.as_deref())
            || !text_eq(self.tier.as_deref(), record.tier.as_deref())
            || !text_eq(
                self.certification_level.as_deref(),
                record.certification_level.as_deref(),
            )
        {
            return false;
        }
        match self.sales_support {
            None => {}
            Some(SupportFilter::Unassigned) => {
                if record.sales_support_id.is_some() {
                    return false;
                }
            }
            Some(SupportFilter::Member(id)) => {
                if record.sales_support_id != Some(id) {
                    return false;
                }
            }
        }
        if let Some(range) = self.date_range {
            let cutoff = range.cutoff(now);
            match record.created_at.as_deref().and_then(parse_timestamp) {
                Some(created) if created >= cutoff => {}
                _ => return false,
            }
        }
        true
    }
}

fn text_eq(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}

/// Parse a backend timestamp. Accepts RFC 3339 and naive `YYYY-MM-DD HH:MM:SS`
/// variants (taken as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
