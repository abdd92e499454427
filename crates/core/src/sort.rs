use std::cmp::Ordering;
use std::str::FromStr;

use crate::agent::AgentRecord;

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id,
    FullName,
    Gender,
    Email,
    Phone,
    NationalId,
    City,
    State,
    Postcode,
    Tax,
    Bank,
    Account,
    AgentCode,
    UserType,
    UplineEmail,
    ReferredBy,
    ApplicationStatus,
    AccountStatus,
    SalesSupportName,
    CreatedAt,
    UpdatedAt,
    ReviewedAt,
}

impl SortKey {
    pub const ALL: [Self; 22] = [
        Self::Id,
        Self::FullName,
        Self::Gender,
        Self::Email,
        Self::Phone,
        Self::NationalId,
        Self::City,
        Self::State,
        Self::Postcode,
        Self::Tax,
        Self::Bank,
        Self::Account,
        Self::AgentCode,
        Self::UserType,
        Self::UplineEmail,
        Self::ReferredBy,
        Self::ApplicationStatus,
        Self::AccountStatus,
        Self::SalesSupportName,
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::ReviewedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FullName => "full_name",
            Self::Gender => "gender",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::NationalId => "national_id",
            Self::City => "city",
            Self::State => "state",
            Self::Postcode => "postcode",
            Self::Tax => "tax",
            Self::Bank => "bank",
            Self::Account => "account",
            Self::AgentCode => "agent_code",
            Self::UserType => "user_type",
            Self::UplineEmail => "upline_email",
            Self::ReferredBy => "referred_by",
            Self::ApplicationStatus => "application_status",
            Self::AccountStatus => "account_status",
            Self::SalesSupportName => "sales_support_name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::ReviewedAt => "reviewed_at",
        }
    }

    fn value(&self, record: &AgentRecord) -> SortValue {
        let text = |v: &Option<String>| SortValue::Text(v.as_deref().unwrap_or("").to_lowercase());
        match self {
            Self::Id => SortValue::Number(record.id.0),
            Self::FullName => text(&record.full_name),
            Self::Gender => SortValue::Text(
                record.gender.map(|g| g.as_str()).unwrap_or("").to_string(),
            ),
            Self::Email => text(&record.email),
            Self::Phone => text(&record.phone),
            Self::NationalId => text(&record.national_id),
            Self::City => text(&record.city),
            Self::State => text(&record.state),
            Self::Postcode => text(&record.postcode),
            Self::Tax => text(&record.tax),
            Self::Bank => text(&record.bank),
            Self::Account => text(&record.account),
            Self::AgentCode => text(&record.agent_code),
            Self::UserType => text(&record.user_type),
            Self::UplineEmail => text(&record.upline_email),
            Self::ReferredBy => text(&record.referred_by),
            Self::ApplicationStatus => {
                SortValue::Text(record.application_status.as_str().to_string())
            }
            Self::AccountStatus => SortValue::Text(
                record
                    .account_status
                    .map(|s| s.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            Self::SalesSupportName => text(&record.sales_support_name),
            Self::CreatedAt => text(&record.created_at),
            Self::UpdatedAt => text(&record.updated_at),
            Self::ReviewedAt => text(&record.reviewed_at),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("not a sortable column: {s:?}"))
    }
}

/// Normalized comparison value. Absent values are the empty string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// At most one active sort column. `key == None` keeps store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortDirective {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn by(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Column-header click: the active ascending key flips to descending,
    /// anything else becomes ascending on `key`.
    pub fn toggle(&mut self, key: SortKey) {
        let direction = if self.key == Some(key) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        *self = Self::by(key, direction);
    }

    pub fn compare(&self, lhs: &AgentRecord, rhs: &AgentRecord) -> Ordering {
        match self.key {
            None => Ordering::Equal,
            Some(key) => self.direction.apply(key.value(lhs).cmp(&key.value(rhs))),
        }
    }
}
