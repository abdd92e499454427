//! Agent record model.
//!
//! Records arrive from the admin API as loosely typed JSON: ids may be numbers
//! or numeric strings, flags may be booleans or 0/1, enum columns may be empty
//! strings. Everything is normalized here, at deserialization time, so the rest
//! of the workspace only ever compares canonical values.

use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Backend-assigned agent id. Immutable and unique within a record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AgentId(pub i64);

/// Id of a sales-support staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SupportId(pub i64);

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Text(String),
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

macro_rules! id_impls {
    ($ty:ident, $what:literal) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match IdRepr::deserialize(deserializer)? {
                    IdRepr::Int(v) => Ok(Self(v)),
                    IdRepr::Text(s) => parse_id(&s)
                        .map(Self)
                        .ok_or_else(|| D::Error::custom(format!(concat!("invalid ", $what, ": {:?}"), s))),
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_id(s)
                    .map(Self)
                    .ok_or_else(|| format!(concat!("invalid ", $what, ": {:?}"), s))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_impls!(AgentId, "agent id");
id_impls!(SupportId, "support id");

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Review state of an application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Operational state of an approved agent's account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Suspended];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

macro_rules! enum_text_impls {
    ($ty:ident, $what:literal) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::variants()
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| format!(concat!("unknown ", $what, ": {:?}"), s))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

impl ApplicationStatus {
    fn variants() -> &'static [Self] {
        &Self::ALL
    }
}

impl AccountStatus {
    fn variants() -> &'static [Self] {
        &Self::ALL
    }
}

impl Gender {
    fn variants() -> &'static [Self] {
        &[Self::Male, Self::Female]
    }
}

enum_text_impls!(ApplicationStatus, "application status");
enum_text_impls!(AccountStatus, "account status");
enum_text_impls!(Gender, "gender");

// ─── Sales support roster ────────────────────────────────────────────────────

/// One entry of the sales-support roster (`GET /admin/sales-support`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupportMember {
    pub id: SupportId,
    pub name: String,
}

/// Look up the display name for a support id.
pub fn support_name(roster: &[SupportMember], id: SupportId) -> Option<&str> {
    roster
        .iter()
        .find(|member| member.id == id)
        .map(|member| member.name.as_str())
}

// ─── Agent record ────────────────────────────────────────────────────────────

/// One applicant's profile plus workflow, assignment and document state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRecord {
    pub id: AgentId,

    #[serde(default, deserialize_with = "de::text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "de::choice")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "de::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub national_id: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub addr_line2: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub postcode: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub tax: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub bank: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub account: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub agent_code: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub user_type: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub upline_email: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub referred_by: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub territory: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub tier: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub certification_level: Option<String>,

    #[serde(default, deserialize_with = "de::status_or_pending")]
    pub application_status: ApplicationStatus,
    #[serde(default, deserialize_with = "de::choice")]
    pub account_status: Option<AccountStatus>,
    #[serde(default, deserialize_with = "de::text")]
    pub reviewed_at: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub reviewed_by: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub rejection_reason: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub application_notes: Option<String>,

    #[serde(default, deserialize_with = "de::support_id")]
    pub sales_support_id: Option<SupportId>,
    #[serde(default, deserialize_with = "de::text")]
    pub sales_support_name: Option<String>,

    #[serde(default, deserialize_with = "de::flag")]
    pub agreement_sent: bool,
    #[serde(default, deserialize_with = "de::text")]
    pub agreement_url: Option<String>,

    #[serde(default, deserialize_with = "de::text")]
    pub icfront_s3: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub icback_s3: Option<String>,

    #[serde(default, deserialize_with = "de::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub updated_at: Option<String>,
}

impl AgentRecord {
    /// A record with only its id set; every other field is absent.
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            full_name: None,
            gender: None,
            email: None,
            phone: None,
            national_id: None,
            address: None,
            addr_line2: None,
            city: None,
            state: None,
            postcode: None,
            tax: None,
            bank: None,
            account: None,
            agent_code: None,
            user_type: None,
            upline_email: None,
            referred_by: None,
            territory: None,
            tier: None,
            certification_level: None,
            application_status: ApplicationStatus::Pending,
            account_status: None,
            reviewed_at: None,
            reviewed_by: None,
            rejection_reason: None,
            application_notes: None,
            sales_support_id: None,
            sales_support_name: None,
            agreement_sent: false,
            agreement_url: None,
            icfront_s3: None,
            icback_s3: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn profile_value(&self, field: ProfileField) -> Option<&str> {
        let value = match field {
            ProfileField::FullName => &self.full_name,
            ProfileField::Gender => return self.gender.map(|g| g.as_str()),
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::NationalId => &self.national_id,
            ProfileField::Address => &self.address,
            ProfileField::AddrLine2 => &self.addr_line2,
            ProfileField::City => &self.city,
            ProfileField::State => &self.state,
            ProfileField::Postcode => &self.postcode,
            ProfileField::Tax => &self.tax,
            ProfileField::Bank => &self.bank,
            ProfileField::Account => &self.account,
            ProfileField::AgentCode => &self.agent_code,
            ProfileField::UserType => &self.user_type,
            ProfileField::UplineEmail => &self.upline_email,
            ProfileField::ReferredBy => &self.referred_by,
        };
        value.as_deref()
    }

    /// Write a profile field. Empty values clear the field; an unrecognised
    /// gender clears it as well (callers validate beforehand).
    pub fn set_profile_value(&mut self, field: ProfileField, value: &str) {
        let normalized = (!value.is_empty()).then(|| value.to_string());
        let slot = match field {
            ProfileField::Gender => {
                self.gender = value.parse().ok();
                return;
            }
            ProfileField::FullName => &mut self.full_name,
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
            ProfileField::NationalId => &mut self.national_id,
            ProfileField::Address => &mut self.address,
            ProfileField::AddrLine2 => &mut self.addr_line2,
            ProfileField::City => &mut self.city,
            ProfileField::State => &mut self.state,
            ProfileField::Postcode => &mut self.postcode,
            ProfileField::Tax => &mut self.tax,
            ProfileField::Bank => &mut self.bank,
            ProfileField::Account => &mut self.account,
            ProfileField::AgentCode => &mut self.agent_code,
            ProfileField::UserType => &mut self.user_type,
            ProfileField::UplineEmail => &mut self.upline_email,
            ProfileField::ReferredBy => &mut self.referred_by,
        };
        *slot = normalized;
    }
}

// ─── Editable profile fields ─────────────────────────────────────────────────

/// Input kind of an editable field; drives validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Gender,
}

/// Profile fields an administrator may edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileField {
    FullName,
    Gender,
    Email,
    Phone,
    NationalId,
    Address,
    AddrLine2,
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
}

impl ProfileField {
    pub const ALL: [Self; 17] = [
        Self::FullName,
        Self::Gender,
        Self::Email,
        Self::Phone,
        Self::NationalId,
        Self::Address,
        Self::AddrLine2,
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
    ];

    /// Wire key, as used in JSON bodies.
    pub fn key(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Gender => "gender",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::NationalId => "national_id",
            Self::Address => "address",
            Self::AddrLine2 => "addr_line2",
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
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Gender => "Gender",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::NationalId => "National ID",
            Self::Address => "Address",
            Self::AddrLine2 => "Address Line 2",
            Self::City => "City",
            Self::State => "State",
            Self::Postcode => "Postcode",
            Self::Tax => "Tax",
            Self::Bank => "Bank",
            Self::Account => "Account",
            Self::AgentCode => "Agent Code",
            Self::UserType => "User Type",
            Self::UplineEmail => "Upline Email",
            Self::ReferredBy => "Referred By",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::Gender => FieldKind::Gender,
            Self::Email | Self::UplineEmail => FieldKind::Email,
            _ => FieldKind::Text,
        }
    }

    pub fn required(self) -> bool {
        matches!(
            self,
            Self::FullName | Self::Gender | Self::Email | Self::Phone | Self::NationalId
        )
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == s.trim())
            .ok_or_else(|| format!("not an editable field: {s:?}"))
    }
}

/// Parse a fetched agent list one entry at a time. Entries that are not a
/// record at all (missing or non-numeric id, not an object) are skipped with a
/// warning instead of failing the whole list.
pub fn records_from_values(values: Vec<serde_json::Value>) -> Vec<AgentRecord> {
    values
        .into_iter()
        .filter_map(|value| {
            serde_json::from_value(value)
                .inspect_err(|e| warn!("skipping unreadable agent record: {e}"))
                .ok()
        })
        .collect()
}

// ─── Lenient deserializers ───────────────────────────────────────────────────

mod de {
    use super::*;

    /// Null and empty strings become `None`; numbers are kept as their text.
    /// Arrays and objects are dropped with a warning.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) if s.is_empty() => None,
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
            Some(other) => {
                warn!("ignoring non-text value {other}");
                None
            }
        })
    }

    /// Unknown or non-string values become `None` with a warning, so one odd
    /// record never rejects the whole list.
    pub fn choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr<Err = String>,
    {
        Ok(match text(deserializer)? {
            None => None,
            Some(s) if s.trim().is_empty() => None,
            Some(s) => s
                .parse()
                .inspect_err(|e| warn!("ignoring {e}"))
                .ok(),
        })
    }

    pub fn status_or_pending<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ApplicationStatus, D::Error> {
        Ok(choice(deserializer)?.unwrap_or_default())
    }

    /// `null`, `0` and `""` all mean "unassigned".
    pub fn support_id<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SupportId>, D::Error> {
        match Option::<IdRepr>::deserialize(deserializer)? {
            None | Some(IdRepr::Int(0)) => Ok(None),
            Some(IdRepr::Int(v)) => Ok(Some(SupportId(v))),
            Some(IdRepr::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(IdRepr::Text(s)) => match parse_id(&s) {
                Some(0) => Ok(None),
                Some(v) => Ok(Some(SupportId(v))),
                None => {
                    warn!("ignoring invalid support id {s:?}");
                    Ok(None)
                }
            },
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagRepr {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Option::<FlagRepr>::deserialize(deserializer)? {
            None => false,
            Some(FlagRepr::Bool(b)) => b,
            Some(FlagRepr::Int(v)) => v != 0,
            Some(FlagRepr::Text(s)) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        let a: AgentRecord = serde_json::from_value(json!({ "id": 7 })).unwrap();
        let b: AgentRecord = serde_json::from_value(json!({ "id": "7" })).unwrap();
        assert_eq!(a.id, AgentId(7));
        assert_eq!(a.id, b.id);
        assert!(serde_json::from_value::<AgentRecord>(json!({ "id": "seven" })).is_err());
    }

    #[test]
    fn falsy_support_ids_mean_unassigned() {
        for raw in [json!(null), json!(0), json!(""), json!("0")] {
            let rec: AgentRecord =
                serde_json::from_value(json!({ "id": 1, "sales_support_id": raw })).unwrap();
            assert_eq!(rec.sales_support_id, None, "raw value {raw}");
        }
        let rec: AgentRecord =
            serde_json::from_value(json!({ "id": 1, "sales_support_id": "12" })).unwrap();
        assert_eq!(rec.sales_support_id, Some(SupportId(12)));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let rec: AgentRecord = serde_json::from_value(json!({
            "id": 3,
            "gender": "",
            "account_status": null,
            "agreement_sent": 1,
            "postcode": 50450,
            "unexpected": "ignored"
        }))
        .unwrap();
        assert_eq!(rec.application_status, ApplicationStatus::Pending);
        assert_eq!(rec.gender, None);
        assert_eq!(rec.account_status, None);
        assert!(rec.agreement_sent);
        assert_eq!(rec.postcode.as_deref(), Some("50450"));
    }

    #[test]
    fn enum_columns_are_case_insensitive() {
        let rec: AgentRecord = serde_json::from_value(json!({
            "id": 4,
            "gender": "Female",
            "application_status": "APPROVED",
            "account_status": "Suspended"
        }))
        .unwrap();
        assert_eq!(rec.gender, Some(Gender::Female));
        assert_eq!(rec.application_status, ApplicationStatus::Approved);
        assert_eq!(rec.account_status, Some(AccountStatus::Suspended));
    }

    #[test]
    fn profile_values_round_trip_through_setters() {
        let mut rec = AgentRecord::new(AgentId(1));
        rec.set_profile_value(ProfileField::City, "Penang");
        rec.set_profile_value(ProfileField::Gender, "male");
        assert_eq!(rec.profile_value(ProfileField::City), Some("Penang"));
        assert_eq!(rec.profile_value(ProfileField::Gender), Some("male"));

        rec.set_profile_value(ProfileField::City, "");
        assert_eq!(rec.city, None);
    }

    #[test]
    fn profile_field_keys_parse() {
        assert_eq!("addr_line2".parse::<ProfileField>(), Ok(ProfileField::AddrLine2));
        assert!("id".parse::<ProfileField>().is_err());
        assert_eq!(
            ProfileField::ALL.iter().filter(|f| f.required()).count(),
            5
        );
    }

    #[test]
    fn odd_values_stay_local_to_their_record() {
        let values = vec![
            json!({ "id": 1, "full_name": "Alice", "gender": "female" }),
            json!({
                "id": 2,
                "gender": "other",
                "application_status": "under_review",
                "account_status": 3,
                "city": { "name": "Ipoh" },
                "sales_support_id": "n/a"
            }),
            json!({ "id": 3, "application_status": "approved" }),
        ];
        let records: Vec<AgentRecord> =
            serde_json::from_value(serde_json::Value::Array(values.clone())).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records, records_from_values(values));

        let odd = &records[1];
        assert_eq!(odd.gender, None);
        assert_eq!(odd.application_status, ApplicationStatus::Pending);
        assert_eq!(odd.account_status, None);
        assert_eq!(odd.city, None);
        assert_eq!(odd.sales_support_id, None);
        assert_eq!(records[2].application_status, ApplicationStatus::Approved);
    }

    #[test]
    fn records_without_usable_id_are_skipped() {
        let records = records_from_values(vec![
            json!({ "id": 1 }),
            json!({ "id": "seven" }),
            json!("not a record"),
            json!({ "id": "4" }),
        ]);
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![AgentId(1), AgentId(4)]);
    }
}
