use std::collections::BTreeMap;

use crate::agent::{AgentRecord, ProfileField};

/// Draft values for the profile edit form, keyed by editable field.
///
/// A form seeded from a record holds every editable field (absent values as
/// empty strings), so submitting it sends the complete editable profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    values: BTreeMap<ProfileField, String>,
}

impl EditForm {
    pub fn from_record(record: &AgentRecord) -> Self {
        let values = ProfileField::ALL
            .iter()
            .map(|field| {
                (
                    *field,
                    record.profile_value(*field).unwrap_or_default().to_string(),
                )
            })
            .collect();
        Self { values }
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Current draft value; fields never set read as empty.
    pub fn get(&self, field: ProfileField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProfileField, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Copy every drafted value onto `record`.
    pub fn apply_to(&self, record: &mut AgentRecord) {
        for (field, value) in self.iter() {
            record.set_profile_value(field, value);
        }
    }

    /// Fields whose drafted value differs from `record`.
    pub fn changed_fields(&self, record: &AgentRecord) -> Vec<ProfileField> {
        self.iter()
            .filter(|(field, value)| record.profile_value(*field).unwrap_or_default() != *value)
            .map(|(field, _)| field)
            .collect()
    }
}
