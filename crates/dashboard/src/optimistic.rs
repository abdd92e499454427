//! Apply, call, reconcile-or-revert.
//!
//! Every state-changing action goes through the same three steps: [`apply`]
//! mutates the stored record and captures the exact pre-action copy,
//! [`reconcile`] confirms the mutation after a successful call, and
//! [`revert`] puts the captured copy back after a failed one.

use agentdesk_core::{AgentId, AgentRecord};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::store::RecordStore;

/// Pre-action copy of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    before: AgentRecord,
}

impl Snapshot {
    pub fn id(&self) -> AgentId {
        self.before.id
    }

    pub fn before(&self) -> &AgentRecord {
        &self.before
    }
}

/// How a successful call was folded back into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The server returned the record; it replaced the local copy.
    Replaced,
    /// No record in the response; optimistic values kept, `updated_at` stamped.
    Stamped,
    /// The record left the store (e.g. a reload) while the call was out.
    Gone,
}

/// ISO-8601 UTC with millisecond precision, the format the backend emits.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Snapshot record `id`, then run `mutate` on it. `None` when the record is
/// not in the store; nothing is touched in that case.
pub fn apply(
    store: &mut RecordStore,
    id: AgentId,
    mutate: impl FnOnce(&mut AgentRecord),
) -> Option<Snapshot> {
    let record = store.get_mut(id)?;
    let before = record.clone();
    mutate(record);
    record.id = before.id;
    Some(Snapshot { before })
}

pub fn reconcile(
    store: &mut RecordStore,
    snapshot: &Snapshot,
    authoritative: Option<AgentRecord>,
    now: DateTime<Utc>,
) -> Reconciled {
    let Some(slot) = store.get_mut(snapshot.id()) else {
        debug!("Agent #{} gone before reconcile", snapshot.id());
        return Reconciled::Gone;
    };
    match authoritative {
        Some(mut record) => {
            record.id = snapshot.id();
            *slot = record;
            Reconciled::Replaced
        }
        None => {
            slot.updated_at = Some(timestamp(now));
            Reconciled::Stamped
        }
    }
}

/// Restore the exact pre-action record. Returns false when it is no longer
/// in the store.
pub fn revert(store: &mut RecordStore, snapshot: Snapshot) -> bool {
    match store.get_mut(snapshot.id()) {
        Some(slot) => {
            *slot = snapshot.before;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdesk_core::{ApplicationStatus, testing};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn revert_restores_every_field() {
        let mut store = RecordStore::new(testing::roster_records());
        let original = store.get(AgentId(1)).unwrap().clone();

        let snapshot = apply(&mut store, AgentId(1), |r| {
            r.application_status = ApplicationStatus::Rejected;
            r.rejection_reason = Some("Duplicate application".into());
            r.city = Some("Ipoh".into());
        })
        .unwrap();
        assert_ne!(store.get(AgentId(1)), Some(&original));

        assert!(revert(&mut store, snapshot));
        assert_eq!(store.get(AgentId(1)), Some(&original));
    }

    #[test]
    fn apply_on_missing_record_is_a_no_op() {
        let mut store = RecordStore::new(testing::roster_records());
        let before = store.clone();
        assert!(apply(&mut store, AgentId(99), |r| r.city = Some("x".into())).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn mutation_cannot_change_the_id() {
        let mut store = RecordStore::new(testing::roster_records());
        apply(&mut store, AgentId(2), |r| r.id = AgentId(500)).unwrap();
        assert!(store.contains(AgentId(2)));
        assert!(!store.contains(AgentId(500)));
    }

    #[test]
    fn reconcile_prefers_the_server_record() {
        let mut store = RecordStore::new(testing::roster_records());
        let snapshot = apply(&mut store, AgentId(1), |r| {
            r.application_status = ApplicationStatus::Approved;
        })
        .unwrap();

        let mut server = testing::record(1, "Alice Tan (verified)", ApplicationStatus::Approved);
        server.reviewed_by = Some("server".into());
        assert_eq!(
            reconcile(&mut store, &snapshot, Some(server.clone()), now()),
            Reconciled::Replaced
        );
        assert_eq!(store.get(AgentId(1)), Some(&server));
    }

    #[test]
    fn reconcile_without_record_stamps_updated_at() {
        let mut store = RecordStore::new(testing::roster_records());
        let snapshot = apply(&mut store, AgentId(3), |r| {
            r.application_status = ApplicationStatus::Pending;
        })
        .unwrap();

        assert_eq!(
            reconcile(&mut store, &snapshot, None, now()),
            Reconciled::Stamped
        );
        let bob = store.get(AgentId(3)).unwrap();
        assert_eq!(bob.application_status, ApplicationStatus::Pending);
        assert_eq!(bob.updated_at.as_deref(), Some("2024-07-01T08:30:00.000Z"));
    }

    #[test]
    fn settle_after_reload_reports_gone() {
        let mut store = RecordStore::new(testing::roster_records());
        let snapshot = apply(&mut store, AgentId(4), |r| r.tier = Some("gold".into())).unwrap();
        store.replace(Vec::new());
        assert_eq!(reconcile(&mut store, &snapshot, None, now()), Reconciled::Gone);
        assert!(!revert(&mut store, snapshot));
    }
}
