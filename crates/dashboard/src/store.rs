use std::collections::HashSet;

use agentdesk_core::{AgentId, AgentRecord};
use tracing::warn;

/// The full fetched list of agent records, in server order.
///
/// Ids are unique: loading a list with repeated ids keeps the first
/// occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<AgentRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<AgentRecord>) -> Self {
        let mut store = Self::default();
        store.replace(records);
        store
    }

    /// Swap in a freshly fetched list. Returns how many duplicates were
    /// dropped.
    pub fn replace(&mut self, records: Vec<AgentRecord>) -> usize {
        let mut seen = HashSet::with_capacity(records.len());
        let total = records.len();
        self.records = records
            .into_iter()
            .filter(|record| {
                let fresh = seen.insert(record.id);
                if !fresh {
                    warn!("Dropping duplicate agent #{} from fetched list", record.id);
                }
                fresh
            })
            .collect();
        total - self.records.len()
    }

    pub fn records(&self) -> &[AgentRecord] {
        &self.records
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentRecord> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
