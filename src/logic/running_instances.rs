use crate::error::{ResolveError, Result};
use crate::model::{NodeId, RunningInstance};
use serde_json::json;
use std::collections::BTreeMap;

/// Running instances keyed by node id.
///
/// Entries are seeded with `(0, 0)` as ids are assigned and only ever
/// removed all at once by `clear`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningInstanceStore {
    entries: BTreeMap<NodeId, RunningInstance>,
}

impl RunningInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Resets the entry for `id` to the default pair.
    pub fn seed(&mut self, id: NodeId) {
        self.entries.insert(id, RunningInstance::default());
    }

    pub fn get(&self, id: NodeId) -> Option<RunningInstance> {
        self.entries.get(&id).copied()
    }

    /// Overwrites the pair of an existing node.
    pub fn set(&mut self, id: NodeId, instance: RunningInstance) -> Result<()> {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                *entry = instance;
                Ok(())
            }
            None => Err(ResolveError::UnknownNode(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.keys().copied()
    }

    /// Instances in id order, as sent in an execute request.
    pub fn to_request_list(&self) -> Vec<RunningInstance> {
        self.entries.values().copied().collect()
    }

    /// `{"running_instances": [...]}`
    pub fn to_json(&self) -> serde_json::Value {
        json!({ "running_instances": self.to_request_list() })
    }
}
