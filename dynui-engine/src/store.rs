//! Component store: sole owner of live component instances.
//!
//! Every query returns owned copies; nothing outside the store can mutate a
//! stored instance. Instances are kept ordered by id so snapshots come out in
//! the same order for the same store state.

use crate::error::EngineResult;
use dynui_types::{Clock, ComponentDraft, ComponentInstance, Placement, Timestamp};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub struct ComponentStore {
    instances: BTreeMap<String, ComponentInstance>,
    clock: Arc<dyn Clock>,
}

impl ComponentStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            instances: BTreeMap::new(),
            clock,
        }
    }

    /// Inserts or replaces by id and returns a copy of what was stored.
    ///
    /// Drafts without a timestamp are stamped with the store clock's "now".
    pub fn add(&mut self, draft: impl Into<ComponentDraft>) -> EngineResult<ComponentInstance> {
        let instance = draft.into().into_instance(self.clock.now())?;
        let stored = instance.clone();
        if let Some(previous) = self.instances.insert(instance.id.clone(), instance) {
            debug!(
                id = %stored.id,
                component_type = %stored.component_type,
                previous_updated_at = %previous.updated_at,
                updated_at = %stored.updated_at,
                "Component replaced"
            );
        }
        Ok(stored)
    }

    /// Returns true if an instance with `id` existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.instances.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<ComponentInstance> {
        self.instances.get(id).cloned()
    }

    pub fn get_all(&self) -> Vec<ComponentInstance> {
        self.instances.values().cloned().collect()
    }

    pub fn get_by_placement(&self, placement: Placement) -> Vec<ComponentInstance> {
        self.instances
            .values()
            .filter(|instance| instance.placement == placement)
            .cloned()
            .collect()
    }

    /// Removes every instance with `now - updated_at > max_age_ms`.
    ///
    /// Returns the number of instances removed.
    pub fn evict_older_than(&mut self, max_age_ms: u64, now: Timestamp) -> usize {
        let before = self.instances.len();
        self.instances
            .retain(|_, instance| instance.age_at(now) <= max_age_ms);
        before - self.instances.len()
    }

    /// Removes everything, returning how many instances were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.instances.len();
        self.instances.clear();
        count
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
