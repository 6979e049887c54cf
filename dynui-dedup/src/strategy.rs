use dynui_types::{ComponentInstance, Placement};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Selects which instances of a single component type remain visible.
///
/// Implementations must be pure: the output depends only on the input list.
pub trait DeduplicationStrategy: Send + Sync + fmt::Debug {
    /// Name used in logs and deduplication rules.
    fn name(&self) -> &str;

    fn apply(&self, instances: Vec<ComponentInstance>) -> Vec<ComponentInstance>;
}

/// Sorts newest first. Stable, so equal timestamps keep their relative order.
pub fn sort_by_recency(instances: &mut [ComponentInstance]) {
    instances.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Keeps the `limit` most recent instances, newest first.
pub fn keep_most_recent(mut instances: Vec<ComponentInstance>, limit: usize) -> Vec<ComponentInstance> {
    sort_by_recency(&mut instances);
    instances.truncate(limit);
    instances
}

/// At most one survivor: the most recently updated instance.
///
/// Used for types that must be singular on screen (a loyalty card).
#[derive(Debug, Clone, Copy, Default)]
pub struct Unique;

impl DeduplicationStrategy for Unique {
    fn name(&self) -> &str {
        "unique"
    }

    fn apply(&self, instances: Vec<ComponentInstance>) -> Vec<ComponentInstance> {
        keep_most_recent(instances, 1)
    }
}

/// Most recent instance wins (a recommendations carousel replaced by newer results).
///
/// Same selection as [`Unique`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Latest;

impl DeduplicationStrategy for Latest {
    fn name(&self) -> &str {
        "latest"
    }

    fn apply(&self, instances: Vec<ComponentInstance>) -> Vec<ComponentInstance> {
        keep_most_recent(instances, 1)
    }
}

/// Keeps the `limit` most recent instances.
#[derive(Debug, Clone, Copy)]
pub struct LimitByType {
    limit: usize,
}

impl LimitByType {
    /// A zero limit is raised to one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl DeduplicationStrategy for LimitByType {
    fn name(&self) -> &str {
        "limit-by-type"
    }

    fn apply(&self, instances: Vec<ComponentInstance>) -> Vec<ComponentInstance> {
        keep_most_recent(instances, self.limit)
    }
}

/// Keeps the `limit` most recent instances in each placement.
///
/// Only differs from [`LimitByType`] when the input spans several placements,
/// which is the case when it is layered after a type-wide limit in a
/// [`Composite`] over a whole-store snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PerPlacementLimit {
    limit: usize,
}

impl PerPlacementLimit {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }
}

impl DeduplicationStrategy for PerPlacementLimit {
    fn name(&self) -> &str {
        "per-placement-limit"
    }

    fn apply(&self, mut instances: Vec<ComponentInstance>) -> Vec<ComponentInstance> {
        sort_by_recency(&mut instances);
        let mut seen: HashMap<Placement, usize> = HashMap::new();
        instances.retain(|instance| {
            let count = seen.entry(instance.placement).or_insert(0);
            *count += 1;
            *count <= self.limit
        });
        instances
    }
}

/// Applies each layer in order, feeding one layer's output into the next.
#[derive(Debug, Clone)]
pub struct Composite {
    name: String,
    layers: Vec<Arc<dyn DeduplicationStrategy>>,
}

impl Composite {
    pub fn new(name: impl Into<String>, layers: Vec<Arc<dyn DeduplicationStrategy>>) -> Self {
        Self {
            name: name.into(),
            layers,
        }
    }

    pub fn layers(&self) -> &[Arc<dyn DeduplicationStrategy>] {
        &self.layers
    }
}

impl DeduplicationStrategy for Composite {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, instances: Vec<ComponentInstance>) -> Vec<ComponentInstance> {
        let mut survivors = self
            .layers
            .iter()
            .fold(instances, |acc, layer| layer.apply(acc));
        // An empty pipeline still honors the output ordering contract.
        sort_by_recency(&mut survivors);
        survivors
    }
}
