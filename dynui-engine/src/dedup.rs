//! Per-type strategy resolution and placement-level deduplication.

use crate::error::{EngineError, EngineResult};
use crate::registry::TypeRegistry;
use dynui_dedup::{
    DeduplicationStrategy, LimitByType, StrategyCatalog, UNIQUE, Unique, sort_by_recency,
};
use dynui_types::ComponentInstance;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Decides which stored instances of a placement are visible.
///
/// Strategy for a type, in order of precedence:
/// 1. an explicit deduplication rule naming a catalog strategy
/// 2. the registered policy (`unique` or `limit-by-type` with its limit)
/// 3. `limit-by-type` with the registry's default limit
#[derive(Debug, Default)]
pub struct Deduplicator {
    catalog: StrategyCatalog,
    rules: HashMap<String, String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_strategy(
        &mut self,
        name: &str,
        strategy: Arc<dyn DeduplicationStrategy>,
    ) -> EngineResult<()> {
        self.catalog.register(name, strategy)?;
        info!(strategy = name, "Deduplication strategy registered");
        Ok(())
    }

    /// Associates `component_type` with a named strategy.
    ///
    /// The name must already resolve in the catalog; a later rule for the
    /// same type replaces the earlier one.
    pub fn register_rule(&mut self, component_type: &str, strategy: &str) -> EngineResult<()> {
        if !self.catalog.contains(strategy) {
            return Err(EngineError::UnknownStrategy {
                component_type: component_type.to_string(),
                strategy: strategy.to_string(),
            });
        }
        self.rules
            .insert(component_type.to_string(), strategy.to_string());
        debug!(component_type, strategy, "Deduplication rule registered");
        Ok(())
    }

    /// Adds a `unique` rule for every unique type that has no rule yet.
    pub fn bootstrap_unique_rules(&mut self, registry: &TypeRegistry) {
        for component_type in registry.list_unique_types() {
            self.rules
                .entry(component_type)
                .or_insert_with(|| UNIQUE.to_string());
        }
    }

    pub fn rule_for(&self, component_type: &str) -> Option<&str> {
        self.rules.get(component_type).map(String::as_str)
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.catalog.names()
    }

    pub fn strategy_for(
        &self,
        component_type: &str,
        registry: &TypeRegistry,
    ) -> Arc<dyn DeduplicationStrategy> {
        let limit = registry.effective_limit(component_type);
        if let Some(strategy) = self
            .rule_for(component_type)
            .and_then(|name| self.catalog.resolve(name, limit))
        {
            return strategy;
        }
        if registry.contains(component_type) && registry.get_policy(component_type).is_unique {
            return Arc::new(Unique);
        }
        Arc::new(LimitByType::new(limit))
    }

    /// Groups by type, prunes each group with its strategy, then merges the
    /// survivors newest first.
    pub fn deduplicate(
        &self,
        instances: Vec<ComponentInstance>,
        registry: &TypeRegistry,
    ) -> Vec<ComponentInstance> {
        let mut groups: BTreeMap<String, Vec<ComponentInstance>> = BTreeMap::new();
        for instance in instances {
            groups
                .entry(instance.component_type.clone())
                .or_default()
                .push(instance);
        }

        let mut survivors = Vec::new();
        for (component_type, group) in groups {
            let strategy = self.strategy_for(&component_type, registry);
            let before = group.len();
            let kept = strategy.apply(group);
            if kept.len() < before {
                debug!(
                    component_type = %component_type,
                    strategy = strategy.name(),
                    kept = kept.len(),
                    dropped = before - kept.len(),
                    "Deduplicated component group"
                );
            }
            survivors.extend(kept);
        }

        sort_by_recency(&mut survivors);
        survivors
    }
}
