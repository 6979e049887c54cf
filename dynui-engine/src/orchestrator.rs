//! The engine facade.
//!
//! Owns the component store and every registry. All mutation goes through
//! `&mut self`, so a caller on a single event loop gets run-to-completion
//! semantics without locks.

use crate::config::EngineConfig;
use crate::creator::{ComponentCreator, CreatorRegistry, ViewDescriptor};
use crate::dedup::Deduplicator;
use crate::error::{EngineError, EngineResult};
use crate::registry::TypeRegistry;
use crate::store::ComponentStore;
use dynui_dedup::DeduplicationStrategy;
use dynui_types::{
    Clock, ComponentDraft, ComponentInstance, FunctionResult, Placement, SystemClock, TypePolicy,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One visible component, ready for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub view: ViewDescriptor,
}

pub struct Orchestrator {
    config: EngineConfig,
    store: ComponentStore,
    types: TypeRegistry,
    creators: CreatorRegistry,
    dedup: Deduplicator,
    version: u64,
}

impl Orchestrator {
    /// An engine with empty registries.
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            types: TypeRegistry::new(config.default_limit),
            store: ComponentStore::new(clock),
            creators: CreatorRegistry::new(),
            dedup: Deduplicator::new(),
            version: 0,
            config,
        }
    }

    /// An engine with the built-in creators, their policies and rules, and
    /// the overrides from `config` applied on top.
    pub fn with_builtins(config: EngineConfig, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        let mut engine = Self::new(config, clock);
        for creator in crate::creators::builtin_creators() {
            engine.register_creator(creator)?;
        }
        engine.apply_config_overrides()?;
        engine.dedup.bootstrap_unique_rules(&engine.types);
        Ok(engine)
    }

    /// Built-in engine on the system clock.
    pub fn with_system_clock(config: EngineConfig) -> EngineResult<Self> {
        Self::with_builtins(config, Arc::new(SystemClock))
    }

    fn apply_config_overrides(&mut self) -> EngineResult<()> {
        let types: Vec<(String, TypePolicy)> = self
            .config
            .types
            .iter()
            .map(|(t, p)| (t.clone(), p.clone()))
            .collect();
        for (component_type, policy) in types {
            self.register_type(&component_type, policy);
        }
        let rules: Vec<(String, String)> = self
            .config
            .rules
            .iter()
            .map(|(t, s)| (t.clone(), s.clone()))
            .collect();
        for (component_type, strategy) in rules {
            self.register_deduplication_rule(&component_type, &strategy)?;
        }
        Ok(())
    }

    // ================================================================
    // Extension points
    // ================================================================

    /// Inserts or replaces the policy for `component_type`.
    pub fn register_type(&mut self, component_type: &str, policy: TypePolicy) {
        info!(
            component_type,
            unique = policy.is_unique,
            limit = ?policy.limit,
            "Type registered"
        );
        self.types.register_type(component_type, policy);
    }

    /// Registers a creator, plus its default policy and rule when the type
    /// has none yet.
    pub fn register_creator(&mut self, creator: Arc<dyn ComponentCreator>) -> EngineResult<()> {
        self.creators.register(Arc::clone(&creator))?;
        self.adopt_creator_defaults(creator.as_ref())
    }

    /// Swaps the creator for an existing type (hot reload). Policies and rules
    /// already registered are left alone.
    pub fn replace_creator(&mut self, creator: Arc<dyn ComponentCreator>) -> EngineResult<()> {
        self.creators.replace(Arc::clone(&creator))?;
        self.adopt_creator_defaults(creator.as_ref())
    }

    fn adopt_creator_defaults(&mut self, creator: &dyn ComponentCreator) -> EngineResult<()> {
        let component_type = creator.component_type();
        if !self.types.contains(component_type) {
            self.register_type(component_type, creator.policy());
        }
        if let Some(rule) = creator.dedup_rule() {
            if self.dedup.rule_for(component_type).is_none() {
                self.dedup.register_rule(component_type, rule)?;
            }
        }
        Ok(())
    }

    pub fn register_strategy(
        &mut self,
        name: &str,
        strategy: Arc<dyn DeduplicationStrategy>,
    ) -> EngineResult<()> {
        self.dedup.register_strategy(name, strategy)
    }

    pub fn register_deduplication_rule(
        &mut self,
        component_type: &str,
        strategy: &str,
    ) -> EngineResult<()> {
        self.dedup.register_rule(component_type, strategy)
    }

    // ================================================================
    // Ingestion
    // ================================================================

    /// Stores `draft`, replacing any instance with the same id.
    ///
    /// Rejected if the type's policy does not allow the draft's placement.
    pub fn add_component(
        &mut self,
        draft: impl Into<ComponentDraft>,
    ) -> EngineResult<ComponentInstance> {
        let draft = draft.into();
        let policy = self.types.get_policy(&draft.component_type);
        if !policy.allows(draft.placement) {
            warn!(
                id = %draft.id,
                component_type = %draft.component_type,
                placement = %draft.placement,
                "Rejected component in disallowed placement"
            );
            return Err(EngineError::PlacementNotAllowed {
                component_type: draft.component_type,
                placement: draft.placement,
            });
        }

        let stored = self.store.add(draft)?;
        self.version += 1;
        debug!(
            id = %stored.id,
            component_type = %stored.component_type,
            placement = %stored.placement,
            updated_at = %stored.updated_at,
            version = self.version,
            "Component added"
        );
        Ok(stored)
    }

    /// Adds every draft independently; one failure does not stop the rest.
    pub fn add_components<I>(&mut self, drafts: I) -> Vec<EngineResult<ComponentInstance>>
    where
        I: IntoIterator,
        I::Item: Into<ComponentDraft>,
    {
        drafts
            .into_iter()
            .map(|draft| self.add_component(draft))
            .collect()
    }

    /// Builds and stores a component from a completed function call.
    ///
    /// Returns `Ok(None)` for failed results and functions no creator owns.
    pub fn ingest_function_result(
        &mut self,
        function_name: &str,
        result: &FunctionResult,
    ) -> EngineResult<Option<ComponentInstance>> {
        if !result.success {
            debug!(
                function_name,
                error = result.error.as_deref().unwrap_or(""),
                "Ignoring unsuccessful function result"
            );
            return Ok(None);
        }
        let now = self.store.now();
        match self.creators.create_from_function_result(function_name, result, now) {
            Some(draft) => self.add_component(draft).map(Some),
            None => Ok(None),
        }
    }

    /// Removes every instance. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.store.clear();
        self.version += 1;
        info!(removed, version = self.version, "Cleared all components");
        removed
    }

    /// Removes instances older than `max_age_ms`. Safe to call on an empty store.
    ///
    /// The version only moves when something was removed.
    pub fn evict(&mut self, max_age_ms: u64) -> usize {
        let now = self.store.now();
        let removed = self.store.evict_older_than(max_age_ms, now);
        if removed > 0 {
            self.version += 1;
            info!(removed, max_age_ms, version = self.version, "Evicted stale components");
        }
        removed
    }

    /// [`evict`](Self::evict) with the configured maximum age.
    pub fn evict_expired(&mut self) -> usize {
        self.evict(self.config.max_age_ms)
    }

    // ================================================================
    // Queries
    // ================================================================

    /// Deduplicated instances for `placement`, newest first.
    pub fn instances_for_placement(&self, placement: Placement) -> Vec<ComponentInstance> {
        self.dedup
            .deduplicate(self.store.get_by_placement(placement), &self.types)
    }

    /// Visible components for `placement`, newest first, with their views.
    pub fn get_for_placement(&self, placement: Placement) -> Vec<RenderedComponent> {
        self.instances_for_placement(placement)
            .into_iter()
            .map(|instance| RenderedComponent {
                view: self.creators.create_view(&instance),
                id: instance.id,
                component_type: instance.component_type,
            })
            .collect()
    }

    /// Change counter for the UI: bumped on every state change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: &str) -> Option<ComponentInstance> {
        self.store.get(id)
    }

    /// Snapshot of every stored instance, deduplicated or not.
    pub fn all_components(&self) -> Vec<ComponentInstance> {
        self.store.get_all()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn creators(&self) -> &CreatorRegistry {
        &self.creators
    }

    pub fn deduplicator(&self) -> &Deduplicator {
        &self.dedup
    }
}
