//! Creator registry: builds component drafts from function results and maps
//! stored instances to view descriptors.
//!
//! Dispatch is by string: component type → creator, and function name →
//! component type. The set of widget types is open, so new types are added by
//! registering another [`ComponentCreator`].

use crate::error::{EngineError, EngineResult};
use dynui_types::{
    ComponentDraft, ComponentInstance, FunctionResult, PayloadReader, Placement, Timestamp,
    TypePolicy, build_instance_id,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rendering instructions for one visible instance, consumed by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewDescriptor {
    Widget {
        widget: String,
        props: serde_json::Value,
    },
    /// Placeholder for an instance whose type has no registered creator.
    Unsupported { component_type: String },
}

impl ViewDescriptor {
    /// Serializes `props` into a widget descriptor.
    ///
    /// Falls back to [`ViewDescriptor::Unsupported`] if `props` cannot be
    /// represented as JSON.
    pub fn widget<T: Serialize>(widget: &str, props: &T) -> Self {
        match serde_json::to_value(props) {
            Ok(props) => Self::Widget {
                widget: widget.to_string(),
                props,
            },
            Err(e) => {
                warn!(widget, error = %e, "Failed to serialize view props");
                Self::Unsupported {
                    component_type: widget.to_string(),
                }
            }
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Builds and renders one semantic component type.
///
/// Implementors only describe their type and normalize payloads; function
/// ownership checks, envelope unwrapping and id assignment come from the
/// provided `create_from_function_result`.
pub trait ComponentCreator: Send + Sync {
    /// Semantic type name, e.g. `"loyaltyCard"`.
    fn component_type(&self) -> &str;

    /// Function names whose results this creator turns into components.
    fn function_names(&self) -> &'static [&'static str];

    /// Policy registered for this type when the creator is registered.
    fn policy(&self) -> TypePolicy;

    fn default_placement(&self) -> Placement;

    /// Deduplication rule registered alongside the creator, if any.
    fn dedup_rule(&self) -> Option<&'static str> {
        None
    }

    /// Turns a raw payload into this type's stored `data`, defaulting every
    /// missing field.
    fn normalize(&self, payload: PayloadReader<'_>) -> serde_json::Value;

    fn create_view(&self, instance: &ComponentInstance) -> ViewDescriptor;

    fn handles(&self, function_name: &str) -> bool {
        self.function_names().contains(&function_name)
    }

    /// Returns `None` when this creator does not own `function_name` or the
    /// result was not successful. `now` is embedded in non-unique ids.
    fn create_from_function_result(
        &self,
        function_name: &str,
        result: &FunctionResult,
        now: Timestamp,
    ) -> Option<ComponentDraft> {
        if !self.handles(function_name) {
            return None;
        }
        let payload = result.payload()?;
        let data = self.normalize(PayloadReader::new(payload));
        let id = build_instance_id(self.component_type(), &data, self.policy().is_unique, now);
        Some(ComponentDraft::new(
            id,
            self.component_type(),
            self.default_placement(),
            data,
        ))
    }
}

/// Registration table for creators.
///
/// A function name belongs to at most one creator. Conflicting claims are
/// rejected when the creator is registered, never resolved at dispatch time.
#[derive(Default)]
pub struct CreatorRegistry {
    creators: HashMap<String, Arc<dyn ComponentCreator>>,
    functions: HashMap<String, String>,
}

impl CreatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in ordering widgets.
    pub fn with_builtin_creators() -> EngineResult<Self> {
        let mut registry = Self::new();
        for creator in crate::creators::builtin_creators() {
            registry.register(creator)?;
        }
        Ok(registry)
    }

    /// Registers a creator for a new component type.
    ///
    /// Fails without side effects if the type already has a creator or any of
    /// its function names is owned by another type.
    pub fn register(&mut self, creator: Arc<dyn ComponentCreator>) -> EngineResult<()> {
        let component_type = creator.component_type().to_string();
        if self.creators.contains_key(&component_type) {
            return Err(EngineError::CreatorAlreadyRegistered(component_type));
        }
        self.check_function_claims(creator.as_ref())?;
        self.insert(creator);
        Ok(())
    }

    /// Replaces the creator for an existing type, or registers it if new.
    ///
    /// The previous creator's function claims are released first; claims held
    /// by other types still conflict.
    pub fn replace(
        &mut self,
        creator: Arc<dyn ComponentCreator>,
    ) -> EngineResult<Option<Arc<dyn ComponentCreator>>> {
        let component_type = creator.component_type().to_string();
        self.check_function_claims(creator.as_ref())?;
        self.functions.retain(|_, owner| *owner != component_type);
        let previous = self.creators.remove(&component_type);
        if previous.is_some() {
            info!(component_type = %component_type, "Creator replaced");
        }
        self.insert(creator);
        Ok(previous)
    }

    fn check_function_claims(&self, creator: &dyn ComponentCreator) -> EngineResult<()> {
        for function_name in creator.function_names() {
            if let Some(owner) = self.functions.get(*function_name) {
                if owner != creator.component_type() {
                    warn!(
                        function_name,
                        owner = %owner,
                        claimant = creator.component_type(),
                        "Rejected conflicting function claim"
                    );
                    return Err(EngineError::FunctionNameConflict {
                        function_name: function_name.to_string(),
                        owner: owner.clone(),
                        claimant: creator.component_type().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, creator: Arc<dyn ComponentCreator>) {
        let component_type = creator.component_type().to_string();
        for function_name in creator.function_names() {
            self.functions
                .insert(function_name.to_string(), component_type.clone());
        }
        info!(
            component_type = %component_type,
            functions = creator.function_names().len(),
            "Creator registered"
        );
        self.creators.insert(component_type, creator);
    }

    pub fn creator_for_type(&self, component_type: &str) -> Option<Arc<dyn ComponentCreator>> {
        self.creators.get(component_type).cloned()
    }

    pub fn creator_for_function(&self, function_name: &str) -> Option<Arc<dyn ComponentCreator>> {
        self.functions
            .get(function_name)
            .and_then(|component_type| self.creators.get(component_type))
            .cloned()
    }

    /// Routes a function result to its owning creator.
    ///
    /// Unregistered function names and unsuccessful results produce nothing.
    pub fn create_from_function_result(
        &self,
        function_name: &str,
        result: &FunctionResult,
        now: Timestamp,
    ) -> Option<ComponentDraft> {
        let Some(creator) = self.creator_for_function(function_name) else {
            debug!(function_name, "No creator for function, ignoring result");
            return None;
        };
        creator.create_from_function_result(function_name, result, now)
    }

    /// View for `instance`, or an `Unsupported` placeholder for unknown types.
    pub fn create_view(&self, instance: &ComponentInstance) -> ViewDescriptor {
        match self.creators.get(&instance.component_type) {
            Some(creator) => creator.create_view(instance),
            None => {
                warn!(
                    id = %instance.id,
                    component_type = %instance.component_type,
                    "No creator for component type, rendering placeholder"
                );
                ViewDescriptor::Unsupported {
                    component_type: instance.component_type.clone(),
                }
            }
        }
    }

    /// Registered function names, sorted.
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered component types, sorted.
    pub fn component_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.creators.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.creators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}
