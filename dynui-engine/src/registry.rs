//! Type registry: semantic component type → visibility policy.

use dynui_types::TypePolicy;
use std::collections::HashMap;
use tracing::debug;

/// Catalog of per-type policies.
///
/// Registration never fails; registering a type again replaces its policy so
/// extension modules can override built-in defaults.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    policies: HashMap<String, TypePolicy>,
    default_limit: usize,
}

impl TypeRegistry {
    pub fn new(default_limit: usize) -> Self {
        Self {
            policies: HashMap::new(),
            default_limit: default_limit.max(1),
        }
    }

    pub fn register_type(&mut self, component_type: &str, policy: TypePolicy) {
        if let Some(previous) = self.policies.insert(component_type.to_string(), policy) {
            debug!(
                component_type,
                previous_unique = previous.is_unique,
                previous_limit = ?previous.limit,
                "Type policy overridden"
            );
        }
    }

    /// The registered policy, or a non-unique policy with the default limit.
    pub fn get_policy(&self, component_type: &str) -> TypePolicy {
        self.policies
            .get(component_type)
            .cloned()
            .unwrap_or_else(|| TypePolicy::fallback(self.default_limit))
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.policies.contains_key(component_type)
    }

    /// Types flagged unique, sorted by name.
    pub fn list_unique_types(&self) -> Vec<String> {
        let mut unique: Vec<String> = self
            .policies
            .iter()
            .filter(|(_, policy)| policy.is_unique)
            .map(|(name, _)| name.clone())
            .collect();
        unique.sort();
        unique
    }

    /// All registered type names, sorted.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.policies.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Visible-instance limit for `component_type` under its current policy.
    pub fn effective_limit(&self, component_type: &str) -> usize {
        self.policies
            .get(component_type)
            .map(|p| p.effective_limit(self.default_limit))
            .unwrap_or(self.default_limit)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_LIMIT)
    }
}
