//! Name → strategy resolution for runtime deduplication rules.

use crate::strategy::{DeduplicationStrategy, Latest, LimitByType, Unique};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Built-in strategy names. `limit-by-type` is parameterized per component type.
pub const UNIQUE: &str = "unique";
pub const LATEST: &str = "latest";
pub const LIMIT_BY_TYPE: &str = "limit-by-type";

const BUILTIN_NAMES: [&str; 3] = [UNIQUE, LATEST, LIMIT_BY_TYPE];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DedupError {
    #[error("strategy name '{0}' is reserved for a built-in strategy")]
    ReservedName(String),

    #[error("strategy name must not be empty")]
    EmptyName,
}

/// Registry of named strategies.
///
/// The three built-in names always resolve. Extension code can add further
/// named strategies (typically [`Composite`](crate::Composite) pipelines);
/// registering an existing custom name replaces it.
#[derive(Debug, Default)]
pub struct StrategyCatalog {
    custom: HashMap<String, Arc<dyn DeduplicationStrategy>>,
}

impl StrategyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        strategy: Arc<dyn DeduplicationStrategy>,
    ) -> Result<(), DedupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DedupError::EmptyName);
        }
        if BUILTIN_NAMES.contains(&name) {
            return Err(DedupError::ReservedName(name.to_string()));
        }
        self.custom.insert(name.to_string(), strategy);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        BUILTIN_NAMES.contains(&name) || self.custom.contains_key(name)
    }

    /// Resolves `name`; `type_limit` parameterizes `limit-by-type`.
    pub fn resolve(&self, name: &str, type_limit: usize) -> Option<Arc<dyn DeduplicationStrategy>> {
        match name {
            UNIQUE => Some(Arc::new(Unique)),
            LATEST => Some(Arc::new(Latest)),
            LIMIT_BY_TYPE => Some(Arc::new(LimitByType::new(type_limit))),
            other => self.custom.get(other).cloned(),
        }
    }

    /// All resolvable names, built-ins first, custom names sorted.
    pub fn names(&self) -> Vec<String> {
        let mut custom: Vec<String> = self.custom.keys().cloned().collect();
        custom.sort();
        BUILTIN_NAMES
            .iter()
            .map(|s| s.to_string())
            .chain(custom)
            .collect()
    }
}
