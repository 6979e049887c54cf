use crate::Placement;
use serde::{Deserialize, Serialize};

/// Visibility rule for one semantic component type.
///
/// `is_unique` is semantically `limit == Some(1)`, but is kept as its own flag
/// because it selects the `unique` deduplication strategy instead of
/// `limit-by-type`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypePolicy {
    #[serde(default)]
    pub is_unique: bool,
    /// Maximum visible instances when not unique. `None` means the engine default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub display_name: String,
    /// Placements this type may be shown in. Empty allows every placement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placements: Vec<Placement>,
}

impl TypePolicy {
    /// Shorthand for a type that may only ever show one instance.
    pub fn unique(display_name: &str) -> Self {
        Self {
            is_unique: true,
            limit: None,
            display_name: display_name.into(),
            placements: Vec::new(),
        }
    }

    /// Shorthand for a type that shows up to `limit` most recent instances.
    ///
    /// A zero limit is treated as one.
    pub fn limited(display_name: &str, limit: usize) -> Self {
        Self {
            is_unique: false,
            limit: Some(limit.max(1)),
            display_name: display_name.into(),
            placements: Vec::new(),
        }
    }

    /// Policy used for unregistered types.
    pub fn fallback(default_limit: usize) -> Self {
        Self {
            is_unique: false,
            limit: Some(default_limit.max(1)),
            display_name: String::new(),
            placements: Vec::new(),
        }
    }

    /// Restricts the placements this type may appear in.
    #[must_use]
    pub fn in_placements(mut self, placements: &[Placement]) -> Self {
        self.placements = placements.to_vec();
        self
    }

    /// Effective visible count: 1 for unique types, otherwise the limit or `default_limit`.
    pub fn effective_limit(&self, default_limit: usize) -> usize {
        if self.is_unique {
            1
        } else {
            self.limit.unwrap_or(default_limit).max(1)
        }
    }

    pub fn allows(&self, placement: Placement) -> bool {
        self.placements.is_empty() || self.placements.contains(&placement)
    }
}
