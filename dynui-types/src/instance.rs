use crate::{Error, Result, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Screen region that may host component instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Rendered within the chat transcript.
    Inline,
    Sidebar,
    Bottom,
}

impl Placement {
    pub const ALL: [Placement; 3] = [Placement::Inline, Placement::Sidebar, Placement::Bottom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Sidebar => "sidebar",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "sidebar" => Ok(Self::Sidebar),
            "bottom" => Ok(Self::Bottom),
            _ => Err(Error::UnknownPlacement(s.to_string())),
        }
    }
}

/// A component as it is handed to the store, before it has a timestamp.
///
/// Creators produce drafts; the store stamps `updated_at` at insertion time
/// when the draft does not carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDraft {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub placement: Placement,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl ComponentDraft {
    pub fn new(
        id: impl Into<String>,
        component_type: impl Into<String>,
        placement: Placement,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            placement,
            data,
            updated_at: None,
        }
    }

    /// Pins the draft to an explicit timestamp (replay and tests).
    #[must_use]
    pub fn at(mut self, updated_at: impl Into<Timestamp>) -> Self {
        self.updated_at = Some(updated_at.into());
        self
    }

    /// Checks the structural invariants every stored instance must hold.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidInstance("id must not be empty".into()));
        }
        if self.component_type.trim().is_empty() {
            return Err(Error::InvalidInstance(format!(
                "component '{}' has an empty type",
                self.id
            )));
        }
        Ok(())
    }

    /// Converts into a stored instance, using `now` if no timestamp was set.
    pub fn into_instance(self, now: Timestamp) -> Result<ComponentInstance> {
        self.validate()?;
        Ok(ComponentInstance {
            id: self.id,
            component_type: self.component_type,
            placement: self.placement,
            data: self.data,
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// A live component instance owned by the component store.
///
/// The `data` payload is opaque to the engine; only the creator for
/// `component_type` knows its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub placement: Placement,
    pub data: serde_json::Value,
    pub updated_at: Timestamp,
}

impl ComponentInstance {
    /// Extract a string value from `data` using a JSON pointer (e.g., "/name").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a numeric value from `data` using a JSON pointer.
    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.data.pointer(pointer).and_then(|v| v.as_f64())
    }

    /// Extract a boolean value from `data` using a JSON pointer.
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.data.pointer(pointer).and_then(|v| v.as_bool())
    }

    /// Age in milliseconds as observed at `now`.
    pub fn age_at(&self, now: Timestamp) -> u64 {
        self.updated_at.age_at(now)
    }
}

impl From<ComponentInstance> for ComponentDraft {
    fn from(instance: ComponentInstance) -> Self {
        Self {
            id: instance.id,
            component_type: instance.component_type,
            placement: instance.placement,
            data: instance.data,
            updated_at: Some(instance.updated_at),
        }
    }
}
