//! Core data model for dynui.
//!
//! Defines the plugin-agnostic types every other dynui crate depends on:
//! - [`ComponentInstance`] / [`ComponentDraft`]: one widget of a semantic type in a placement
//! - [`Placement`]: the fixed set of screen regions that can host widgets
//! - [`TypePolicy`]: per-type visibility rule (unique, limit, allowed placements)
//! - [`Timestamp`] and [`Clock`]: millisecond logical clock used for recency ordering
//! - [`FunctionResult`]: the envelope produced by the function-execution backend
//!
//! Widget-specific payload shapes belong to their creators, not here.

mod ids;
mod instance;
mod policy;
mod result;
mod timestamp;

pub use ids::{build_instance_id, content_discriminator};
pub use instance::{ComponentDraft, ComponentInstance, Placement};
pub use policy::TypePolicy;
pub use result::{FunctionResult, PayloadReader};
pub use timestamp::{Clock, ManualClock, SystemClock, Timestamp};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown placement: {0}")]
    UnknownPlacement(String),

    #[error("invalid component instance: {0}")]
    InvalidInstance(String),
}
