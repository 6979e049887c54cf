//! Deduplication strategies for dynui.
//!
//! A strategy is a pure function over instances of one component type that
//! decides which of them survive for display:
//!
//! - [`Unique`]: only the most recent instance
//! - [`Latest`]: same selection as `Unique`, named for "newest wins" call sites
//! - [`LimitByType`]: the `n` most recent instances
//! - [`PerPlacementLimit`]: the `n` most recent instances in each placement
//! - [`Composite`]: an ordered pipeline of other strategies
//!
//! All strategies order their output by `updated_at` descending using a stable
//! sort, so instances with equal timestamps keep their input order and repeated
//! calls over the same input give the same output.
//!
//! [`StrategyCatalog`] resolves strategies by name for runtime-configured rules.

mod catalog;
mod strategy;

pub use catalog::{DedupError, LATEST, LIMIT_BY_TYPE, StrategyCatalog, UNIQUE};
pub use strategy::{
    Composite, DeduplicationStrategy, Latest, LimitByType, PerPlacementLimit, Unique,
    keep_most_recent, sort_by_recency,
};
