//! Dynamic UI component orchestration engine.
//!
//! Turns function-call results into typed UI components, keeps them in a
//! single store, and answers "what should be visible in this placement?"
//! under per-type uniqueness and limit policies.
//!
//! The pieces:
//! - [`TypeRegistry`]: semantic type → [`TypePolicy`](dynui_types::TypePolicy)
//! - [`CreatorRegistry`]: function name → [`ComponentCreator`], type → view
//! - [`ComponentStore`]: id-keyed instances with age-based eviction
//! - [`Deduplicator`]: per-type strategy resolution over a placement
//! - [`Orchestrator`]: the facade that owns all of the above
//!
//! ```no_run
//! use dynui_engine::{EngineConfig, Orchestrator};
//! use dynui_types::{FunctionResult, Placement};
//! use serde_json::json;
//!
//! let mut engine = Orchestrator::with_system_clock(EngineConfig::default())?;
//! engine.ingest_function_result("get_loyalty_points", &FunctionResult::ok(json!({"points": 120})))?;
//! let sidebar = engine.get_for_placement(Placement::Sidebar);
//! assert_eq!(sidebar.len(), 1);
//! # Ok::<(), dynui_engine::EngineError>(())
//! ```

pub mod config;
pub mod creator;
pub mod creators;
pub mod dedup;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod store;

pub use config::EngineConfig;
pub use creator::{ComponentCreator, CreatorRegistry, ViewDescriptor};
pub use dedup::Deduplicator;
pub use error::{EngineError, EngineResult};
pub use orchestrator::{Orchestrator, RenderedComponent};
pub use registry::TypeRegistry;
pub use store::ComponentStore;
