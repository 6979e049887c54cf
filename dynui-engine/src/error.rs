//! Error types for the orchestration engine.

use dynui_types::Placement;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid component: {0}")]
    InvalidComponent(#[from] dynui_types::Error),

    #[error(
        "function '{function_name}' is already handled by '{owner}', rejected claim from '{claimant}'"
    )]
    FunctionNameConflict {
        function_name: String,
        owner: String,
        claimant: String,
    },

    #[error("creator already registered for component type '{0}'")]
    CreatorAlreadyRegistered(String),

    #[error("unknown deduplication strategy '{strategy}' for component type '{component_type}'")]
    UnknownStrategy {
        component_type: String,
        strategy: String,
    },

    #[error("strategy registration failed: {0}")]
    Strategy(#[from] dynui_dedup::DedupError),

    #[error("component type '{component_type}' is not allowed in placement '{placement}'")]
    PlacementNotAllowed {
        component_type: String,
        placement: Placement,
    },

    #[error("config error: {0}")]
    Config(String),
}
