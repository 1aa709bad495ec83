//! Error types for marga-plan.

use thiserror::Error;

/// Planner error type.
///
/// Covers recoverable caller mistakes. Internal invariant violations
/// (e.g. popping an empty open list mid-repair) are bugs and panic instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("Unknown vertex: {0}")]
    UnknownVertex(u64),

    #[error("Cell ({0}, {1}) is outside the grid")]
    OutOfBounds(i32, i32),

    #[error("Negative edge cost {cost} on ({from}, {to})")]
    NegativeCost { from: u64, to: u64, cost: f64 },

    #[error("Planner is not initialized (call initialize first)")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, PlannerError>;
