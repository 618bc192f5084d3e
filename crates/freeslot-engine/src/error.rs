//! Error types for the free-time engine.

use crate::model::GroupId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid interval: {0}")]
    Validation(String),

    #[error("Unknown group: {0}")]
    GroupNotFound(GroupId),

    #[error("Recomputation failed for group {group}: {message}")]
    Computation { group: GroupId, message: String },

    #[error("Batch too large: {size} busy intervals (maximum {max})")]
    BatchTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
