//! Stage types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::CallError;

/// Smallest and largest stage counts accepted.
pub const MIN_STAGES: u32 = 1;
pub const MAX_STAGES: u32 = 10;

/// One unit of a multi-step prompt sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePrompt {
    pub stage: String,
    pub prompt: String,
    pub stage_number: u32,
}

/// A generated stage image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageImage {
    pub stage: String,
    pub stage_number: u32,
    pub prompt: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Error)]
pub enum StageError {
    #[error("numStages must be between 1 and 10 (got {0})")]
    InvalidCount(u32),

    #[error("Invalid JSON response from completion model: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error("Some stages failed to generate: {}", summarize(.0))]
    Partial(Vec<(u32, CallError)>),
}

pub type StageResult<T> = Result<T, StageError>;

/// `Stage N: message` for every failure, in stage order.
pub fn summarize(failures: &[(u32, CallError)]) -> String {
    let mut sorted: Vec<_> = failures.iter().collect();
    sorted.sort_by_key(|(number, _)| *number);
    sorted
        .iter()
        .map(|(number, error)| format!("Stage {number}: {error}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn validate_count(count: u32) -> StageResult<u32> {
    if (MIN_STAGES..=MAX_STAGES).contains(&count) {
        Ok(count)
    } else {
        Err(StageError::InvalidCount(count))
    }
}
