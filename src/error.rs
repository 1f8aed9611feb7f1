//! Errors raised while composing or trimming segment latents.

use thiserror::Error;

/// Validation failures for segment composition and tail trimming.
///
/// Every check runs before any output tensor is allocated, so an error
/// never leaves a partially built segment behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StitchError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Invalid length {0}: a segment needs at least one frame")]
    InvalidLength(i64),
    #[error("motion_latent_count must be >= 0, got {0}")]
    NegativeMotionCount(i64),
    #[error("slots_to_cut must be >= 0, got {0}")]
    NegativeCut(i64),
    #[error("Temporal stride must be >= 1, got {0}")]
    InvalidStride(usize),
}
