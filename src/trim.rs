//! Tail Trimmer
//!
//! Drops trailing latent slots from a finished segment before it is fed back
//! as `prev_samples`. With stride 4, cutting one slot removes four frames.
//! Cutting the hard-locked end slots avoids continuing motion from a tail
//! that was pinned to the end target.

use burn::prelude::*;

use crate::error::StitchError;
use crate::modules::shape::LatentShape;

/// Temporal length left after cutting `slots_to_cut` from `time` slots.
///
/// Never goes below one slot.
pub fn trimmed_slots(time: usize, slots_to_cut: usize) -> usize {
    time.saturating_sub(slots_to_cut).max(1)
}

/// Remove the last `slots_to_cut` temporal slots of `latents`.
///
/// # Arguments
/// * `latents` - Segment latents [B, C, T, H, W] with T >= 1
/// * `slots_to_cut` - Number of trailing slots to drop (>= 0)
///
/// # Returns
/// Latents [B, C, max(T - slots_to_cut, 1), H, W]. Other axes are untouched.
pub fn trim_tail<B: Backend>(
    latents: Tensor<B, 5>,
    slots_to_cut: i64,
) -> Result<Tensor<B, 5>, StitchError> {
    if slots_to_cut < 0 {
        return Err(StitchError::NegativeCut(slots_to_cut));
    }
    let shape = LatentShape::of(&latents);
    shape.require_slots("latents")?;

    let kept = trimmed_slots(shape.time, slots_to_cut as usize);
    tracing::debug!(
        slots = shape.time,
        requested = slots_to_cut,
        kept,
        "trimming latent tail"
    );

    if kept == shape.time {
        return Ok(latents);
    }
    Ok(latents.slice(shape.ranges(0..kept)))
}
