//! Temporal zone planning for a stitched segment
//!
//! A segment of `T` latent slots is split into three zones along the time axis:
//!
//! ```text
//! | anchor | motion tail | free ........................ | end lock |
//! 0        a             a+k                             T-e        T
//! ```
//!
//! The plan is pure slot arithmetic. It never touches tensors, so the
//! clamping and precedence rules can be checked without a backend.

use std::ops::Range;

use crate::error::StitchError;

/// Convert a frame count into latent slots: frame 0 owns slot 0 and every
/// further block of `stride` frames advances one slot.
///
/// Example with stride 4: 81 frames -> 21 slots, 41 frames -> 11 slots.
pub fn latent_slots(length: i64, stride: usize) -> Result<usize, StitchError> {
    if stride == 0 {
        return Err(StitchError::InvalidStride(stride));
    }
    if length < 1 {
        return Err(StitchError::InvalidLength(length));
    }
    let slots = (length as usize - 1) / stride + 1;
    Ok(slots.max(1))
}

/// Smallest frame count that maps onto `slots` latent slots.
pub fn frames_for_slots(slots: usize, stride: usize) -> usize {
    slots.saturating_sub(1) * stride + 1
}

/// Which input tensor a region write reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    /// Leading slots of the anchor block
    Anchor,
    /// Trailing slots of the previous segment
    Previous,
    /// Trailing slots of the end target
    End,
}

/// One rectangular write along the time axis: `source[from]` -> `latent[to]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCopy {
    pub source: SlotSource,
    pub from: Range<usize>,
    pub to: Range<usize>,
}

/// Resolved zone layout for one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonePlan {
    /// Segment length in latent slots
    pub total_slots: usize,
    /// Slots pinned to the anchor block, always starting at 0
    pub anchor: Range<usize>,
    /// Slots seeded from the previous segment's tail
    pub motion: Range<usize>,
    /// Slots hard-locked to the end target, always ending at `total_slots`
    pub end: Range<usize>,
    prev_slots: usize,
    end_source_slots: usize,
}

impl ZonePlan {
    /// Lay out the zones for a segment.
    ///
    /// # Arguments
    /// * `total_slots` - Segment length `T` (>= 1)
    /// * `anchor_slots` - Temporal length of the anchor block
    /// * `prev_slots` - Temporal length of the previous segment, if any
    /// * `end_slots` - Temporal length of the end target, if any
    /// * `motion_latent_count` - Requested motion tail length
    ///
    /// The anchor takes the earliest slots and is clamped to `T`. The end
    /// lock is clamped to what the anchor leaves. The motion tail only gets
    /// slots between the two, so it shrinks (possibly to zero) first.
    pub fn new(
        total_slots: usize,
        anchor_slots: usize,
        prev_slots: Option<usize>,
        end_slots: Option<usize>,
        motion_latent_count: usize,
    ) -> Self {
        let anchor_len = anchor_slots.min(total_slots);
        let end_len = end_slots.unwrap_or(0).min(total_slots - anchor_len);
        let prev_len = prev_slots.unwrap_or(0);
        let motion_len = motion_latent_count
            .min(prev_len)
            .min(total_slots - anchor_len - end_len);

        Self {
            total_slots,
            anchor: 0..anchor_len,
            motion: anchor_len..anchor_len + motion_len,
            end: total_slots - end_len..total_slots,
            prev_slots: prev_len,
            end_source_slots: end_slots.unwrap_or(0),
        }
    }

    /// Slots left for the sampler to synthesise
    pub fn free(&self) -> Range<usize> {
        self.motion.end..self.end.start
    }

    /// Number of fixed slots across all zones
    pub fn fixed_slots(&self) -> usize {
        self.anchor.len() + self.motion.len() + self.end.len()
    }

    /// Whether slot `t` is pinned by any zone
    pub fn is_fixed(&self, t: usize) -> bool {
        self.anchor.contains(&t) || self.motion.contains(&t) || self.end.contains(&t)
    }

    /// Region writes in application order.
    ///
    /// Later writes overwrite earlier ones, so the end lock always wins over
    /// the motion tail. Empty zones produce no write.
    pub fn writes(&self) -> Vec<SlotCopy> {
        let mut writes = Vec::with_capacity(3);

        if !self.anchor.is_empty() {
            writes.push(SlotCopy {
                source: SlotSource::Anchor,
                from: 0..self.anchor.len(),
                to: self.anchor.clone(),
            });
        }

        if !self.motion.is_empty() {
            let k = self.motion.len();
            writes.push(SlotCopy {
                source: SlotSource::Previous,
                from: self.prev_slots - k..self.prev_slots,
                to: self.motion.clone(),
            });
        }

        if !self.end.is_empty() {
            let e = self.end.len();
            writes.push(SlotCopy {
                source: SlotSource::End,
                from: self.end_source_slots - e..self.end_source_slots,
                to: self.end.clone(),
            });
        }

        writes
    }
}
