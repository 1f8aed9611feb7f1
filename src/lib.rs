//! Wan Video Segment Stitching in Burn
//!
//! Long videos are generated segment by segment. Each segment is conditioned
//! on latent content that pins its start, continues the motion of the
//! previous segment, and optionally pins its end. This crate assembles that
//! conditioning in latent space; sampling, encoding and decoding happen
//! elsewhere.
//!
//! ## Components
//!
//! - **Segment Composer**: lays out anchor, motion-tail and end-lock zones
//!   along the time axis of a [B, C, T, H, W] latent and builds the matching
//!   concat mask
//! - **Tail Trimmer**: drops trailing slots from a finished segment before it
//!   is reused as the next segment's `prev_samples`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wan_stitch_burn::{trim_tail, SegmentComposer, SegmentRequest, StitchConfig};
//!
//! let composer = SegmentComposer::new(StitchConfig::wan_sampler());
//!
//! let request = SegmentRequest::new(anchor)
//!     .with_length(81)
//!     .with_prev(prev)
//!     .with_end(end)
//!     .with_motion_latent_count(2);
//! let segment = composer.compose(&positive, &negative, &request)?;
//!
//! // ... sample with segment.positive / segment.negative / segment.latent ...
//!
//! // Drop the hard-locked end slot before continuing from this segment
//! let prev = trim_tail(sampled, 1)?;
//! ```

pub mod composer;
pub mod conditioning;
pub mod config;
pub mod error;
pub mod modules;
pub mod trim;

// Re-export main types
pub use composer::{compose_segment, ComposedSegment, SegmentComposer, SegmentRequest};
pub use conditioning::{
    conditioning_set_values, Conditioning, ConditioningEntry, ConditioningValue, CONCAT_LATENT_IMAGE,
    CONCAT_MASK,
};
pub use config::{StitchConfig, WAN_LATENT_CHANNELS, WAN_TEMPORAL_STRIDE};
pub use error::StitchError;
pub use modules::latent_format::LatentFormat;
pub use modules::mask::MaskPolarity;
pub use modules::shape::LatentShape;
pub use modules::zones::{frames_for_slots, latent_slots, SlotCopy, SlotSource, ZonePlan};
pub use trim::{trim_tail, trimmed_slots};
