//! Segment stitching building blocks

pub mod latent_format;
pub mod mask;
pub mod shape;
pub mod zones;

pub use mask::{build_concat_mask, MaskPolarity};
pub use zones::{SlotCopy, SlotSource, ZonePlan};
