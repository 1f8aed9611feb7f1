//! Concatenation mask construction

use burn::config::Config;
use burn::prelude::*;

use super::zones::ZonePlan;

/// Encoding of "fixed" vs "free" slots in the concat mask
#[derive(Config, Debug, PartialEq, Eq)]
pub enum MaskPolarity {
    /// 1.0 marks provided content, 0.0 marks slots left to the sampler
    FixedIsOne,
    /// 0.0 marks provided content (the Wan / SVI Pro sampler convention)
    FixedIsZero,
}

impl MaskPolarity {
    /// Mask value of a fixed slot
    pub fn fixed_value(&self) -> f32 {
        match self {
            MaskPolarity::FixedIsOne => 1.0,
            MaskPolarity::FixedIsZero => 0.0,
        }
    }

    /// Mask value of a free slot
    pub fn free_value(&self) -> f32 {
        1.0 - self.fixed_value()
    }
}

/// Build a [batch, 1, T, height, width] mask for `plan`.
///
/// Every slot written by the plan is marked fixed; the rest stay free.
/// The channel axis is a singleton and broadcasts against the latent.
pub fn build_concat_mask<B: Backend>(
    plan: &ZonePlan,
    batch: usize,
    height: usize,
    width: usize,
    polarity: &MaskPolarity,
    device: &B::Device,
) -> Tensor<B, 5> {
    let mut mask = Tensor::<B, 5>::zeros([batch, 1, plan.total_slots, height, width], device);

    for write in plan.writes() {
        let ones = Tensor::ones([batch, 1, write.to.len(), height, width], device);
        mask = mask.slice_assign([0..batch, 0..1, write.to, 0..height, 0..width], ones);
    }

    match polarity {
        MaskPolarity::FixedIsOne => mask,
        MaskPolarity::FixedIsZero => mask.ones_like() - mask,
    }
}

/// Per-slot mask values of the first batch/pixel, for inspection and tests
pub fn slot_values<B: Backend>(mask: Tensor<B, 5>) -> Vec<f32> {
    let [_, _, time, _, _] = mask.dims();
    mask.slice([0..1, 0..1, 0..time, 0..1, 0..1])
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .unwrap_or_default()
}
