//! Segment Composer
//!
//! Builds the concat latent, concat mask and empty sampler latent for one
//! video segment from an anchor block, an optional previous-segment tail and
//! an optional end target:
//! 1. Anchor slots are copied to the start of the segment
//! 2. The last `motion_latent_count` slots of the previous segment follow
//! 3. The last slots of the end target hard-lock the end of the segment
//!
//! Everything else is left free for the sampler.

use burn::prelude::*;

use crate::conditioning::{
    conditioning_set_values, Conditioning, ConditioningEntry, ConditioningValue, CONCAT_LATENT_IMAGE,
    CONCAT_MASK,
};
use crate::config::StitchConfig;
use crate::error::StitchError;
use crate::modules::mask::build_concat_mask;
use crate::modules::shape::LatentShape;
use crate::modules::zones::{latent_slots, SlotSource, ZonePlan};

/// Inputs for one segment
#[derive(Debug, Clone)]
pub struct SegmentRequest<B: Backend> {
    /// Target length in video frames
    pub length: i64,
    /// Anchor latent(s) for this segment [B, C, T_anchor, H, W]
    pub anchor_samples: Tensor<B, 5>,
    /// Previous segment latents [B, C, T_prev, H, W]
    pub prev_samples: Option<Tensor<B, 5>>,
    /// End target latents [B, C, T_end, H, W]
    pub end_samples: Option<Tensor<B, 5>>,
    /// Trailing slots of `prev_samples` to continue motion from (0 = off)
    pub motion_latent_count: i64,
}

impl<B: Backend> SegmentRequest<B> {
    /// Request with an anchor only: 81 frames, one motion slot.
    pub fn new(anchor_samples: Tensor<B, 5>) -> Self {
        Self {
            length: 81,
            anchor_samples,
            prev_samples: None,
            end_samples: None,
            motion_latent_count: 1,
        }
    }

    /// Set the target length in frames
    pub fn with_length(mut self, length: i64) -> Self {
        self.length = length;
        self
    }

    /// Continue motion from a previous segment
    pub fn with_prev(mut self, prev_samples: Tensor<B, 5>) -> Self {
        self.prev_samples = Some(prev_samples);
        self
    }

    /// Hard-lock the end of the segment
    pub fn with_end(mut self, end_samples: Tensor<B, 5>) -> Self {
        self.end_samples = Some(end_samples);
        self
    }

    /// Set how many previous slots seed the motion zone
    pub fn with_motion_latent_count(mut self, count: i64) -> Self {
        self.motion_latent_count = count;
        self
    }
}

/// Everything produced for one segment
#[derive(Debug, Clone)]
pub struct ComposedSegment<B: Backend> {
    /// Positive conditioning with concat latent and mask set
    pub positive: Conditioning<B>,
    /// Negative conditioning with concat latent and mask set
    pub negative: Conditioning<B>,
    /// Zero latent [B, C_out, T, H, W] for the sampler to fill
    pub latent: Tensor<B, 5>,
    /// Composed concat latent [B, C, T, H, W]
    pub concat_latent: Tensor<B, 5>,
    /// Concat mask [B, 1, T, H, W]
    pub concat_mask: Tensor<B, 5>,
    /// Zone layout used to build the segment
    pub plan: ZonePlan,
}

/// Composes segment conditioning according to a [`StitchConfig`]
#[derive(Debug, Clone, Default)]
pub struct SegmentComposer {
    config: StitchConfig,
}

impl SegmentComposer {
    pub fn new(config: StitchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    /// Validate a request and resolve its zone plan without building tensors.
    pub fn plan<B: Backend>(&self, request: &SegmentRequest<B>) -> Result<ZonePlan, StitchError> {
        let stride = self.config.stride()?;
        let total_slots = latent_slots(request.length, stride)?;
        if request.motion_latent_count < 0 {
            return Err(StitchError::NegativeMotionCount(request.motion_latent_count));
        }

        let anchor = LatentShape::of(&request.anchor_samples);
        anchor.require_slots("anchor_samples")?;

        let prev = request.prev_samples.as_ref().map(LatentShape::of);
        if let Some(prev) = &prev {
            anchor.ensure_compatible(prev, "prev_samples")?;
        }
        let end = request.end_samples.as_ref().map(LatentShape::of);
        if let Some(end) = &end {
            anchor.ensure_compatible(end, "end_samples")?;
        }

        if let Some(expected) = self.config.padding_format.channels() {
            if expected != anchor.channels {
                return Err(StitchError::ShapeMismatch(format!(
                    "{:?} padding needs {} channels, anchor_samples has {}",
                    self.config.padding_format, expected, anchor.channels
                )));
            }
        }

        let plan = ZonePlan::new(
            total_slots,
            anchor.time,
            prev.map(|s| s.time),
            end.map(|s| s.time),
            request.motion_latent_count as usize,
        );

        if anchor.time > plan.anchor.len() {
            tracing::warn!(
                anchor_slots = anchor.time,
                total_slots,
                "anchor_samples longer than segment, keeping leading slots"
            );
        }
        if let Some(end) = &end {
            if end.time > plan.end.len() {
                tracing::warn!(
                    end_slots = end.time,
                    locked = plan.end.len(),
                    "end_samples clamped to fit segment"
                );
            }
        }
        if prev.is_some() && (request.motion_latent_count as usize) > plan.motion.len() {
            tracing::warn!(
                requested = request.motion_latent_count,
                applied = plan.motion.len(),
                "motion tail reduced"
            );
        }

        Ok(plan)
    }

    /// Compose one segment.
    ///
    /// # Arguments
    /// * `positive` - Positive conditioning record
    /// * `negative` - Negative conditioning record
    /// * `request` - Segment inputs
    ///
    /// # Returns
    /// Conditioned records, the empty sampler latent and the composed
    /// concat latent/mask. Inputs are never modified.
    pub fn compose<B: Backend>(
        &self,
        positive: &[ConditioningEntry<B>],
        negative: &[ConditioningEntry<B>],
        request: &SegmentRequest<B>,
    ) -> Result<ComposedSegment<B>, StitchError> {
        let plan = self.plan(request)?;

        let anchor = &request.anchor_samples;
        let shape = LatentShape::of(anchor).with_time(plan.total_slots);
        let device = anchor.device();

        let mut concat_latent = self.config.padding_format.padding::<B>(shape.dims(), &device)?;
        for write in plan.writes() {
            let source = match write.source {
                SlotSource::Anchor => Some(anchor),
                SlotSource::Previous => request.prev_samples.as_ref(),
                SlotSource::End => request.end_samples.as_ref(),
            };
            // plans only emit writes for sources that are present
            let Some(source) = source else { continue };
            let block = source.clone().slice(LatentShape::of(source).ranges(write.from));
            concat_latent = concat_latent.slice_assign(shape.ranges(write.to), block);
        }

        let concat_mask = build_concat_mask::<B>(
            &plan,
            shape.batch,
            shape.height,
            shape.width,
            &self.config.mask_polarity,
            &device,
        );

        let out_channels = self.config.output_channels.unwrap_or(shape.channels);
        let latent = Tensor::zeros(
            [shape.batch, out_channels, plan.total_slots, shape.height, shape.width],
            &device,
        );

        let values = [
            (CONCAT_LATENT_IMAGE, ConditioningValue::Tensor(concat_latent.clone())),
            (CONCAT_MASK, ConditioningValue::Tensor(concat_mask.clone())),
        ];
        let positive = conditioning_set_values(positive, &values);
        let negative = conditioning_set_values(negative, &values);

        tracing::debug!(
            total_slots = plan.total_slots,
            anchor = ?plan.anchor,
            motion = ?plan.motion,
            end = ?plan.end,
            free = ?plan.free(),
            "composed segment"
        );

        Ok(ComposedSegment {
            positive,
            negative,
            latent,
            concat_latent,
            concat_mask,
            plan,
        })
    }
}

/// Compose one segment with the default configuration.
///
/// Returns the updated positive and negative conditioning and a zero latent
/// of shape [B, C, T, H, W] with `T = (length - 1) / 4 + 1`.
pub fn compose_segment<B: Backend>(
    positive: &[ConditioningEntry<B>],
    negative: &[ConditioningEntry<B>],
    length: i64,
    prev_samples: Option<Tensor<B, 5>>,
    anchor_samples: Tensor<B, 5>,
    end_samples: Option<Tensor<B, 5>>,
    motion_latent_count: i64,
) -> Result<(Conditioning<B>, Conditioning<B>, Tensor<B, 5>), StitchError> {
    let request = SegmentRequest {
        length,
        anchor_samples,
        prev_samples,
        end_samples,
        motion_latent_count,
    };
    let segment = SegmentComposer::default().compose(positive, negative, &request)?;
    Ok((segment.positive, segment.negative, segment.latent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::latent_format::LatentFormat;
    use crate::modules::mask::{slot_values, MaskPolarity};
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;
    type TestDevice = <TestBackend as Backend>::Device;

    /// [1, 1, T, 1, 1] latent whose slot t holds `base + t`
    fn ramp(time: usize, base: f32, device: &TestDevice) -> Tensor<TestBackend, 5> {
        let values: Vec<f32> = (0..time).map(|t| base + t as f32).collect();
        Tensor::<TestBackend, 1>::from_floats(values.as_slice(), device).reshape([1, 1, time, 1, 1])
    }

    fn slots(tensor: Tensor<TestBackend, 5>) -> Vec<f32> {
        tensor.into_data().to_vec::<f32>().unwrap()
    }

    fn text_cond(device: &TestDevice) -> Conditioning<TestBackend> {
        vec![ConditioningEntry::new(Tensor::zeros([1, 2, 4], device))]
    }

    #[test]
    fn test_compose_reference_scenario() {
        let device = Default::default();
        let request = SegmentRequest::new(ramp(1, 100.0, &device))
            .with_length(81)
            .with_prev(ramp(6, 10.0, &device))
            .with_end(ramp(1, 200.0, &device))
            .with_motion_latent_count(2);

        let segment = SegmentComposer::default()
            .compose(&text_cond(&device), &text_cond(&device), &request)
            .unwrap();

        let mut expected_latent = vec![0.0; 21];
        expected_latent[0] = 100.0;
        expected_latent[1] = 14.0;
        expected_latent[2] = 15.0;
        expected_latent[20] = 200.0;
        assert_eq!(slots(segment.concat_latent), expected_latent);

        let mut expected_mask = vec![0.0; 21];
        for t in [0, 1, 2, 20] {
            expected_mask[t] = 1.0;
        }
        assert_eq!(slot_values(segment.concat_mask), expected_mask);

        assert_eq!(segment.latent.dims(), [1, 1, 21, 1, 1]);
        assert!(slots(segment.latent).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_conditioning_receives_concat_values() {
        let device = Default::default();
        let request = SegmentRequest::new(ramp(1, 1.0, &device)).with_length(9);

        let segment = SegmentComposer::default()
            .compose(&text_cond(&device), &text_cond(&device), &request)
            .unwrap();

        for entry in segment.positive.iter().chain(segment.negative.iter()) {
            assert_eq!(entry.concat_latent().map(|t| t.dims()), Some([1, 1, 3, 1, 1]));
            assert_eq!(entry.concat_mask().map(|t| t.dims()), Some([1, 1, 3, 1, 1]));
        }
    }

    #[test]
    fn test_without_end_samples_tail_is_free() {
        let device = Default::default();
        let request = SegmentRequest::new(ramp(1, 1.0, &device))
            .with_length(17)
            .with_prev(ramp(3, 5.0, &device))
            .with_motion_latent_count(1);

        let segment = SegmentComposer::default().compose(&[], &[], &request).unwrap();

        assert_eq!(slots(segment.concat_latent), vec![1.0, 7.0, 0.0, 0.0, 0.0]);
        assert_eq!(slot_values(segment.concat_mask), vec![1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_short_segment_end_wins_over_motion() {
        let device = Default::default();
        // T = 3: anchor 1, end 2 leaves nothing for motion
        let request = SegmentRequest::new(ramp(1, 1.0, &device))
            .with_length(9)
            .with_prev(ramp(4, 10.0, &device))
            .with_end(ramp(2, 50.0, &device))
            .with_motion_latent_count(2);

        let segment = SegmentComposer::default().compose(&[], &[], &request).unwrap();

        assert!(segment.plan.motion.is_empty());
        assert_eq!(slots(segment.concat_latent), vec![1.0, 50.0, 51.0]);
    }

    #[test]
    fn test_batch_mismatch_rejected() {
        let device = Default::default();
        let anchor = Tensor::<TestBackend, 5>::zeros([2, 1, 1, 1, 1], &device);
        let request = SegmentRequest::new(anchor).with_end(ramp(1, 0.0, &device));

        let result = SegmentComposer::default().compose(&[], &[], &request);
        assert!(matches!(result, Err(StitchError::ShapeMismatch(_))));
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        let device = Default::default();
        let composer = SegmentComposer::default();

        let request = SegmentRequest::new(ramp(1, 0.0, &device)).with_length(0);
        assert_eq!(composer.plan(&request), Err(StitchError::InvalidLength(0)));

        let request = SegmentRequest::new(ramp(1, 0.0, &device)).with_motion_latent_count(-1);
        assert_eq!(composer.plan(&request), Err(StitchError::NegativeMotionCount(-1)));
    }

    #[test]
    fn test_wan_sampler_config() {
        let device = Default::default();
        let anchor = Tensor::<TestBackend, 5>::ones([1, 16, 1, 2, 2], &device);
        let request = SegmentRequest::new(anchor).with_length(9);

        let composer = SegmentComposer::new(StitchConfig::wan_sampler());
        let segment = composer.compose(&[], &[], &request).unwrap();

        assert_eq!(slot_values(segment.concat_mask), vec![0.0, 1.0, 1.0]);
        assert_eq!(segment.latent.dims(), [1, 16, 3, 2, 2]);

        // free slots hold the per-channel Wan 2.1 mean
        let free = segment.concat_latent.slice([0..1, 0..1, 1..3, 0..1, 0..1]);
        let expected = crate::modules::latent_format::WAN21_LATENTS_MEAN[0];
        assert!(slots(free).iter().all(|v| (v - expected).abs() < 1e-6));
    }

    #[test]
    fn test_wan_padding_rejects_other_channel_counts() {
        let device = Default::default();
        let composer =
            SegmentComposer::new(StitchConfig::new().with_padding_format(LatentFormat::Wan21));
        let request = SegmentRequest::new(ramp(1, 0.0, &device));
        assert!(matches!(composer.plan(&request), Err(StitchError::ShapeMismatch(_))));
    }

    #[test]
    fn test_inputs_untouched() {
        let device = Default::default();
        let prev = ramp(4, 10.0, &device);
        let anchor = ramp(1, 1.0, &device);
        let request = SegmentRequest::new(anchor.clone())
            .with_prev(prev.clone())
            .with_motion_latent_count(2);

        SegmentComposer::new(StitchConfig::new().with_mask_polarity(MaskPolarity::FixedIsZero))
            .compose(&[], &[], &request)
            .unwrap();

        assert_eq!(slots(prev), vec![10.0, 11.0, 12.0, 13.0]);
        assert_eq!(slots(anchor), vec![1.0]);
    }

    #[test]
    fn test_compose_segment_entry_point() {
        let device = Default::default();
        let (positive, negative, latent) = compose_segment(
            &text_cond(&device),
            &text_cond(&device),
            41,
            None,
            ramp(1, 0.0, &device),
            None,
            0,
        )
        .unwrap();

        assert_eq!(latent.dims(), [1, 1, 11, 1, 1]);
        assert_eq!(positive.len(), 1);
        assert!(negative[0].concat_mask().is_some());
    }
}
