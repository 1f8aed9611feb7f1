//! Latent shape bookkeeping and compatibility checks

use burn::prelude::*;

use crate::error::StitchError;

/// Named view of a [batch, channels, time, height, width] latent shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatentShape {
    pub batch: usize,
    pub channels: usize,
    pub time: usize,
    pub height: usize,
    pub width: usize,
}

impl LatentShape {
    pub fn of<B: Backend>(tensor: &Tensor<B, 5>) -> Self {
        let [batch, channels, time, height, width] = tensor.dims();
        Self {
            batch,
            channels,
            time,
            height,
            width,
        }
    }

    pub fn dims(&self) -> [usize; 5] {
        [self.batch, self.channels, self.time, self.height, self.width]
    }

    /// Same shape with a different temporal length
    pub fn with_time(self, time: usize) -> Self {
        Self { time, ..self }
    }

    /// Full index ranges over every axis except time
    pub fn ranges(&self, time: std::ops::Range<usize>) -> [std::ops::Range<usize>; 5] {
        [0..self.batch, 0..self.channels, time, 0..self.height, 0..self.width]
    }

    /// Fail if the tensor has no temporal slots.
    pub fn require_slots(&self, name: &str) -> Result<(), StitchError> {
        if self.time == 0 {
            return Err(StitchError::ShapeMismatch(format!(
                "{} has no temporal slots",
                name
            )));
        }
        Ok(())
    }

    /// Check that `other` can be copied slot-by-slot into a latent shaped like `self`.
    ///
    /// Batch, channel and spatial axes must agree; time may differ.
    pub fn ensure_compatible(&self, other: &LatentShape, name: &str) -> Result<(), StitchError> {
        let axes = [
            ("batch", self.batch, other.batch),
            ("channel", self.channels, other.channels),
            ("height", self.height, other.height),
            ("width", self.width, other.width),
        ];
        for (axis, expected, found) in axes {
            if expected != found {
                return Err(StitchError::ShapeMismatch(format!(
                    "{} {} size {} does not match anchor_samples ({})",
                    name, axis, found, expected
                )));
            }
        }
        Ok(())
    }
}
