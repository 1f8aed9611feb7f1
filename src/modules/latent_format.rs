//! Latent normalisation formats
//!
//! The Wan 2.1 VAE stores latents whitened per channel. Padding slots must be
//! written in the same space the sampler reads, so zero padding for Wan is
//! `process_out(0)`, i.e. the per-channel mean.

use burn::config::Config;
use burn::prelude::*;

use crate::error::StitchError;

/// Per-channel latent mean of the Wan 2.1 VAE
pub const WAN21_LATENTS_MEAN: [f32; 16] = [
    -0.7571, -0.7089, -0.9113, 0.1075, -0.1745, 0.9653, -0.1517, 1.5508,
    0.4134, -0.0715, 0.5517, -0.3632, -0.1922, -0.9497, 0.2503, -0.2921,
];

/// Per-channel latent standard deviation of the Wan 2.1 VAE
pub const WAN21_LATENTS_STD: [f32; 16] = [
    2.8184, 1.4541, 2.3275, 2.6558, 1.2196, 1.7708, 2.6052, 2.0743,
    3.2687, 2.1526, 2.8652, 1.5579, 1.6382, 1.1253, 2.8251, 1.9160,
];

/// Latent space convention used for padding and format conversion
#[derive(Config, Debug, PartialEq, Eq)]
pub enum LatentFormat {
    /// Values are used as-is; padding is 0.0
    Raw,
    /// Wan 2.1 VAE statistics (16 channels, scale factor 1.0)
    Wan21,
}

impl LatentFormat {
    /// Channel count this format is defined for, if it is fixed
    pub fn channels(&self) -> Option<usize> {
        match self {
            LatentFormat::Raw => None,
            LatentFormat::Wan21 => Some(WAN21_LATENTS_MEAN.len()),
        }
    }

    fn check_channels(&self, channels: usize) -> Result<(), StitchError> {
        match self.channels() {
            Some(expected) if expected != channels => Err(StitchError::ShapeMismatch(format!(
                "{:?} latents have {} channels, tensor has {}",
                self, expected, channels
            ))),
            _ => Ok(()),
        }
    }

    /// Broadcastable [1, C, 1, 1, 1] mean and std tensors
    fn stats<B: Backend>(&self, device: &B::Device) -> Option<(Tensor<B, 5>, Tensor<B, 5>)> {
        match self {
            LatentFormat::Raw => None,
            LatentFormat::Wan21 => {
                let c = WAN21_LATENTS_MEAN.len();
                let mean = Tensor::<B, 1>::from_floats(WAN21_LATENTS_MEAN, device)
                    .reshape([1, c, 1, 1, 1]);
                let std = Tensor::<B, 1>::from_floats(WAN21_LATENTS_STD, device)
                    .reshape([1, c, 1, 1, 1]);
                Some((mean, std))
            }
        }
    }

    /// Map raw VAE latents into the sampler's normalised space
    pub fn process_in<B: Backend>(&self, latent: Tensor<B, 5>) -> Result<Tensor<B, 5>, StitchError> {
        let [_, channels, _, _, _] = latent.dims();
        self.check_channels(channels)?;
        match self.stats::<B>(&latent.device()) {
            None => Ok(latent),
            Some((mean, std)) => Ok((latent - mean) / std),
        }
    }

    /// Map normalised latents back to raw VAE space
    pub fn process_out<B: Backend>(&self, latent: Tensor<B, 5>) -> Result<Tensor<B, 5>, StitchError> {
        let [_, channels, _, _, _] = latent.dims();
        self.check_channels(channels)?;
        match self.stats::<B>(&latent.device()) {
            None => Ok(latent),
            Some((mean, std)) => Ok(latent * std + mean),
        }
    }

    /// A block of "empty" latent slots in this format
    pub fn padding<B: Backend>(
        &self,
        shape: [usize; 5],
        device: &B::Device,
    ) -> Result<Tensor<B, 5>, StitchError> {
        self.process_out(Tensor::zeros(shape, device))
    }
}
