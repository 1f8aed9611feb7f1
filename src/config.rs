//! Segment stitching configuration

use burn::config::Config;

use crate::error::StitchError;
use crate::modules::latent_format::LatentFormat;
use crate::modules::mask::MaskPolarity;

/// Wan video latents advance one temporal slot every 4 frames.
pub const WAN_TEMPORAL_STRIDE: usize = 4;

/// Number of latent channels produced by the Wan 2.1 VAE.
pub const WAN_LATENT_CHANNELS: usize = 16;

/// Configuration shared by the segment composer and the tail trimmer
#[derive(Config, Debug)]
pub struct StitchConfig {
    /// Real video frames per latent time slot (default: 4)
    #[config(default = 4)]
    pub temporal_stride: usize,

    /// How fixed slots are encoded in the concat mask (default: 1 = fixed)
    #[config(default = "MaskPolarity::FixedIsOne")]
    pub mask_polarity: MaskPolarity,

    /// Values written into free slots of the concat latent (default: zeros)
    #[config(default = "LatentFormat::Raw")]
    pub padding_format: LatentFormat,

    /// Channel count of the empty sampler latent. `None` reuses the anchor's.
    pub output_channels: Option<usize>,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StitchConfig {
    /// Settings matching what the Wan 2.x image-to-video sampler consumes:
    /// zero-marks-fixed mask, Wan 2.1 formatted padding, 16-channel latent.
    pub fn wan_sampler() -> Self {
        Self::new()
            .with_mask_polarity(MaskPolarity::FixedIsZero)
            .with_padding_format(LatentFormat::Wan21)
            .with_output_channels(Some(WAN_LATENT_CHANNELS))
    }

    /// Check the stride and return it.
    pub fn stride(&self) -> Result<usize, StitchError> {
        if self.temporal_stride == 0 {
            return Err(StitchError::InvalidStride(self.temporal_stride));
        }
        Ok(self.temporal_stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StitchConfig::default();
        assert_eq!(config.temporal_stride, WAN_TEMPORAL_STRIDE);
        assert_eq!(config.mask_polarity, MaskPolarity::FixedIsOne);
        assert_eq!(config.padding_format, LatentFormat::Raw);
        assert_eq!(config.output_channels, None);
    }

    #[test]
    fn test_wan_sampler_preset() {
        let config = StitchConfig::wan_sampler();
        assert_eq!(config.mask_polarity, MaskPolarity::FixedIsZero);
        assert_eq!(config.padding_format, LatentFormat::Wan21);
        assert_eq!(config.output_channels, Some(16));
    }

    #[test]
    fn test_zero_stride_rejected() {
        let config = StitchConfig::new().with_temporal_stride(0);
        assert_eq!(config.stride(), Err(StitchError::InvalidStride(0)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("stitch_config_{}.json", std::process::id()));
        let config = StitchConfig::wan_sampler().with_temporal_stride(8);
        config.save(&path).unwrap();

        let loaded = StitchConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.temporal_stride, 8);
        assert_eq!(loaded.mask_polarity, MaskPolarity::FixedIsZero);
        assert_eq!(loaded.padding_format, LatentFormat::Wan21);
        assert_eq!(loaded.output_channels, Some(16));
    }
}
