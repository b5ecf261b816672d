//! Image preprocessing for the classification pipeline.

use crate::{Result, Tensor};

/// Default target size for the layer stack input.
pub const DEFAULT_TARGET_SIZE: (usize, usize) = (224, 224);

const PIXEL_MAX: f32 = 255.0;

/// Stateless preprocessing: resize to a fixed shape, then scale samples
/// from the native `[0, 255]` pixel range into `[0, 1]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Preprocessor;

impl Preprocessor {
    /// Scales every sample by `1 / 255`. No clipping: out-of-range input
    /// propagates as scaled out-of-`[0, 1]` values.
    pub fn normalize(image: &Tensor) -> Tensor {
        Tensor::new(image.data().mapv(|v| v / PIXEL_MAX))
    }

    /// Produces a tensor of shape `(target_height, target_width, channels)`,
    /// preserving the input's channel count (1 if it has no channel axis).
    ///
    /// Simplified resize: the flattened source buffer is re-tiled cyclically
    /// into the target shape instead of interpolated. Only the output shape
    /// is contractual. An empty source fills with zeros.
    pub fn resize(image: &Tensor, target_height: usize, target_width: usize) -> Result<Tensor> {
        let shape = image.shape();
        let channels = if shape.len() > 2 { shape[2] } else { 1 };
        let total = target_height * target_width * channels;

        let source = image.to_vec();
        let data = if source.is_empty() {
            vec![0.0; total]
        } else {
            source.iter().copied().cycle().take(total).collect()
        };

        Tensor::from_vec(data, &[target_height, target_width, channels])
    }

    /// Resize then normalize, in that order.
    pub fn preprocess(image: &Tensor, target_size: (usize, usize)) -> Result<Tensor> {
        let resized = Self::resize(image, target_size.0, target_size.1)?;
        Ok(Self::normalize(&resized))
    }
}
