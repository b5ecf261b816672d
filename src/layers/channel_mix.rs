use crate::{activations::Activation, Error, Result, Tensor};
use ndarray::{Array1, Array2, ArrayD, Axis, IxDyn, Zip};
use rand::Rng;
use rand_distr::Normal;

/// Fixed per-layer mixing coefficient applied to the trailing-axis sum.
const MIX_COEFF: f32 = 0.1;

/// Scale applied to unit-normal samples when materializing weights.
const WEIGHT_SCALE: f32 = 0.1;

/// Parameter state of a [`ChannelMix`] layer.
///
/// A layer is built with hyperparameters only and holds no numbers until the
/// owning model builder materializes them. Once `Ready`, parameters are
/// frozen for the layer's lifetime.
#[derive(Debug, Clone)]
pub enum Params {
    Uninitialized,
    Ready {
        /// `[output_channels, input_channels]`
        weights: Array2<f32>,
        /// `[output_channels]`
        bias: Array1<f32>,
    },
}

/// Channel-mixing projection layer.
///
/// Maps `(..., input_channels)` to `(..., output_channels)` and applies an
/// activation. The transform is a coarse stand-in for a spatial convolution:
/// each output channel sees the input's trailing-axis sum scaled by a fixed
/// coefficient, plus its bias. `kernel_extent` is informational only.
#[derive(Debug, Clone)]
pub struct ChannelMix {
    name: String,
    output_channels: usize,
    kernel_extent: usize,
    activation: Activation,
    params: Params,
}

impl ChannelMix {
    pub fn new(
        name: String,
        output_channels: usize,
        kernel_extent: usize,
        activation: Activation,
    ) -> Result<Self> {
        if output_channels == 0 {
            return Err(Error::Config(format!(
                "Layer {}: output_channels must be greater than 0",
                name
            )));
        }

        if kernel_extent == 0 {
            return Err(Error::Config(format!(
                "Layer {}: kernel_extent must be greater than 0",
                name
            )));
        }

        Ok(Self {
            name,
            output_channels,
            kernel_extent,
            activation,
            params: Params::Uninitialized,
        })
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    pub fn kernel_extent(&self) -> usize {
        self.kernel_extent
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Input channel count the materialized weights expect, if any.
    pub fn input_channels(&self) -> Option<usize> {
        match &self.params {
            Params::Uninitialized => None,
            Params::Ready { weights, .. } => Some(weights.ncols()),
        }
    }

    /// Materializes weights (0.1 x unit-normal) and a zero bias for the
    /// given input channel count. Parameters are frozen afterwards;
    /// initializing twice is a configuration error.
    pub fn initialize<R: Rng>(&mut self, input_channels: usize, rng: &mut R) -> Result<()> {
        if matches!(self.params, Params::Ready { .. }) {
            return Err(Error::Config(format!(
                "Layer {} is already initialized",
                self.name
            )));
        }

        if input_channels == 0 {
            return Err(Error::Config(format!(
                "Layer {}: input_channels must be greater than 0",
                self.name
            )));
        }

        let normal = Normal::new(0.0f32, 1.0)
            .map_err(|e| Error::Config(format!("Invalid weight distribution: {}", e)))?;

        let weights = Array2::from_shape_fn((self.output_channels, input_channels), |_| {
            rng.sample(normal) * WEIGHT_SCALE
        });
        let bias = Array1::zeros(self.output_channels);

        self.params = Params::Ready { weights, bias };
        Ok(())
    }

    /// Injects explicit parameters instead of random materialization.
    pub fn set_params(&mut self, weights: Array2<f32>, bias: Array1<f32>) -> Result<()> {
        if matches!(self.params, Params::Ready { .. }) {
            return Err(Error::Config(format!(
                "Layer {} is already initialized",
                self.name
            )));
        }

        if weights.nrows() != self.output_channels {
            return Err(Error::ShapeMismatch {
                expected: vec![self.output_channels],
                actual: vec![weights.nrows()],
            });
        }

        if bias.len() != self.output_channels {
            return Err(Error::ShapeMismatch {
                expected: vec![self.output_channels],
                actual: vec![bias.len()],
            });
        }

        self.params = Params::Ready { weights, bias };
        Ok(())
    }
}

impl super::Layer for ChannelMix {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let Params::Ready { weights, bias } = &self.params else {
            return Err(Error::Layer(format!(
                "Layer {} has no materialized parameters",
                self.name
            )));
        };

        let shape = input.shape();
        if shape.is_empty() {
            return Err(Error::Layer(format!(
                "Layer {} expects at least rank-1 input, got a scalar",
                self.name
            )));
        }

        let input_channels = shape[shape.len() - 1];
        if input_channels != weights.ncols() {
            return Err(Error::ShapeMismatch {
                expected: vec![weights.ncols()],
                actual: vec![input_channels],
            });
        }

        let last = shape.len() - 1;
        let summed = input.data().sum_axis(Axis(last));

        let mut out_shape = shape.to_vec();
        out_shape[last] = self.output_channels;
        let mut output = ArrayD::<f32>::zeros(IxDyn(&out_shape));

        for (c, mut channel) in output.axis_iter_mut(Axis(last)).enumerate() {
            let b = bias[c];
            Zip::from(&mut channel).and(&summed).for_each(|out, &s| {
                *out = s * MIX_COEFF + b;
            });
        }

        let mut tensor = Tensor::new(output);
        self.activation.apply(&mut tensor)?;

        Ok(tensor)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>> {
        if input_shape.is_empty() {
            return Err(Error::Layer(format!(
                "Layer {} expects at least rank-1 input, got a scalar",
                self.name
            )));
        }

        let mut shape = input_shape.to_vec();
        let last = shape.len() - 1;
        shape[last] = self.output_channels;
        Ok(shape)
    }
}
