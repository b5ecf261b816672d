use crate::{Error, Result, Tensor};
use ndarray::{Axis, Zip};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Identity,
    ReLU,
    Softmax,
}

impl Activation {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "identity" | "none" => Ok(Activation::Identity),
            "relu" => Ok(Activation::ReLU),
            "softmax" => Ok(Activation::Softmax),
            _ => Err(Error::UnsupportedActivation(s.to_string())),
        }
    }

    pub fn apply(&self, tensor: &mut Tensor) -> Result<()> {
        match self {
            Activation::Identity => Ok(()),
            Activation::ReLU => {
                Zip::from(tensor.data_mut()).for_each(|x| {
                    *x = x.max(0.0);
                });
                Ok(())
            }
            Activation::Softmax => self.apply_softmax(tensor),
        }
    }

    /// Numerically stable softmax over the trailing axis: subtract the
    /// per-position maximum before exponentiating, then normalize.
    fn apply_softmax(&self, tensor: &mut Tensor) -> Result<()> {
        let data = tensor.data_mut();
        if data.ndim() == 0 {
            return Ok(());
        }

        let axis = Axis(data.ndim() - 1);
        for mut lane in data.lanes_mut(axis) {
            let max_val = lane.iter().copied().fold(f32::NEG_INFINITY, f32::max);

            let mut sum = 0.0;
            for x in lane.iter_mut() {
                *x = (*x - max_val).exp();
                sum += *x;
            }

            for x in lane.iter_mut() {
                *x /= sum;
            }
        }

        Ok(())
    }
}
