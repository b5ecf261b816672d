use crate::{layers::Layer, Error, Result, Tensor};

/// Ordered stack of layers; the forward pass threads a tensor through each
/// layer in declaration order.
///
/// Channel-count consistency between adjacent layers is a precondition of
/// whoever builds the stack; it is not re-checked here. An incompatible
/// layer fails with a shape error that propagates to the caller.
#[derive(Debug)]
pub struct Sequential {
    name: String,
    layers: Vec<Box<dyn Layer>>,
    input_shape: Option<Vec<usize>>,
}

impl Sequential {
    pub fn new(name: String) -> Self {
        Self {
            name,
            layers: Vec::new(),
            input_shape: None,
        }
    }

    pub fn add(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
    }

    pub fn set_input_shape(&mut self, shape: Vec<usize>) {
        self.input_shape = Some(shape);
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        if self.layers.is_empty() {
            return Err(Error::Config(
                "Cannot run forward on an empty model".to_string(),
            ));
        }

        let mut current = input.clone();

        for (idx, layer) in self.layers.iter().enumerate() {
            current = layer
                .forward(&current)
                .map_err(|e| Error::Layer(format!("Layer {} ({}): {}", idx, layer.name(), e)))?;
        }

        Ok(current)
    }

    pub fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>> {
        let mut current_shape = input_shape.to_vec();

        for layer in &self.layers {
            current_shape = layer.output_shape(&current_shape)?;
        }

        Ok(current_shape)
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Model: {}\n", self.name));
        s.push_str("_________________________________________________________________\n");
        s.push_str("Layer (type)                 Output Shape              \n");
        s.push_str("=================================================================\n");

        let mut current_shape = self.input_shape.clone().unwrap_or_default();

        for layer in &self.layers {
            if !current_shape.is_empty() {
                current_shape = match layer.output_shape(&current_shape) {
                    Ok(shape) => shape,
                    Err(_) => vec![],
                };
            }

            s.push_str(&format!("{:28} {:?}\n", layer.name(), current_shape));
        }

        s.push_str("=================================================================\n");
        s.push_str(&format!("Total layers: {}\n", self.layers.len()));

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{activations::Activation, layers::ChannelMix};
    use ndarray::Array2;

    fn fixed_layer(name: &str, in_ch: usize, out_ch: usize, activation: Activation) -> ChannelMix {
        let mut layer = ChannelMix::new(name.to_string(), out_ch, 3, activation).unwrap();
        layer
            .set_params(
                Array2::zeros((out_ch, in_ch)),
                ndarray::Array1::zeros(out_ch),
            )
            .unwrap();
        layer
    }

    #[test]
    fn test_sequential_forward() {
        let mut model = Sequential::new("test_model".to_string());
        model.add(Box::new(fixed_layer("mix1", 2, 3, Activation::ReLU)));
        model.add(Box::new(fixed_layer("mix2", 3, 1, Activation::Identity)));

        let input = Tensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let output = model.forward(&input).unwrap();

        assert_eq!(output.shape(), &[1]);
        // 0.3 per channel after mix1, summed to 0.9, mixed again
        let result = output.to_vec();
        assert!((result[0] - 0.09).abs() < 1e-6);
    }

    #[test]
    fn test_sequential_empty_model_fails() {
        let model = Sequential::new("empty".to_string());
        let input = Tensor::from_vec(vec![1.0], &[1]).unwrap();
        assert!(model.forward(&input).is_err());
    }

    #[test]
    fn test_sequential_propagates_shape_error() {
        let mut model = Sequential::new("test_model".to_string());
        model.add(Box::new(fixed_layer("mix1", 2, 3, Activation::Identity)));

        let input = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let result = model.forward(&input);
        assert!(result.is_err());
    }

    #[test]
    fn test_sequential_output_shape() {
        let mut model = Sequential::new("test_model".to_string());
        model.add(Box::new(fixed_layer("mix1", 3, 32, Activation::ReLU)));
        model.add(Box::new(fixed_layer("mix2", 32, 10, Activation::Softmax)));

        let shape = model.output_shape(&[224, 224, 3]).unwrap();
        assert_eq!(shape, vec![224, 224, 10]);
    }

    #[test]
    fn test_summary_lists_layers() {
        let mut model = Sequential::new("test_model".to_string());
        model.add(Box::new(fixed_layer("mix1", 2, 3, Activation::ReLU)));
        model.set_input_shape(vec![4, 4, 2]);

        let summary = model.summary();
        assert!(summary.contains("test_model"));
        assert!(summary.contains("mix1"));
        assert!(summary.contains("Total layers: 1"));
    }
}
