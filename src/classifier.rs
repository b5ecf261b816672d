//! Image classifier: preprocessing, the layer stack, and ranked predictions.

use crate::{
    activations::Activation,
    clock::{Clock, SystemClock},
    layers::ChannelMix,
    model::Sequential,
    preprocess::{Preprocessor, DEFAULT_TARGET_SIZE},
    ranking::top_k,
    Error, Result, Tensor,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

/// Label reported when the argmax index falls outside the class table.
const UNKNOWN_CLASS: &str = "Unknown";

/// Default class table; index `i` names the class of output channel `i`.
pub const DEFAULT_CLASSES: [&str; 10] = [
    "Airplane",
    "Automobile",
    "Bird",
    "Cat",
    "Deer",
    "Dog",
    "Frog",
    "Horse",
    "Ship",
    "Truck",
];

/// A single classification result. Immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub class_name: String,
    pub confidence: f32,
    /// RFC 3339 instant at which the prediction was made.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionSummary {
    pub class: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub num_classes: usize,
    pub architecture: String,
    pub layers: usize,
}

/// Structured report produced by [`ImageClassifier::analyze_image`].
#[derive(Debug, Clone, Serialize)]
pub struct ImageAnalysis {
    pub primary_prediction: PredictionSummary,
    pub all_predictions: Vec<PredictionSummary>,
    pub model_info: ModelInfo,
    pub timestamp: String,
}

impl ImageAnalysis {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for [`ImageClassifier`].
///
/// All parameters have defaults matching the stock ten-class setup. Layer
/// parameters are materialized here, before any forward pass, so a built
/// classifier is immutable.
pub struct ImageClassifierBuilder {
    num_classes: usize,
    classes: Vec<String>,
    input_channels: usize,
    target_size: (usize, usize),
    seed: Option<u64>,
    clock: Box<dyn Clock>,
}

impl Default for ImageClassifierBuilder {
    fn default() -> Self {
        Self {
            num_classes: DEFAULT_CLASSES.len(),
            classes: DEFAULT_CLASSES.iter().map(|s| s.to_string()).collect(),
            input_channels: 3,
            target_size: DEFAULT_TARGET_SIZE,
            seed: None,
            clock: Box::new(SystemClock),
        }
    }
}

impl ImageClassifierBuilder {
    pub fn num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    pub fn classes(mut self, classes: Vec<String>) -> Self {
        self.classes = classes;
        self
    }

    pub fn input_channels(mut self, input_channels: usize) -> Self {
        self.input_channels = input_channels;
        self
    }

    pub fn target_size(mut self, target_size: (usize, usize)) -> Self {
        self.target_size = target_size;
        self
    }

    /// Seed for weight materialization. Unseeded builds draw from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<ImageClassifier> {
        if self.num_classes == 0 {
            return Err(Error::Config(
                "num_classes must be greater than 0".to_string(),
            ));
        }

        if self.input_channels == 0 {
            return Err(Error::Config(
                "input_channels must be greater than 0".to_string(),
            ));
        }

        if self.target_size.0 == 0 || self.target_size.1 == 0 {
            return Err(Error::Config(
                "target_size dimensions must be greater than 0".to_string(),
            ));
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let specs = [
            (32, 3, Activation::ReLU),
            (64, 3, Activation::ReLU),
            (128, 3, Activation::ReLU),
            (self.num_classes, 1, Activation::Softmax),
        ];

        let mut model = Sequential::new("cnn_classifier".to_string());
        let mut in_channels = self.input_channels;
        for (idx, (out_channels, kernel_extent, activation)) in specs.into_iter().enumerate() {
            let mut layer = ChannelMix::new(
                format!("channel_mix_{}", idx),
                out_channels,
                kernel_extent,
                activation,
            )?;
            layer.initialize(in_channels, &mut rng)?;
            in_channels = out_channels;
            model.add(Box::new(layer));
        }
        model.set_input_shape(vec![
            self.target_size.0,
            self.target_size.1,
            self.input_channels,
        ]);

        Ok(ImageClassifier {
            num_classes: self.num_classes,
            classes: self.classes,
            target_size: self.target_size,
            model,
            clock: self.clock,
        })
    }
}

/// Image classifier over a fixed four-layer channel-mixing stack.
///
/// Owns its model and class table exclusively; immutable after construction,
/// so every entry point takes `&self`.
#[derive(Debug)]
pub struct ImageClassifier {
    num_classes: usize,
    classes: Vec<String>,
    target_size: (usize, usize),
    model: Sequential,
    clock: Box<dyn Clock>,
}

impl ImageClassifier {
    pub fn builder() -> ImageClassifierBuilder {
        ImageClassifierBuilder::default()
    }

    /// Classifier with the default class table, target size, and an
    /// entropy-seeded model.
    pub fn new(num_classes: usize) -> Result<Self> {
        Self::builder().num_classes(num_classes).build()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn model(&self) -> &Sequential {
        &self.model
    }

    /// Preprocess, run the stack, and flatten to the class-score vector.
    ///
    /// Truncation policy: if the flattened model output is longer than
    /// `num_classes`, only the first `num_classes` entries are kept.
    fn class_scores(&self, image: &Tensor) -> Result<Vec<f32>> {
        let processed = Preprocessor::preprocess(image, self.target_size)?;
        tracing::debug!(shape = ?processed.shape(), "preprocessed image");

        let output = self.model.forward(&processed)?;

        let mut scores = output.to_vec();
        scores.truncate(self.num_classes);
        Ok(scores)
    }

    /// Predicts the single most likely class.
    ///
    /// An argmax index outside the class table resolves to the `"Unknown"`
    /// sentinel rather than an error.
    pub fn predict(&self, image: &Tensor) -> Result<Prediction> {
        let scores = self.class_scores(image)?;

        if scores.is_empty() {
            return Err(Error::Prediction("empty score vector".to_string()));
        }

        // First maximum wins among exact ties.
        let mut best_idx = 0;
        let mut best_score = scores[0];
        for (idx, &score) in scores.iter().enumerate().skip(1) {
            if score > best_score {
                best_idx = idx;
                best_score = score;
            }
        }

        let class_name = self
            .classes
            .get(best_idx)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_CLASS.to_string());

        Ok(Prediction {
            class_name,
            confidence: best_score,
            timestamp: self.clock.now(),
        })
    }

    /// Predicts each image independently, in input order. One image's
    /// failure does not terminate the rest of the batch.
    pub fn predict_batch(&self, images: &[Tensor]) -> Vec<Result<Prediction>> {
        images.iter().map(|image| self.predict(image)).collect()
    }

    /// Returns up to `k` predictions ordered descending by confidence.
    ///
    /// Selected indices outside the class table are silently dropped, so
    /// the result may be shorter than `min(k, num_classes)`.
    pub fn get_top_predictions(&self, image: &Tensor, k: usize) -> Result<Vec<Prediction>> {
        let scores = self.class_scores(image)?;
        let ranked = top_k(&scores, k);

        let mut results = Vec::with_capacity(ranked.len());
        for (idx, score) in ranked {
            match self.classes.get(idx) {
                Some(name) => results.push(Prediction {
                    class_name: name.clone(),
                    confidence: score,
                    timestamp: self.clock.now(),
                }),
                None => {
                    tracing::warn!(
                        index = idx,
                        table_len = self.classes.len(),
                        "dropping prediction outside the class table"
                    );
                }
            }
        }

        Ok(results)
    }

    /// Packages the top-3 predictions with model metadata. No inference
    /// work beyond the single top-3 call.
    pub fn analyze_image(&self, image: &Tensor) -> Result<ImageAnalysis> {
        let top = self.get_top_predictions(image, 3)?;

        let primary = top
            .first()
            .ok_or_else(|| Error::Prediction("no predictions available".to_string()))?;

        Ok(ImageAnalysis {
            primary_prediction: PredictionSummary {
                class: primary.class_name.clone(),
                confidence: primary.confidence,
            },
            all_predictions: top
                .iter()
                .map(|p| PredictionSummary {
                    class: p.class_name.clone(),
                    confidence: p.confidence,
                })
                .collect(),
            model_info: ModelInfo {
                num_classes: self.num_classes,
                architecture: "CNN".to_string(),
                layers: self.model.num_layers(),
            },
            timestamp: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn small_classifier() -> ImageClassifier {
        ImageClassifier::builder()
            .seed(42)
            .target_size((8, 8))
            .build()
            .unwrap()
    }

    #[test]
    fn test_zero_num_classes_rejected() {
        assert!(ImageClassifier::new(0).is_err());
    }

    #[test]
    fn test_zero_target_size_rejected() {
        let result = ImageClassifier::builder().target_size((0, 8)).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_model_has_four_layers() {
        let classifier = small_classifier();
        assert_eq!(classifier.model().num_layers(), 4);
    }

    #[test]
    fn test_predict_uses_injected_clock() {
        let classifier = ImageClassifier::builder()
            .seed(1)
            .target_size((8, 8))
            .clock(Box::new(FixedClock("2024-06-01T12:00:00+00:00".to_string())))
            .build()
            .unwrap();

        let prediction = classifier.predict(&Tensor::zeros(&[8, 8, 3])).unwrap();
        assert_eq!(prediction.timestamp, "2024-06-01T12:00:00+00:00");
    }

    #[test]
    fn test_empty_class_table_reports_unknown() {
        let classifier = ImageClassifier::builder()
            .seed(3)
            .target_size((8, 8))
            .classes(Vec::new())
            .build()
            .unwrap();

        let prediction = classifier.predict(&Tensor::zeros(&[8, 8, 3])).unwrap();
        assert_eq!(prediction.class_name, "Unknown");
    }

    #[test]
    fn test_top_predictions_skip_out_of_table_indices() {
        let classifier = ImageClassifier::builder()
            .seed(3)
            .target_size((8, 8))
            .classes(vec!["OnlyClass".to_string()])
            .build()
            .unwrap();

        let top = classifier
            .get_top_predictions(&Tensor::zeros(&[8, 8, 3]), 5)
            .unwrap();

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].class_name, "OnlyClass");
    }

    #[test]
    fn test_analyze_fails_without_predictions() {
        let classifier = ImageClassifier::builder()
            .seed(3)
            .target_size((8, 8))
            .classes(Vec::new())
            .build()
            .unwrap();

        assert!(classifier.analyze_image(&Tensor::zeros(&[8, 8, 3])).is_err());
    }

    #[test]
    fn test_batch_surfaces_per_element_errors() {
        let classifier = small_classifier();

        let good = Tensor::zeros(&[8, 8, 3]);
        // Single-channel image mismatches the materialized 3-channel weights.
        let bad = Tensor::zeros(&[8, 8]);

        let results = classifier.predict_batch(&[good.clone(), bad, good]);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_analysis_serializes_to_json() {
        let classifier = small_classifier();
        let analysis = classifier.analyze_image(&Tensor::zeros(&[8, 8, 3])).unwrap();

        let json = analysis.to_json().unwrap();
        assert!(json.contains("primary_prediction"));
        assert!(json.contains("model_info"));
    }
}
