//! # Microvision
//!
//! A minimal-size Rust library for image-classification inference.
//! This library focuses on inference only - no training.
//!
//! ## Example
//!
//! ```rust
//! use microvision::{ImageClassifier, Tensor};
//!
//! # fn main() -> microvision::Result<()> {
//! let classifier = ImageClassifier::builder().seed(7).build()?;
//! let image = Tensor::zeros(&[32, 32, 3]);
//! let prediction = classifier.predict(&image)?;
//! println!("{} ({:.2}%)", prediction.class_name, prediction.confidence * 100.0);
//! # Ok(())
//! # }
//! ```

pub mod activations;
pub mod classifier;
pub mod clock;
pub mod error;
pub mod layers;
pub mod model;
pub mod preprocess;
pub mod ranking;
pub mod tensor;

pub use classifier::{ImageAnalysis, ImageClassifier, Prediction};
pub use error::{Error, Result};
pub use model::Sequential;
pub use tensor::Tensor;
