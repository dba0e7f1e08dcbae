//! IMDB Sentiment Classifier
//!
//! Loads a BERT sequence classifier fine-tuned on IMDB reviews and labels
//! free text as Positive or Negative with a confidence score.
//!
//! The flow is two calls:
//! - [`load_model`] builds a [`ModelHandle`] from a [`ModelConfig`], once
//!   per process. The base model supplies architecture and vocabulary; a
//!   weights file supplies every parameter.
//! - [`ModelHandle::predict`] classifies one review. The handle is
//!   immutable, so it can be shared behind an `Arc` by any number of
//!   callers.
//!
//! Inference runs on CPU by default through Candle.

pub mod classifier;
pub mod config;
pub mod model;
pub mod model_loader;
pub mod predictor;
pub mod tokenizer;
pub mod weights;

pub use classifier::Classifier;
pub use config::{DeviceSpec, ModelConfig, OverflowPolicy};
pub use model_loader::{load_model, ModelHandle};
pub use imdb_sentiment_core::{Error, Prediction, Result, Sentiment};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::Classifier;
    pub use crate::config::{DeviceSpec, ModelConfig, OverflowPolicy};
    pub use crate::model_loader::{load_model, ModelHandle};
    pub use imdb_sentiment_core::{Prediction, Sentiment};
}
