//! IMDB Sentiment Core
//!
//! Types and error handling shared by the classifier and the demo shell.
//!
//! This crate provides:
//! - The binary `Sentiment` label and the `Prediction` produced for a review
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Prediction, Sentiment};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Prediction, Sentiment};
}
