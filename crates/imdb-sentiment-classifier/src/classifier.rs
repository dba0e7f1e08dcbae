//! Classifier trait

use imdb_sentiment_core::{Prediction, Result};

/// Trait for sentiment classifiers.
///
/// Classification is synchronous and CPU-bound; async callers should run
/// it on a blocking thread. The demo shell only talks to this seam, so it
/// can be served by the BERT model or by a stand-in during tests.
pub trait Classifier: Send + Sync {
    /// Classify the given review
    fn classify(&self, text: &str) -> Result<Prediction>;

    /// Get the classifier name
    fn name(&self) -> &str;
}
