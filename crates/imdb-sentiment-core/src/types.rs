//! Core types for IMDB Sentiment

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary sentiment label.
///
/// Class indices follow the fine-tuned head: 0 is Negative, 1 is Positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    /// All labels, ordered by class index
    pub const ALL: [Sentiment; 2] = [Sentiment::Negative, Sentiment::Positive];

    /// Map a class index from the model head to a label
    pub fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Negative),
            1 => Some(Self::Positive),
            _ => None,
        }
    }

    /// Class index in the model head
    pub fn class_index(&self) -> usize {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "Negative",
            Self::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one review
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted label
    pub label: Sentiment,

    /// Probability mass of the predicted class (0.5-1.0)
    pub confidence: f32,

    /// Softmax distribution, indexed by class (Negative, Positive)
    pub probabilities: [f32; 2],
}

impl Prediction {
    /// Build a prediction from a two-way probability distribution.
    ///
    /// The predicted class is the argmax; ties go to class 0 (Negative).
    pub fn from_probabilities(probs: &[f32]) -> Result<Self> {
        let probabilities: [f32; 2] = probs.try_into().map_err(|_| {
            Error::inference(format!(
                "expected 2 class probabilities, got {}",
                probs.len()
            ))
        })?;

        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(Error::inference(format!(
                "non-finite class probabilities: {:?}",
                probabilities
            )));
        }

        let index = if probabilities[1] > probabilities[0] { 1 } else { 0 };
        let label = Sentiment::ALL[index];

        Ok(Self {
            label,
            confidence: probabilities[index],
            probabilities,
        })
    }

    /// Confidence formatted the way the UI shows it
    pub fn confidence_display(&self) -> String {
        format!("{:.4}", self.confidence)
    }
}
