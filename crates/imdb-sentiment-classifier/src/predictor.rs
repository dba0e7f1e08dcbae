//! Review classification on a loaded model

use crate::classifier::Classifier;
use crate::model_loader::ModelHandle;
use candle_core::{Device, Tensor, D};
use imdb_sentiment_core::{Error, Prediction, Result};
use std::time::Instant;

impl ModelHandle {
    /// Classify one review.
    ///
    /// The text is truncated and padded to the configured window, run
    /// through the model once, and the argmax of the two-way softmax is
    /// returned with its probability. Any string is accepted; the empty
    /// string encodes to `[CLS] [SEP]` followed by padding.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let start = Instant::now();

        if let Some(counting) = &self.counting_tokenizer {
            let tokens = counting
                .encode(text, true)
                .map_err(|e| Error::inference(format!("Tokenization failed: {}", e)))?
                .len();
            let max = self.config.max_sequence_length;
            if tokens > max {
                return Err(Error::InputTooLong { tokens, max });
            }
        }

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::inference(format!("Tokenization failed: {}", e)))?;

        let input_ids = batch_tensor(encoding.get_ids(), &self.device)?;
        let token_type_ids = batch_tensor(encoding.get_type_ids(), &self.device)?;
        let attention_mask = batch_tensor(encoding.get_attention_mask(), &self.device)?;

        let logits = self
            .model
            .forward(&input_ids, &token_type_ids, &attention_mask)?;
        let probs = to_probabilities(&logits)?;
        let prediction = Prediction::from_probabilities(&probs)?;

        tracing::debug!(
            label = %prediction.label,
            confidence = prediction.confidence,
            latency_us = start.elapsed().as_micros() as u64,
            "Classified review"
        );

        Ok(prediction)
    }
}

impl Classifier for ModelHandle {
    fn classify(&self, text: &str) -> Result<Prediction> {
        self.predict(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wrap one encoded sequence as a `(1, seq_len)` tensor
fn batch_tensor(values: &[u32], device: &Device) -> Result<Tensor> {
    Tensor::new(values, device)
        .and_then(|t| t.unsqueeze(0))
        .map_err(|e| Error::inference(format!("Failed to create input tensor: {}", e)))
}

/// Softmax over the last dimension of `(1, num_labels)` logits
pub fn to_probabilities(logits: &Tensor) -> Result<Vec<f32>> {
    candle_nn::ops::softmax(logits, D::Minus1)
        .and_then(|probs| probs.squeeze(0))
        .and_then(|probs| probs.to_dtype(candle_core::DType::F32))
        .and_then(|probs| probs.to_vec1::<f32>())
        .map_err(|e| Error::inference(format!("Softmax failed: {}", e)))
}
