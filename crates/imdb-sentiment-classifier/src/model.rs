//! BERT for sequence classification
//!
//! Encoder, pooler and linear head laid out the way Hugging Face's
//! `BertForSequenceClassification` names its parameters, so a fine-tuned
//! state dict loads without renaming.

use candle_core::{IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use imdb_sentiment_core::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Parameter prefix of the encoder
pub const ENCODER_PREFIX: &str = "bert";

/// Parameter prefix of the classification head
pub const HEAD_PREFIX: &str = "classifier";

/// Architecture parsed from the base model's `config.json`
#[derive(Debug, Clone)]
pub struct Architecture {
    /// Full candle configuration handed to `BertModel::load`
    pub bert: BertConfig,
    /// Dimensions this crate reads directly
    pub dims: Dimensions,
}

/// The subset of the BERT configuration needed for shape bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dimensions {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub max_position_embeddings: usize,
}

impl Architecture {
    /// Read and parse `config.json`
    pub fn from_file(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path).map_err(|e| {
            Error::load(format!(
                "Failed to read config {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_json(&config_str).map_err(|e| match e {
            Error::Load(msg) => Error::load(format!("{} ({})", msg, config_path.display())),
            other => other,
        })
    }

    pub fn from_json(config_str: &str) -> Result<Self> {
        let bert: BertConfig = serde_json::from_str(config_str)
            .map_err(|e| Error::load(format!("Failed to parse BERT config: {}", e)))?;
        let dims: Dimensions = serde_json::from_str(config_str)
            .map_err(|e| Error::load(format!("Failed to parse BERT dimensions: {}", e)))?;

        Ok(Self { bert, dims })
    }

    /// Every parameter name the classifier reads, in state-dict naming
    pub fn parameter_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let linear = |names: &mut BTreeSet<String>, prefix: String| {
            names.insert(format!("{prefix}.weight"));
            names.insert(format!("{prefix}.bias"));
        };

        let embeddings = format!("{ENCODER_PREFIX}.embeddings");
        for table in ["word_embeddings", "position_embeddings", "token_type_embeddings"] {
            names.insert(format!("{embeddings}.{table}.weight"));
        }
        linear(&mut names, format!("{embeddings}.LayerNorm"));

        for layer in 0..self.dims.num_hidden_layers {
            let prefix = format!("{ENCODER_PREFIX}.encoder.layer.{layer}");
            for projection in ["query", "key", "value"] {
                linear(&mut names, format!("{prefix}.attention.self.{projection}"));
            }
            linear(&mut names, format!("{prefix}.attention.output.dense"));
            linear(&mut names, format!("{prefix}.attention.output.LayerNorm"));
            linear(&mut names, format!("{prefix}.intermediate.dense"));
            linear(&mut names, format!("{prefix}.output.dense"));
            linear(&mut names, format!("{prefix}.output.LayerNorm"));
        }

        linear(&mut names, format!("{ENCODER_PREFIX}.pooler.dense"));
        linear(&mut names, HEAD_PREFIX.to_string());

        names
    }
}

/// BERT encoder with pooler and classification head.
///
/// Built for inference only: dropout is the identity and nothing tracks
/// gradients.
pub struct BertSequenceClassifier {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    num_labels: usize,
}

impl BertSequenceClassifier {
    /// Build the model, pulling every parameter from `vb`.
    /// A missing parameter or a shape mismatch fails here.
    pub fn load(vb: VarBuilder, arch: &Architecture, num_labels: usize) -> Result<Self> {
        let hidden_size = arch.dims.hidden_size;

        let bert = BertModel::load(vb.pp(ENCODER_PREFIX), &arch.bert)
            .map_err(|e| Error::load(format!("Failed to load BERT encoder: {}", e)))?;

        let pooler = candle_nn::linear(
            hidden_size,
            hidden_size,
            vb.pp(ENCODER_PREFIX).pp("pooler").pp("dense"),
        )
        .map_err(|e| Error::load(format!("Failed to load pooler: {}", e)))?;

        let classifier = candle_nn::linear(hidden_size, num_labels, vb.pp(HEAD_PREFIX))
            .map_err(|e| Error::load(format!("Failed to load classification head: {}", e)))?;

        Ok(Self {
            bert,
            pooler,
            classifier,
            num_labels,
        })
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Compute logits of shape `(batch, num_labels)`.
    ///
    /// All inputs are `(batch, seq_len)` u32 tensors. Positions where
    /// `attention_mask` is 0 do not influence the result.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden_states = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))
            .map_err(|e| Error::inference(format!("Model forward pass failed: {}", e)))?;

        let cls_embedding = hidden_states
            .i((.., 0))
            .map_err(|e| Error::inference(format!("Failed to get CLS token: {}", e)))?;

        let pooled = self
            .pooler
            .forward(&cls_embedding)
            .and_then(|t| t.tanh())
            .map_err(|e| Error::inference(format!("Pooler failed: {}", e)))?;

        self.classifier
            .forward(&pooled)
            .map_err(|e| Error::inference(format!("Classification head failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY_CONFIG: &str = r#"{
        "architectures": ["BertForMaskedLM"],
        "vocab_size": 16,
        "hidden_size": 8,
        "num_hidden_layers": 2,
        "num_attention_heads": 2,
        "intermediate_size": 16,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "max_position_embeddings": 32,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "position_embedding_type": "absolute",
        "use_cache": true,
        "classifier_dropout": null,
        "model_type": "bert"
    }"#;

    #[test]
    fn test_parse_architecture() {
        let arch = Architecture::from_json(TINY_CONFIG).unwrap();
        assert_eq!(
            arch.dims,
            Dimensions {
                vocab_size: 16,
                hidden_size: 8,
                num_hidden_layers: 2,
                max_position_embeddings: 32,
            }
        );
    }

    #[test]
    fn test_parameter_names() {
        let arch = Architecture::from_json(TINY_CONFIG).unwrap();
        let names = arch.parameter_names();

        // 5 embedding tensors, 16 per layer, pooler and head
        assert_eq!(names.len(), 5 + 2 * 16 + 2 + 2);
        assert!(names.contains("bert.embeddings.LayerNorm.weight"));
        assert!(names.contains("bert.encoder.layer.1.attention.self.value.bias"));
        assert!(names.contains("bert.pooler.dense.weight"));
        assert!(names.contains("classifier.bias"));
        assert!(!names.contains("bert.encoder.layer.2.output.dense.weight"));
    }

    #[test]
    fn test_invalid_config_is_load_error() {
        let err = Architecture::from_json("{\"hidden_size\": 8}").unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn test_forward_shape() {
        use candle_core::{DType, Device};
        use candle_nn::VarMap;

        let device = Device::Cpu;
        let arch = Architecture::from_json(TINY_CONFIG).unwrap();
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = BertSequenceClassifier::load(vb, &arch, 2).unwrap();

        let input_ids = Tensor::new(&[[2u32, 5, 6, 3, 0, 0]], &device).unwrap();
        let token_type_ids = input_ids.zeros_like().unwrap();
        let attention_mask = Tensor::new(&[[1u32, 1, 1, 1, 0, 0]], &device).unwrap();

        let logits = model
            .forward(&input_ids, &token_type_ids, &attention_mask)
            .unwrap();
        assert_eq!(logits.dims(), &[1, 2]);
        assert_eq!(model.num_labels(), 2);

        // VarMap registers exactly the parameters the model reads
        let registered: BTreeSet<String> =
            varmap.data().lock().unwrap().keys().cloned().collect();
        assert_eq!(registered, arch.parameter_names());
    }
}
