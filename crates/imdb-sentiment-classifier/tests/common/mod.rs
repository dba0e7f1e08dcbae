//! Tiny on-disk BERT used by the integration tests.
//!
//! The fixture is a real base-model directory (`config.json`, `vocab.txt`)
//! plus a SafeTensors file with randomly initialized classifier weights,
//! so tests drive the same `load_model` path as production.

#![allow(dead_code)]

use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use imdb_sentiment_classifier::model::{Architecture, BertSequenceClassifier};
use imdb_sentiment_classifier::ModelConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HIDDEN_SIZE: usize = 8;

const VOCAB: &[&str] = &[
    "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "the", "movie", "film", "was", "is", "a",
    "great", "good", "wonderful", "masterpiece", "absolutely", "terrible", "boring", "bad",
    "complete", "waste", "of", "time", ",", ".", "!",
];

fn bert_config(max_position_embeddings: usize) -> String {
    format!(
        r#"{{
            "vocab_size": 32,
            "hidden_size": {HIDDEN_SIZE},
            "num_hidden_layers": 1,
            "num_attention_heads": 2,
            "intermediate_size": 16,
            "hidden_act": "gelu",
            "hidden_dropout_prob": 0.1,
            "max_position_embeddings": {max_position_embeddings},
            "type_vocab_size": 2,
            "initializer_range": 0.02,
            "layer_norm_eps": 1e-12,
            "pad_token_id": 0,
            "position_embedding_type": "absolute",
            "use_cache": true,
            "classifier_dropout": null,
            "model_type": "bert"
        }}"#
    )
}

pub struct TinyModel {
    pub dir: TempDir,
    pub weights: PathBuf,
}

impl TinyModel {
    /// Base directory with room for a 256-token window
    pub fn new() -> Self {
        Self::with_positions(512)
    }

    pub fn with_positions(max_position_embeddings: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            bert_config(max_position_embeddings),
        )
        .unwrap();
        std::fs::write(dir.path().join("vocab.txt"), VOCAB.join("\n")).unwrap();

        let config_str = bert_config(max_position_embeddings);
        let arch = Architecture::from_json(&config_str).unwrap();
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        BertSequenceClassifier::load(vb, &arch, 2).unwrap();

        let weights = dir.path().join("imdb.safetensors");
        varmap.save(&weights).unwrap();

        Self { dir, weights }
    }

    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> ModelConfig {
        ModelConfig::new(self.base().to_string_lossy(), &self.weights)
    }

    /// Rewrite the weights file after applying `edit` to its tensors
    pub fn edit_weights(&self, edit: impl FnOnce(&mut HashMap<String, Tensor>)) -> PathBuf {
        let mut tensors = candle_core::safetensors::load(&self.weights, &Device::Cpu).unwrap();
        edit(&mut tensors);

        let path = self.dir.path().join("edited.safetensors");
        candle_core::safetensors::save(&tensors, &path).unwrap();
        path
    }
}
