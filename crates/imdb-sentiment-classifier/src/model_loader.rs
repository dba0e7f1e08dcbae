//! Model loading for the Candle-based sentiment classifier

use crate::config::{DeviceSpec, ModelConfig, OverflowPolicy};
use crate::model::{Architecture, BertSequenceClassifier};
use crate::tokenizer::{self, TokenizerSource};
use crate::weights;
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use imdb_sentiment_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokenizers::Tokenizer;

/// Files resolved for the pretrained base
#[derive(Debug, Clone)]
pub struct BaseFiles {
    /// Architecture definition
    pub config: PathBuf,
    /// Vocabulary and subword rules
    pub tokenizer: TokenizerSource,
}

/// Loaded tokenizer and model, ready for inference.
///
/// Built once by [`load_model`] and never mutated afterwards; share it
/// behind an `Arc` to serve concurrent requests.
pub struct ModelHandle {
    pub(crate) name: String,
    pub(crate) config: ModelConfig,
    pub(crate) tokenizer: Tokenizer,
    /// Untruncated tokenizer, present only under `OverflowPolicy::Reject`
    pub(crate) counting_tokenizer: Option<Tokenizer>,
    pub(crate) model: BertSequenceClassifier,
    pub(crate) device: Device,
}

impl ModelHandle {
    /// Configuration the handle was built from
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Get reference to the device
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Get reference to the tokenizer
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

/// Load the tokenizer and the fine-tuned classifier described by `config`.
///
/// The base supplies architecture and vocabulary; every parameter then
/// comes from `config.weights_path`. The file must match the architecture
/// exactly: missing, unexpected, or mis-shaped tensors are a load error.
pub fn load_model(config: &ModelConfig) -> Result<ModelHandle> {
    config.validate()?;
    let start = Instant::now();

    tracing::info!(
        "Loading model: base '{}', weights {}",
        config.base_identifier,
        config.weights_path.display()
    );

    let base = resolve_base(config)?;
    let arch = Architecture::from_file(&base.config)?;

    if config.max_sequence_length > arch.dims.max_position_embeddings {
        return Err(Error::config(format!(
            "max_sequence_length {} exceeds the model's {} position embeddings",
            config.max_sequence_length, arch.dims.max_position_embeddings
        )));
    }

    let tokenizer = tokenizer::load_tokenizer(&base.tokenizer, config.max_sequence_length)?;
    let counting_tokenizer = match config.overflow {
        OverflowPolicy::Truncate => None,
        OverflowPolicy::Reject => Some(tokenizer::unbounded(&tokenizer)?),
    };

    let device = create_device(config.device)?;

    let state_dict = weights::read_state_dict(&config.weights_path, &device)?;
    let tensor_count = state_dict.len();
    weights::check_parameter_names(&state_dict, &arch.parameter_names())?;

    let vb = VarBuilder::from_tensors(state_dict, DType::F32, &device);
    let model = BertSequenceClassifier::load(vb, &arch, config.num_labels)?;

    tracing::info!(
        "Model ready: {} tensors on {:?}, window {} tokens, loaded in {:?}",
        tensor_count,
        device,
        config.max_sequence_length,
        start.elapsed()
    );

    Ok(ModelHandle {
        name: model_name(config),
        config: config.clone(),
        tokenizer,
        counting_tokenizer,
        model,
        device,
    })
}

/// Resolve `config.json` and the tokenizer for the base model.
///
/// A base identifier naming an existing directory is read from disk;
/// anything else is treated as a Hugging Face Hub model id. hf-hub serves
/// files from its cache when present and fetches them otherwise.
pub fn resolve_base(config: &ModelConfig) -> Result<BaseFiles> {
    let local = Path::new(&config.base_identifier);
    if local.is_dir() {
        return resolve_local_base(local);
    }

    download_from_huggingface(config)
}

fn resolve_local_base(dir: &Path) -> Result<BaseFiles> {
    tracing::debug!("Resolving base model from {}", dir.display());

    let config = dir.join("config.json");
    if !config.exists() {
        return Err(Error::load(format!(
            "config.json not found in {}",
            dir.display()
        )));
    }

    let tokenizer = TokenizerSource::from_dir(dir).ok_or_else(|| {
        Error::load(format!(
            "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
            dir.display()
        ))
    })?;

    Ok(BaseFiles { config, tokenizer })
}

fn download_from_huggingface(config: &ModelConfig) -> Result<BaseFiles> {
    tracing::debug!(
        "Resolving base model from HuggingFace: {} @ {}",
        config.base_identifier,
        config.revision
    );

    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(cache_dir) = &config.cache_dir {
        builder = builder.with_cache_dir(cache_dir.clone());
    }
    let api = builder
        .build()
        .map_err(|e| Error::load(format!("Failed to initialize HuggingFace API: {}", e)))?;

    let repo = api.repo(Repo::with_revision(
        config.base_identifier.clone(),
        RepoType::Model,
        config.revision.clone(),
    ));

    let config_path = repo
        .get("config.json")
        .map_err(|e| Error::load(format!("Failed to download config.json: {}", e)))?;

    let tokenizer = match repo.get("tokenizer.json") {
        Ok(path) => TokenizerSource::Json(path),
        Err(json_err) => {
            tracing::debug!("tokenizer.json unavailable ({}), trying vocab.txt", json_err);
            let vocab = repo.get("vocab.txt").map_err(|e| {
                Error::load(format!(
                    "No tokenizer found for {} (tried tokenizer.json, vocab.txt): {}",
                    config.base_identifier, e
                ))
            })?;
            TokenizerSource::Vocab(vocab)
        }
    };

    Ok(BaseFiles {
        config: config_path,
        tokenizer,
    })
}

/// Create Candle device from device spec
fn create_device(spec: DeviceSpec) -> Result<Device> {
    match spec {
        DeviceSpec::Cpu => Ok(Device::Cpu),
        DeviceSpec::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::load(format!("Failed to create CUDA device: {}", e))),
        DeviceSpec::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::load(format!("Failed to create Metal device: {}", e))),
    }
}

fn model_name(config: &ModelConfig) -> String {
    let weights = config
        .weights_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("weights");
    format!("{}+{}", config.base_identifier, weights)
}
