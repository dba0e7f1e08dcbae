//! Model configuration

use imdb_sentiment_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration for loading the sentiment model.
///
/// Everything the loader needs is passed explicitly here; there is no
/// implicit lookup by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Pretrained base: a local directory or a Hugging Face Hub model id.
    /// Supplies the architecture (`config.json`) and the vocabulary.
    #[serde(default = "default_base_identifier")]
    pub base_identifier: String,

    /// Hub revision used when the base is fetched remotely
    #[serde(default = "default_revision")]
    pub revision: String,

    /// Fine-tuned parameters overwriting the base model
    #[serde(default = "default_weights_path")]
    pub weights_path: PathBuf,

    /// Tokenizer window; inputs are truncated and padded to this length
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,

    /// Number of output classes of the classification head
    #[serde(default = "default_num_labels")]
    pub num_labels: usize,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceSpec,

    /// What to do with input longer than the window
    #[serde(default)]
    pub overflow: OverflowPolicy,

    /// Override for the Hugging Face cache directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_base_identifier() -> String {
    "bert-base-uncased".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_weights_path() -> PathBuf {
    PathBuf::from("bert_imdb_state_dict.pt")
}

fn default_max_sequence_length() -> usize {
    256
}

fn default_num_labels() -> usize {
    2
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_identifier: default_base_identifier(),
            revision: default_revision(),
            weights_path: default_weights_path(),
            max_sequence_length: default_max_sequence_length(),
            num_labels: default_num_labels(),
            device: DeviceSpec::default(),
            overflow: OverflowPolicy::default(),
            cache_dir: None,
        }
    }
}

impl ModelConfig {
    /// Create a configuration for the given base and weights file
    pub fn new(base_identifier: impl Into<String>, weights_path: impl Into<PathBuf>) -> Self {
        Self {
            base_identifier: base_identifier.into(),
            weights_path: weights_path.into(),
            ..Default::default()
        }
    }

    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse model config: {}", e)))
    }

    /// Set the tokenizer window
    pub fn with_max_sequence_length(mut self, max_sequence_length: usize) -> Self {
        self.max_sequence_length = max_sequence_length;
        self
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceSpec) -> Self {
        self.device = device;
        self
    }

    /// Set overflow policy
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Set Hugging Face revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Check values that do not depend on the base model's files
    pub fn validate(&self) -> Result<()> {
        if self.base_identifier.trim().is_empty() {
            return Err(Error::config("base_identifier must not be empty"));
        }

        if self.weights_path.as_os_str().is_empty() {
            return Err(Error::config("weights_path must not be empty"));
        }

        if self.num_labels != 2 {
            return Err(Error::config(format!(
                "num_labels must be 2 for binary sentiment, got {}",
                self.num_labels
            )));
        }

        // [CLS] and [SEP] alone take two positions
        if self.max_sequence_length < 2 {
            return Err(Error::config(format!(
                "max_sequence_length must be at least 2, got {}",
                self.max_sequence_length
            )));
        }

        Ok(())
    }
}

/// Device specification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceSpec {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// CUDA GPU inference (if compiled in)
    Cuda(usize),
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl FromStr for DeviceSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let (kind, index) = match lower.split_once(':') {
            Some((kind, index)) => {
                let index = index.parse::<usize>().map_err(|_| {
                    Error::config(format!("Invalid device index in '{}'", s))
                })?;
                (kind.to_string(), index)
            }
            None => (lower, 0),
        };

        match kind.as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            _ => Err(Error::config(format!(
                "Unknown device '{}' (expected cpu, cuda[:N] or metal[:N])",
                s
            ))),
        }
    }
}

impl TryFrom<String> for DeviceSpec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DeviceSpec> for String {
    fn from(spec: DeviceSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("cpu"),
            Self::Cuda(0) => f.write_str("cuda"),
            Self::Cuda(index) => write!(f, "cuda:{}", index),
            Self::Metal(0) => f.write_str("metal"),
            Self::Metal(index) => write!(f, "metal:{}", index),
        }
    }
}

/// Handling of reviews longer than the tokenizer window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Silently drop every token past the window
    #[default]
    Truncate,
    /// Fail with `Error::InputTooLong`
    Reject,
}

impl FromStr for OverflowPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "truncate" => Ok(Self::Truncate),
            "reject" => Ok(Self::Reject),
            _ => Err(Error::config(format!(
                "Unknown overflow policy '{}' (expected truncate or reject)",
                s
            ))),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncate => f.write_str("truncate"),
            Self::Reject => f.write_str("reject"),
        }
    }
}
