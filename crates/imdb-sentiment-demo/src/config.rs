//! Demo configuration

use crate::cli::ModelArgs;
use imdb_sentiment_classifier::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Demo configuration: where to listen and which model to load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Model settings
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from file, or defaults when the file is absent
    pub fn load(config_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = config_path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Apply CLI overrides to the model section
    pub fn apply_overrides(&mut self, args: &ModelArgs) {
        let model = &mut self.model;

        if let Some(weights) = &args.weights {
            model.weights_path = weights.clone();
        }
        if let Some(base) = &args.base_model {
            model.base_identifier = base.clone();
        }
        if let Some(revision) = &args.revision {
            model.revision = revision.clone();
        }
        if let Some(max_length) = args.max_length {
            model.max_sequence_length = max_length;
        }
        if let Some(overflow) = args.overflow {
            model.overflow = overflow;
        }
        if let Some(device) = args.device {
            model.device = device;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdb_sentiment_classifier::{DeviceSpec, OverflowPolicy};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DemoConfig::load(dir.path().join("absent.yaml")).unwrap();

        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.model.max_sequence_length, 256);
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  address: "0.0.0.0"
  port: 8080
model:
  weights_path: "/models/imdb.safetensors"
  overflow: reject
"#
        )
        .unwrap();

        let config = DemoConfig::load(file.path()).unwrap();
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.model.weights_path,
            PathBuf::from("/models/imdb.safetensors")
        );
        assert_eq!(config.model.overflow, OverflowPolicy::Reject);
        assert_eq!(config.model.base_identifier, "bert-base-uncased");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map").unwrap();
        assert!(DemoConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = DemoConfig::default();
        let args = ModelArgs {
            weights: Some(PathBuf::from("custom.pt")),
            max_length: Some(128),
            device: Some(DeviceSpec::Metal(0)),
            ..Default::default()
        };

        config.apply_overrides(&args);
        assert_eq!(config.model.weights_path, PathBuf::from("custom.pt"));
        assert_eq!(config.model.max_sequence_length, 128);
        assert_eq!(config.model.device, DeviceSpec::Metal(0));
        assert_eq!(config.model.overflow, OverflowPolicy::Truncate);
    }
}
