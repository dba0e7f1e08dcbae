//! Reading fine-tuned parameter files

use candle_core::{Device, Tensor};
use imdb_sentiment_core::{Error, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Buffers some checkpoints carry that are not parameters
const IGNORED_SUFFIXES: &[&str] = &["position_ids"];

/// How many offending names to list in an error message
const MAX_REPORTED_NAMES: usize = 8;

/// Weights file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightFormat {
    /// SafeTensors format
    SafeTensors,
    /// PyTorch pickled state dict (`torch.save(model.state_dict())`)
    PyTorch,
}

impl WeightFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("safetensors") => Ok(Self::SafeTensors),
            Some("pt") | Some("pth") | Some("bin") => Ok(Self::PyTorch),
            _ => Err(Error::load(format!(
                "Unsupported weights file {} (expected .safetensors, .pt, .pth or .bin)",
                path.display()
            ))),
        }
    }
}

/// Read every tensor stored in a weights file
pub fn read_state_dict(path: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    if !path.exists() {
        return Err(Error::load(format!(
            "Weights file not found: {}",
            path.display()
        )));
    }

    let tensors = match WeightFormat::from_path(path)? {
        WeightFormat::SafeTensors => candle_core::safetensors::load(path, device).map_err(|e| {
            Error::load(format!("Failed to load SafeTensors {}: {}", path.display(), e))
        })?,
        WeightFormat::PyTorch => {
            let entries = candle_core::pickle::read_all(path).map_err(|e| {
                Error::load(format!(
                    "Failed to load PyTorch weights {}: {}",
                    path.display(),
                    e
                ))
            })?;

            entries
                .into_iter()
                .map(|(name, tensor)| match tensor.to_device(device) {
                    Ok(tensor) => Ok((name, tensor)),
                    Err(e) => Err(Error::load(format!(
                        "Failed to move {} to device: {}",
                        name, e
                    ))),
                })
                .collect::<Result<HashMap<_, _>>>()?
        }
    };

    tracing::debug!("Read {} tensors from {}", tensors.len(), path.display());
    Ok(tensors)
}

/// Check that the file holds exactly the expected parameter names.
///
/// Shapes are checked later, when the model pulls each tensor.
pub fn check_parameter_names(
    tensors: &HashMap<String, Tensor>,
    expected: &BTreeSet<String>,
) -> Result<()> {
    let missing: Vec<&str> = expected
        .iter()
        .filter(|name| !tensors.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();

    let mut unexpected: Vec<&str> = tensors
        .keys()
        .filter(|name| !expected.contains(name.as_str()) && !is_ignored(name))
        .map(String::as_str)
        .collect();
    unexpected.sort_unstable();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!(
            "missing {} key(s): {}",
            missing.len(),
            summarize(&missing)
        ));
    }
    if !unexpected.is_empty() {
        problems.push(format!(
            "unexpected {} key(s): {}",
            unexpected.len(),
            summarize(&unexpected)
        ));
    }

    Err(Error::load(format!(
        "Weights do not match the architecture: {}",
        problems.join("; ")
    )))
}

fn is_ignored(name: &str) -> bool {
    IGNORED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn summarize(names: &[&str]) -> String {
    let mut summary = names
        .iter()
        .take(MAX_REPORTED_NAMES)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > MAX_REPORTED_NAMES {
        summary.push_str(&format!(", ... ({} more)", names.len() - MAX_REPORTED_NAMES));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;

    fn tensors(names: &[&str]) -> HashMap<String, Tensor> {
        names
            .iter()
            .map(|name| {
                let tensor = Tensor::zeros((2,), DType::F32, &Device::Cpu).unwrap();
                (name.to_string(), tensor)
            })
            .collect()
    }

    fn expected(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            WeightFormat::from_path(Path::new("model.safetensors")).unwrap(),
            WeightFormat::SafeTensors
        );
        assert_eq!(
            WeightFormat::from_path(Path::new("bert_imdb_state_dict.pt")).unwrap(),
            WeightFormat::PyTorch
        );
        assert_eq!(
            WeightFormat::from_path(Path::new("pytorch_model.bin")).unwrap(),
            WeightFormat::PyTorch
        );
        assert!(WeightFormat::from_path(Path::new("weights.onnx")).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = read_state_dict(Path::new("/nonexistent/weights.pt"), &Device::Cpu).unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn test_exact_match() {
        let file = tensors(&["classifier.weight", "classifier.bias"]);
        let names = expected(&["classifier.weight", "classifier.bias"]);
        assert!(check_parameter_names(&file, &names).is_ok());
    }

    #[test]
    fn test_position_ids_buffer_ignored() {
        let file = tensors(&["classifier.weight", "bert.embeddings.position_ids"]);
        let names = expected(&["classifier.weight"]);
        assert!(check_parameter_names(&file, &names).is_ok());
    }

    #[test]
    fn test_missing_and_unexpected_reported() {
        let file = tensors(&["classifier.weight", "lm_head.bias"]);
        let names = expected(&["classifier.weight", "classifier.bias"]);

        let err = check_parameter_names(&file, &names).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing 1 key(s): classifier.bias"), "{msg}");
        assert!(msg.contains("unexpected 1 key(s): lm_head.bias"), "{msg}");
    }

    #[test]
    fn test_summary_is_capped() {
        let names: Vec<String> = (0..10).map(|i| format!("extra.{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let summary = summarize(&refs);
        assert!(summary.ends_with(", ... (2 more)"));
    }
}
