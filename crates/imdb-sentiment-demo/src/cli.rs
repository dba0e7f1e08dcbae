use clap::{Args, Parser, Subcommand};
use crate::EMPTY_INPUT_WARNING;
use imdb_sentiment_classifier::{Classifier, DeviceSpec, OverflowPolicy};
use imdb_sentiment_core::Prediction;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "imdb-sentiment")]
#[command(
    author,
    version,
    about = "BERT movie-review sentiment classifier with a web demo"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the model and start the web UI
    Serve {
        /// Listen address
        #[arg(short, long)]
        address: Option<String>,

        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        model: ModelArgs,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify a single review and exit
    Predict {
        /// Review text
        text: String,

        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        model: ModelArgs,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Model options shared by every subcommand. Each one overrides the
/// matching value from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "imdb-sentiment.yaml")]
    pub config: String,

    /// Fine-tuned weights (.pt, .pth, .bin or .safetensors)
    #[arg(short, long)]
    pub weights: Option<PathBuf>,

    /// Base model: Hugging Face Hub id or local directory
    #[arg(long)]
    pub base_model: Option<String>,

    /// Hugging Face revision of the base model
    #[arg(long)]
    pub revision: Option<String>,

    /// Tokenizer window in tokens
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Over-length input: truncate or reject
    #[arg(long, value_parser = parse_overflow)]
    pub overflow: Option<OverflowPolicy>,

    /// Inference device: cpu, cuda[:N] or metal[:N]
    #[arg(long, value_parser = parse_device)]
    pub device: Option<DeviceSpec>,
}

fn parse_overflow(s: &str) -> Result<OverflowPolicy, String> {
    s.parse().map_err(|e: imdb_sentiment_core::Error| e.to_string())
}

fn parse_device(s: &str) -> Result<DeviceSpec, String> {
    s.parse().map_err(|e: imdb_sentiment_core::Error| e.to_string())
}

/// Render a prediction for the terminal
pub fn render_prediction(prediction: &Prediction, json: bool) -> String {
    if json {
        serde_json::json!({
            "label": prediction.label,
            "confidence": prediction.confidence,
            "probabilities": prediction.probabilities,
        })
        .to_string()
    } else {
        format!(
            "Prediction: {}\nConfidence: {}",
            prediction.label,
            prediction.confidence_display()
        )
    }
}

/// Result of the `predict` subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictOutput {
    /// Rendered prediction, for stdout
    Rendered(String),
    /// Blank review; the warning, for stderr
    BlankInput(&'static str),
}

impl PredictOutput {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Rendered(_) => ExitCode::SUCCESS,
            Self::BlankInput(_) => ExitCode::FAILURE,
        }
    }
}

/// Classify one review for the CLI.
///
/// Blank text short-circuits with the empty-input warning; `load` is only
/// called for non-blank text.
pub fn run_predict<C, F>(text: &str, json: bool, load: F) -> anyhow::Result<PredictOutput>
where
    C: Classifier,
    F: FnOnce() -> anyhow::Result<C>,
{
    if text.trim().is_empty() {
        return Ok(PredictOutput::BlankInput(EMPTY_INPUT_WARNING));
    }

    let classifier = load()?;
    let prediction = classifier.classify(text)?;
    Ok(PredictOutput::Rendered(render_prediction(&prediction, json)))
}
