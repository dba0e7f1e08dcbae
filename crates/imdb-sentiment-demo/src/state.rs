//! Shared application state

use imdb_sentiment_classifier::{Classifier, ModelConfig, OverflowPolicy, Sentiment};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    /// Loaded classifier; read-only after startup
    pub classifier: Arc<dyn Classifier>,
    pub model_info: Arc<ModelInfo>,
    /// Prometheus handle, when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>, model_info: ModelInfo) -> Self {
        Self {
            classifier,
            model_info: Arc::new(model_info),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Description of the loaded model served by `/api/model`
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub base_identifier: String,
    pub max_sequence_length: usize,
    pub overflow: OverflowPolicy,
    pub labels: Vec<Sentiment>,
}

impl ModelInfo {
    pub fn from_config(name: impl Into<String>, config: &ModelConfig) -> Self {
        Self {
            name: name.into(),
            base_identifier: config.base_identifier.clone(),
            max_sequence_length: config.max_sequence_length,
            overflow: config.overflow,
            labels: Sentiment::ALL.to_vec(),
        }
    }
}
