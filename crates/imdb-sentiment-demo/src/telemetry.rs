//! Logging and metrics setup

use imdb_sentiment_core::Prediction;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing. `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Directives used when `RUST_LOG` is unset. `imdb_sentiment` also
/// matches the `imdb_sentiment_*` crate targets.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "imdb_sentiment=debug,tower_http=debug"
    } else {
        "imdb_sentiment=info,tower_http=warn"
    }
}

/// Install the Prometheus recorder and describe the demo's metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "imdb_sentiment_predictions_total",
        "Total number of predictions by label"
    );
    metrics::describe_counter!(
        "imdb_sentiment_errors_total",
        "Total number of failed predictions by kind"
    );
    metrics::describe_histogram!(
        "imdb_sentiment_inference_latency_us",
        metrics::Unit::Microseconds,
        "Classifier latency in microseconds"
    );

    tracing::info!("Metrics exporter initialized");
    Ok(handle)
}

/// Record a successful prediction
pub fn record_prediction(prediction: &Prediction, latency: Duration) {
    metrics::counter!("imdb_sentiment_predictions_total", "label" => prediction.label.as_str())
        .increment(1);
    metrics::histogram!("imdb_sentiment_inference_latency_us")
        .record(latency.as_micros() as f64);
}

/// Record a failed prediction
pub fn record_error(kind: &'static str) {
    metrics::counter!("imdb_sentiment_errors_total", "kind" => kind).increment(1);
}
