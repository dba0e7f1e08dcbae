use anyhow::Context;
use clap::Parser;
use imdb_sentiment_classifier::{load_model, Classifier, ModelConfig, ModelHandle};
use imdb_sentiment_demo::cli::{run_predict, Cli, Commands, PredictOutput};
use imdb_sentiment_demo::config::DemoConfig;
use imdb_sentiment_demo::server::run_server;
use imdb_sentiment_demo::state::{AppState, ModelInfo};
use imdb_sentiment_demo::telemetry::{init_logging, init_metrics};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Serve {
            address,
            port,
            model,
            verbose,
        } => {
            init_logging(verbose);

            let mut config = DemoConfig::load(&model.config)?;
            config.apply_overrides(&model);
            if let Some(address) = address {
                config.server.address = address;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let addr: SocketAddr =
                format!("{}:{}", config.server.address, config.server.port).parse()?;

            println!();
            println!("  ╔═══════════════════════════════════════════════════════╗");
            println!("  ║                                                       ║");
            println!("  ║             IMDB Sentiment Analyzer                   ║");
            println!("  ║       BERT movie-review sentiment classification      ║");
            println!("  ║                                                       ║");
            println!("  ╚═══════════════════════════════════════════════════════╝");
            println!();
            println!("  Base:     {}", config.model.base_identifier);
            println!("  Weights:  {}", config.model.weights_path.display());
            println!("  Device:   {}", config.model.device);
            println!();

            let metrics_handle = init_metrics()?;
            let handle = load_in_background(config.model.clone()).await?;
            let info = ModelInfo::from_config(handle.name(), handle.config());

            let state = AppState::new(Arc::new(handle), info).with_metrics(metrics_handle);

            println!("  Open http://{} in your browser", addr);
            println!();

            run_server(state, addr).await?;
            ExitCode::SUCCESS
        }

        Commands::Predict {
            text,
            json,
            model,
            verbose,
        } => {
            init_logging(verbose);

            let mut config = DemoConfig::load(&model.config)?;
            config.apply_overrides(&model);

            let output = tokio::task::spawn_blocking(move || {
                run_predict(&text, json, || load(&config.model))
            })
            .await
            .context("Prediction task failed")??;

            match &output {
                PredictOutput::Rendered(rendered) => println!("{}", rendered),
                PredictOutput::BlankInput(warning) => eprintln!("{}", warning),
            }
            output.exit_code()
        }
    };

    Ok(code)
}

/// Load the model off the async runtime; reading weights is blocking I/O
async fn load_in_background(config: ModelConfig) -> anyhow::Result<ModelHandle> {
    tokio::task::spawn_blocking(move || load(&config))
        .await
        .context("Model loading task failed")?
}

fn load(config: &ModelConfig) -> anyhow::Result<ModelHandle> {
    tracing::info!(
        base = %config.base_identifier,
        weights = %config.weights_path.display(),
        "Loading sentiment model"
    );

    load_model(config).context("Failed to load sentiment model")
}
