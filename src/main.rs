use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap_serde_derive::ClapSerde;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use rec_note::config::Config;
use rec_note::model::gemini::GeminiClient;
use rec_note::telemetry::init_telemetry;
use rec_note::{create_router, AppState};

#[cfg(unix)]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const DEFAULT_CONFIG_FILE: &str = "RecNote.toml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env, default_value = DEFAULT_CONFIG_FILE)]
    config_file: String,

    /// Configuration options
    #[command(flatten)]
    pub opt_config: <Config as ClapSerde>::Opt,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match Config::from_toml(&args.config_file) {
        Ok(file_config) => Config::from(file_config).merge(args.opt_config),
        Err(err) => {
            if args.config_file != DEFAULT_CONFIG_FILE {
                eprintln!(
                    "Failed to read configuration file {} with error: {}",
                    args.config_file, err
                );
                std::process::exit(1);
            }
            Config::default().merge(args.opt_config)
        }
    };

    init_telemetry(config.otel_endpoint().as_deref())?;

    if config.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set, every model call will be rejected");
    }
    let model = GeminiClient::new(
        &config.gemini_api_base,
        &config.gemini_model,
        config.gemini_api_key.clone(),
        config.model_timeout(),
    )?;
    info!(endpoint = %model.endpoint(), "Using Gemini model");

    let upload_dir = config.upload_dir();
    tokio::fs::create_dir_all(&upload_dir).await?;

    let router = create_router(AppState {
        model: Arc::new(model),
        upload_dir,
        max_upload_bytes: config.max_upload_bytes,
    });

    let listener = TcpListener::bind(format!("{}:{}", config.address, config.port)).await?;
    info!("RecNote backend running on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
