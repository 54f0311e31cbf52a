// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Parser;
use ocr_api::{
    api::{start_server, AppState},
    cli::Cli,
    config::AppConfig,
    version,
    vision::{OcrModelManager, OnnxPipelineLoader},
};
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("🚀 Starting OCR API...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = AppConfig::from(Cli::parse());
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    info!("{}", version::get_version_string());
    debug!("Version info: {}", version::get_version_info());

    // The pipeline is built exactly once, before the listener is bound
    println!(
        "🧠 Loading PaddleOCR models from {}...",
        config.pipeline.model_dir.display()
    );
    let manager = OcrModelManager::initialize(&OnnxPipelineLoader, &config.pipeline).await?;
    let model_info = manager.model_info();
    println!(
        "✅ OCR pipeline ready (language: {}, angle classification: {})",
        model_info.pipeline.language, model_info.pipeline.angle_classification
    );

    let state = AppState::new(manager.pipeline(), &config);

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("OCR API is running!");
    println!("{}", separator);
    let base = format!("http://{}:{}{}", config.host, config.port, config.root_path);
    println!("  Welcome:  GET  {}/", base);
    println!("  OCR:      POST {}/ocr", base);
    println!("  Docs:     GET  {}/docs", base);
    println!("\nTest with curl:");
    println!(
        "  curl -F 'image=@scan.png' http://localhost:{}{}/ocr",
        config.port, config.root_path
    );
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        println!("\n⏹️  Shutting down...");
    };

    start_server(&config, state, shutdown).await?;

    println!("👋 Goodbye!");
    Ok(())
}
