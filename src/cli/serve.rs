// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use super::CommonArgs;
use crate::api::{build_state, start_server};
use crate::config::ToolkitConfig;
use crate::version;

/// Serve the text extraction web UI and HTTP API
#[derive(Parser, Debug)]
#[command(name = "text-extraction-toolkit")]
#[command(version)]
#[command(about = "EAST text detection + Tesseract OCR web UI", long_about = None)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "API_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p', env = "API_PORT")]
    pub port: Option<u16>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ServeArgs {
    pub fn apply(&self, config: &mut ToolkitConfig) {
        self.common.apply(config);
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub async fn serve(args: ServeArgs) -> Result<()> {
    println!("🚀 Starting {}...", version::get_version_string());

    let mut config = ToolkitConfig::load(args.common.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!("📦 Loading EAST model from {}", config.detection.model_path.display());
    // Model load and OCR availability check block, keep them off the runtime workers
    let state = tokio::task::spawn_blocking(move || build_state(&config))
        .await
        .context("Model loading task panicked")?
        .context("Failed to initialize text extractor")?;

    if !state.extractor.ocr_available() {
        println!("⚠️  Tesseract not found, extraction requests will fail until it is installed");
    }
    println!("✅ Text extractor ready");

    start_server(state).await
}
