// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use text_extraction_toolkit::cli::{self, serve::ServeArgs};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    cli::init_logging();

    let args = ServeArgs::parse();

    if let Err(e) = cli::serve::serve(args).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}
