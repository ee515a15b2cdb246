// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use text_extraction_toolkit::cli::{self, batch::BatchArgs};

fn main() {
    dotenv::dotenv().ok();
    cli::init_logging();

    let args = BatchArgs::parse();
    let output_dir = args.output.clone();

    match cli::batch::run(args) {
        Ok(report) => {
            println!(
                "✅ {} of {} images processed in {} ms",
                report.processed(),
                report.total,
                report.elapsed_ms
            );
            if let Some(dir) = output_dir {
                println!("📁 Results in {}", dir.display());
            }
            if !report.failures.is_empty() {
                println!("⚠️  {} images skipped", report.failures.len());
            }
        }
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
