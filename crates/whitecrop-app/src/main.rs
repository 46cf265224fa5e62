// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Whitecrop: command-line front end.
//
// Entry point. Initialises logging, loads settings, and dispatches to the
// subcommand handlers. Exits non-zero only when a run could not start or
// could not complete; individual item failures are part of the summary.

mod cli;
mod commands;

use clap::Parser;
use whitecrop_batch::BatchJob;
use whitecrop_core::AppConfig;
use whitecrop_core::error::Result;

use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "whitecrop failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Images { dir, output, merge } => {
            let job = match merge {
                Some(output) => BatchJob::ImagesMerged {
                    input_dir: dir,
                    output,
                },
                None => BatchJob::ImagesSeparately {
                    output_dir: output.unwrap_or_else(|| dir.clone()),
                    input_dir: dir,
                },
            };
            commands::run_batch(config, job, cli.json)
        }
        Commands::PdfFolder { input, output } => commands::run_batch(
            config,
            BatchJob::PdfFolder {
                input_root: input,
                output_root: output,
            },
            cli.json,
        ),
        Commands::Pdf { file, output } => commands::run_batch(
            config,
            BatchJob::PdfDocument {
                input: file,
                output,
            },
            cli.json,
        ),
        Commands::Labels { file, output } => commands::run_labels(&config, &file, &output, cli.json),
        Commands::Inspect { file } => commands::run_inspect(&file, cli.json),
    }
}
