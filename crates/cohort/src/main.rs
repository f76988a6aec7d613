// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cohort - engagement analysis and content generation for cohort communities.
//!
//! Binary entry point: loads and validates configuration, then dispatches to
//! the requested subcommand.

mod serve;

use clap::{Parser, Subcommand};

/// Cohort - engagement analysis and content generation service.
#[derive(Parser, Debug)]
#[command(name = "cohort", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Cohort gateway server.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cohort_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            cohort_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(error) = serve::run_serve(config).await {
                eprintln!("cohort serve failed: {error}");
                std::process::exit(1);
            }
        }
        None => {
            println!("cohort: use --help for available commands");
        }
    }
}
