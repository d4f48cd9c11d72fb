//! Goalcast CLI - Savings goal planner
//!
//! Usage:
//!   goalcast generate -n 1000        Write a synthetic dataset
//!   goalcast train                   Train and save the model
//!   goalcast predict --salary ...    Estimate time to goal
//!   goalcast serve --port 8000       Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.model.as_deref())?;

    match cli.command {
        Commands::Generate {
            output,
            records,
            seed,
        } => commands::cmd_generate(&config, &output, records, seed).map(|_| ()),
        Commands::Train {
            data,
            records,
            seed,
        } => commands::cmd_train(&config, data.as_deref(), records, seed).map(|_| ()),
        Commands::Predict { profile, json } => {
            commands::cmd_predict(&config, &profile.to_profile(), json)
        }
        Commands::Recommend { profile, json } => {
            commands::cmd_recommend(&config, &profile.to_profile(), json)
        }
        Commands::Model { json } => commands::cmd_model(&config, json),
        Commands::Serve { port, host, train } => {
            commands::cmd_serve(&config, host.as_deref(), port, train).await
        }
    }
}
