//! Server command implementation

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use goalcast_core::{GoalcastConfig, ModelHandle, SyntheticDataGenerator, Trainer};
use goalcast_server::{AppState, ServerConfig};

use super::open_store;

pub async fn cmd_serve(
    config: &GoalcastConfig,
    host: Option<&str>,
    port: Option<u16>,
    train: bool,
) -> Result<()> {
    let host = host.unwrap_or(&config.server.host).to_string();
    let port = port.unwrap_or(config.server.port);
    let store = Arc::new(open_store(config));

    let handle = ModelHandle::load_from(store.as_ref())
        .with_context(|| format!("Failed to load model from {}", store.path().display()))?;

    if !handle.is_loaded() {
        if !train {
            bail!(
                "No model at {}. Run `goalcast train` first or pass --train",
                store.path().display()
            );
        }

        println!(
            "🌲 No model found, training on {} synthetic records...",
            config.training.records
        );
        let worker_handle = handle.clone();
        let worker_store = Arc::clone(&store);
        let trainer = Trainer::new(config.training.trainer_config());
        let generator = SyntheticDataGenerator::new(config.generator.clone())?;
        let (records, seed) = (config.training.records, config.training.seed);

        let outcome = tokio::task::spawn_blocking(move || {
            let dataset = generator.generate(records, seed);
            worker_handle.retrain(&trainer, worker_store.as_ref(), &dataset)
        })
        .await?
        .context("Initial training failed")?;
        println!("   MAE {:.2} months", outcome.metrics.mae);
    }

    println!("🚀 Starting Goalcast web server...");
    println!("   Model: {}", store.path().display());
    println!("   Listening: http://{}:{}", host, port);
    if config.server.cors_origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!("   CORS: {}", config.server.cors_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let state = AppState::from_config(config, handle, store)?;
    goalcast_server::serve_with_config(state, &host, port, ServerConfig::from(&config.server))
        .await
}
