//! Model metadata command

use anyhow::{Context, Result};
use goalcast_core::{GoalcastConfig, ModelStore};

use super::open_store;

pub fn cmd_model(config: &GoalcastConfig, json: bool) -> Result<()> {
    let store = open_store(config);
    let model = store
        .load()
        .with_context(|| format!("Failed to read model at {}", store.path().display()))?;

    let Some(model) = model else {
        if json {
            println!("{}", serde_json::json!({ "loaded": false }));
        } else {
            println!("ℹ️  No model at {}", store.path().display());
            println!("   Run `goalcast train` to create one");
        }
        return Ok(());
    };

    let meta = &model.metadata;
    if json {
        println!("{}", serde_json::to_string_pretty(meta)?);
        return Ok(());
    }

    println!();
    println!("🌲 Goalcast Model");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Path:        {}", store.path().display());
    println!("   Trained:     {}", meta.trained_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("   Records:     {}", meta.training_records);
    println!("   Trees:       {}", model.forest().tree_count());
    println!("   Features:    {}", meta.feature_names.join(", "));
    println!("   Dataset:     {}", meta.dataset_fingerprint);
    println!();
    println!(
        "   MAE {:.2}  RMSE {:.2}  R² {:.3}  ({} held out)",
        meta.metrics.mae, meta.metrics.rmse, meta.metrics.r2, meta.metrics.test_records
    );

    let importance = model.forest().feature_importance();
    if !importance.is_empty() {
        println!();
        println!("   Feature importance:");
        for (name, share) in importance {
            println!("     {:<24} {:>5.1}%", name, share * 100.0);
        }
    }
    println!();

    Ok(())
}
