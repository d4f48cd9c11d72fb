//! Dataset generation command

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use goalcast_core::synthetic::write_csv;
use goalcast_core::{dataset_fingerprint, GoalcastConfig, SyntheticDataGenerator};

/// Write a synthetic dataset to `output`, returning its fingerprint
pub fn cmd_generate(
    config: &GoalcastConfig,
    output: &Path,
    records: Option<usize>,
    seed: Option<u64>,
) -> Result<String> {
    let records = records.unwrap_or(config.training.records);
    let seed = seed.unwrap_or(config.training.seed);

    println!("🎲 Generating {} synthetic records (seed {})...", records, seed);

    let generator = SyntheticDataGenerator::new(config.generator.clone())?;
    let dataset = generator.generate(records, seed);

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_csv(&dataset, BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let fingerprint = dataset_fingerprint(&dataset)?;
    let achieved = dataset.iter().filter(|r| r.achieved).count();

    println!("✅ Wrote {}", output.display());
    println!("   Records: {}", dataset.len());
    println!(
        "   Achieved within duration: {} ({:.1}%)",
        achieved,
        achieved as f64 / dataset.len().max(1) as f64 * 100.0
    );
    println!("   Fingerprint: {}", fingerprint);

    Ok(fingerprint)
}
