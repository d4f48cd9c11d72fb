//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use goalcast_core::FinancialProfile;

/// Goalcast - How long until you reach your savings goal?
#[derive(Parser)]
#[command(name = "goalcast")]
#[command(about = "Savings goal planner with a learned time-to-goal model", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config override file (defaults to the data-dir config, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model artifact path (overrides config and GOALCAST_MODEL_PATH)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a synthetic training dataset as CSV
    Generate {
        /// Output CSV file
        #[arg(short, long, default_value = "synthetic_financial_data.csv")]
        output: PathBuf,

        /// Number of records (defaults to training.records)
        #[arg(short = 'n', long)]
        records: Option<usize>,

        /// Random seed (defaults to training.seed)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Train the time-to-goal model and save it
    Train {
        /// Train from an existing CSV dataset instead of generating one
        #[arg(long)]
        data: Option<PathBuf>,

        /// Number of generated records (ignored with --data)
        #[arg(short = 'n', long)]
        records: Option<usize>,

        /// Random seed for generation and the evaluation split
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Predict time to goal and check it against the desired duration
    Predict {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recommend the savings rate that meets the desired duration
    Recommend {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the saved model's metadata
    Model {
        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Train and save a model first when none exists
        #[arg(long)]
        train: bool,
    },
}

/// Financial profile flags shared by predict and recommend
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Monthly salary
    #[arg(long)]
    pub salary: f64,

    /// Monthly expenses
    #[arg(long)]
    pub expenses: f64,

    /// Goal amount
    #[arg(long)]
    pub goal: f64,

    /// Goal label (car, house, trip...)
    #[arg(long, default_value = "goal")]
    pub goal_type: String,

    /// Desired duration in years
    #[arg(long)]
    pub years: u32,

    /// Current savings percentage (0-100)
    #[arg(long)]
    pub savings_percent: Option<f64>,
}

impl ProfileArgs {
    pub fn to_profile(&self) -> FinancialProfile {
        FinancialProfile {
            savings_percent: self.savings_percent,
            ..FinancialProfile::new(
                self.salary,
                self.expenses,
                self.goal,
                self.goal_type.clone(),
                self.years,
            )
        }
    }
}
