use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "edm", author, version, about = "Electricity demand metrics", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// TOML configuration file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where datasets are read from and computed tables written to.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Directory holding the dataset CSV files (overrides the config)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Write computed tables as CSV into this directory
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub export_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dataset summary followed by every analysis
    Report {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Shape, columns and sample rows of each loaded dataset
    Summary {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Year-over-year growth and CAGR of historical demand and cost
    Historical {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Monthly seasonal index with peak and low months
    Seasonal {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Sector breakdown and growth between the configured years
    Sectors {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Weekday and weekend hourly load profiles
    LoadProfile {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Capacity, renewable share and T&D losses
    Infrastructure {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Synthesise projection tables from the [projection] parameters
    Generate {
        /// Directory for the generated_*.csv files
        #[arg(long, value_hint = ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
    },
    /// Compound annual growth rate between two values
    Cagr {
        #[arg(long, allow_negative_numbers = true)]
        first: f64,
        #[arg(long, allow_negative_numbers = true)]
        last: f64,
        /// Number of compounding periods
        #[arg(long)]
        periods: u32,
    },
}
