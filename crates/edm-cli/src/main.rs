use anyhow::Result;
use clap::Parser;
use edm_cli::{load_config, Cli, Commands};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::analyze::Step;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.config.as_deref())?;
    if let Some(path) = &cli.config {
        info!("Using config {}", path.display());
    }

    match &cli.command {
        Commands::Report { data } => commands::analyze::handle(&Step::REPORT, data, &config),
        Commands::Summary { data } => commands::analyze::handle(&[Step::Summary], data, &config),
        Commands::Historical { data } => {
            commands::analyze::handle(&[Step::Historical], data, &config)
        }
        Commands::Seasonal { data } => commands::analyze::handle(&[Step::Seasonal], data, &config),
        Commands::Sectors { data } => commands::analyze::handle(&[Step::Sectors], data, &config),
        Commands::LoadProfile { data } => {
            commands::analyze::handle(&[Step::LoadProfile], data, &config)
        }
        Commands::Infrastructure { data } => {
            commands::analyze::handle(&[Step::Infrastructure], data, &config)
        }
        Commands::Generate { out_dir } => commands::generate::handle(out_dir.as_deref(), &config),
        Commands::Cagr {
            first,
            last,
            periods,
        } => commands::cagr::handle(*first, *last, *periods, &config),
    }
}
