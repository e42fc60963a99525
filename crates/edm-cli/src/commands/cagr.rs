use anyhow::{Context, Result};
use edm_cli::EdmConfig;
use edm_metrics::compound_annual_growth_rate;

pub fn handle(first: f64, last: f64, periods: u32, config: &EdmConfig) -> Result<()> {
    let rate = compound_annual_growth_rate(first, last, periods)
        .with_context(|| format!("CAGR from {first} to {last} over {periods} periods"))?;
    println!(
        "CAGR over {periods} periods: {}",
        config.display.percent(rate)
    );
    Ok(())
}
