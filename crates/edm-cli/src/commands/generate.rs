use std::path::Path;

use anyhow::{Context, Result};
use edm_cli::EdmConfig;
use edm_io::export_csv;
use edm_metrics::{generate, MetricsEngine};
use edm_report::ReportPrinter;
use tracing::info;

pub fn handle(out_dir: Option<&Path>, config: &EdmConfig) -> Result<()> {
    let params = &config.projection;
    info!(
        "Generating projections {}-{} from {} MU",
        params.base_year, params.horizon_year, params.base_demand_mu
    );
    let data = generate(params).context("generating projection datasets")?;
    let printer = ReportPrinter::new(config.display.clone());

    print!("{}", printer.section("GENERATED PROJECTIONS"));
    print!("{}", printer.table(&data.projections)?);
    print!("{}", printer.section("PROJECTION SCENARIOS"));
    print!("{}", printer.table(&data.scenarios)?);

    let kpis = MetricsEngine::new(config.analysis.clone())
        .key_indicators(&data.projections, Some(&data.monthly), Some(&data.sector))
        .context("computing key indicators")?;
    print!("{}", printer.key_indicators(&kpis)?);

    let out_dir = out_dir.map(Path::to_path_buf).or_else(|| {
        config
            .data
            .export_dir
            .as_ref()
            .map(std::path::PathBuf::from)
    });
    if let Some(dir) = out_dir {
        println!();
        for (table, file_name) in data.exports() {
            let path = dir.join(file_name);
            export_csv(table, &path).with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {}", path.display());
        }
    }
    Ok(())
}
