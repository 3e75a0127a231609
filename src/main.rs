//! Supply Chain Analyzer - command line front end
//!
//! Usage: supply_chain_analyzer <file.csv> [config.json]
//! Prints the analysis report as JSON on stdout.

use anyhow::{bail, Context, Result};
use supply_chain_analyzer::{AnalysisConfig, DataLoader, SupplyChainAnalyzer};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(csv_path) = args.next() else {
        bail!("Usage: supply_chain_analyzer <file.csv> [config.json]");
    };

    let config = match args.next() {
        Some(path) => AnalysisConfig::from_json_file(&path)
            .with_context(|| format!("loading config {path}"))?,
        None => AnalysisConfig::default(),
    };

    let mut loader = DataLoader::new();
    let table = loader
        .load_csv(&csv_path)
        .with_context(|| format!("loading {csv_path}"))?;

    let report = SupplyChainAnalyzer::new(config).run(table);
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");
    Ok(())
}
