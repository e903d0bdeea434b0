use anyhow::{Context, Result, bail};
use chart_etl::{Pipeline, PipelineConfig, RawTable};
use log::info;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;
use std::time::Instant;

const USAGE: &str = "usage: chart-etl <records.json> [output.json]";

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(input) = args.first() else {
        bail!(USAGE);
    };
    let input = Path::new(input);

    let start = Instant::now();
    let contents = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let rows: Vec<Map<String, Value>> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of records", input.display()))?;
    info!("Loaded {} records from {}", rows.len(), input.display());

    let table = RawTable::from_json_rows(&rows);
    let config = PipelineConfig::default();
    let pipeline = Pipeline::standard(config).context("Failed to build the lexicon")?;
    let output = pipeline.run(&table).context("Pipeline run failed")?;
    info!("{output}");
    if let Some(switching) = &output.switching {
        info!("{switching}");
    }

    let document = json!({
        "report": output.report,
        "enriched": output.enriched_table(pipeline.config()).to_json_records(),
        "longitudinal": output.longitudinal_table(pipeline.config()).to_json_records(),
        "switching": output.switching,
    });
    let rendered = serde_json::to_string_pretty(&document)?;

    match args.get(1) {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Failed to write {path}"))?;
            info!("Wrote output to {path}");
        }
        None => println!("{rendered}"),
    }

    info!("Done in {:?}", start.elapsed());
    Ok(())
}
