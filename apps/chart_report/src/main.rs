use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use urania::{ChartAnalyzer, MemoryShapeCache, PositionMap, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Chart JSON: `{"positions": {...}, "cusps": [...], "house_systems": {...}}`.
    #[arg(long)]
    positions: PathBuf,

    /// Optional TOML settings (aspect orbs, cluster orb, rulership scheme).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Deserialize)]
struct ChartInput {
    positions: PositionMap,
    #[serde(default)]
    cusps: Option<Vec<f64>>,
    #[serde(default)]
    house_systems: BTreeMap<String, Vec<f64>>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let text = std::fs::read_to_string(&args.positions)
        .with_context(|| format!("reading {}", args.positions.display()))?;
    let input: ChartInput = serde_json::from_str(&text)
        .with_context(|| format!("parsing chart JSON {}", args.positions.display()))?;
    log::info!(
        "Loaded {} bodies from {}",
        input.positions.len(),
        args.positions.display()
    );

    let mut analyzer = ChartAnalyzer::new(settings).with_cache(MemoryShapeCache::new());
    let analysis = analyzer.analyze_with_systems(
        &input.positions,
        input.cusps.as_deref(),
        &input.house_systems,
    );

    let report = if args.pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };
    println!("{report}");
    Ok(())
}
