use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chartweave::{
    ChartConfig, ChartController, JsonFileLoader, Millis, RecordingSurface, RecordingTooltip,
    RenderReport, VisualElement,
};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "chartweave", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the periods a selector can offer.
    Periods(SourceArgs),
    /// List entities present in every source.
    Entities(SourceArgs),
    /// Render headless and print the settled scene as JSON.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Chart config JSON. Source paths resolve relative to its directory.
    #[arg(long)]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Chart config JSON. Source paths resolve relative to its directory.
    #[arg(long)]
    config: PathBuf,

    /// Selector values applied in order after the initial render.
    #[arg(long = "select")]
    select: Vec<String>,

    /// Animation tick interval.
    #[arg(long, default_value_t = 16)]
    step_ms: u64,

    /// Apply each selector this long after the previous one instead of waiting for
    /// animations to settle.
    #[arg(long)]
    gap_ms: Option<u64>,
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    renders: Vec<RenderReport>,
    settled_at_ms: u64,
    elements: Vec<&'a VisualElement>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Periods(args) => cmd_periods(args),
        Command::Entities(args) => cmd_entities(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<ChartConfig> {
    let cfg = ChartConfig::from_path(path)
        .with_context(|| format!("read chart config '{}'", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn loader_for(config_path: &Path) -> JsonFileLoader {
    JsonFileLoader::new(config_path.parent().unwrap_or_else(|| Path::new(".")))
}

fn load_tables(args: &SourceArgs) -> anyhow::Result<Vec<chartweave::ObservationTable>> {
    let cfg = read_config(&args.config)?;
    let tables = chartweave::load_all(&loader_for(&args.config), &cfg.sources)
        .with_context(|| "load chart sources")?;
    Ok(tables)
}

fn cmd_periods(args: SourceArgs) -> anyhow::Result<()> {
    for p in chartweave::available_periods(&load_tables(&args)?) {
        println!("{p}");
    }
    Ok(())
}

fn cmd_entities(args: SourceArgs) -> anyhow::Result<()> {
    for e in chartweave::common_entities(&load_tables(&args)?) {
        println!("{e}");
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.step_ms > 0, "--step-ms must be > 0");
    let cfg = read_config(&args.config)?;
    let step = Millis(args.step_ms);

    let (mut chart, first) = ChartController::init(
        &cfg,
        &loader_for(&args.config),
        RecordingSurface::new(),
        RecordingTooltip::default(),
        Millis(0),
    )
    .with_context(|| "initial render")?;

    let mut renders = vec![first];
    let mut now = Millis(0);
    for value in &args.select {
        now = match args.gap_ms {
            Some(gap) => {
                let until = now.saturating_add(Millis(gap));
                while now < until {
                    now = now.saturating_add(step).min(until);
                    chart.tick(now);
                }
                now
            }
            None => chart.run_until_idle(now, step)?,
        };
        let report = chart
            .on_selector_change(value, now)
            .with_context(|| format!("render selector '{value}'"))?;
        renders.push(report);
    }
    let settled = chart.run_until_idle(now, step)?;

    let out = RenderOutput {
        renders,
        settled_at_ms: settled.0,
        elements: chart.pool().iter().collect(),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
