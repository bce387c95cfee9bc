//! Formcheck CLI
//!
//! Replays two recorded landmark tracks side by side, scores how closely
//! the performed exercise follows the reference, and prints a session
//! summary.
//!
//! # Keys
//!
//! - `space`: pause / resume
//! - `p`, `r`: pause, resume
//! - `q`, `Esc`: quit

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use formcheck_core::{PipelineConfig, SkeletonLayout, StreamSide};
use formcheck_runtime::{ComparisonPipeline, SessionReport};

mod summary;
mod terminal;
mod track;

use summary::OutputFormat;
use terminal::TerminalSink;
use track::{RecordedLandmarks, TrackSource};

/// Formcheck - compare a performed exercise against a reference
#[derive(Parser, Debug)]
#[command(name = "formcheck")]
#[command(version)]
#[command(about = "Frame-by-frame pose comparison of a performed exercise against a reference")]
struct Cli {
    /// Landmark track of the performed exercise
    performed: PathBuf,

    /// Landmark track of the reference exercise
    reference: PathBuf,

    /// Per-joint deviation threshold in normalized coordinates
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Landmark layout of both tracks (media-pipe, coco)
    #[arg(long)]
    layout: Option<SkeletonLayout>,

    /// Flag bones whose direction differs by more than this many radians
    #[arg(long)]
    limb_angle: Option<f32>,

    /// TOML config file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Run without keyboard control
    #[arg(long)]
    headless: bool,

    /// Keyboard poll interval per tick, in milliseconds
    #[arg(long, default_value_t = 33)]
    tick_ms: u64,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(&cli, &mut io::stdout().lock()) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "session failed");
            eprintln!("error: {:#}", e);
            1
        }
    };
    std::process::exit(exit_code);
}

/// Run one session and write its summary to `out`
fn run<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    let performed = TrackSource::open(&cli.performed, StreamSide::Performed)?;
    let reference = TrackSource::open(&cli.reference, StreamSide::Reference)?;

    let pipeline = ComparisonPipeline::new(
        config,
        performed,
        reference,
        RecordedLandmarks,
        RecordedLandmarks,
    )?;

    let layout = pipeline.config().layout;
    let interactive = !cli.headless && io::stdin().is_terminal();
    let report = {
        let mut sink = TerminalSink::new(layout, interactive, Duration::from_millis(cli.tick_ms))
            .context("failed to set up terminal")?;
        pipeline.run(&mut sink)?
    };

    write_summary(out, &report, cli.format)
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    if let Some(threshold) = cli.threshold {
        config.deviation_threshold = threshold;
    }
    if let Some(angle) = cli.limb_angle {
        config.limb_angle_threshold = Some(angle);
    }

    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> anyhow::Result<PipelineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))
}

fn write_summary<W: Write>(
    out: &mut W,
    report: &SessionReport,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let summary = summary::render(report, format).context("failed to encode summary")?;
    write!(out, "{}", summary)?;
    if format == OutputFormat::Json {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
