//! Relaysim command-line interface.
//!
//! Loads a `.rsim` document, runs it to stability and reports the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use relaysim::{Engine, EngineConfig, ExecMode, Outcome, Signal};

#[derive(Parser)]
#[command(name = "relaysim")]
#[command(about = "A relay-logic circuit simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Input document (.rsim)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print the stable snapshot (components and nets)
    #[arg(short, long)]
    snapshot: bool,

    /// Print run statistics
    #[arg(long)]
    stats: bool,

    /// Execution mode: auto, single, or parallel
    #[arg(long, default_value = "auto")]
    mode: String,

    /// Keep servicing periodic sources (clocks) until this many seconds of
    /// simulated time have passed
    #[arg(long, value_name = "SECONDS")]
    run_for: Option<f64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_mode(mode: &str) -> Result<ExecMode> {
    match mode {
        "auto" => Ok(ExecMode::Auto),
        "single" => Ok(ExecMode::SingleThreaded),
        "parallel" => Ok(ExecMode::Parallel),
        other => anyhow::bail!("unknown mode {other:?} (expected auto, single or parallel)"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let document = relaysim::load_document(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;

    if cli.verbose {
        println!(
            "Loaded {} page(s), {} component(s)",
            document.page_count(),
            document.pages().map(|p| p.components().count()).sum::<usize>()
        );
    }

    let config = EngineConfig {
        mode: parse_mode(&cli.mode)?,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(document, config).context("building engine")?;
    engine.start().context("running to stability")?;

    if let Some(seconds) = cli.run_for {
        engine
            .run_until(std::time::Duration::from_secs_f64(seconds.max(0.0)))
            .context("servicing periodic sources")?;
    }

    let stats = engine.statistics();
    match stats.outcome {
        Outcome::Stable => {
            if cli.verbose {
                println!(
                    "Stable after {} iteration(s) in {:?}",
                    stats.iterations, stats.wall_time
                );
            }
        }
        other => println!("Run ended: {other:?}"),
    }

    if cli.snapshot {
        print_snapshot(&engine)?;
    }

    if cli.stats {
        println!("iterations:           {}", stats.iterations);
        println!("components evaluated: {}", stats.components_evaluated);
        println!("dirty peak:           {}", stats.dirty_peak);
        println!("wall time:            {:?}", stats.wall_time);
        println!("outcome:              {:?}", stats.outcome);
    }

    engine.stop().context("stopping engine")?;
    Ok(())
}

fn print_snapshot(engine: &Engine) -> Result<()> {
    let snapshot = engine.snapshot().context("reading snapshot")?;

    println!("Components:");
    for component in &snapshot.components {
        let states: Vec<String> = component
            .pin_states
            .iter()
            .map(|p| format!("{}={}", p.pin, p.state))
            .collect();
        println!(
            "  {} {:<10} {}",
            component.id,
            component.kind.as_str(),
            states.join(" ")
        );
        if let Some(error) = &component.last_error {
            println!("    last error: {error}");
        }
    }

    println!("Nets:");
    for net in &snapshot.nets {
        let marker = if net.state == Signal::High { "*" } else { " " };
        println!(
            "  {marker}{} {:<5} {} tab(s)",
            net.id,
            net.state.to_string(),
            net.members.len()
        );
    }
    Ok(())
}
