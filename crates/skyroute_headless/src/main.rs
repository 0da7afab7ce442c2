//! Headless mission simulation runner.
//!
//! Runs a scenario without any frontend and prints JSON lines on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Run the bundled scenario for 600 ticks
//! cargo run -p skyroute_headless -- run
//!
//! # Run a scenario file, stop once nothing is left to do
//! cargo run -p skyroute_headless -- run --scenario my.ron --ticks 5000 --until-idle
//!
//! # Validate a scenario file
//! cargo run -p skyroute_headless -- validate --scenario my.ron
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use skyroute_core::data::ScenarioData;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skyroute_headless::{
    protocol::Response,
    runner::{self, HeadlessConfig, HeadlessRunner},
    scenario::{self, ScenarioError},
};

#[derive(Parser)]
#[command(name = "skyroute_headless")]
#[command(about = "Headless vehicle mission simulation runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario
    Run {
        /// Scenario file to load (defaults to the bundled one)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Maximum number of ticks to run
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// Stop once no vehicle has missions left
        #[arg(long)]
        until_idle: bool,

        /// Only print the ready and summary lines
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check that a scenario loads and builds
    Validate {
        /// Scenario file to check
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for JSON lines
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            scenario,
            ticks,
            until_idle,
            quiet,
        }) => cmd_run(scenario.as_deref(), ticks, until_idle, quiet),
        Some(Commands::Validate { scenario }) => cmd_validate(&scenario),
        None => cmd_run(None, HeadlessConfig::default().max_ticks, false, false),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "Command failed");
            print!("{}", Response::error(err.to_string()).to_json_line());
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(path: Option<&Path>) -> Result<ScenarioData, ScenarioError> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading scenario");
            scenario::load(path)
        }
        None => {
            tracing::info!("Using bundled scenario");
            scenario::from_ron_str(scenario::DOWNTOWN)
        }
    }
}

/// Run a scenario, streaming tick events to stdout
fn cmd_run(
    path: Option<&Path>,
    ticks: u64,
    until_idle: bool,
    quiet: bool,
) -> Result<(), ScenarioError> {
    let data = load_scenario(path)?;
    let config = HeadlessConfig {
        max_ticks: ticks,
        stop_when_idle: until_idle,
        emit_events: !quiet,
    };

    let mut runner = HeadlessRunner::new(&data, config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    runner.run(&mut out)?;
    Ok(())
}

/// Validate a scenario without running it
fn cmd_validate(path: &Path) -> Result<(), ScenarioError> {
    let data = scenario::load(path)?;
    let response = runner::validate(&data)?;
    let mut out = io::stdout().lock();
    write!(out, "{}", response.to_json_line())?;
    out.flush()?;
    tracing::info!(scenario = %data.name, "Scenario is valid");
    Ok(())
}
