//! tumble CLI: simulation, benchmarking, and debugging.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tumble")]
#[command(version, about = "tumble: swept-collision rolling sphere physics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one body in a scene and print a summary.
    Simulate {
        /// Path to simulation config (TOML). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to scene description (JSON). A flat floor when omitted.
        #[arg(short, long)]
        scene: Option<PathBuf>,

        /// Number of ticks to run.
        #[arg(short, long, default_value_t = 300)]
        ticks: u32,

        /// Override the config's physics profile (mbu, mbg, xna, mbu_slopes, mbg_slopes).
        #[arg(short, long)]
        profile: Option<String>,

        /// Start position as x,y,z.
        #[arg(
            long,
            value_delimiter = ',',
            num_args = 3,
            allow_hyphen_values = true,
            default_values_t = [0.0, 0.0, 2.0]
        )]
        start: Vec<f64>,

        /// Forward input held for the whole run, in [-1, 1].
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        forward: f64,

        /// Write a snapshot of the final state to this file.
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Write every physics event to this file as JSON lines.
        #[arg(long)]
        events: Option<PathBuf>,

        /// Log every physics event.
        #[arg(long)]
        trace_events: bool,
    },

    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (drop, roll, platform_ride, pinball, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect a state snapshot file.
    Inspect {
        /// Path to snapshot file.
        path: PathBuf,
    },

    /// Validate a config (.toml) or scene (.json) file.
    Validate {
        /// Path to config or scene file.
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            config,
            scene,
            ticks,
            profile,
            start,
            forward,
            snapshot,
            events,
            trace_events,
        } => commands::simulate(&commands::SimulateArgs {
            config,
            scene,
            ticks,
            profile,
            start,
            forward,
            snapshot,
            events,
            trace_events,
        }),
        Commands::Benchmark { scenario, output } => commands::benchmark(&scenario, output.as_deref()),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
