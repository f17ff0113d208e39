use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gat-protect", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate one fault and report every relay's response
    Simulate {
        /// Faulted bus number
        #[arg(long)]
        bus: usize,
        /// Fault type: 3ph, 2ph, 1ph, 2ph_ground (or 3-phase, ...)
        #[arg(long, default_value = "3ph")]
        fault_type: String,
        /// Fault severity in (0, 1]
        #[arg(long, default_value_t = 1.0)]
        severity: f64,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Train the Q-learning agent over a scenario batch
    Train {
        /// Number of episodes
        #[arg(long, default_value_t = 10)]
        episodes: u32,
        /// Scenario as BUS:TYPE:SEVERITY (repeatable); defaults to the built-in batch
        #[arg(long = "scenario", value_name = "BUS:TYPE:SEVERITY")]
        scenarios: Vec<String>,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Optimize relay settings and keep the best configuration found
    Optimize {
        /// Number of episodes
        #[arg(long, default_value_t = 20)]
        episodes: u32,
        /// Write the optimized topology (JSON) to this path
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Show system and agent status
    Status {
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Topology diagnostics, audit score and the adjustment log
    Audit {
        /// Optimization episodes to run before auditing
        #[arg(long, default_value_t = 0)]
        episodes: u32,
        /// Number of adjustment log entries to show, newest first
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

/// Options shared by every command that builds a coordinator.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Engine configuration (TOML)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Topology file (JSON or TOML); defaults to the IEEE 14-bus two-zone case
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub topology: Option<PathBuf>,
    /// RNG seed, overrides `agent.seed` from the configuration
    #[arg(long)]
    pub seed: Option<u64>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
