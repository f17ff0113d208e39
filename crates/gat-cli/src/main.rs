use clap::Parser;
use gat_cli::{Cli, Commands};
use std::io;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    // stdout is reserved for reports
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    let result = match &cli.command {
        Commands::Simulate {
            bus,
            fault_type,
            severity,
            engine,
        } => commands::simulate::handle(engine, *bus, fault_type, *severity),
        Commands::Train {
            episodes,
            scenarios,
            engine,
        } => commands::train::handle(engine, *episodes, scenarios),
        Commands::Optimize {
            episodes,
            out,
            engine,
        } => commands::optimize::handle(engine, *episodes, out.as_deref()),
        Commands::Status { engine } => commands::status::handle(engine),
        Commands::Audit {
            episodes,
            limit,
            engine,
        } => commands::audit::handle(engine, *episodes, *limit),
    };

    if let Err(err) = result {
        error!("{err:?}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
