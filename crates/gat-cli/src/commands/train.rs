use std::io::{self, Write};

use anyhow::Result;
use gat_cli::{EngineArgs, OutputFormat};
use gat_core::FaultScenario;
use gat_protection::default_training_batch;
use tabwriter::TabWriter;
use tracing::info;

use super::common::{build_coordinator, parse_scenario, print_json};

pub fn handle(engine: &EngineArgs, episodes: u32, scenarios: &[String]) -> Result<()> {
    let batch = scenarios
        .iter()
        .map(String::as_str)
        .map(parse_scenario)
        .collect::<Result<Vec<FaultScenario>>>()?;
    let mut coordinator = build_coordinator(engine)?;

    info!(
        "Training for {} episode(s) over {} scenario(s)",
        episodes,
        if batch.is_empty() {
            default_training_batch().len()
        } else {
            batch.len()
        }
    );
    let report = coordinator.train(episodes, (!batch.is_empty()).then_some(batch.as_slice()));

    if engine.format == OutputFormat::Json {
        return print_json(&report);
    }

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "EPISODE\tREWARD\tEPSILON")?;
    for entry in &report.results {
        writeln!(writer, "{}\t{:.3}\t{:.4}", entry.episode, entry.reward, entry.epsilon)?;
    }
    writer.flush()?;
    println!(
        "\nCompleted {} episode(s); agent has run {} in total, final epsilon {:.4} ({})",
        report.episodes_completed,
        report.total_episodes,
        report.final_epsilon,
        coordinator.agent().phase()
    );
    Ok(())
}
