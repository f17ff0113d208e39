use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use gat_cli::{EngineArgs, OutputFormat};
use tabwriter::TabWriter;
use tracing::info;

use super::common::{build_coordinator, print_json};

pub fn handle(engine: &EngineArgs, episodes: u32, out: Option<&Path>) -> Result<()> {
    let mut coordinator = build_coordinator(engine)?;
    let report = coordinator.optimize_with_rl(episodes);

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(coordinator.topology())?;
        fs::write(path, json)
            .with_context(|| format!("writing optimized topology to {}", path.display()))?;
        info!("Optimized topology written to {}", path.display());
    }

    if engine.format == OutputFormat::Json {
        return print_json(&report);
    }

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "EPISODE\tAVG REWARD\tQUALITY\tAUDIT\tEPSILON\tADJUSTMENTS")?;
    for episode in &report.optimization_history {
        writeln!(
            writer,
            "{}\t{:.3}\t{:.2}\t{:.2}\t{:.4}\t{}",
            episode.episode,
            episode.avg_reward,
            episode.coordination_quality,
            episode.coordination_audit_score,
            episode.epsilon,
            episode.adjustments_made
        )?;
    }
    writer.flush()?;

    println!(
        "\nBaseline {:.2} -> best {:.2} (improvement {:.2}) after {} episode(s), {} adjustment(s)",
        report.baseline_score,
        report.best_coordination_score,
        report.improvement,
        report.episodes_completed,
        report.total_adjustments
    );

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "DEVICE\tPICKUP (pu)\tDELAY (s)")?;
    for device in coordinator.topology().devices() {
        writeln!(
            writer,
            "{}\t{:.4}\t{:.4}",
            device.id, device.pickup_current, device.time_delay
        )?;
    }
    writer.flush()?;
    Ok(())
}
