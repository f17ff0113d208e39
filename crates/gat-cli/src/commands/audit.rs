use std::io::{self, Write};

use anyhow::Result;
use gat_cli::{EngineArgs, OutputFormat};
use serde_json::json;
use tabwriter::TabWriter;

use super::common::{build_coordinator, print_json};

pub fn handle(engine: &EngineArgs, episodes: u32, limit: usize) -> Result<()> {
    let mut coordinator = build_coordinator(engine)?;
    if episodes > 0 {
        coordinator.optimize_with_rl(episodes);
    }

    let diagnostics = coordinator.topology().diagnostics();
    let audit_score = coordinator.coordination_audit_score();
    let recent = coordinator.recent_adjustments(limit);

    if engine.format == OutputFormat::Json {
        return print_json(&json!({
            "coordination_audit_score": audit_score,
            "diagnostics": diagnostics.issues,
            "total_adjustments": coordinator.adjustment_log().len(),
            "adjustments": recent,
        }));
    }

    println!("Coordination audit score: {audit_score:.2}");
    println!("Topology: {}", diagnostics.summary());
    for issue in &diagnostics.issues {
        println!("  {issue}");
    }

    println!(
        "\nAdjustments: {} total, showing {}",
        coordinator.adjustment_log().len(),
        recent.len()
    );
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "TIMESTAMP\tDEVICE\tACTION\tPICKUP (pu)\tDELAY (s)")?;
    for entry in recent {
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.4}\t{:.4}",
            entry.timestamp.to_rfc3339(),
            entry.device_id,
            entry.action_type,
            entry.pickup_current,
            entry.time_delay
        )?;
    }
    writer.flush()?;
    Ok(())
}
