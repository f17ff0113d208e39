use std::io::{self, Write};

use anyhow::Result;
use gat_cli::{EngineArgs, OutputFormat};
use tabwriter::TabWriter;

use super::common::{build_coordinator, parse_fault, print_json, yes_no};

pub fn handle(engine: &EngineArgs, bus: usize, fault_type: &str, severity: f64) -> Result<()> {
    let scenario = parse_fault(fault_type, bus, severity)?;
    let coordinator = build_coordinator(engine)?;
    let result = coordinator.simulate(&scenario);

    if engine.format == OutputFormat::Json {
        return print_json(&result);
    }

    println!(
        "{} {} fault, severity {:.2}: {} (zone {})",
        result.fault_location,
        result.fault_type,
        result.severity,
        result.fault_current_a,
        result
            .affected_zone
            .as_ref()
            .map(|zone| zone.as_str())
            .unwrap_or("none"),
    );

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "DEVICE\tTYPE\tZONE\tOPERATES\tTIME (s)\tCOORDINATED")?;
    for response in &result.device_responses {
        let time = response
            .trip_time()
            .map(|t| format!("{t:.3}"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            response.device_id,
            response.kind,
            response.zone,
            yes_no(response.should_operate),
            time,
            yes_no(response.coordination_ok)
        )?;
    }
    writer.flush()?;

    println!();
    if result.coordination_issues.is_empty() {
        println!("Coordination OK");
    } else {
        println!("{} coordination issue(s):", result.coordination_issues.len());
        for issue in &result.coordination_issues {
            println!(
                "  {} / {}: margin {:.3}s < {:.1}s",
                issue.device1, issue.device2, issue.margin, issue.required
            );
        }
    }

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "STANDARD\tCOMPLIANT\tNOTES")?;
    for (standard, check) in result.normative_compliance.iter() {
        writeln!(
            writer,
            "{}\t{}\t{}",
            standard,
            yes_no(check.compliant),
            check.issues.join("; ")
        )?;
    }
    writer.flush()?;
    Ok(())
}
