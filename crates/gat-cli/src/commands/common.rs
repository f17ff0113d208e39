use anyhow::{anyhow, Context, Result};
use gat_cli::EngineArgs;
use gat_core::{FaultScenario, FaultType, ProtectionTopology};
use gat_protection::{load_topology, ProtectionConfig, ProtectionCoordinator};
use serde::Serialize;
use std::io::{self, Write};
use tracing::info;

pub fn build_coordinator(args: &EngineArgs) -> Result<ProtectionCoordinator> {
    let mut config = match &args.config {
        Some(path) => ProtectionConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => ProtectionConfig::default(),
    };
    if args.seed.is_some() {
        config.agent.seed = args.seed;
    }

    let topology = match &args.topology {
        Some(path) => {
            info!("Loading topology from {}", path.display());
            load_topology(path).with_context(|| format!("loading topology {}", path.display()))?
        }
        None => ProtectionTopology::ieee14_two_zone(),
    };

    ProtectionCoordinator::new(topology, config).context("building protection coordinator")
}

pub fn parse_fault(fault_type: &str, bus: usize, severity: f64) -> Result<FaultScenario> {
    let fault_type: FaultType = fault_type.parse()?;
    Ok(FaultScenario::validated(bus, fault_type, severity)?)
}

/// Parse `BUS:TYPE:SEVERITY`, e.g. `4:3ph:0.8`.
pub fn parse_scenario(raw: &str) -> Result<FaultScenario> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let [bus, fault_type, severity] = parts.as_slice() else {
        return Err(anyhow!("scenario '{raw}' must look like BUS:TYPE:SEVERITY"));
    };
    let bus: usize = bus
        .parse()
        .with_context(|| format!("invalid bus in scenario '{raw}'"))?;
    let severity: f64 = severity
        .parse()
        .with_context(|| format!("invalid severity in scenario '{raw}'"))?;
    parse_fault(fault_type, bus, severity).with_context(|| format!("invalid scenario '{raw}'"))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
