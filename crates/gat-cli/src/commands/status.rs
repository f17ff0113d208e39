use std::io::{self, Write};

use anyhow::Result;
use gat_cli::{EngineArgs, OutputFormat};
use serde_json::json;
use tabwriter::TabWriter;

use super::common::{build_coordinator, print_json};

pub fn handle(engine: &EngineArgs) -> Result<()> {
    let coordinator = build_coordinator(engine)?;
    let system = coordinator.system_status();
    let rl = coordinator.rl_status();

    if engine.format == OutputFormat::Json {
        return print_json(&json!({ "system": system, "rl": rl }));
    }

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "devices\t{} ({} active)", system.total_devices, system.active_devices)?;
    writeln!(writer, "zones\t{}", system.zones)?;
    writeln!(writer, "health\t{}", system.system_health)?;
    writeln!(writer, "agent\t{} / {}", rl.status, rl.phase)?;
    writeln!(writer, "episodes\t{} of {}", rl.episodes, rl.max_episodes)?;
    writeln!(writer, "learning rate\t{}", rl.learning_rate)?;
    writeln!(writer, "epsilon\t{}", rl.epsilon)?;
    writeln!(writer, "gamma\t{}", rl.gamma)?;
    writeln!(writer, "q-table\t{} states x {} actions", rl.state_size, rl.action_space_size)?;
    writer.flush()?;
    Ok(())
}
