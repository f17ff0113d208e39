//! Engine configuration and topology loading.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! reproduces the IEEE 14-bus study settings:
//!
//! ```toml
//! [simulator]
//! base_current_a = 1000.0
//! default_impedance_pu = 0.15
//! bus_impedances = [{ bus = 4, impedance_pu = 0.08 }]
//!
//! [limits]
//! min_pickup = 0.05
//! max_pickup = 2.0
//!
//! [agent]
//! learning_rate = 0.01
//! seed = 7
//! ```

use gat_core::{GatError, GatResult, ProtectionTopology};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-bus Thevenin impedance seen by a fault.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusImpedance {
    pub bus: usize,
    pub impedance_pu: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Base current in amperes; pickups are per-unit of this value.
    pub base_current_a: f64,
    /// Impedance used for buses missing from `bus_impedances`.
    pub default_impedance_pu: f64,
    pub bus_impedances: Vec<BusImpedance>,
    /// Voltage relays (27/59) trip above this fault severity.
    pub voltage_trip_severity: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let table = [
            (1, 0.10),
            (2, 0.12),
            (3, 0.15),
            (4, 0.08),
            (5, 0.09),
            (6, 0.11),
            (7, 0.13),
            (8, 0.14),
            (9, 0.16),
            (10, 0.18),
            (11, 0.19),
            (12, 0.20),
            (13, 0.21),
            (14, 0.22),
        ];
        Self {
            base_current_a: 1000.0,
            default_impedance_pu: 0.15,
            bus_impedances: table
                .into_iter()
                .map(|(bus, impedance_pu)| BusImpedance { bus, impedance_pu })
                .collect(),
            voltage_trip_severity: 0.7,
        }
    }
}

/// Safe ranges for relay settings. An adjustment that would leave the range
/// is dropped, not clamped onto the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentLimits {
    /// Sensitivity floor, per-unit (0.05 pu = 50 A on a 1000 A base)
    pub min_pickup: f64,
    /// Sensitivity ceiling, per-unit (2.0 pu = 2000 A)
    pub max_pickup: f64,
    /// Stability floor, seconds. Matches the instantaneous 87T setting.
    pub min_time_delay: f64,
    /// Coordination ceiling, seconds
    pub max_time_delay: f64,
}

impl Default for AdjustmentLimits {
    fn default() -> Self {
        Self {
            min_pickup: 0.05,
            max_pickup: 2.0,
            min_time_delay: 0.02,
            max_time_delay: 2.0,
        }
    }
}

impl AdjustmentLimits {
    pub fn pickup_in_range(&self, pickup: f64) -> bool {
        pickup >= self.min_pickup && pickup <= self.max_pickup
    }

    pub fn time_delay_in_range(&self, time_delay: f64) -> bool {
        time_delay >= self.min_time_delay && time_delay <= self.max_time_delay
    }

    /// Describe every device whose current settings sit outside these limits.
    pub fn out_of_range(&self, topology: &ProtectionTopology) -> Vec<String> {
        topology
            .devices()
            .filter(|device| {
                !self.pickup_in_range(device.pickup_current) || !self.time_delay_in_range(device.time_delay)
            })
            .map(|device| {
                format!(
                    "{} (pickup {}, delay {} s)",
                    device.id, device.pickup_current, device.time_delay
                )
            })
            .collect()
    }
}

/// Q-learning hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Number of Q-table rows (state hash buckets)
    pub state_size: usize,
    /// Number of Q-table columns; `None` means 4 × device count
    pub action_space_size: Option<usize>,
    pub learning_rate: f64,
    /// Initial exploration rate
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub epsilon_min: f64,
    /// Discount factor
    pub gamma: f64,
    /// Episodes of pure random exploration before epsilon-greedy starts
    pub min_exploration_episodes: u32,
    /// Reported in status snapshots only
    pub max_episodes: u32,
    /// Std-dev of the Gaussian noise added to Q-values before argmax
    pub exploration_noise: f64,
    /// RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Devices whose trip state is encoded individually
    pub critical_devices: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            state_size: 64,
            action_space_size: None,
            learning_rate: 0.01,
            epsilon: 0.3,
            epsilon_decay: 0.99,
            epsilon_min: 0.05,
            gamma: 0.95,
            min_exploration_episodes: 50,
            max_episodes: 1000,
            exploration_noise: 0.01,
            seed: None,
            critical_devices: ["87T-TR1", "87T-TR2", "50/51-L4-5", "50/51-L5-6"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionConfig {
    pub simulator: SimulatorConfig,
    pub limits: AdjustmentLimits,
    pub agent: AgentConfig,
}

impl ProtectionConfig {
    pub fn from_toml_str(data: &str) -> GatResult<Self> {
        let config: ProtectionConfig = toml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> GatResult<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_toml_str(&data).map_err(|err| match err {
            GatError::Parse(msg) => GatError::Parse(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn validate(&self) -> GatResult<()> {
        let sim = &self.simulator;
        if !(sim.base_current_a.is_finite() && sim.base_current_a > 0.0) {
            return Err(config_error("simulator.base_current_a must be positive"));
        }
        if !(sim.default_impedance_pu.is_finite() && sim.default_impedance_pu > 0.0) {
            return Err(config_error("simulator.default_impedance_pu must be positive"));
        }
        if let Some(entry) = sim
            .bus_impedances
            .iter()
            .find(|entry| !(entry.impedance_pu.is_finite() && entry.impedance_pu > 0.0))
        {
            return Err(config_error(&format!(
                "impedance for bus {} must be positive, got {}",
                entry.bus, entry.impedance_pu
            )));
        }

        let limits = &self.limits;
        if !(limits.min_pickup > 0.0 && limits.min_pickup <= limits.max_pickup) {
            return Err(config_error(
                "limits.min_pickup must be positive and not exceed limits.max_pickup",
            ));
        }
        if !(limits.min_time_delay > 0.0 && limits.min_time_delay <= limits.max_time_delay) {
            return Err(config_error(
                "limits.min_time_delay must be positive and not exceed limits.max_time_delay",
            ));
        }

        let agent = &self.agent;
        if agent.state_size == 0 {
            return Err(config_error("agent.state_size must be at least 1"));
        }
        if agent.action_space_size == Some(0) {
            return Err(config_error("agent.action_space_size must be at least 1"));
        }
        if !(agent.learning_rate > 0.0 && agent.learning_rate <= 1.0) {
            return Err(config_error("agent.learning_rate must be in (0, 1]"));
        }
        if !(agent.gamma > 0.0 && agent.gamma <= 1.0) {
            return Err(config_error("agent.gamma must be in (0, 1]"));
        }
        for (name, value) in [
            ("epsilon", agent.epsilon),
            ("epsilon_decay", agent.epsilon_decay),
            ("epsilon_min", agent.epsilon_min),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(config_error(&format!("agent.{name} must be in [0, 1]")));
            }
        }
        if !(agent.exploration_noise.is_finite() && agent.exploration_noise >= 0.0) {
            return Err(config_error("agent.exploration_noise must be non-negative"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> GatError {
    GatError::Config(message.to_string())
}

/// Load a zone/device topology from JSON or TOML, chosen by extension.
pub fn load_topology(path: &Path) -> GatResult<ProtectionTopology> {
    let data = fs::read_to_string(path)?;
    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).map_err(GatError::from)
        }
        Some(ext) if ext.eq_ignore_ascii_case("toml") => {
            toml::from_str(&data).map_err(GatError::from)
        }
        _ => serde_json::from_str(&data)
            .map_err(GatError::from)
            .or_else(|_| toml::from_str(&data).map_err(GatError::from)),
    };
    parsed.map_err(|err| GatError::Parse(format!("topology {}: {err}", path.display())))
}
