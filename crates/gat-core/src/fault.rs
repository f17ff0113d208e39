//! Fault types and fault scenarios.

use crate::error::{GatError, GatResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short-circuit fault classes.
///
/// The serialized names (`3ph`, `2ph`, `1ph`, `2ph_ground`) are the ones used
/// by topology/scenario files; [`FromStr`] additionally accepts the long
/// spellings (`3-phase`, `2-phase-to-ground`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultType {
    #[serde(rename = "3ph", alias = "3-phase")]
    ThreePhase,
    #[serde(rename = "2ph", alias = "2-phase")]
    TwoPhase,
    #[serde(rename = "1ph", alias = "1-phase")]
    SinglePhase,
    #[serde(rename = "2ph_ground", alias = "2-phase-ground", alias = "2-phase-to-ground")]
    TwoPhaseGround,
}

impl FaultType {
    pub const ALL: [FaultType; 4] = [
        FaultType::ThreePhase,
        FaultType::TwoPhase,
        FaultType::SinglePhase,
        FaultType::TwoPhaseGround,
    ];

    /// Fault current relative to a bolted three-phase fault at the same bus.
    pub fn current_factor(self) -> f64 {
        match self {
            FaultType::ThreePhase => 1.0,
            FaultType::TwoPhase => 0.87,
            FaultType::SinglePhase => 0.58,
            FaultType::TwoPhaseGround => 0.95,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultType::ThreePhase => "3ph",
            FaultType::TwoPhase => "2ph",
            FaultType::SinglePhase => "1ph",
            FaultType::TwoPhaseGround => "2ph_ground",
        }
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultType {
    type Err = GatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3ph" | "3-phase" | "three-phase" => Ok(FaultType::ThreePhase),
            "2ph" | "2-phase" | "two-phase" => Ok(FaultType::TwoPhase),
            "1ph" | "1-phase" | "single-phase" => Ok(FaultType::SinglePhase),
            "2ph_ground" | "2-phase-ground" | "2-phase-to-ground" => {
                Ok(FaultType::TwoPhaseGround)
            }
            other => Err(GatError::Parse(format!(
                "unknown fault type '{other}' (expected 3ph, 2ph, 1ph or 2ph_ground)"
            ))),
        }
    }
}

/// A fault to simulate: where, what kind, and how severe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultScenario {
    /// 0-based network bus index
    pub bus: usize,
    pub fault_type: FaultType,
    /// Fraction of a bolted fault, in (0, 1]
    pub severity: f64,
}

impl FaultScenario {
    /// Build a scenario without validation. The simulator tolerates any
    /// severity; use [`FaultScenario::validated`] at input boundaries.
    pub const fn new(bus: usize, fault_type: FaultType, severity: f64) -> Self {
        Self {
            bus,
            fault_type,
            severity,
        }
    }

    /// Build a scenario, rejecting severities outside (0, 1].
    pub fn validated(bus: usize, fault_type: FaultType, severity: f64) -> GatResult<Self> {
        if !(severity > 0.0 && severity <= 1.0) {
            return Err(GatError::Validation(format!(
                "fault severity must be in (0, 1], got {severity}"
            )));
        }
        Ok(Self::new(bus, fault_type, severity))
    }
}

impl fmt::Display for FaultScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fault at bus {} (severity {:.2})",
            self.fault_type, self.bus, self.severity
        )
    }
}
