//! Short-circuit response of every relay in a topology.
//!
//! The fault current model is a single Thevenin step:
//!
//! ```text
//! I_fault = I_base · severity · k_type / Z_bus
//! ```
//!
//! with `k_type` from [`FaultType::current_factor`] and `Z_bus` from the
//! configured impedance table (falling back to the default impedance for
//! unlisted buses). No power flow is solved.
//!
//! Operate logic per device class:
//!
//! | Class | Operates when | Operating time |
//! |-------|---------------|----------------|
//! | 87T, 67 | relay zone is the faulted zone and `I > pickup · I_base` | `time_delay` |
//! | 50/51 | `I > pickup · I_base`, any zone | `time_delay · (1 + 1 / (I/I_base − pickup))` |
//! | 27/59 | `severity > voltage_trip_severity` | `time_delay` |
//!
//! Inactive relays never operate. Any computed time that is not finite and
//! non-negative is treated as "does not operate".

use crate::config::SimulatorConfig;
use crate::coordination::{self, CoordinationIssue, NormativeCompliance};
use gat_core::{
    Amperes, DeviceId, DeviceKind, FaultScenario, FaultType, ProtectionDevice,
    ProtectionTopology, ZoneId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How a single relay reacts to a simulated fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub device_id: DeviceId,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub zone: ZoneId,
    pub should_operate: bool,
    /// Seconds; 0.0 when the relay does not operate
    pub operating_time: f64,
    /// Cleared by the coordination analyzer when the relay is part of an issue
    pub coordination_ok: bool,
}

impl DeviceResponse {
    /// Trip time, if the relay operates.
    pub fn trip_time(&self) -> Option<f64> {
        self.should_operate.then_some(self.operating_time)
    }
}

/// Everything derived from one fault simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultSimulationResult {
    /// Human-readable location, e.g. "Bus 4"
    pub fault_location: String,
    pub bus: usize,
    pub fault_type: FaultType,
    pub severity: f64,
    pub fault_current_a: Amperes,
    /// `None` when no zone covers the bus
    pub affected_zone: Option<ZoneId>,
    pub coordination_ok: bool,
    pub device_responses: Vec<DeviceResponse>,
    pub coordination_issues: Vec<CoordinationIssue>,
    pub normative_compliance: NormativeCompliance,
}

impl FaultSimulationResult {
    pub fn operating(&self) -> impl Iterator<Item = &DeviceResponse> {
        self.device_responses.iter().filter(|r| r.should_operate)
    }

    pub fn operating_count(&self) -> usize {
        self.operating().count()
    }

    pub fn response(&self, device_id: &str) -> Option<&DeviceResponse> {
        self.device_responses
            .iter()
            .find(|r| r.device_id.as_str() == device_id)
    }
}

/// Stateless fault simulator. Holds only the electrical constants.
#[derive(Debug, Clone)]
pub struct FaultSimulator {
    base_current: Amperes,
    default_impedance_pu: f64,
    bus_impedances: BTreeMap<usize, f64>,
    voltage_trip_severity: f64,
}

impl Default for FaultSimulator {
    fn default() -> Self {
        Self::new(&SimulatorConfig::default())
    }
}

impl FaultSimulator {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            base_current: Amperes(config.base_current_a),
            default_impedance_pu: config.default_impedance_pu,
            bus_impedances: config
                .bus_impedances
                .iter()
                .map(|entry| (entry.bus, entry.impedance_pu))
                .collect(),
            voltage_trip_severity: config.voltage_trip_severity,
        }
    }

    pub fn base_current(&self) -> Amperes {
        self.base_current
    }

    pub fn bus_impedance(&self, bus: usize) -> f64 {
        self.bus_impedances
            .get(&bus)
            .copied()
            .unwrap_or(self.default_impedance_pu)
    }

    pub fn fault_current(&self, bus: usize, fault_type: FaultType, severity: f64) -> Amperes {
        self.base_current * (severity * fault_type.current_factor()) / self.bus_impedance(bus)
    }

    pub fn simulate(
        &self,
        topology: &ProtectionTopology,
        scenario: &FaultScenario,
    ) -> FaultSimulationResult {
        let FaultScenario {
            bus,
            fault_type,
            severity,
        } = *scenario;

        let affected_zone = topology.zone_for_bus(bus).map(|zone| zone.id.clone());
        let fault_current = self.fault_current(bus, fault_type, severity);

        let mut device_responses: Vec<DeviceResponse> = topology
            .devices()
            .map(|device| {
                let trip = self.trip_time(device, affected_zone.as_ref(), fault_current, severity);
                DeviceResponse {
                    device_id: device.id.clone(),
                    kind: device.kind,
                    zone: device.zone.clone(),
                    should_operate: trip.is_some(),
                    operating_time: trip.unwrap_or(0.0),
                    coordination_ok: true,
                }
            })
            .collect();

        let analysis = coordination::analyze(&mut device_responses);
        let coordination_ok = analysis.coordination_ok();

        debug!(
            bus,
            %fault_type,
            severity,
            fault_current_a = fault_current.value(),
            zone = affected_zone.as_ref().map(ZoneId::as_str).unwrap_or("none"),
            operating = device_responses.iter().filter(|r| r.should_operate).count(),
            issues = analysis.issues.len(),
            "simulated fault"
        );

        FaultSimulationResult {
            fault_location: format!("Bus {bus}"),
            bus,
            fault_type,
            severity,
            fault_current_a: fault_current,
            affected_zone,
            coordination_ok,
            device_responses,
            coordination_issues: analysis.issues,
            normative_compliance: analysis.compliance,
        }
    }

    fn trip_time(
        &self,
        device: &ProtectionDevice,
        affected_zone: Option<&ZoneId>,
        fault_current: Amperes,
        severity: f64,
    ) -> Option<f64> {
        if !device.is_active() {
            return None;
        }

        let picked_up = fault_current.value() > device.pickup_current * self.base_current.value();
        let in_zone = affected_zone == Some(&device.zone);

        let time = match device.kind {
            DeviceKind::Differential | DeviceKind::DirectionalOvercurrent => {
                (in_zone && picked_up).then_some(device.time_delay)
            }
            DeviceKind::InverseTimeOvercurrent => {
                if picked_up {
                    inverse_time(
                        device.time_delay,
                        fault_current / self.base_current,
                        device.pickup_current,
                    )
                } else {
                    None
                }
            }
            DeviceKind::Voltage => (severity > self.voltage_trip_severity).then_some(device.time_delay),
        };

        time.filter(|t| t.is_finite() && *t >= 0.0)
    }
}

/// Simplified inverse-time curve. `None` when the current multiple does not
/// exceed the pickup (the curve is undefined there).
pub fn inverse_time(time_delay: f64, current_pu: f64, pickup_pu: f64) -> Option<f64> {
    let excess = current_pu - pickup_pu;
    if !(excess.is_finite() && excess > 0.0) {
        return None;
    }
    let time = time_delay * (1.0 + 1.0 / excess);
    time.is_finite().then_some(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gat_core::DeviceStatus;

    fn scenario(bus: usize, fault_type: FaultType, severity: f64) -> FaultScenario {
        FaultScenario::new(bus, fault_type, severity)
    }

    #[test]
    fn test_fault_current_formula() {
        let sim = FaultSimulator::default();
        // 1000 * 0.8 * 1.0 / 0.08
        let current = sim.fault_current(4, FaultType::ThreePhase, 0.8);
        assert!((current.value() - 10_000.0).abs() < 1e-6);
        // bus 0 is not in the table: default 0.15
        let current = sim.fault_current(0, FaultType::SinglePhase, 0.5);
        assert!((current.value() - 1000.0 * 0.5 * 0.58 / 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_bus4_three_phase_responses() {
        let sim = FaultSimulator::default();
        let topology = ProtectionTopology::ieee14_two_zone();
        let result = sim.simulate(&topology, &scenario(4, FaultType::ThreePhase, 0.8));

        assert_eq!(result.affected_zone.as_ref().unwrap().as_str(), "Z1");
        assert_eq!(result.fault_location, "Bus 4");
        assert_eq!(result.device_responses.len(), 8);

        let diff = result.response("87T-TR1").unwrap();
        assert_eq!(diff.trip_time(), Some(0.02));
        // other zone's differential stays put
        assert!(!result.response("87T-TR2").unwrap().should_operate);
        assert!(!result.response("67-B5").unwrap().should_operate);

        let overcurrent = result.response("50/51-L4-5").unwrap();
        let expected = 0.4 * (1.0 + 1.0 / (10.0 - 1.3));
        assert!((overcurrent.operating_time - expected).abs() < 1e-9);

        // severity 0.8 > 0.7: both voltage relays trip
        assert!(result.response("27/59-B7").unwrap().should_operate);
        assert!(result.response("27/59-B14").unwrap().should_operate);
    }

    #[test]
    fn test_non_operating_time_is_zero() {
        let sim = FaultSimulator::default();
        let topology = ProtectionTopology::ieee14_two_zone();
        let result = sim.simulate(&topology, &scenario(14, FaultType::SinglePhase, 0.5));
        for response in &result.device_responses {
            if response.should_operate {
                assert!(response.operating_time.is_finite() && response.operating_time > 0.0);
            } else {
                assert_eq!(response.operating_time, 0.0);
            }
        }
    }

    #[test]
    fn test_low_severity_voltage_relays_hold() {
        let sim = FaultSimulator::default();
        let topology = ProtectionTopology::ieee14_two_zone();
        let result = sim.simulate(&topology, &scenario(7, FaultType::TwoPhase, 0.6));
        assert!(!result.response("27/59-B7").unwrap().should_operate);
    }

    #[test]
    fn test_uncovered_bus_has_no_zone_and_no_zone_relays() {
        let sim = FaultSimulator::default();
        let topology = ProtectionTopology::ieee14_two_zone();
        let result = sim.simulate(&topology, &scenario(2, FaultType::ThreePhase, 1.0));
        assert!(result.affected_zone.is_none());
        assert!(result
            .device_responses
            .iter()
            .filter(|r| matches!(r.kind, DeviceKind::Differential | DeviceKind::DirectionalOvercurrent))
            .all(|r| !r.should_operate));
        // 50/51 still reaches as backup
        assert!(result.response("50/51-L4-5").unwrap().should_operate);
    }

    #[test]
    fn test_inactive_device_never_operates() {
        let sim = FaultSimulator::default();
        let mut topology = ProtectionTopology::ieee14_two_zone();
        topology.device_mut(0).unwrap().status = DeviceStatus::Inactive;
        let result = sim.simulate(&topology, &scenario(4, FaultType::ThreePhase, 0.8));
        assert!(!result.response("87T-TR1").unwrap().should_operate);
    }

    #[test]
    fn test_inverse_time_guards() {
        assert_eq!(inverse_time(0.4, 1.3, 1.3), None);
        assert_eq!(inverse_time(0.4, 1.0, 1.3), None);
        assert_eq!(inverse_time(0.4, f64::NAN, 1.3), None);
        let t = inverse_time(0.5, 3.0, 1.0).unwrap();
        assert!((t - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_analyzer_runs_on_results() {
        let sim = FaultSimulator::default();
        let topology = ProtectionTopology::ieee14_two_zone();
        let result = sim.simulate(&topology, &scenario(4, FaultType::ThreePhase, 0.8));
        assert_eq!(result.coordination_ok, result.coordination_issues.is_empty());
        // 87T-TR1 (0.02 s) and 67-B4 (0.35 s) are 0.33 s apart; 67-B4 and
        // 50/51-L4-5 (~0.446 s) are not.
        assert!(result.coordination_issues.iter().any(|issue| {
            let pair = [issue.device1.as_str(), issue.device2.as_str()];
            pair.contains(&"67-B4") && pair.contains(&"50/51-L4-5")
        }));
        assert!(!result.coordination_ok);
    }
}
