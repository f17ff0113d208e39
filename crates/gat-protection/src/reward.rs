//! Scalar reward for one simulated fault.
//!
//! All terms are additive and unnormalized, so catastrophic outcomes
//! (blackout, lost critical load) dominate everything else.

use crate::coordination::Standard;
use crate::simulator::FaultSimulationResult;
use gat_core::DeviceKind;

const PRIMARY_OPERATION: f64 = 10.0;
const NO_ISSUES: f64 = 5.0;
const BACKUP_COVERS: f64 = 5.0;
const SELECTIVE_TIGHT: f64 = 8.0;
const SELECTIVE_LOOSE: f64 = 4.0;
const OVER_TRIPPING: f64 = -10.0;
const PER_ISSUE: f64 = -5.0;
const MISCOORDINATED: f64 = -25.0;
const CRITICAL_LOAD_LOST: f64 = -20.0;
const BLACKOUT: f64 = -50.0;
const SPREAD_TOO_NARROW: f64 = -8.0;
const SPREAD_TOO_WIDE: f64 = -5.0;
const ZONE_DIFFERENTIAL_MISSING: f64 = -15.0;
const MARGIN_QUALITY: f64 = 3.0;
const FAST_CLEARING: f64 = 3.0;

/// Issues whose observed margin is at least this close to compliance earn
/// partial credit.
const NEAR_MARGIN_S: f64 = 0.25;
const FAST_CLEARING_S: f64 = 0.1;
const MIN_SPREAD_S: f64 = 0.2;
const MAX_SPREAD_S: f64 = 2.0;

fn standard_bonus(standard: Standard) -> f64 {
    match standard {
        Standard::IeeeC37_112 => 3.0,
        Standard::Iec61850 => 2.0,
        Standard::Nbr5410 => 3.0,
        Standard::ApiRp14c => 2.0,
    }
}

pub fn calculate_reward(result: &FaultSimulationResult, critical_load_lost: bool, blackout: bool) -> f64 {
    let mut reward = 0.0;
    let issues = result.coordination_issues.len();
    let operating: Vec<_> = result.operating().collect();

    if result.coordination_ok {
        let primary_ok = operating
            .iter()
            .any(|r| r.kind.is_primary() && r.coordination_ok);
        if primary_ok {
            reward += PRIMARY_OPERATION;
        }
        if issues == 0 {
            reward += NO_ISSUES;
        }
    }

    let differential_operated = operating.iter().any(|r| r.kind == DeviceKind::Differential);
    let overcurrent_operated = operating
        .iter()
        .any(|r| r.kind == DeviceKind::InverseTimeOvercurrent);
    if overcurrent_operated && !differential_operated {
        reward += BACKUP_COVERS;
    }

    reward += match operating.len() {
        0..=2 => SELECTIVE_TIGHT,
        3 => SELECTIVE_LOOSE,
        4 | 5 => 0.0,
        _ => OVER_TRIPPING,
    };

    reward += result
        .normative_compliance
        .iter()
        .filter(|(_, check)| check.compliant)
        .map(|(standard, _)| standard_bonus(standard))
        .sum::<f64>();

    reward += PER_ISSUE * issues as f64;
    if !result.coordination_ok {
        reward += MISCOORDINATED;
    }
    if critical_load_lost {
        reward += CRITICAL_LOAD_LOST;
    }
    if blackout {
        reward += BLACKOUT;
    }

    if operating.len() > 1 {
        let times = operating.iter().map(|r| r.operating_time);
        let min = times.clone().fold(f64::INFINITY, f64::min);
        let max = times.fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;
        if spread < MIN_SPREAD_S {
            reward += SPREAD_TOO_NARROW;
        } else if spread > MAX_SPREAD_S {
            reward += SPREAD_TOO_WIDE;
        }
    }

    if let Some(zone) = &result.affected_zone {
        let zone_differential = operating
            .iter()
            .any(|r| r.kind == DeviceKind::Differential && &r.zone == zone);
        if !zone_differential {
            reward += ZONE_DIFFERENTIAL_MISSING;
        }
    }

    if issues > 0 {
        let near = result
            .coordination_issues
            .iter()
            .filter(|issue| issue.margin >= NEAR_MARGIN_S)
            .count();
        reward += MARGIN_QUALITY * near as f64 / issues as f64;
    }

    let fast = operating
        .iter()
        .filter(|r| r.operating_time < FAST_CLEARING_S)
        .count();
    if (1..=2).contains(&fast) {
        reward += FAST_CLEARING;
    }

    reward
}
