//! Lossy discretization of a simulation result into a Q-table row.
//!
//! A result is first turned into a fixed-length feature vector (see
//! [`StateEncoder::features`]); the vector is quantized to three decimals
//! and hashed into `0..state_size` by [`bucket`]. Distinct outcomes may share
//! a bucket. The hasher is SipHash with fixed keys, so bucket assignment is
//! stable across runs.

use crate::coordination::Standard;
use crate::simulator::FaultSimulationResult;
use gat_core::{FaultType, ZoneId};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fault current that maps to feature value 1.0, amperes.
const CURRENT_SCALE_A: f64 = 15_000.0;
/// Operating time that maps to feature value 1.0, seconds.
const TIME_SCALE_S: f64 = 2.0;
const OPERATING_SCALE: f64 = 8.0;
const ISSUE_SCALE: f64 = 10.0;

/// Hash a feature vector into `0..state_size`.
///
/// Values are rounded to three decimals first, so features that differ by
/// less than 0.0005 land in the same bucket.
pub fn bucket(features: &[f64], state_size: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    features.len().hash(&mut hasher);
    for value in features {
        let quantized = (value * 1000.0).round();
        // -0.0 and 0.0 hash alike
        let quantized = if quantized == 0.0 { 0 } else { quantized as i64 };
        quantized.hash(&mut hasher);
    }
    (hasher.finish() % state_size.max(1) as u64) as usize
}

fn fault_code(fault_type: FaultType) -> f64 {
    match fault_type {
        FaultType::ThreePhase => 0.25,
        FaultType::TwoPhase => 0.5,
        FaultType::SinglePhase => 0.75,
        FaultType::TwoPhaseGround => 1.0,
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct StateEncoder {
    state_size: usize,
    critical_devices: Vec<String>,
    reference_zone: Option<ZoneId>,
}

impl StateEncoder {
    /// `reference_zone` is the zone whose faults set the zone feature,
    /// normally the first zone of the topology.
    pub fn new(state_size: usize, critical_devices: Vec<String>, reference_zone: Option<ZoneId>) -> Self {
        Self {
            state_size,
            critical_devices,
            reference_zone,
        }
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// Feature vector, zero-padded or truncated to `state_size`.
    pub fn features(&self, result: &FaultSimulationResult) -> Vec<f64> {
        let mut features = Vec::with_capacity(self.state_size.max(16));

        features.push(flag(result.coordination_ok));
        features.push((result.operating_count() as f64 / OPERATING_SCALE).min(1.0));
        features.push(flag(
            result.affected_zone.is_some() && result.affected_zone == self.reference_zone,
        ));
        features.push(fault_code(result.fault_type));
        features.push((result.coordination_issues.len() as f64 / ISSUE_SCALE).min(1.0));
        for standard in Standard::ALL {
            features.push(flag(result.normative_compliance.is_compliant(standard)));
        }

        let primary_times: Vec<f64> = result
            .operating()
            .filter(|r| r.kind.is_primary())
            .map(|r| r.operating_time)
            .collect();
        if primary_times.is_empty() {
            features.extend([0.0, 0.0, 0.0]);
        } else {
            let n = primary_times.len() as f64;
            let min = primary_times.iter().copied().fold(f64::INFINITY, f64::min);
            let max = primary_times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = primary_times.iter().sum::<f64>() / n;
            let std = (primary_times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n).sqrt();
            features.push((min / TIME_SCALE_S).min(1.0));
            features.push((max / TIME_SCALE_S).min(1.0));
            features.push(std.min(1.0));
        }

        features.push((result.fault_current_a.value() / CURRENT_SCALE_A).min(1.0));

        for id in &self.critical_devices {
            match result.response(id).and_then(|r| r.trip_time()) {
                Some(time) => {
                    features.push(1.0);
                    features.push((time / TIME_SCALE_S).min(1.0));
                }
                None => features.extend([0.0, 0.0]),
            }
        }

        features.resize(self.state_size, 0.0);
        features
    }

    /// Q-table row for a simulation result.
    pub fn encode(&self, result: &FaultSimulationResult) -> usize {
        bucket(&self.features(result), self.state_size)
    }
}
