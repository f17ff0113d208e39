//! Discrete relay-setting nudges and their audit trail.
//!
//! An action index encodes `(device position, adjustment)` as
//! `4 · position + adjustment`. Each adjustment is a ±5 % multiplicative step
//! on either the pickup current or the time delay. A step that would leave
//! the configured [`AdjustmentLimits`] is rejected and the setting stays as
//! it was; an index past the last device is ignored. Only applied steps are
//! logged.

use crate::config::AdjustmentLimits;
use chrono::{DateTime, Utc};
use gat_core::{DeviceId, ProtectionTopology};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Adjustments available per device.
pub const ADJUSTMENTS_PER_DEVICE: usize = 4;

const STEP_DOWN: f64 = 0.95;
const STEP_UP: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Pickup × 0.95 (more sensitive)
    DecreasePickup = 0,
    /// Pickup × 1.05 (less sensitive)
    IncreasePickup = 1,
    /// Time delay × 0.95 (faster)
    DecreaseDelay = 2,
    /// Time delay × 1.05 (more grading margin)
    IncreaseDelay = 3,
}

impl AdjustmentKind {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(AdjustmentKind::DecreasePickup),
            1 => Some(AdjustmentKind::IncreasePickup),
            2 => Some(AdjustmentKind::DecreaseDelay),
            3 => Some(AdjustmentKind::IncreaseDelay),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A decoded action index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentAction {
    pub device_index: usize,
    pub kind: AdjustmentKind,
}

impl AdjustmentAction {
    pub fn decode(action: usize) -> Self {
        Self {
            device_index: action / ADJUSTMENTS_PER_DEVICE,
            // action % 4 is always 0..=3
            kind: AdjustmentKind::from_index(action % ADJUSTMENTS_PER_DEVICE)
                .unwrap_or(AdjustmentKind::DecreasePickup),
        }
    }

    pub fn encode(self) -> usize {
        self.device_index * ADJUSTMENTS_PER_DEVICE + self.kind.index()
    }
}

/// One applied adjustment, with the settings it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentLogEntry {
    pub device_id: DeviceId,
    /// 0..=3, see [`AdjustmentKind`]
    pub action_type: usize,
    pub pickup_current: f64,
    pub time_delay: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdjustmentOutcome {
    Applied(AdjustmentLogEntry),
    /// The step would have left the limits; nothing changed
    Rejected {
        device_id: DeviceId,
        kind: AdjustmentKind,
        attempted: f64,
    },
    /// No device at the decoded position
    Ignored,
}

impl AdjustmentOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, AdjustmentOutcome::Applied(_))
    }
}

/// Applies actions to a topology and keeps the append-only audit log.
#[derive(Debug, Clone, Default)]
pub struct ParameterAdjuster {
    limits: AdjustmentLimits,
    log: Vec<AdjustmentLogEntry>,
}

impl ParameterAdjuster {
    pub fn new(limits: AdjustmentLimits) -> Self {
        Self {
            limits,
            log: Vec::new(),
        }
    }

    pub fn limits(&self) -> &AdjustmentLimits {
        &self.limits
    }

    pub fn apply(&mut self, topology: &mut ProtectionTopology, action: usize) -> AdjustmentOutcome {
        let AdjustmentAction { device_index, kind } = AdjustmentAction::decode(action);
        let Some(device) = topology.device_mut(device_index) else {
            debug!(action, device_index, "ignoring action for unknown device position");
            return AdjustmentOutcome::Ignored;
        };

        let limits = &self.limits;
        let (attempted, accepted) = match kind {
            AdjustmentKind::DecreasePickup => {
                let value = device.pickup_current * STEP_DOWN;
                (value, limits.pickup_in_range(value))
            }
            AdjustmentKind::IncreasePickup => {
                let value = device.pickup_current * STEP_UP;
                (value, limits.pickup_in_range(value))
            }
            AdjustmentKind::DecreaseDelay => {
                let value = device.time_delay * STEP_DOWN;
                (value, limits.time_delay_in_range(value))
            }
            AdjustmentKind::IncreaseDelay => {
                let value = device.time_delay * STEP_UP;
                (value, limits.time_delay_in_range(value))
            }
        };

        if !accepted {
            debug!(device = %device.id, ?kind, attempted, "adjustment rejected by limits");
            return AdjustmentOutcome::Rejected {
                device_id: device.id.clone(),
                kind,
                attempted,
            };
        }

        match kind {
            AdjustmentKind::DecreasePickup | AdjustmentKind::IncreasePickup => {
                device.pickup_current = attempted
            }
            AdjustmentKind::DecreaseDelay | AdjustmentKind::IncreaseDelay => {
                device.time_delay = attempted
            }
        }

        let entry = AdjustmentLogEntry {
            device_id: device.id.clone(),
            action_type: kind.index(),
            pickup_current: device.pickup_current,
            time_delay: device.time_delay,
            timestamp: Utc::now(),
        };
        debug!(
            device = %entry.device_id,
            ?kind,
            pickup = entry.pickup_current,
            delay = entry.time_delay,
            "adjustment applied"
        );
        self.log.push(entry.clone());
        AdjustmentOutcome::Applied(entry)
    }

    /// Full audit trail, oldest first.
    pub fn log(&self) -> &[AdjustmentLogEntry] {
        &self.log
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&AdjustmentLogEntry> {
        self.log.iter().rev().take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_encode() {
        let action = AdjustmentAction::decode(13);
        assert_eq!(action.device_index, 3);
        assert_eq!(action.kind, AdjustmentKind::IncreasePickup);
        assert_eq!(action.encode(), 13);
        assert_eq!(AdjustmentAction::decode(31).kind, AdjustmentKind::IncreaseDelay);
    }

    #[test]
    fn test_increase_delay_applies_and_logs() {
        let mut topology = ProtectionTopology::ieee14_two_zone();
        let mut adjuster = ParameterAdjuster::new(AdjustmentLimits::default());

        // device 1 = 50/51-L4-5, adjustment 3 = delay up
        let outcome = adjuster.apply(&mut topology, 4 + 3);
        assert!(outcome.is_applied());
        let delay = topology.device(1).unwrap().time_delay;
        assert!((delay - 0.42).abs() < 1e-12);

        let entry = &adjuster.log()[0];
        assert_eq!(entry.device_id.as_str(), "50/51-L4-5");
        assert_eq!(entry.action_type, 3);
        assert_eq!(entry.time_delay, delay);
    }

    #[test]
    fn test_rejected_step_leaves_value_and_log() {
        let mut topology = ProtectionTopology::ieee14_two_zone();
        let mut adjuster = ParameterAdjuster::new(AdjustmentLimits::default());

        // 87T-TR1 delay is already at the 0.02 s floor
        let outcome = adjuster.apply(&mut topology, 2);
        assert!(matches!(
            outcome,
            AdjustmentOutcome::Rejected {
                kind: AdjustmentKind::DecreaseDelay,
                ..
            }
        ));
        assert_eq!(topology.device(0).unwrap().time_delay, 0.02);
        assert!(adjuster.log().is_empty());
    }

    #[test]
    fn test_step_that_stays_below_floor_is_rejected() {
        let mut topology = ProtectionTopology::ieee14_two_zone();
        let mut adjuster = ParameterAdjuster::new(AdjustmentLimits {
            min_time_delay: 0.1,
            ..AdjustmentLimits::default()
        });

        // 87T-TR1 delay 0.02 s would become 0.021 s, still under the 0.1 s floor
        let outcome = adjuster.apply(&mut topology, 3);
        assert!(!outcome.is_applied());
        assert_eq!(topology.device(0).unwrap().time_delay, 0.02);
        assert!(adjuster.log().is_empty());
    }

    #[test]
    fn test_out_of_range_action_is_noop() {
        let mut topology = ProtectionTopology::ieee14_two_zone();
        let before = topology.clone();
        let mut adjuster = ParameterAdjuster::default();

        assert_eq!(adjuster.apply(&mut topology, 32), AdjustmentOutcome::Ignored);
        assert_eq!(adjuster.apply(&mut topology, 1_000), AdjustmentOutcome::Ignored);
        assert_eq!(topology, before);
        assert!(adjuster.log().is_empty());
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut topology = ProtectionTopology::ieee14_two_zone();
        let mut adjuster = ParameterAdjuster::new(AdjustmentLimits::default());
        adjuster.apply(&mut topology, 4 + 3);
        adjuster.apply(&mut topology, 8 + 3);
        adjuster.apply(&mut topology, 12 + 3);

        let recent = adjuster.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].device_id.as_str(), "27/59-B7");
        assert_eq!(recent[1].device_id.as_str(), "67-B4");
        assert_eq!(adjuster.recent(10).len(), 3);
    }
}
