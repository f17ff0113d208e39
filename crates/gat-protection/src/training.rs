//! Scenario batteries and reports for the training and optimization loops.

use crate::agent::{AgentPhase, TrainingHistoryEntry};
use gat_core::{FaultScenario, FaultType};
use serde::{Deserialize, Serialize};

/// Default scenarios for [`train`](crate::ProtectionCoordinator::train) and
/// the audit score: one fault per fault class of interest across both zones.
pub fn default_training_batch() -> Vec<FaultScenario> {
    vec![
        FaultScenario::new(4, FaultType::ThreePhase, 0.8),
        FaultScenario::new(7, FaultType::TwoPhase, 0.6),
        FaultScenario::new(14, FaultType::SinglePhase, 0.5),
    ]
}

/// Fixed evaluation battery for
/// [`optimize_with_rl`](crate::ProtectionCoordinator::optimize_with_rl).
/// The first entry also provides the agent's state.
pub const OPTIMIZATION_BATTERY: [FaultScenario; 5] = [
    FaultScenario::new(4, FaultType::ThreePhase, 0.9),
    FaultScenario::new(7, FaultType::TwoPhase, 0.7),
    FaultScenario::new(14, FaultType::SinglePhase, 0.5),
    FaultScenario::new(1, FaultType::ThreePhase, 0.8),
    FaultScenario::new(9, FaultType::TwoPhase, 0.6),
];

/// Adjustment steps per optimization episode.
pub const STEPS_PER_EPISODE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub episodes_completed: u32,
    /// Episodes the agent has started over its lifetime
    pub total_episodes: u32,
    pub final_epsilon: f64,
    pub results: Vec<TrainingHistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationEpisode {
    pub episode: u32,
    pub avg_reward: f64,
    pub coordination_quality: f64,
    pub coordination_audit_score: f64,
    pub epsilon: f64,
    pub adjustments_made: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub episodes_completed: u32,
    pub best_coordination_score: f64,
    pub baseline_score: f64,
    pub final_epsilon: f64,
    pub total_adjustments: usize,
    pub optimization_history: Vec<OptimizationEpisode>,
    /// `best_coordination_score − baseline_score`, never negative
    pub improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub total_devices: usize,
    pub active_devices: usize,
    pub zones: usize,
    /// "healthy" when every device is active, otherwise "warning"
    pub system_health: String,
    pub agent_phase: AgentPhase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RlStatus {
    /// "operational" after 10 episodes, otherwise "training"
    pub status: String,
    pub phase: AgentPhase,
    pub episodes: u32,
    pub max_episodes: u32,
    pub learning_rate: f64,
    pub epsilon: f64,
    pub gamma: f64,
    pub state_size: usize,
    pub action_space_size: usize,
}
