//! # gat-protection: Relay Coordination Engine
//!
//! Simulates short-circuit faults on a zone/relay topology, checks the time
//! grading between the relays that trip, and tunes relay settings with a
//! tabular Q-learning agent.
//!
//! ## Pipeline
//!
//! ```text
//! FaultScenario ──▶ FaultSimulator ──▶ coordination::analyze ──▶ FaultSimulationResult
//!                                                                      │
//!                         ┌────────────── StateEncoder ◀───────────────┤
//!                         ▼                                            ▼
//!                  QLearningAgent ──action──▶ ParameterAdjuster   calculate_reward
//! ```
//!
//! [`ProtectionCoordinator`] owns the live topology and wires the stages
//! together. It exposes single simulations, single adjustments, episode
//! training ([`ProtectionCoordinator::train`]) and best-of-history
//! optimization ([`ProtectionCoordinator::optimize_with_rl`]).
//!
//! ## Example
//!
//! ```rust
//! use gat_core::FaultType;
//! use gat_protection::{ProtectionConfig, ProtectionCoordinator};
//!
//! let mut config = ProtectionConfig::default();
//! config.agent.seed = Some(1);
//! let mut coordinator =
//!     ProtectionCoordinator::new(gat_core::ProtectionTopology::ieee14_two_zone(), config).unwrap();
//!
//! let result = coordinator.simulate_fault(4, FaultType::ThreePhase, 0.8);
//! assert_eq!(result.device_responses.len(), 8);
//!
//! let report = coordinator.optimize_with_rl(3);
//! assert!(report.best_coordination_score >= report.baseline_score);
//! ```
//!
//! Core operations never fail for in-domain input: unknown buses fall back
//! to the default impedance, out-of-range actions are ignored, and a
//! degenerate inverse-time curve means "does not operate". Errors
//! ([`gat_core::GatError`]) only come from loading files or building a
//! coordinator from an invalid topology or configuration.

pub mod adjuster;
pub mod agent;
pub mod config;
pub mod coordination;
pub mod coordinator;
pub mod reward;
pub mod simulator;
pub mod training;

pub use adjuster::{AdjustmentAction, AdjustmentKind, AdjustmentLogEntry, AdjustmentOutcome, ParameterAdjuster};
pub use agent::{AgentPhase, QLearningAgent, StateEncoder, TrainingHistoryEntry};
pub use config::{load_topology, AdjustmentLimits, AgentConfig, ProtectionConfig, SimulatorConfig};
pub use coordination::{
    evaluate_normative_compliance, CoordinationIssue, NormativeCompliance, Standard, StandardCheck,
    MIN_COORDINATION_MARGIN_S,
};
pub use coordinator::ProtectionCoordinator;
pub use reward::calculate_reward;
pub use simulator::{DeviceResponse, FaultSimulationResult, FaultSimulator};
pub use training::{
    default_training_batch, OptimizationEpisode, OptimizationReport, RlStatus, SystemStatus,
    TrainingReport, OPTIMIZATION_BATTERY,
};
