//! The coordinator owns the live topology and drives simulate → encode →
//! act → adjust → re-simulate → reward → learn cycles over it.
//!
//! Device settings live in exactly one place, the coordinator's
//! [`ProtectionTopology`]. The simulator only reads it; the adjuster is the
//! only writer. Snapshots taken during optimization are deep copies, so a
//! stored "best" configuration cannot drift while later episodes keep
//! adjusting the live devices.
//!
//! A coordinator is meant to run one training or optimization loop at a
//! time; every method that learns or adjusts takes `&mut self`.

use crate::adjuster::{AdjustmentLogEntry, AdjustmentOutcome, ParameterAdjuster, ADJUSTMENTS_PER_DEVICE};
use crate::agent::{QLearningAgent, TrainingHistoryEntry};
use crate::config::ProtectionConfig;
use crate::reward::calculate_reward;
use crate::simulator::{FaultSimulationResult, FaultSimulator};
use crate::training::{
    default_training_batch, OptimizationEpisode, OptimizationReport, RlStatus, SystemStatus,
    TrainingReport, OPTIMIZATION_BATTERY, STEPS_PER_EPISODE,
};
use gat_core::{FaultScenario, FaultType, GatError, GatResult, ProtectionTopology};
use tracing::{info, warn};

/// Episodes after which the agent is reported as operational.
const OPERATIONAL_AFTER_EPISODES: u32 = 10;

#[derive(Debug)]
pub struct ProtectionCoordinator {
    topology: ProtectionTopology,
    simulator: FaultSimulator,
    adjuster: ParameterAdjuster,
    agent: QLearningAgent,
    config: ProtectionConfig,
}

impl Default for ProtectionCoordinator {
    /// IEEE 14-bus two-zone study with default settings.
    fn default() -> Self {
        Self::build(ProtectionTopology::ieee14_two_zone(), ProtectionConfig::default())
    }
}

impl ProtectionCoordinator {
    /// Validate the configuration and topology, then build the engine.
    ///
    /// Topology errors (duplicate ids, no devices, non-positive settings)
    /// are rejected, as are devices whose settings start outside
    /// `config.limits`. Warnings such as overlapping zone buses are logged
    /// and accepted.
    pub fn new(topology: ProtectionTopology, config: ProtectionConfig) -> GatResult<Self> {
        config.validate()?;
        let diagnostics = topology.diagnostics();
        if diagnostics.has_errors() {
            let details: Vec<String> = diagnostics.errors().map(ToString::to_string).collect();
            return Err(GatError::Topology(format!(
                "{}: {}",
                diagnostics.summary(),
                details.join("; ")
            )));
        }
        let out_of_range = config.limits.out_of_range(&topology);
        if !out_of_range.is_empty() {
            return Err(GatError::Config(format!(
                "device settings outside adjustment limits: {}",
                out_of_range.join("; ")
            )));
        }
        Ok(Self::build(topology, config))
    }

    fn build(topology: ProtectionTopology, config: ProtectionConfig) -> Self {
        for issue in topology.diagnostics().warnings() {
            warn!("topology: {issue}");
        }

        let action_space_size = config
            .agent
            .action_space_size
            .unwrap_or(ADJUSTMENTS_PER_DEVICE * topology.device_count());
        let reference_zone = topology.zones.first().map(|zone| zone.id.clone());
        let agent = QLearningAgent::new(&config.agent, action_space_size, reference_zone);

        info!(
            devices = topology.device_count(),
            zones = topology.zones.len(),
            state_size = agent.state_size(),
            action_space_size = agent.action_space_size(),
            "protection coordinator ready"
        );

        Self {
            simulator: FaultSimulator::new(&config.simulator),
            adjuster: ParameterAdjuster::new(config.limits),
            topology,
            agent,
            config,
        }
    }

    pub fn topology(&self) -> &ProtectionTopology {
        &self.topology
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn config(&self) -> &ProtectionConfig {
        &self.config
    }

    pub fn simulator(&self) -> &FaultSimulator {
        &self.simulator
    }

    pub fn simulate_fault(&self, bus: usize, fault_type: FaultType, severity: f64) -> FaultSimulationResult {
        self.simulate(&FaultScenario::new(bus, fault_type, severity))
    }

    pub fn simulate(&self, scenario: &FaultScenario) -> FaultSimulationResult {
        self.simulator.simulate(&self.topology, scenario)
    }

    /// Apply one encoded action to the live devices.
    pub fn apply_action(&mut self, action: usize) -> AdjustmentOutcome {
        self.adjuster.apply(&mut self.topology, action)
    }

    /// One learning episode over `scenarios`; returns the mean reward
    /// (0.0 for an empty batch).
    pub fn train_episode(&mut self, scenarios: &[FaultScenario]) -> f64 {
        let episode = self.agent.begin_episode();
        let mut total = 0.0;

        for scenario in scenarios {
            let before = self.simulate(scenario);
            let state = self.agent.state(&before);
            let action = self.agent.select_action(state);
            self.adjuster.apply(&mut self.topology, action);

            let after = self.simulate(scenario);
            let reward = calculate_reward(&after, false, false);
            let next_state = self.agent.state(&after);
            self.agent.learn(state, action, reward, next_state);
            total += reward;
        }

        let mean = if scenarios.is_empty() {
            0.0
        } else {
            total / scenarios.len() as f64
        };
        let entry = self.agent.end_episode(total);
        info!(
            episode,
            reward = mean,
            total_reward = total,
            epsilon = entry.epsilon,
            phase = %self.agent.phase(),
            "training episode complete"
        );
        mean
    }

    /// Run `episodes` training episodes, over the default batch when
    /// `scenarios` is `None`.
    pub fn train(&mut self, episodes: u32, scenarios: Option<&[FaultScenario]>) -> TrainingReport {
        let default_batch;
        let batch = match scenarios {
            Some(batch) => batch,
            None => {
                default_batch = default_training_batch();
                &default_batch
            }
        };

        let mut results: Vec<TrainingHistoryEntry> = Vec::with_capacity(episodes as usize);
        for _ in 0..episodes {
            self.train_episode(batch);
            if let Some(entry) = self.agent.history().last() {
                results.push(entry.clone());
            }
        }

        TrainingReport {
            episodes_completed: episodes,
            total_episodes: self.agent.episodes(),
            final_epsilon: self.agent.epsilon(),
            results,
        }
    }

    /// Mean over scenarios of +20 for a coordinated outcome and −5 per
    /// coordination issue.
    pub fn coordination_quality(&self, scenarios: &[FaultScenario]) -> f64 {
        if scenarios.is_empty() {
            return 0.0;
        }
        let total: f64 = scenarios
            .iter()
            .map(|scenario| quality_of(&self.simulate(scenario)))
            .sum();
        total / scenarios.len() as f64
    }

    /// Audit score over the default batch: +30 coordinated, −10 per issue,
    /// +15 when at most two relays trip, −10 when more than four do. Mean
    /// per scenario, floored at zero.
    pub fn coordination_audit_score(&self) -> f64 {
        let batch = default_training_batch();
        let total: f64 = batch
            .iter()
            .map(|scenario| {
                let result = self.simulate(scenario);
                let operating = result.operating_count();
                let mut score = -10.0 * result.coordination_issues.len() as f64;
                if result.coordination_ok {
                    score += 30.0;
                }
                if operating <= 2 {
                    score += 15.0;
                } else if operating > 4 {
                    score -= 10.0;
                }
                score
            })
            .sum();
        (total / batch.len() as f64).max(0.0)
    }

    /// Learn against the fixed scenario battery and keep the best device
    /// configuration seen.
    ///
    /// The pre-optimization configuration seeds the best-so-far, and the
    /// best snapshot (not the last episode's state) is restored at the end,
    /// so the returned configuration never scores below the baseline.
    pub fn optimize_with_rl(&mut self, episodes: u32) -> OptimizationReport {
        let battery = &OPTIMIZATION_BATTERY;
        let baseline = self.coordination_quality(battery);
        let mut best_score = baseline;
        let mut best_devices = self.topology.snapshot_devices();
        let log_start = self.adjuster.log().len();
        let mut history = Vec::with_capacity(episodes as usize);

        info!(episodes, baseline, "starting RL optimization");

        for _ in 0..episodes {
            let episode = self.agent.begin_episode();
            let log_before = self.adjuster.log().len();
            let mut state = self.agent.state(&self.simulate(&battery[0]));
            let mut reward_sum = 0.0;
            let mut quality = baseline;

            for _ in 0..STEPS_PER_EPISODE {
                let action = self.agent.select_action(state);
                self.adjuster.apply(&mut self.topology, action);

                let evaluation = self.evaluate_battery(battery);
                let next_state = self.agent.state(&evaluation.reference);
                self.agent.learn(state, action, evaluation.mean_reward, next_state);

                reward_sum += evaluation.mean_reward;
                quality = evaluation.quality;
                state = next_state;
            }

            let avg_reward = reward_sum / STEPS_PER_EPISODE as f64;
            let entry = self.agent.end_episode(reward_sum);
            let audit = self.coordination_audit_score();

            if quality > best_score {
                best_score = quality;
                best_devices = self.topology.snapshot_devices();
                info!(episode, quality, "new best coordination");
            }

            history.push(OptimizationEpisode {
                episode,
                avg_reward,
                coordination_quality: quality,
                coordination_audit_score: audit,
                epsilon: entry.epsilon,
                adjustments_made: self.adjuster.log().len() - log_before,
            });
        }

        self.topology.restore_devices(&best_devices);

        let report = OptimizationReport {
            episodes_completed: episodes,
            best_coordination_score: best_score,
            baseline_score: baseline,
            final_epsilon: self.agent.epsilon(),
            total_adjustments: self.adjuster.log().len() - log_start,
            optimization_history: history,
            improvement: best_score - baseline,
        };
        info!(
            best = report.best_coordination_score,
            improvement = report.improvement,
            adjustments = report.total_adjustments,
            "RL optimization complete"
        );
        report
    }

    fn evaluate_battery(&self, battery: &[FaultScenario]) -> BatteryEvaluation {
        let results: Vec<FaultSimulationResult> =
            battery.iter().map(|scenario| self.simulate(scenario)).collect();
        let n = results.len().max(1) as f64;
        let mean_reward = results
            .iter()
            .map(|result| calculate_reward(result, false, false))
            .sum::<f64>()
            / n;
        let quality = results.iter().map(quality_of).sum::<f64>() / n;
        let reference = results
            .into_iter()
            .next()
            .unwrap_or_else(|| self.simulate(&OPTIMIZATION_BATTERY[0]));
        BatteryEvaluation {
            mean_reward,
            quality,
            reference,
        }
    }

    pub fn system_status(&self) -> SystemStatus {
        let total_devices = self.topology.device_count();
        let active_devices = self.topology.active_device_count();
        SystemStatus {
            total_devices,
            active_devices,
            zones: self.topology.zones.len(),
            system_health: if active_devices == total_devices {
                "healthy".to_string()
            } else {
                "warning".to_string()
            },
            agent_phase: self.agent.phase(),
        }
    }

    pub fn rl_status(&self) -> RlStatus {
        let agent = &self.agent;
        RlStatus {
            status: if agent.episodes() > OPERATIONAL_AFTER_EPISODES {
                "operational".to_string()
            } else {
                "training".to_string()
            },
            phase: agent.phase(),
            episodes: agent.episodes(),
            max_episodes: agent.max_episodes(),
            learning_rate: agent.learning_rate(),
            epsilon: agent.epsilon(),
            gamma: agent.gamma(),
            state_size: agent.state_size(),
            action_space_size: agent.action_space_size(),
        }
    }

    pub fn adjustment_log(&self) -> &[AdjustmentLogEntry] {
        self.adjuster.log()
    }

    /// Newest first.
    pub fn recent_adjustments(&self, limit: usize) -> Vec<&AdjustmentLogEntry> {
        self.adjuster.recent(limit)
    }
}

struct BatteryEvaluation {
    mean_reward: f64,
    quality: f64,
    /// Result for the first battery scenario, used as the next state
    reference: FaultSimulationResult,
}

fn quality_of(result: &FaultSimulationResult) -> f64 {
    let mut score = -5.0 * result.coordination_issues.len() as f64;
    if result.coordination_ok {
        score += 20.0;
    }
    score
}
