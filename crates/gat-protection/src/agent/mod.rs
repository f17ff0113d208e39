//! Tabular Q-learning agent.
//!
//! The agent moves through three phases, counted on started episodes and
//! never going back:
//!
//! ```text
//! Uninitialized ──begin_episode──▶ Exploring ──(> min_exploration_episodes)──▶ Exploiting
//! ```
//!
//! While exploring, every action is drawn uniformly. Once exploiting,
//! actions are epsilon-greedy: uniform with probability ε, otherwise the
//! argmax of the Q row after adding small Gaussian noise to each entry.
//!
//! The update is one-step Q-learning with an error-scaled step size:
//!
//! ```text
//! td_error = r + γ · max Q[s'] − Q[s][a]
//! Q[s][a] += α · (1 + |td_error| / 10) · td_error
//! ```

mod qtable;
mod state;

pub use qtable::QTable;
pub use state::{bucket, StateEncoder};

use crate::config::AgentConfig;
use crate::simulator::FaultSimulationResult;
use gat_core::ZoneId;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    Uninitialized,
    Exploring,
    Exploiting,
}

impl AgentPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentPhase::Uninitialized => "uninitialized",
            AgentPhase::Exploring => "exploring",
            AgentPhase::Exploiting => "exploiting",
        }
    }
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistoryEntry {
    pub episode: u32,
    /// Cumulative reward over the episode
    pub reward: f64,
    pub epsilon: f64,
}

pub struct QLearningAgent {
    encoder: StateEncoder,
    q_table: QTable,
    learning_rate: f64,
    gamma: f64,
    epsilon: f64,
    epsilon_decay: f64,
    epsilon_min: f64,
    min_exploration_episodes: u32,
    max_episodes: u32,
    noise: Option<Normal<f64>>,
    episodes: u32,
    history: Vec<TrainingHistoryEntry>,
    rng: StdRng,
}

impl fmt::Debug for QLearningAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QLearningAgent")
            .field("phase", &self.phase())
            .field("episodes", &self.episodes)
            .field("epsilon", &self.epsilon)
            .field("states", &self.q_table.states())
            .field("actions", &self.q_table.actions())
            .finish()
    }
}

impl QLearningAgent {
    pub fn new(config: &AgentConfig, action_space_size: usize, reference_zone: Option<ZoneId>) -> Self {
        let state_size = config.state_size.max(1);
        let rng = config
            .seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);
        let noise = (config.exploration_noise > 0.0)
            .then(|| Normal::new(0.0, config.exploration_noise).ok())
            .flatten();

        Self {
            encoder: StateEncoder::new(state_size, config.critical_devices.clone(), reference_zone),
            q_table: QTable::new(state_size, action_space_size.max(1)),
            learning_rate: config.learning_rate,
            gamma: config.gamma,
            epsilon: config.epsilon,
            epsilon_decay: config.epsilon_decay,
            epsilon_min: config.epsilon_min,
            min_exploration_episodes: config.min_exploration_episodes,
            max_episodes: config.max_episodes,
            noise,
            episodes: 0,
            history: Vec::new(),
            rng,
        }
    }

    pub fn phase(&self) -> AgentPhase {
        if self.episodes == 0 {
            AgentPhase::Uninitialized
        } else if self.episodes <= self.min_exploration_episodes {
            AgentPhase::Exploring
        } else {
            AgentPhase::Exploiting
        }
    }

    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    pub fn max_episodes(&self) -> u32 {
        self.max_episodes
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn state_size(&self) -> usize {
        self.q_table.states()
    }

    pub fn action_space_size(&self) -> usize {
        self.q_table.actions()
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn encoder(&self) -> &StateEncoder {
        &self.encoder
    }

    pub fn history(&self) -> &[TrainingHistoryEntry] {
        &self.history
    }

    /// Q-table row for a simulation result.
    pub fn state(&self, result: &FaultSimulationResult) -> usize {
        self.encoder.encode(result)
    }

    /// Start a new episode and return its 1-based number.
    pub fn begin_episode(&mut self) -> u32 {
        self.episodes += 1;
        self.episodes
    }

    /// An unknown `state` has no learned row and gets a uniform draw.
    pub fn select_action(&mut self, state: usize) -> usize {
        let actions = self.q_table.actions();
        if self.phase() != AgentPhase::Exploiting
            || state >= self.q_table.states()
            || self.rng.gen::<f64>() < self.epsilon
        {
            return self.rng.gen_range(0..actions);
        }

        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (action, value) in self.q_table.row(state).iter().enumerate() {
            let perturbed = match &self.noise {
                Some(noise) => value + noise.sample(&mut self.rng),
                None => *value,
            };
            if perturbed > best_value {
                best = action;
                best_value = perturbed;
            }
        }
        best
    }

    /// One-step update; returns the TD error. Indices outside the table are
    /// ignored and report a zero error.
    pub fn learn(&mut self, state: usize, action: usize, reward: f64, next_state: usize) -> f64 {
        let states = self.q_table.states();
        if action >= self.q_table.actions() || state >= states || next_state >= states {
            return 0.0;
        }
        let current = self.q_table.get(state, action);
        let td_target = reward + self.gamma * self.q_table.max_value(next_state);
        let td_error = td_target - current;
        let step = self.learning_rate * (1.0 + td_error.abs() / 10.0);
        self.q_table.set(state, action, current + step * td_error);

        if self.phase() == AgentPhase::Exploiting {
            self.decay_epsilon();
        }
        td_error
    }

    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);
    }

    /// Close the current episode: decay ε once and record its cumulative reward.
    pub fn end_episode(&mut self, reward: f64) -> TrainingHistoryEntry {
        self.decay_epsilon();
        let entry = TrainingHistoryEntry {
            episode: self.episodes,
            reward,
            epsilon: self.epsilon,
        };
        debug!(episode = entry.episode, reward, epsilon = entry.epsilon, "episode closed");
        self.history.push(entry.clone());
        entry
    }
}
