//! Dense row-major action-value table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    states: usize,
    actions: usize,
    values: Vec<f64>,
}

impl QTable {
    /// Zero-initialised `states × actions` table.
    pub fn new(states: usize, actions: usize) -> Self {
        Self {
            states,
            actions,
            values: vec![0.0; states * actions],
        }
    }

    pub fn states(&self) -> usize {
        self.states
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[self.index(state, action)]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        let idx = self.index(state, action);
        self.values[idx] = value;
    }

    pub fn row(&self, state: usize) -> &[f64] {
        let start = state * self.actions;
        &self.values[start..start + self.actions]
    }

    /// Largest value in a row; 0.0 for an empty action space.
    pub fn max_value(&self, state: usize) -> f64 {
        self.row(state)
            .iter()
            .copied()
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
            .unwrap_or(0.0)
    }

    /// Number of non-zero entries; a rough measure of how much was learned.
    pub fn visited(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }

    fn index(&self, state: usize, action: usize) -> usize {
        debug_assert!(state < self.states && action < self.actions);
        state * self.actions + action
    }
}
