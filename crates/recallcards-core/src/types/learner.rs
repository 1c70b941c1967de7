// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::f64::consts::LN_2;

use serde::Deserialize;
use serde::Serialize;

/// The forgetting rate assumed before there is enough history to fit one.
pub const DEFAULT_GLOBAL_DECAY: f64 = 0.03;

/// The number of outcomes required before the global decay is re-estimated.
pub const MIN_HISTORY_FOR_DECAY: usize = 10;

/// How many of the most recent outcomes the re-estimation looks at.
pub const DECAY_HISTORY_WINDOW: usize = 50;

/// The outcome of one review: the interval (in minutes) the card waited
/// before being reviewed, and whether it was recalled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, bool)", into = "(f64, bool)")]
pub struct RecallOutcome {
    pub interval: f64,
    pub success: bool,
}

impl From<(f64, bool)> for RecallOutcome {
    fn from((interval, success): (f64, bool)) -> Self {
        Self { interval, success }
    }
}

impl From<RecallOutcome> for (f64, bool) {
    fn from(outcome: RecallOutcome) -> Self {
        (outcome.interval, outcome.success)
    }
}

/// A learner's aggregate recall history and global forgetting rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnerProfile {
    #[serde(default)]
    recall_history: Vec<RecallOutcome>,
    #[serde(default = "default_global_decay")]
    global_decay: f64,
}

fn default_global_decay() -> f64 {
    DEFAULT_GLOBAL_DECAY
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self::with_global_decay(DEFAULT_GLOBAL_DECAY)
    }
}

impl LearnerProfile {
    pub fn with_global_decay(global_decay: f64) -> Self {
        Self {
            recall_history: Vec::new(),
            global_decay,
        }
    }

    pub fn global_decay(&self) -> f64 {
        self.global_decay
    }

    pub fn recall_history(&self) -> &[RecallOutcome] {
        &self.recall_history
    }

    /// Append a review outcome and re-estimate the global decay.
    pub fn record_outcome(&mut self, interval: f64, success: bool) {
        self.recall_history.push(RecallOutcome { interval, success });
        self.update_decay();
    }

    /// Fraction of successful outcomes, or zero for an empty history.
    pub fn success_rate(&self) -> f64 {
        if self.recall_history.is_empty() {
            return 0.0;
        }
        let successes = self.recall_history.iter().filter(|o| o.success).count();
        successes as f64 / self.recall_history.len() as f64
    }

    /// Treats the mean interval of recent failures as a half-life.
    fn update_decay(&mut self) {
        if self.recall_history.len() < MIN_HISTORY_FOR_DECAY {
            return;
        }
        let start = self.recall_history.len().saturating_sub(DECAY_HISTORY_WINDOW);
        let failures: Vec<f64> = self.recall_history[start..]
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.interval)
            .collect();
        if failures.is_empty() {
            self.global_decay = DEFAULT_GLOBAL_DECAY;
            return;
        }
        let half_life = failures.iter().sum::<f64>() / failures.len() as f64;
        if half_life > 0.0 && half_life.is_finite() {
            self.global_decay = LN_2 / half_life;
        } else {
            log::warn!(
                "Mean failure interval is {half_life}, resetting global decay to {DEFAULT_GLOBAL_DECAY}"
            );
            self.global_decay = DEFAULT_GLOBAL_DECAY;
        }
        log::debug!("Global decay re-estimated to {}", self.global_decay);
    }
}
