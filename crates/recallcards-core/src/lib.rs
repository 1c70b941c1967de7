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

//! recallcards-core: Bayesian spaced repetition scheduling.
//!
//! This library provides:
//! - A Beta posterior over a card's recall probability
//! - A per-card forgetting rate seeded by the learner's global decay
//! - Monte-Carlo sampling of the next review interval
//! - A bucketed card selector for one study pass

pub mod decay;
pub mod error;
pub mod interval;
pub mod recall;
pub mod rng;
pub mod scheduler;
pub mod types;

// Re-exports for convenience
pub use decay::adaptive_decay;
pub use error::{ErrorReport, Fallible, fail};
pub use interval::{
    IntervalPrediction, Minutes, SamplerOptions, bayesian_success_rate_interval, interval_to_text,
    sample_next_review, try_sample_next_review,
};
pub use recall::{BetaParams, deck_posterior, posterior, recent_posterior};
pub use scheduler::{Bucket, SchedulingPass, Selection, SelectorOptions, classify};
pub use types::card::{CardId, CardRecord};
pub use types::learner::{LearnerProfile, RecallOutcome};
pub use types::rating::{Rating, RatingEvent};
pub use types::timestamp::Timestamp;
