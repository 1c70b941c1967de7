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

//! Per-card forgetting rate.
//!
//! The estimate starts from the learner's global decay and folds over the
//! most recent pairs of ratings: a worse rating after a long gap pushes
//! the rate up, a better rating after a real gap pulls it down slightly.

use crate::types::card::CardRecord;
use crate::types::learner::LearnerProfile;
use crate::types::rating::RatingEvent;

/// How many of the most recent ratings are considered.
pub const HISTORY_WINDOW: usize = 5;

/// The smallest decay ever returned for a card with enough history.
pub const MIN_DECAY: f64 = 0.001;

/// Divisor for the increase applied when a rating drops.
const WORSENING_SCALE: f64 = 10_000.0;

/// Multiplier applied when a rating improves after a real gap.
const IMPROVEMENT_FACTOR: f64 = 0.97;

/// Improvements within this many minutes are immediate re-tests.
const RETEST_MINUTES: f64 = 10.0;

/// Multiplier applied to cards past the maturity streak.
const MATURITY_DISCOUNT: f64 = 0.6;

/// Cards whose streak exceeds this get the maturity discount.
const MATURITY_DISCOUNT_STREAK: u32 = 3;

/// Estimate a card's forgetting rate.
///
/// `base_decay` defaults to the learner's global decay. Cards with fewer
/// than two ratings get `base_decay` back unchanged, even when it is below
/// [`MIN_DECAY`]; the floor only applies once there is a rating pair.
pub fn adaptive_decay(
    card: &CardRecord,
    profile: &LearnerProfile,
    base_decay: Option<f64>,
    history_window: usize,
) -> f64 {
    let base_decay = base_decay.unwrap_or_else(|| profile.global_decay());
    if card.review_count() < 2 {
        return base_decay;
    }

    let mut events: Vec<&RatingEvent> = card.ratings().iter().collect();
    events.sort_by_key(|event| event.timestamp);
    let window = &events[events.len().saturating_sub(history_window)..];

    let mut decay = base_decay;
    for pair in window.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let delta_t = curr.timestamp.minutes_since(prev.timestamp);
        let delta_rating = i32::from(curr.rating.value()) - i32::from(prev.rating.value());
        if delta_rating < 0 {
            decay += f64::from(delta_rating.abs()) * delta_t / WORSENING_SCALE;
        } else if delta_rating > 0 && delta_t > RETEST_MINUTES {
            decay *= IMPROVEMENT_FACTOR;
        }
    }

    if card.mature_streak() > MATURITY_DISCOUNT_STREAK {
        decay *= MATURITY_DISCOUNT;
    }
    decay.max(MIN_DECAY)
}
