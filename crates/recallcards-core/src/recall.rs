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

//! Beta posteriors over recall probability.

use serde::Serialize;

use crate::types::card::CardRecord;
use crate::types::learner::LearnerProfile;

/// How many recent outcomes the learner-level posterior looks at.
pub const RECENT_WINDOW: usize = 30;

/// Parameters of a Beta distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BetaParams {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaParams {
    /// Beta(1, 1): no opinion about recall.
    pub const UNIFORM: BetaParams = BetaParams {
        alpha: 1.0,
        beta: 1.0,
    };

    /// Beta(2, 1): the learner-level prior, leaning towards success.
    pub const OPTIMISTIC: BetaParams = BetaParams {
        alpha: 2.0,
        beta: 1.0,
    };

    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Whether both parameters are finite and positive.
    pub fn is_valid(&self) -> bool {
        self.alpha.is_finite() && self.beta.is_finite() && self.alpha > 0.0 && self.beta > 0.0
    }

    fn observe(self, successes: usize, failures: usize) -> Self {
        Self {
            alpha: self.alpha + successes as f64,
            beta: self.beta + failures as f64,
        }
    }
}

/// The posterior over a card's recall probability given its full history.
pub fn posterior(card: &CardRecord, prior: BetaParams) -> BetaParams {
    let successes = card.ratings().iter().filter(|e| e.rating.is_success()).count();
    let failures = card.review_count() - successes;
    prior.observe(successes, failures)
}

/// The posterior over the learner's recall rate, from the last `window`
/// outcomes of their history.
pub fn recent_posterior(profile: &LearnerProfile, window: usize, prior: BetaParams) -> BetaParams {
    let history = profile.recall_history();
    let recent = &history[history.len().saturating_sub(window)..];
    let successes = recent.iter().filter(|o| o.success).count();
    prior.observe(successes, recent.len() - successes)
}

/// The posterior over every rating in a pool of cards.
pub fn deck_posterior<'a>(
    cards: impl IntoIterator<Item = &'a CardRecord>,
    prior: BetaParams,
) -> BetaParams {
    cards
        .into_iter()
        .map(|card| posterior(card, BetaParams::new(0.0, 0.0)))
        .fold(prior, |acc, counts| {
            BetaParams::new(acc.alpha + counts.alpha, acc.beta + counts.beta)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::rating::Rating;
    use crate::types::timestamp::Timestamp;

    fn card_with(id: u64, ratings: &[u8]) -> Fallible<CardRecord> {
        let mut now = Timestamp::try_from("2024-01-01T12:00:00.000".to_string())?;
        let mut card = CardRecord::new(id, Some(now));
        for rating in ratings {
            now = now.plus_minutes(30);
            card.record_review(Rating::new(*rating)?, now);
        }
        Ok(card)
    }

    #[test]
    fn test_no_history_returns_prior() -> Fallible<()> {
        let card = card_with(1, &[])?;
        assert_eq!(posterior(&card, BetaParams::UNIFORM), BetaParams::UNIFORM);
        assert_eq!(
            posterior(&card, BetaParams::new(3.5, 0.5)),
            BetaParams::new(3.5, 0.5)
        );
        Ok(())
    }

    #[test]
    fn test_counts_successes_and_failures() -> Fallible<()> {
        let card = card_with(1, &[7, 6, 10, 0, 9])?;
        assert_eq!(posterior(&card, BetaParams::UNIFORM), BetaParams::new(4.0, 3.0));
        Ok(())
    }

    #[test]
    fn test_parameter_sum_grows_by_history_length() -> Fallible<()> {
        let histories: [&[u8]; 5] = [&[], &[0], &[10, 10], &[3, 7, 6, 8], &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]];
        let prior = BetaParams::new(1.5, 2.5);
        for ratings in histories {
            let card = card_with(1, ratings)?;
            let post = posterior(&card, prior);
            assert_eq!(
                post.alpha + post.beta,
                prior.alpha + prior.beta + ratings.len() as f64
            );
        }
        Ok(())
    }

    #[test]
    fn test_recent_posterior_uses_window() {
        let mut profile = LearnerProfile::default();
        for _ in 0..5 {
            profile.record_outcome(10.0, false);
        }
        for _ in 0..3 {
            profile.record_outcome(10.0, true);
        }
        assert_eq!(
            recent_posterior(&profile, RECENT_WINDOW, BetaParams::OPTIMISTIC),
            BetaParams::new(5.0, 6.0)
        );
        assert_eq!(
            recent_posterior(&profile, 4, BetaParams::OPTIMISTIC),
            BetaParams::new(5.0, 2.0)
        );
    }

    #[test]
    fn test_recent_posterior_empty_history() {
        let profile = LearnerProfile::default();
        assert_eq!(
            recent_posterior(&profile, RECENT_WINDOW, BetaParams::OPTIMISTIC),
            BetaParams::OPTIMISTIC
        );
    }

    #[test]
    fn test_deck_posterior() -> Fallible<()> {
        let cards = vec![card_with(1, &[8, 2])?, card_with(2, &[])?, card_with(3, &[9, 9, 4])?];
        assert_eq!(
            deck_posterior(&cards, BetaParams::OPTIMISTIC),
            BetaParams::new(5.0, 3.0)
        );
        Ok(())
    }

    #[test]
    fn test_mean_and_validity() {
        assert_eq!(BetaParams::new(3.0, 1.0).mean(), 0.75);
        assert!(BetaParams::UNIFORM.is_valid());
        assert!(!BetaParams::new(0.0, 1.0).is_valid());
        assert!(!BetaParams::new(1.0, f64::NAN).is_valid());
    }
}
