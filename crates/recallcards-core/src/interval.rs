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

//! Monte-Carlo sampling of the next review interval.
//!
//! Each sample draws a starting recall probability from the card's
//! posterior and solves `p0 * exp(-decay * t) = target` for `t`. The
//! samples are stretched by the card's age and streak, and the interval is
//! read off a randomly chosen percentile so that similar cards do not all
//! come due at the same minute.

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::decay::HISTORY_WINDOW;
use crate::decay::adaptive_decay;
use crate::error::Fallible;
use crate::error::fail;
use crate::recall::BetaParams;
use crate::recall::posterior;
use crate::rng::sample_beta;
use crate::types::card::CardRecord;
use crate::types::learner::LearnerProfile;
use crate::types::timestamp::Timestamp;

/// All intervals are in minutes.
pub type Minutes = u64;

/// The shortest interval ever predicted.
pub const MIN_INTERVAL: Minutes = 1;

const MINUTES_PER_HOUR: Minutes = 60;
const MINUTES_PER_DAY: Minutes = 60 * 24;
const MINUTES_PER_WEEK: f64 = (60 * 24 * 7) as f64;

/// The interval is read at a percentile drawn uniformly from this range.
const JITTER_LOW: f64 = 30.0;
const JITTER_HIGH: f64 = 80.0;

/// Number of draws used to estimate the recent success rate.
pub const SUCCESS_RATE_SAMPLES: usize = 1000;

/// The success rate the interval correction steers towards.
pub const SUCCESS_RATE_TARGET: f64 = 0.8;

/// How strongly the correction reacts to the success rate.
pub const SUCCESS_RATE_SENSITIVITY: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerOptions {
    /// The recall probability at which a card should be reviewed.
    pub target_recall: f64,
    /// Number of Monte-Carlo samples.
    pub n_samples: usize,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            target_recall: 0.7,
            n_samples: 3000,
        }
    }
}

/// A recommended interval, with the samples it was read from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntervalPrediction {
    pub interval: Minutes,
    pub samples: Vec<f64>,
}

impl IntervalPrediction {
    /// The prediction used when sampling fails: review again in a minute.
    pub fn fallback(n_samples: usize) -> Self {
        Self {
            interval: MIN_INTERVAL,
            samples: vec![MIN_INTERVAL as f64; n_samples],
        }
    }
}

/// Predict the next review interval for a card.
///
/// Interval prediction is advisory: if sampling fails for any reason the
/// failure is logged and [`IntervalPrediction::fallback`] is returned.
pub fn sample_next_review<R: Rng + ?Sized>(
    card: &CardRecord,
    profile: &LearnerProfile,
    options: SamplerOptions,
    now: Timestamp,
    rng: &mut R,
) -> IntervalPrediction {
    match try_sample_next_review(card, profile, options, now, rng) {
        Ok(prediction) => prediction,
        Err(e) => {
            log::warn!(
                "Interval sampling for card {} failed, using fallback: {}",
                card.id(),
                e.message()
            );
            IntervalPrediction::fallback(options.n_samples)
        }
    }
}

/// Like [`sample_next_review`], but reports failures instead of falling back.
pub fn try_sample_next_review<R: Rng + ?Sized>(
    card: &CardRecord,
    profile: &LearnerProfile,
    options: SamplerOptions,
    now: Timestamp,
    rng: &mut R,
) -> Fallible<IntervalPrediction> {
    let SamplerOptions {
        target_recall,
        n_samples,
    } = options;
    if n_samples == 0 {
        return fail("at least one sample is required");
    }
    if !(target_recall > 0.0 && target_recall < 1.0) {
        return fail(format!("target recall must be in (0, 1), got {target_recall}"));
    }
    let params = posterior(card, BetaParams::UNIFORM);
    if !params.is_valid() {
        return fail(format!("invalid posterior {params:?}"));
    }
    let decay = adaptive_decay(card, profile, None, HISTORY_WINDOW);
    if !(decay.is_finite() && decay > 0.0) {
        return fail(format!("invalid decay {decay}"));
    }

    let factor = age_factor(card, now);
    let samples: Vec<f64> = (0..n_samples)
        .map(|_| {
            let p0 = sample_beta(rng, params.alpha, params.beta);
            time_to_target(p0, target_recall, decay) * factor
        })
        .collect();

    let q = rng.gen_range(JITTER_LOW..JITTER_HIGH);
    let value = percentile(&samples, q)?;
    let interval = (value.floor() as Minutes).max(MIN_INTERVAL);
    log::debug!(
        "Card {}: posterior {params:?}, decay {decay:.5}, age factor {factor:.3}, p{q:.1} = {interval} minutes",
        card.id()
    );
    Ok(IntervalPrediction { interval, samples })
}

/// Minutes until recall starting at `p0` decays to `target`, at least one.
fn time_to_target(p0: f64, target: f64, decay: f64) -> f64 {
    if p0 <= target {
        return MIN_INTERVAL as f64;
    }
    ((p0 / target).ln() / decay).max(MIN_INTERVAL as f64)
}

/// Older cards, and cards on a longer streak, get stretched intervals.
fn age_factor(card: &CardRecord, now: Timestamp) -> f64 {
    let minutes_since_added = match card.minutes_since_added(now) {
        Some(minutes) => minutes.max(0.0),
        None => {
            log::debug!("Card {} has no creation time, ignoring its age", card.id());
            0.0
        }
    };
    1.0 + f64::from(card.mature_streak() / 2) + minutes_since_added / MINUTES_PER_WEEK
}

/// The `q`-th percentile of `values`, interpolating linearly between the
/// closest ranks.
fn percentile(values: &[f64], q: f64) -> Fallible<f64> {
    if values.is_empty() {
        return fail("percentile of an empty sample");
    }
    if values.iter().any(|v| !v.is_finite()) {
        return fail("samples contain a non-finite value");
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Human-readable interval, e.g. `"2 days, 3 hours"`.
pub fn interval_to_text(minutes: Minutes) -> String {
    if minutes < MINUTES_PER_HOUR {
        format!("{minutes} minutes")
    } else if minutes < MINUTES_PER_DAY {
        format!("{} hours", minutes / MINUTES_PER_HOUR)
    } else {
        let days = minutes / MINUTES_PER_DAY;
        let hours = (minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
        if hours > 0 {
            format!("{days} days, {hours} hours")
        } else {
            format!("{days} days")
        }
    }
}

/// Draw `n_samples` success rates from a Beta posterior.
pub fn sample_success_rate<R: Rng + ?Sized>(
    params: BetaParams,
    n_samples: usize,
    rng: &mut R,
) -> Vec<f64> {
    (0..n_samples)
        .map(|_| sample_beta(rng, params.alpha, params.beta))
        .collect()
}

/// Nudge an interval by how far the expected success rate is from `target`:
/// longer when the learner is doing better than the target, shorter when
/// worse. Never returns less than one minute.
pub fn bayesian_success_rate_interval<R: Rng + ?Sized>(
    interval: Minutes,
    params: BetaParams,
    target: f64,
    sensitivity: f64,
    rng: &mut R,
) -> Minutes {
    let samples = sample_success_rate(params, SUCCESS_RATE_SAMPLES, rng);
    let mean_p = samples.iter().sum::<f64>() / samples.len() as f64;
    let correction = 1.0 + sensitivity * (mean_p - target);
    let corrected = (interval as f64 * correction).max(MIN_INTERVAL as f64);
    corrected as Minutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use crate::types::rating::Rating;

    fn start() -> Timestamp {
        Timestamp::try_from("2024-01-01T12:00:00.000".to_string()).unwrap()
    }

    fn card_with(ratings: &[u8], created_at: Option<Timestamp>) -> Fallible<CardRecord> {
        let mut card = CardRecord::new(1, created_at);
        let mut now = start();
        for rating in ratings {
            now = now.plus_minutes(60);
            card.record_review(Rating::new(*rating)?, now);
        }
        Ok(card)
    }

    #[test]
    fn test_interval_to_text() {
        assert_eq!(interval_to_text(0), "0 minutes");
        assert_eq!(interval_to_text(45), "45 minutes");
        assert_eq!(interval_to_text(59), "59 minutes");
        assert_eq!(interval_to_text(60), "1 hours");
        assert_eq!(interval_to_text(90), "1 hours");
        assert_eq!(interval_to_text(1439), "23 hours");
        assert_eq!(interval_to_text(1440), "1 days");
        assert_eq!(interval_to_text(1500), "1 days, 1 hours");
        assert_eq!(interval_to_text(2 * 1440 + 59), "2 days");
        assert_eq!(interval_to_text(3000), "2 days, 2 hours");
    }

    #[test]
    fn test_percentile() -> Fallible<()> {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(percentile(&values, 0.0)?, 1.0);
        assert_eq!(percentile(&values, 50.0)?, 3.0);
        assert_eq!(percentile(&values, 100.0)?, 5.0);
        assert!((percentile(&values, 30.0)? - 2.2).abs() < 1e-12);
        assert_eq!(percentile(&[7.0], 42.0)?, 7.0);
        assert!(percentile(&[], 50.0).is_err());
        assert!(percentile(&[1.0, f64::NAN], 50.0).is_err());
        Ok(())
    }

    #[test]
    fn test_time_to_target() {
        assert_eq!(time_to_target(0.5, 0.7, 0.03), 1.0);
        assert_eq!(time_to_target(0.7, 0.7, 0.03), 1.0);
        let t = time_to_target(0.9, 0.7, 0.03);
        assert!((t - (0.9f64 / 0.7).ln() / 0.03).abs() < 1e-9);
        // Barely above target still floors at one minute.
        assert_eq!(time_to_target(0.70001, 0.7, 0.03), 1.0);
    }

    #[test]
    fn test_new_card_interval() -> Fallible<()> {
        let card = card_with(&[], Some(start()))?;
        let profile = LearnerProfile::default();
        let mut rng = seeded(11);
        let prediction =
            try_sample_next_review(&card, &profile, SamplerOptions::default(), start(), &mut rng)?;
        assert!(prediction.interval >= MIN_INTERVAL);
        assert_eq!(prediction.samples.len(), 3000);
        assert!(prediction.samples.iter().all(|t| *t >= 1.0));
        Ok(())
    }

    #[test]
    fn test_interval_is_at_least_one_minute() -> Fallible<()> {
        let profile = LearnerProfile::default();
        let histories: [&[u8]; 4] = [&[], &[0, 0, 0], &[10, 2, 9, 1], &[10; 12]];
        for (seed, ratings) in histories.iter().enumerate() {
            let card = card_with(ratings, Some(start()))?;
            let mut rng = seeded(seed as u64);
            let now = start().plus_minutes(10_000);
            let prediction =
                sample_next_review(&card, &profile, SamplerOptions::default(), now, &mut rng);
            assert!(prediction.interval >= MIN_INTERVAL);
        }
        Ok(())
    }

    #[test]
    fn test_seeded_prediction_is_reproducible() -> Fallible<()> {
        let card = card_with(&[8, 9, 4, 8], Some(start()))?;
        let profile = LearnerProfile::default();
        let now = start().plus_minutes(600);
        let a = sample_next_review(&card, &profile, SamplerOptions::default(), now, &mut seeded(5));
        let b = sample_next_review(&card, &profile, SamplerOptions::default(), now, &mut seeded(5));
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_strong_card_gets_long_interval() -> Fallible<()> {
        let card = card_with(&[10; 10], Some(start()))?;
        let profile = LearnerProfile::default();
        let now = start().plus_minutes(600);
        let prediction =
            try_sample_next_review(&card, &profile, SamplerOptions::default(), now, &mut seeded(3))?;
        assert!(prediction.interval > 10, "interval {}", prediction.interval);
        Ok(())
    }

    #[test]
    fn test_age_stretches_samples() -> Fallible<()> {
        let profile = LearnerProfile::default();
        let now = start();
        let fresh = card_with(&[8, 9], Some(now))?;
        let old = card_with(&[8, 9], Some(now.plus_minutes(-10 * 7 * 24 * 60)))?;
        let options = SamplerOptions::default();
        let a = try_sample_next_review(&fresh, &profile, options, now, &mut seeded(9))?;
        let b = try_sample_next_review(&old, &profile, options, now, &mut seeded(9))?;
        // Streak 2 gives a base factor of 2; ten weeks add 10 more.
        for (x, y) in a.samples.iter().zip(&b.samples) {
            assert!((y / x - 12.0 / 2.0).abs() < 1e-9);
        }
        assert!(b.interval >= a.interval);
        Ok(())
    }

    #[test]
    fn test_missing_creation_time_degrades() -> Fallible<()> {
        let profile = LearnerProfile::default();
        let card = card_with(&[8, 9, 9], None)?;
        assert_eq!(age_factor(&card, start()), 2.0);
        let prediction =
            try_sample_next_review(&card, &profile, SamplerOptions::default(), start(), &mut seeded(1))?;
        assert!(prediction.interval >= MIN_INTERVAL);
        Ok(())
    }

    #[test]
    fn test_future_creation_time_is_clamped() -> Fallible<()> {
        let card = card_with(&[], Some(start().plus_minutes(5000)))?;
        assert_eq!(age_factor(&card, start()), 1.0);
        Ok(())
    }

    #[test]
    fn test_invalid_options_fall_back() -> Fallible<()> {
        let card = card_with(&[8, 9], Some(start()))?;
        let profile = LearnerProfile::default();
        let options = SamplerOptions {
            target_recall: 1.5,
            n_samples: 25,
        };
        assert!(try_sample_next_review(&card, &profile, options, start(), &mut seeded(1)).is_err());
        let prediction = sample_next_review(&card, &profile, options, start(), &mut seeded(1));
        assert_eq!(prediction, IntervalPrediction::fallback(25));
        assert_eq!(prediction.interval, 1);
        assert_eq!(prediction.samples, vec![1.0; 25]);
        Ok(())
    }

    #[test]
    fn test_zero_samples_fall_back() -> Fallible<()> {
        let card = card_with(&[], Some(start()))?;
        let options = SamplerOptions {
            n_samples: 0,
            ..SamplerOptions::default()
        };
        let prediction =
            sample_next_review(&card, &LearnerProfile::default(), options, start(), &mut seeded(1));
        assert_eq!(prediction.interval, 1);
        assert!(prediction.samples.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_global_decay_falls_back() -> Fallible<()> {
        // With fewer than two ratings the global decay is used as is.
        let card = card_with(&[9], Some(start()))?;
        let profile = LearnerProfile::with_global_decay(0.0);
        let options = SamplerOptions::default();
        assert!(try_sample_next_review(&card, &profile, options, start(), &mut seeded(1)).is_err());
        let prediction = sample_next_review(&card, &profile, options, start(), &mut seeded(1));
        assert_eq!(prediction, IntervalPrediction::fallback(options.n_samples));
        Ok(())
    }

    #[test]
    fn test_success_rate_correction() {
        let mut rng = seeded(4);
        let confident = BetaParams::new(1000.0, 1.0);
        let struggling = BetaParams::new(1.0, 1000.0);
        let t = SUCCESS_RATE_TARGET;
        let s = SUCCESS_RATE_SENSITIVITY;
        assert_eq!(bayesian_success_rate_interval(100, confident, t, s, &mut rng), 103);
        assert_eq!(bayesian_success_rate_interval(100, struggling, t, s, &mut rng), 84);
        assert_eq!(bayesian_success_rate_interval(1, struggling, t, s, &mut rng), 1);
        assert_eq!(bayesian_success_rate_interval(0, confident, t, s, &mut rng), 1);
    }

    #[test]
    fn test_sample_success_rate() {
        let samples = sample_success_rate(BetaParams::OPTIMISTIC, 500, &mut seeded(8));
        assert_eq!(samples.len(), 500);
        assert!(samples.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
