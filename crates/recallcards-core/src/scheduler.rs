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

//! Choosing which card to show next.
//!
//! A [`SchedulingPass`] lives for one study pass over a fixed pool of
//! cards. Each selection sorts the cards that are still under their
//! per-pass cap into urgent, new and mature buckets, shuffles them, and
//! draws uniformly from a short candidate list that always contains every
//! urgent card but only a handful of new and mature ones.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::interval::IntervalPrediction;
use crate::interval::SamplerOptions;
use crate::interval::sample_next_review;
use crate::types::card::CardId;
use crate::types::card::CardRecord;
use crate::types::learner::LearnerProfile;
use crate::types::timestamp::Timestamp;

/// A mature card that failed less than this many minutes ago is urgent.
const URGENT_FAILURE_MINUTES: f64 = 48.0 * 60.0;

/// How many new cards make it into the candidate list.
const NEW_SLOTS: usize = 3;

/// How many mature cards make it into the candidate list.
const MATURE_SLOTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// Never reviewed.
    New,
    /// Not yet mature, or mature but failed recently.
    Urgent,
    /// Mature with no recent failure.
    Mature,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::New => "new",
            Bucket::Urgent => "urgent",
            Bucket::Mature => "mature",
        }
    }
}

/// Work out which bucket a card belongs in.
///
/// Fails when the card's maturity data cannot be trusted: a maturity flag
/// that contradicts the streak, or a failure time after `now`.
pub fn classify(card: &CardRecord, now: Timestamp) -> Fallible<Bucket> {
    if card.review_count() == 0 {
        return Ok(Bucket::New);
    }
    if !card.maturity()? {
        return Ok(Bucket::Urgent);
    }
    match card.last_failure_time() {
        Some(failed_at) if failed_at > now => fail(format!(
            "card {} last failed at {failed_at}, which is after {now}",
            card.id()
        )),
        Some(failed_at) if now.minutes_since(failed_at) < URGENT_FAILURE_MINUTES => {
            Ok(Bucket::Urgent)
        }
        _ => Ok(Bucket::Mature),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorOptions {
    /// Maximum number of candidates considered per selection.
    pub backlog_limit: usize,
    /// How many times a card may be shown in one pass.
    pub max_reviews_per_card: u32,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            backlog_limit: 50,
            max_reviews_per_card: 2,
        }
    }
}

/// A selected card together with its predicted interval.
#[derive(Debug)]
pub struct Selection<'a> {
    pub card: &'a CardRecord,
    pub prediction: IntervalPrediction,
}

/// One scheduling pass over a fixed pool of cards.
pub struct SchedulingPass<'a, R: Rng> {
    profile: &'a LearnerProfile,
    cards: &'a [CardRecord],
    shown: HashMap<CardId, u32>,
    rng: R,
}

impl<'a, R: Rng> SchedulingPass<'a, R> {
    pub fn new(profile: &'a LearnerProfile, cards: &'a [CardRecord], rng: R) -> Self {
        let shown = cards.iter().map(|card| (card.id(), 0)).collect();
        Self {
            profile,
            cards,
            shown,
            rng,
        }
    }

    /// How many times a card has been shown in this pass.
    pub fn shown_count(&self, id: CardId) -> u32 {
        self.shown.get(&id).copied().unwrap_or(0)
    }

    /// Pick the next card to show, or `None` if the pool is empty.
    ///
    /// Once every card has reached `max_reviews_per_card`, cards are still
    /// served (uniformly, without counting) so a review loop never stalls.
    pub fn select_next_card(
        &mut self,
        now: Timestamp,
        options: SelectorOptions,
    ) -> Option<&'a CardRecord> {
        let candidates = self.candidates(now, options);
        if let Some(card) = candidates.choose(&mut self.rng).copied() {
            self.mark_shown(card);
            return Some(card);
        }

        let cards = self.cards;
        let remaining: Vec<&'a CardRecord> = cards
            .iter()
            .filter(|card| self.shown_count(card.id()) < options.max_reviews_per_card)
            .collect();
        if let Some(card) = remaining.choose(&mut self.rng).copied() {
            self.mark_shown(card);
            return Some(card);
        }

        let card = cards.choose(&mut self.rng);
        match card {
            Some(card) => log::debug!("Every card is at its cap, serving card {}", card.id()),
            None => log::debug!("Pool is empty, nothing to study"),
        }
        card
    }

    /// Select a card and attach its advisory interval prediction.
    pub fn next_with_interval(
        &mut self,
        now: Timestamp,
        selector: SelectorOptions,
        sampler: SamplerOptions,
    ) -> Option<Selection<'a>> {
        let card = self.select_next_card(now, selector)?;
        let prediction = sample_next_review(card, self.profile, sampler, now, &mut self.rng);
        Some(Selection { card, prediction })
    }

    /// The shuffled candidate list: every urgent card, then a few new and
    /// mature ones, truncated to the backlog limit.
    fn candidates(&mut self, now: Timestamp, options: SelectorOptions) -> Vec<&'a CardRecord> {
        let mut urgent: Vec<&'a CardRecord> = Vec::new();
        let mut new: Vec<&'a CardRecord> = Vec::new();
        let mut mature: Vec<&'a CardRecord> = Vec::new();

        let cards = self.cards;
        for card in cards {
            if self.shown_count(card.id()) >= options.max_reviews_per_card {
                continue;
            }
            let bucket = classify(card, now).unwrap_or_else(|e| {
                log::warn!("Treating card {} as new: {}", card.id(), e.message());
                Bucket::New
            });
            match bucket {
                Bucket::New => new.push(card),
                Bucket::Urgent => urgent.push(card),
                Bucket::Mature => mature.push(card),
            }
        }
        log::debug!(
            "Buckets: {} urgent, {} new, {} mature",
            urgent.len(),
            new.len(),
            mature.len()
        );

        urgent.shuffle(&mut self.rng);
        new.shuffle(&mut self.rng);
        mature.shuffle(&mut self.rng);

        let mut candidates = urgent;
        candidates.extend(new.into_iter().take(NEW_SLOTS));
        candidates.extend(mature.into_iter().take(MATURE_SLOTS));
        candidates.truncate(options.backlog_limit);
        candidates
    }

    fn mark_shown(&mut self, card: &CardRecord) {
        *self.shown.entry(card.id()).or_insert(0) += 1;
        log::debug!("Selected card {} ({} shown)", card.id(), self.shown_count(card.id()));
    }
}
