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

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::rating::Rating;
use crate::types::rating::RatingEvent;
use crate::types::timestamp::Timestamp;

pub type CardId = u64;

/// The success streak at which a card becomes mature.
pub const MATURE_STREAK: u32 = 4;

/// A card's review history and maturity state.
///
/// Only [`CardRecord::record_review`] mutates a card, which keeps the
/// maturity flag, the streak counter and the last failure time in sync.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    id: CardId,
    #[serde(default)]
    rating_history: Vec<RatingEvent>,
    #[serde(default)]
    mature_streak: u32,
    #[serde(default)]
    is_mature: bool,
    #[serde(default)]
    last_failure_time: Option<Timestamp>,
    #[serde(default)]
    created_at: Option<Timestamp>,
}

impl CardRecord {
    pub fn new(id: CardId, created_at: Option<Timestamp>) -> Self {
        Self {
            id,
            rating_history: Vec::new(),
            mature_streak: 0,
            is_mature: false,
            last_failure_time: None,
            created_at,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    /// The card's rating events, in the order they were recorded.
    pub fn ratings(&self) -> &[RatingEvent] {
        &self.rating_history
    }

    pub fn review_count(&self) -> usize {
        self.rating_history.len()
    }

    pub fn mature_streak(&self) -> u32 {
        self.mature_streak
    }

    pub fn last_failure_time(&self) -> Option<Timestamp> {
        self.last_failure_time
    }

    pub fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    /// The stored maturity flag. Fails when the flag contradicts the streak
    /// counter, which only happens when a record was edited outside of
    /// [`CardRecord::record_review`].
    pub fn maturity(&self) -> Fallible<bool> {
        let expected = self.mature_streak >= MATURE_STREAK;
        if self.is_mature != expected {
            return fail(format!(
                "card {} has is_mature = {} but a streak of {}",
                self.id, self.is_mature, self.mature_streak
            ));
        }
        Ok(self.is_mature)
    }

    /// Minutes between the card's creation and `now`, or `None` when the
    /// creation time is unknown.
    pub fn minutes_since_added(&self, now: Timestamp) -> Option<f64> {
        self.created_at.map(|created_at| now.minutes_since(created_at))
    }

    /// The timestamp of the most recent review, if any.
    pub fn last_reviewed_at(&self) -> Option<Timestamp> {
        self.rating_history.iter().map(|event| event.timestamp).max()
    }

    /// Append a review and update the maturity fields.
    pub fn record_review(&mut self, rating: Rating, now: Timestamp) {
        self.rating_history.push(RatingEvent {
            timestamp: now,
            rating,
        });
        if rating.is_success() {
            self.mature_streak += 1;
        } else {
            self.mature_streak = 0;
            self.last_failure_time = Some(now);
        }
        self.is_mature = self.mature_streak >= MATURE_STREAK;
    }
}
