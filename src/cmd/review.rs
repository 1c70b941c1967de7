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

use std::path::PathBuf;

use recallcards_core::CardId;
use recallcards_core::Fallible;
use recallcards_core::Rating;
use recallcards_core::Timestamp;

use crate::snapshot::DeckSnapshot;
use crate::utils::emit;

pub fn review_card(
    deck: PathBuf,
    card_id: CardId,
    rating: u8,
    output: Option<PathBuf>,
) -> Fallible<()> {
    let rating = Rating::new(rating)?;
    let mut snapshot = DeckSnapshot::load(&deck)?;
    apply_review(&mut snapshot, card_id, rating, Timestamp::now())?;
    emit(output, &snapshot.to_json()?)
}

/// Record a review on the card and the outcome on the learner's profile.
///
/// The outcome's interval is the time the card waited since its previous
/// review, or since it was created if this is its first review.
pub fn apply_review(
    snapshot: &mut DeckSnapshot,
    card_id: CardId,
    rating: Rating,
    now: Timestamp,
) -> Fallible<f64> {
    let card = snapshot.card_mut(card_id)?;
    let waited = card
        .last_reviewed_at()
        .or(card.created_at())
        .map(|since| now.minutes_since(since).max(0.0))
        .unwrap_or(0.0);
    card.record_review(rating, now);
    snapshot.profile.record_outcome(waited, rating.is_success());
    log::debug!(
        "Recorded rating {rating} for card {card_id} after {waited:.1} minutes"
    );
    Ok(waited)
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;
    use std::fs::write;

    use recallcards_core::CardRecord;
    use recallcards_core::LearnerProfile;
    use tempfile::tempdir;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::try_from("2024-05-01T09:00:00.000".to_string()).unwrap()
    }

    fn snapshot() -> DeckSnapshot {
        DeckSnapshot {
            profile: LearnerProfile::default(),
            cards: vec![
                CardRecord::new(1, Some(now().plus_minutes(-90))),
                CardRecord::new(2, None),
            ],
        }
    }

    #[test]
    fn test_first_review_waits_since_creation() -> Fallible<()> {
        let mut snapshot = snapshot();
        let waited = apply_review(&mut snapshot, 1, Rating::new(9)?, now())?;
        assert_eq!(waited, 90.0);
        let card = snapshot.card(1)?;
        assert_eq!(card.review_count(), 1);
        assert_eq!(card.mature_streak(), 1);
        assert_eq!(snapshot.profile.recall_history().len(), 1);
        assert!(snapshot.profile.recall_history()[0].success);
        Ok(())
    }

    #[test]
    fn test_later_review_waits_since_previous() -> Fallible<()> {
        let mut snapshot = snapshot();
        apply_review(&mut snapshot, 2, Rating::new(8)?, now())?;
        let waited = apply_review(&mut snapshot, 2, Rating::new(2)?, now().plus_minutes(30))?;
        assert_eq!(waited, 30.0);
        let card = snapshot.card(2)?;
        assert_eq!(card.mature_streak(), 0);
        assert_eq!(card.last_failure_time(), Some(now().plus_minutes(30)));
        assert!(!snapshot.profile.recall_history()[1].success);
        Ok(())
    }

    #[test]
    fn test_unknown_card_leaves_profile_alone() -> Fallible<()> {
        let mut snapshot = snapshot();
        assert!(apply_review(&mut snapshot, 7, Rating::new(8)?, now()).is_err());
        assert!(snapshot.profile.recall_history().is_empty());
        Ok(())
    }

    #[test]
    fn test_review_writes_output_file() -> Fallible<()> {
        let dir = tempdir()?;
        let deck = dir.path().join("deck.json");
        let output = dir.path().join("updated.json");
        write(&deck, snapshot().to_json()?)?;
        review_card(deck.clone(), 1, 10, Some(output.clone()))?;
        let updated: DeckSnapshot = serde_json::from_str(&read_to_string(&output)?)?;
        assert_eq!(updated.card(1)?.review_count(), 1);
        assert_eq!(updated.profile.recall_history().len(), 1);
        // The input deck is untouched.
        let original: DeckSnapshot = serde_json::from_str(&read_to_string(&deck)?)?;
        assert_eq!(original, snapshot());
        Ok(())
    }

    #[test]
    fn test_invalid_rating() -> Fallible<()> {
        let dir = tempdir()?;
        let deck = dir.path().join("deck.json");
        write(&deck, snapshot().to_json()?)?;
        assert!(review_card(deck, 1, 11, None).is_err());
        Ok(())
    }
}
