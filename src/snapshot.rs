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

use std::path::Path;

use recallcards_core::CardId;
use recallcards_core::CardRecord;
use recallcards_core::Fallible;
use recallcards_core::LearnerProfile;
use recallcards_core::fail;
use serde::Deserialize;
use serde::Serialize;

/// A deck and its learner, as handed to the CLI.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckSnapshot {
    #[serde(default)]
    pub profile: LearnerProfile,
    #[serde(default)]
    pub cards: Vec<CardRecord>,
}

impl DeckSnapshot {
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail("deck file does not exist.");
        }
        let text = std::fs::read_to_string(path)?;
        let snapshot: DeckSnapshot = serde_json::from_str(&text)?;
        log::debug!(
            "Loaded {} cards from {}",
            snapshot.cards.len(),
            path.display()
        );
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Fallible<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn card(&self, id: CardId) -> Fallible<&CardRecord> {
        match self.cards.iter().find(|card| card.id() == id) {
            Some(card) => Ok(card),
            None => fail(format!("no card with id {id}.")),
        }
    }

    pub fn card_mut(&mut self, id: CardId) -> Fallible<&mut CardRecord> {
        match self.cards.iter_mut().find(|card| card.id() == id) {
            Some(card) => Ok(card),
            None => fail(format!("no card with id {id}.")),
        }
    }
}
