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

use recallcards_core::Bucket;
use recallcards_core::CardId;
use recallcards_core::Fallible;
use recallcards_core::Minutes;
use recallcards_core::SchedulingPass;
use recallcards_core::Timestamp;
use recallcards_core::classify;
use recallcards_core::interval_to_text;
use serde::Serialize;

use crate::cmd::OutputFormat;
use crate::config::Config;
use crate::snapshot::DeckSnapshot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextCard {
    card_id: CardId,
    bucket: Option<Bucket>,
    interval_minutes: Minutes,
    interval_text: String,
}

pub fn print_next_card(deck: PathBuf, config: Config, format: OutputFormat) -> Fallible<()> {
    let snapshot = DeckSnapshot::load(&deck)?;
    let next = next_card(&snapshot, &config, Timestamp::now());
    match format {
        OutputFormat::Text => match next {
            Some(next) => println!(
                "Card {} ({}): next review in {}.",
                next.card_id,
                next.bucket.map(|b| b.as_str()).unwrap_or("unclassified"),
                next.interval_text
            ),
            None => println!("Nothing to study."),
        },
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&next)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Run a fresh scheduling pass and take its first selection.
pub fn next_card(snapshot: &DeckSnapshot, config: &Config, now: Timestamp) -> Option<NextCard> {
    let mut pass = SchedulingPass::new(&snapshot.profile, &snapshot.cards, config.rng());
    let selection = pass.next_with_interval(now, config.scheduler, config.sampler)?;
    let interval = selection.prediction.interval;
    Some(NextCard {
        card_id: selection.card.id(),
        bucket: classify(selection.card, now).ok(),
        interval_minutes: interval,
        interval_text: interval_to_text(interval),
    })
}
