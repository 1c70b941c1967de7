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

/// One selection in a simulated pass.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStep {
    card_id: CardId,
    bucket: Option<Bucket>,
    times_shown: u32,
    interval_minutes: Minutes,
}

pub fn print_session(
    deck: PathBuf,
    count: Option<usize>,
    config: Config,
    format: OutputFormat,
) -> Fallible<()> {
    let snapshot = DeckSnapshot::load(&deck)?;
    let steps = simulate_session(&snapshot, &config, Timestamp::now(), count);
    match format {
        OutputFormat::Text => {
            if steps.is_empty() {
                println!("Nothing to study.");
            }
            for (i, step) in steps.iter().enumerate() {
                println!(
                    "{:>3}. card {} ({}, shown {}x): next review in {}",
                    i + 1,
                    step.card_id,
                    step.bucket.map(|b| b.as_str()).unwrap_or("unclassified"),
                    step.times_shown,
                    interval_to_text(step.interval_minutes)
                );
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&steps)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Run `count` selections of a single pass without recording any reviews.
/// By default the pass runs until every card has hit its cap. Past that
/// point selections are uncounted repeats, so `count` is clamped to it.
pub fn simulate_session(
    snapshot: &DeckSnapshot,
    config: &Config,
    now: Timestamp,
    count: Option<usize>,
) -> Vec<SessionStep> {
    let cap = (config.scheduler.max_reviews_per_card as usize).max(1);
    let limit = snapshot.cards.len().saturating_mul(cap);
    let count = count.map_or(limit, |n| n.min(limit));
    let mut pass = SchedulingPass::new(&snapshot.profile, &snapshot.cards, config.rng());
    let mut steps = Vec::new();
    for _ in 0..count {
        let Some(selection) = pass.next_with_interval(now, config.scheduler, config.sampler) else {
            break;
        };
        let card_id = selection.card.id();
        steps.push(SessionStep {
            card_id,
            bucket: classify(selection.card, now).ok(),
            times_shown: pass.shown_count(card_id),
            interval_minutes: selection.prediction.interval,
        });
    }
    steps
}
