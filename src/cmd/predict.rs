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

use recallcards_core::BetaParams;
use recallcards_core::CardId;
use recallcards_core::Fallible;
use recallcards_core::Minutes;
use recallcards_core::Timestamp;
use recallcards_core::adaptive_decay;
use recallcards_core::bayesian_success_rate_interval;
use recallcards_core::deck_posterior;
use recallcards_core::decay::HISTORY_WINDOW;
use recallcards_core::interval::SUCCESS_RATE_SENSITIVITY;
use recallcards_core::interval::SUCCESS_RATE_TARGET;
use recallcards_core::interval_to_text;
use recallcards_core::posterior;
use recallcards_core::recall::RECENT_WINDOW;
use recallcards_core::recent_posterior;
use recallcards_core::sample_next_review;
use serde::Serialize;

use crate::cmd::OutputFormat;
use crate::config::Config;
use crate::snapshot::DeckSnapshot;

/// Everything the model knows about one card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    card_id: CardId,
    posterior: BetaParams,
    decay: f64,
    interval_minutes: Minutes,
    interval_text: String,
    corrected_interval_minutes: Minutes,
    learner_posterior: BetaParams,
    learner_success_rate: f64,
    deck_posterior: BetaParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<Vec<f64>>,
}

pub fn print_prediction(
    deck: PathBuf,
    card_id: CardId,
    config: Config,
    format: OutputFormat,
    include_samples: bool,
) -> Fallible<()> {
    let snapshot = DeckSnapshot::load(&deck)?;
    let prediction = predict_card(&snapshot, card_id, &config, Timestamp::now(), include_samples)?;
    match format {
        OutputFormat::Text => {
            println!("Card {}", prediction.card_id);
            println!(
                "  recall posterior: Beta({}, {}), mean {:.3}",
                prediction.posterior.alpha,
                prediction.posterior.beta,
                prediction.posterior.mean()
            );
            println!("  decay: {:.5} per minute", prediction.decay);
            println!("  next review in {}", prediction.interval_text);
            println!(
                "  adjusted for recent performance: {}",
                interval_to_text(prediction.corrected_interval_minutes)
            );
            println!(
                "  learner success rate: {:.1}%",
                prediction.learner_success_rate * 100.0
            );
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&prediction)?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn predict_card(
    snapshot: &DeckSnapshot,
    card_id: CardId,
    config: &Config,
    now: Timestamp,
    include_samples: bool,
) -> Fallible<Prediction> {
    let card = snapshot.card(card_id)?;
    let profile = &snapshot.profile;
    let mut rng = config.rng();

    let prediction = sample_next_review(card, profile, config.sampler, now, &mut rng);
    let learner_posterior = recent_posterior(profile, RECENT_WINDOW, BetaParams::OPTIMISTIC);
    let corrected = bayesian_success_rate_interval(
        prediction.interval,
        learner_posterior,
        SUCCESS_RATE_TARGET,
        SUCCESS_RATE_SENSITIVITY,
        &mut rng,
    );

    Ok(Prediction {
        card_id,
        posterior: posterior(card, BetaParams::UNIFORM),
        decay: adaptive_decay(card, profile, None, HISTORY_WINDOW),
        interval_minutes: prediction.interval,
        interval_text: interval_to_text(prediction.interval),
        corrected_interval_minutes: corrected,
        learner_posterior,
        learner_success_rate: profile.success_rate(),
        deck_posterior: deck_posterior(&snapshot.cards, BetaParams::OPTIMISTIC),
        samples: include_samples.then_some(prediction.samples),
    })
}
