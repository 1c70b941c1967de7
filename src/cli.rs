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

use clap::Parser;
use recallcards_core::CardId;
use recallcards_core::Fallible;

use crate::cmd::OutputFormat;
use crate::cmd::next::print_next_card;
use crate::cmd::predict::print_prediction;
use crate::cmd::review::review_card;
use crate::cmd::session::print_session;
use crate::config::Config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Pick the next card to study and predict when to review it again.
    Next {
        /// Path to the deck snapshot (JSON).
        deck: PathBuf,
        /// Path to a TOML config file. By default, `recallcards.toml` in the current directory is used if it exists.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Which output format to use.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the model's view of a single card.
    Predict {
        /// Path to the deck snapshot (JSON).
        deck: PathBuf,
        /// The card to predict an interval for.
        #[arg(long)]
        card: CardId,
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Which output format to use.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Include the raw interval samples in JSON output.
        #[arg(long)]
        samples: bool,
    },
    /// Record a review and print the updated snapshot.
    Review {
        /// Path to the deck snapshot (JSON).
        deck: PathBuf,
        /// The reviewed card.
        #[arg(long)]
        card: CardId,
        /// The rating, from 0 to 10. Ratings of 7 and above count as recalled.
        #[arg(long)]
        rating: u8,
        /// Optional path to write the updated snapshot to. By default, it is printed to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a scheduling pass without recording reviews and print each selection.
    Session {
        /// Path to the deck snapshot (JSON).
        deck: PathBuf,
        /// Number of selections. By default, the pass runs until every card is at its cap.
        #[arg(long)]
        count: Option<usize>,
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Which output format to use.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Next {
            deck,
            config,
            format,
        } => print_next_card(deck, Config::load(config)?, format),
        Command::Predict {
            deck,
            card,
            config,
            format,
            samples,
        } => print_prediction(deck, card, Config::load(config)?, format, samples),
        Command::Review {
            deck,
            card,
            rating,
            output,
        } => review_card(deck, card, rating, output),
        Command::Session {
            deck,
            count,
            config,
            format,
        } => print_session(deck, count, Config::load(config)?, format),
    }
}
