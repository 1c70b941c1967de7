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
use std::path::PathBuf;

use recallcards_core::ErrorReport;
use recallcards_core::Fallible;
use recallcards_core::SamplerOptions;
use recallcards_core::SelectorOptions;
use recallcards_core::fail;
use recallcards_core::rng::SchedulerRng;
use recallcards_core::rng::from_entropy;
use recallcards_core::rng::seeded;
use serde::Deserialize;

/// The config file picked up from the working directory when `--config`
/// isn't given.
pub const DEFAULT_CONFIG_FILE: &str = "recallcards.toml";

/// Scheduler settings, read from a TOML file.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Seed for the random source. Fresh entropy is used when absent.
    pub seed: Option<u64>,
    pub scheduler: SelectorOptions,
    pub sampler: SamplerOptions,
}

impl Config {
    /// Load the config at `path`, or `recallcards.toml` in the working
    /// directory if it exists, or the defaults.
    pub fn load(path: Option<PathBuf>) -> Fallible<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return fail(format!("config file {} does not exist.", path.display()));
                }
                Self::from_file(&path)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Fallible<Self> {
        log::debug!("Reading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(text)
            .map_err(|e| ErrorReport::new(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// The random source for one command invocation.
    pub fn rng(&self) -> SchedulerRng {
        match self.seed {
            Some(seed) => seeded(seed),
            None => from_entropy(),
        }
    }
}
