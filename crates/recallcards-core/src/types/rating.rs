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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::timestamp::Timestamp;

/// Ratings at or above this value count as a successful recall.
pub const SUCCESS_THRESHOLD: u8 = 7;

/// The highest rating a learner can give.
pub const MAX_RATING: u8 = 10;

/// A self-assessed recall rating on the 0-10 scale.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Fallible<Self> {
        if value > MAX_RATING {
            return fail(format!("rating must be between 0 and {MAX_RATING}, got {value}"));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= SUCCESS_THRESHOLD
    }
}

impl TryFrom<u8> for Rating {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recorded review of a card.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub timestamp: Timestamp,
    pub rating: Rating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_threshold() -> Fallible<()> {
        assert!(!Rating::new(0)?.is_success());
        assert!(!Rating::new(6)?.is_success());
        assert!(Rating::new(7)?.is_success());
        assert!(Rating::new(10)?.is_success());
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        assert!(Rating::new(11).is_err());
        assert!(Rating::try_from(255).is_err());
    }

    #[test]
    fn test_serialization_format() -> Fallible<()> {
        let rating = Rating::new(8)?;
        assert_eq!(serde_json::to_string(&rating)?, "8");
        let parsed: Rating = serde_json::from_str("3")?;
        assert_eq!(parsed.value(), 3);
        Ok(())
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let parsed: Result<Rating, _> = serde_json::from_str("42");
        assert!(parsed.is_err());
    }
}
