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

use recallcards_core::Fallible;

/// Write `text` to `output`, or print it to stdout when no path is given.
pub fn emit(output: Option<PathBuf>, text: &str) -> Fallible<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, text)?;
            log::debug!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_emit_to_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.json");
        emit(Some(path.clone()), "{}")?;
        assert_eq!(std::fs::read_to_string(path)?, "{}");
        Ok(())
    }
}
