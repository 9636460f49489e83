// Copyright 2026 The AlphaZero-rs Authors
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

//! Game history files for the interactive REPL's `save`/`load` commands:
//! one move string per line, no comments or blank-line support.

use std::fs;
use std::io;
use std::path::Path;

pub fn dump(path: impl AsRef<Path>, moves: &[String]) -> io::Result<()> {
    let mut text = moves.join("\n");
    if !moves.is_empty() {
        text.push('\n');
    }
    fs::write(path, text)
}

pub fn load(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text.lines().filter(|line| !line.is_empty()).map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_then_load_round_trips() {
        let path = std::env::temp_dir().join(format!("az_record_test_{}.txt", std::process::id()));
        let moves = vec!["a1".to_string(), "b2!".to_string(), "c3".to_string()];
        dump(&path, &moves).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, moves);
        fs::remove_file(&path).ok();
    }
}
