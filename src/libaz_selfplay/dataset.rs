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

//! Writes finished self-play games to disk as training samples.
//!
//! Each recorded turn of a game becomes `num_symmetries` rows: the original
//! canonical tensor / pruned policy target / per-player value, followed by
//! `num_symmetries - 1` symmetry-augmented copies of the same row. A whole
//! game's worth of rows is written as three sibling files, `c_####_N.pt`,
//! `p_####_N.pt`, `v_####_N.pt`, where `####` is a monotonically increasing
//! dataset index and `N` is the number of recorded turns before symmetry
//! expansion.
//!
//! The on-disk tensor format is a small fixed header (rank, then one `u32`
//! per dimension) followed by raw little-endian `f32` data in row-major
//! order -- everything downstream of this crate (a training pipeline) is out
//! of scope, so there is no need to match any particular deep-learning
//! framework's pickle format; this is just the simplest self-describing
//! layout a reader can `mmap` back into a tensor.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use az_core::GameRules;

/// One recorded turn of a game: the canonical tensor and target policy at
/// that position. The value is filled in once the game's outcome is known,
/// so it is not part of this struct.
pub struct RecordedTurn {
    pub canonical: Vec<f32>,
    pub policy: Vec<f32>,
    pub player: az_core::Player,
}

/// Assigns monotonic dataset indices and writes `c_/p_/v_{index:04}_{n}.pt`
/// triples to a fixed output directory.
pub struct DatasetWriter {
    dir: std::path::PathBuf,
    next_index: AtomicUsize,
}

impl DatasetWriter {
    /// Scans `dir` for existing `_####_` file names and resumes numbering
    /// one past the largest index found, so re-running a self-play job
    /// against a non-empty output directory never clobbers earlier samples.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut next = 0usize;
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(index) = parse_dataset_index(&name) {
                if index + 1 > next {
                    next = index + 1;
                }
            }
        }

        Ok(DatasetWriter { dir, next_index: AtomicUsize::new(next) })
    }

    /// Writes one finished game's recorded turns, applying symmetry
    /// augmentation and assigning each turn's value from `score` (player
    /// zero's win probability). Returns `Ok(None)` without writing anything
    /// if any output value is NaN, matching the reference driver's
    /// "drop the game" behavior; `dir` would otherwise accumulate unusable
    /// samples that silently poison training.
    pub fn write_game<G: GameRules>(&self, game: &G, turns: &[RecordedTurn], score: f32) -> io::Result<Option<usize>> {
        if turns.is_empty() {
            return Ok(None);
        }

        let symmetries = game.num_symmetries().max(1);
        let n = turns.len();
        let (c, h, w) = game.canonical_shape();
        let feature_len = c * h * w;
        let num_actions = game.num_actions();

        let mut canonical = vec![0.0f32; n * symmetries * feature_len];
        let mut policy = vec![0.0f32; n * symmetries * num_actions];
        let mut value = vec![0.0f32; n * symmetries * 2];

        for (i, turn) in turns.iter().enumerate() {
            let base_row = i * symmetries;
            canonical[base_row * feature_len..(base_row + 1) * feature_len].copy_from_slice(&turn.canonical);
            policy[base_row * num_actions..(base_row + 1) * num_actions].copy_from_slice(&turn.policy);

            // Column `turn.player` (whoever was to move when this row was
            // recorded) gets player zero's win probability, and the other
            // column gets its complement -- mover-relative, the same
            // side-to-move convention `GameRules::canonicalize` and
            // `SearchTree::process_result`'s `v_pair` re-seating already use
            // (`tree.rs`'s `(own, opponent)` reindex by `node.player`).
            let mover = turn.player.index();
            value[base_row * 2 + mover] = score;
            value[base_row * 2 + (1 - mover)] = 1.0 - score;

            for s in 1..symmetries {
                let row = base_row + s;
                let (prev, cur) = canonical.split_at_mut(row * feature_len);
                game.create_symmetry_board(&mut cur[..feature_len], &prev[(row - 1) * feature_len..row * feature_len], s);

                let (prev, cur) = policy.split_at_mut(row * num_actions);
                game.create_symmetry_action(&mut cur[..num_actions], &prev[(row - 1) * num_actions..row * num_actions], s);

                let (prev, cur) = value.split_at_mut(row * 2);
                game.create_symmetry_value(&mut cur[..2], &prev[(row - 1) * 2..row * 2], s);
            }
        }

        if has_nan(&canonical) || has_nan(&policy) || has_nan(&value) {
            return Ok(None);
        }

        let index = self.next_index.fetch_add(1, Ordering::SeqCst);
        write_tensor(&self.dir.join(format!("c_{:04}_{}.pt", index, n)), &[n * symmetries, c, h, w], &canonical)?;
        write_tensor(&self.dir.join(format!("p_{:04}_{}.pt", index, n)), &[n * symmetries, num_actions], &policy)?;
        write_tensor(&self.dir.join(format!("v_{:04}_{}.pt", index, n)), &[n * symmetries, 2], &value)?;

        Ok(Some(index))
    }
}

fn has_nan(data: &[f32]) -> bool {
    data.iter().any(|x| x.is_nan())
}

fn write_tensor(path: &Path, shape: &[usize], data: &[f32]) -> io::Result<()> {
    let mut file = io::BufWriter::new(fs::File::create(path)?);
    file.write_all(&(shape.len() as u32).to_le_bytes())?;
    for &dim in shape {
        file.write_all(&(dim as u32).to_le_bytes())?;
    }
    for &x in data {
        file.write_all(&x.to_le_bytes())?;
    }
    file.flush()
}

/// Extracts the `####` index out of a `*_####_*` file name, the same
/// convention the reference driver scans for on startup.
fn parse_dataset_index(name: &str) -> Option<usize> {
    let parts: Vec<&str> = name.split('_').collect();
    for part in &parts {
        if part.len() == 4 && part.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = part.parse() {
                return Some(index);
            }
        }
    }
    None
}
