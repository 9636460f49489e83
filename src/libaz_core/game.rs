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

use crate::player::Player;

/// Sentinel action index meaning "pass" / "no legal action taken", used by
/// games that have one (most do not).
pub const PASS: usize = usize::MAX;

/// Everything the search engine needs to know about the game it is playing.
/// A `GameRules` value *is* a game state -- `apply_move` mutates it in place,
/// and `Clone` stands in for the copy-constructor the original engine uses to
/// fork a position down into the tree.
///
/// This engine is fixed to exactly two players; see the crate-level Non-goals
/// for games with more.
pub trait GameRules: Clone + Send + Sync + 'static {
    /// Size of the action space, i.e. the length of a policy vector.
    fn num_actions(&self) -> usize;

    /// `(channels, height, width)` of the canonical tensor returned by
    /// [`GameRules::canonicalize`].
    fn canonical_shape(&self) -> (usize, usize, usize);

    /// Number of board symmetries this game exposes (rotations/reflections).
    /// Returns `1` if the game has none.
    fn num_symmetries(&self) -> usize {
        1
    }

    /// The player to move in the current state.
    fn current_player(&self) -> Player;

    /// One entry per action; `true` if legal in the current state.
    fn valid_moves(&self) -> Vec<bool>;

    /// Applies `action` in place. Panics if `action` is not legal.
    fn apply_move(&mut self, action: usize);

    /// Whether the game has ended (a win, loss, or draw).
    fn ended(&self) -> bool;

    /// The winner of a finished game. Only meaningful once [`GameRules::ended`]
    /// is `true`.
    fn winner(&self) -> Player;

    /// Player-zero's win probability for a finished game: `1.0` if player
    /// zero won, `0.0` if player one won, `0.5` for a draw.
    fn score(&self) -> f32;

    /// Writes the canonical input tensor for the current state into `out`,
    /// which has length `channels * height * width`.
    fn canonicalize(&self, out: &mut [f32]);

    /// A stable hash of the current state, used only to key engine-external
    /// caches; the search itself does not rely on it.
    fn hash(&self) -> u64 {
        0
    }

    /// Renders `action` the way a human would type it back.
    fn action_to_string(&self, action: usize) -> String;

    /// Parses a human-typed move, returning `None` if it cannot be parsed
    /// (not necessarily if it is illegal -- legality is checked separately).
    fn string_to_action(&self, text: &str) -> Option<usize>;

    /// Rewrites a canonical board tensor under `symmetry` (`0` is identity).
    fn create_symmetry_board(&self, dst: &mut [f32], src: &[f32], symmetry: usize);

    /// Rewrites a policy vector under `symmetry`.
    fn create_symmetry_action(&self, dst: &mut [f32], src: &[f32], symmetry: usize);

    /// Rewrites a two-element value vector under `symmetry`. Most games leave
    /// this untouched since win probability does not depend on board
    /// orientation; provided for games where it does (e.g. a player-relative
    /// encoding).
    fn create_symmetry_value(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) {
        dst.copy_from_slice(src);
    }
}
