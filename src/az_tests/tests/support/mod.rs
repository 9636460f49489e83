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

//! A tiny game shared by the end-to-end tests in this crate: ordinary Nim,
//! the same fixture `az_core` and `az_selfplay`'s own unit tests use, kept
//! here so the scenario tests do not have to pull in the much larger
//! Connect4 board just to exercise the engine's plumbing.

use az_core::{GameRules, Player};

#[derive(Clone)]
pub struct Nim {
    pub sticks: i32,
    pub player: Player,
}

impl Nim {
    pub fn new(sticks: i32) -> Self {
        Nim { sticks, player: Player::P0 }
    }
}

impl GameRules for Nim {
    fn num_actions(&self) -> usize {
        3
    }

    fn canonical_shape(&self) -> (usize, usize, usize) {
        (1, 1, 1)
    }

    fn current_player(&self) -> Player {
        self.player
    }

    fn valid_moves(&self) -> Vec<bool> {
        (1..=3).map(|take| take <= self.sticks).collect()
    }

    fn apply_move(&mut self, action: usize) {
        assert!(self.valid_moves()[action], "illegal move {action} on {} sticks", self.sticks);
        self.sticks -= action as i32 + 1;
        self.player = self.player.opposite();
    }

    fn ended(&self) -> bool {
        self.sticks <= 0
    }

    fn winner(&self) -> Player {
        // Whoever is to move when `sticks` hits zero took the last stick
        // and wins -- ordinary (non-misère) Nim.
        self.player.opposite()
    }

    fn score(&self) -> f32 {
        if self.winner() == Player::P0 {
            1.0
        } else {
            0.0
        }
    }

    fn canonicalize(&self, out: &mut [f32]) {
        out[0] = self.sticks as f32;
    }

    fn action_to_string(&self, action: usize) -> String {
        (action + 1).to_string()
    }

    fn string_to_action(&self, text: &str) -> Option<usize> {
        text.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
    }

    fn create_symmetry_board(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) {
        dst.copy_from_slice(src);
    }

    fn create_symmetry_action(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) {
        dst.copy_from_slice(src);
    }
}
