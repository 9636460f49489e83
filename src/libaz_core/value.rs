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

/// A single scalar win probability, always stored from player zero's point of
/// view. [`Value::get`] flips it for player one so that every other module
/// can ask "how good is this for me" without caring which seat it sits in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Value {
    v: f32,
}

impl Value {
    /// Wraps a raw player-zero win probability, e.g. the outcome of a
    /// finished game (`GameRules::score`).
    pub fn new(v: f32) -> Self {
        Value { v }
    }

    /// Builds a value representing `v` from `player`'s perspective.
    pub fn from_player(player: Player, v: f32) -> Self {
        match player {
            Player::P0 => Value { v },
            Player::P1 => Value { v: 1.0 - v },
        }
    }

    /// Builds a value from a pair of unnormalized per-player logits, as
    /// emitted by the value head: `v0 / (v0 + v1)`.
    pub fn from_logits(v0: f32, v1: f32) -> Self {
        Value { v: v0 / (v0 + v1) }
    }

    /// The win probability from `player`'s point of view.
    pub fn get(&self, player: Player) -> f32 {
        match player {
            Player::P0 => self.v,
            Player::P1 => 1.0 - self.v,
        }
    }
}
