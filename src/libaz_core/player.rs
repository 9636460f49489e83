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

/// One of the two seats at the board. This engine does not generalize to
/// games with more than two players.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Player {
    P0,
    P1,
}

impl Player {
    pub fn opposite(self) -> Player {
        match self {
            Player::P0 => Player::P1,
            Player::P1 => Player::P0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::P0 => 0,
            Player::P1 => 1,
        }
    }

    pub fn from_index(index: usize) -> Player {
        if index == 0 {
            Player::P0
        } else {
            Player::P1
        }
    }
}
