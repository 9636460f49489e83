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

//! A 5x5x5 stacking connect-four: players drop pieces into one of 25
//! columns; a piece falls to the lowest open layer in that column, and
//! whoever lines up four in a row first -- along any of the three axes or a
//! diagonal -- wins.

use az_core::{GameRules, Player};

pub const N: usize = 5;
pub const K: usize = 4;
pub const NUM_ACTIONS: usize = N * N;
pub const NUM_SYMMETRIES: usize = 2;
pub const CANONICAL_SHAPE: (usize, usize, usize) = (N, N + 1, N * 2);

/// `piece[layer][x][y]` is `Some(player)` once a piece has landed there,
/// `None` while that cell is still open.
#[derive(Clone)]
pub struct Connect4 {
    piece: [[[Option<Player>; N]; N]; N],
    current_player: Player,
    round: u32,
}

impl Connect4 {
    pub fn new() -> Self {
        let mut game = Connect4 {
            piece: [[[None; N]; N]; N],
            current_player: Player::P0,
            round: 0,
        };
        // Matches the forced opening the original engine always plays before
        // handing control to the search.
        game.apply_move(game.string_to_action("c3").unwrap());
        game.apply_move(game.string_to_action("b2").unwrap());
        game
    }

    fn raw_winner(&self) -> Option<Player> {
        if self.round as usize == N * N * N {
            return Some(Player::P1);
        }

        let n = N as isize;
        let k = K as isize;
        for dx in -1..=1isize {
            for dy in -1..=1isize {
                for dz in -1..=1isize {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    for i in 0..n {
                        for j in 0..n {
                            for kk in 0..n {
                                if i + dx * (k - 1) < 0 || i + dx * (k - 1) >= n {
                                    continue;
                                }
                                if j + dy * (k - 1) < 0 || j + dy * (k - 1) >= n {
                                    continue;
                                }
                                if kk + dz * (k - 1) < 0 || kk + dz * (k - 1) >= n {
                                    continue;
                                }

                                let mut count = [0i32; 2];
                                for l in 0..k {
                                    let (li, lj, lk) = (
                                        (i + dx * l) as usize,
                                        (j + dy * l) as usize,
                                        (kk + dz * l) as usize,
                                    );
                                    match self.piece[li][lj][lk] {
                                        Some(Player::P0) => count[0] += 1,
                                        Some(Player::P1) => count[1] += 1,
                                        None => {}
                                    }
                                }
                                if count[0] == K as i32 {
                                    return Some(Player::P0);
                                }
                                if count[1] == K as i32 {
                                    return Some(Player::P1);
                                }
                            }
                        }
                    }
                }
            }
        }
        None
    }
}

impl Default for Connect4 {
    fn default() -> Self {
        Connect4::new()
    }
}

impl GameRules for Connect4 {
    fn num_actions(&self) -> usize {
        NUM_ACTIONS
    }

    fn canonical_shape(&self) -> (usize, usize, usize) {
        CANONICAL_SHAPE
    }

    fn num_symmetries(&self) -> usize {
        NUM_SYMMETRIES
    }

    fn current_player(&self) -> Player {
        self.current_player
    }

    fn valid_moves(&self) -> Vec<bool> {
        let mut valid = vec![false; NUM_ACTIONS];
        for x in 0..N {
            for y in 0..N {
                if self.piece[N - 1][x][y].is_none() {
                    valid[x * N + y] = true;
                }
            }
        }
        valid
    }

    fn apply_move(&mut self, action: usize) {
        let x = action / N;
        let y = action % N;
        for layer in 0..N {
            if self.piece[layer][x][y].is_none() {
                self.piece[layer][x][y] = Some(self.current_player);
                break;
            }
        }
        self.current_player = self.current_player.opposite();
        self.round += 1;
    }

    fn ended(&self) -> bool {
        self.raw_winner().is_some()
    }

    fn winner(&self) -> Player {
        self.raw_winner().expect("winner() requires the game to have ended")
    }

    fn score(&self) -> f32 {
        match self.winner() {
            Player::P0 => 1.0,
            Player::P1 => 0.0,
        }
    }

    fn canonicalize(&self, out: &mut [f32]) {
        let (c, h, w) = CANONICAL_SHAPE;
        debug_assert_eq!(out.len(), c * h * w);
        let player_plane = match self.current_player {
            Player::P0 => 0.0,
            Player::P1 => 1.0,
        };
        for i in 0..N {
            for x in 0..N {
                for y in 0..N {
                    let base = i * h * w + x * w;
                    out[base + y] = match self.piece[i][x][y] {
                        Some(Player::P0) => 1.0,
                        _ => 0.0,
                    };
                    out[base + y + N] = match self.piece[i][x][y] {
                        Some(Player::P1) => 1.0,
                        _ => 0.0,
                    };
                }
            }
            let row_base = i * h * w + N * w;
            for k in 0..N * 2 {
                out[row_base + k] = player_plane;
            }
        }
    }

    fn action_to_string(&self, action: usize) -> String {
        let x = action / N;
        let y = action % N;
        format!("{}{}", (b'a' + y as u8) as char, (b'1' + x as u8) as char)
    }

    fn string_to_action(&self, text: &str) -> Option<usize> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let y = (bytes[0] as i32 - b'a' as i32) as usize;
        let x = (bytes[1] as i32 - b'1' as i32) as usize;
        if x >= N || y >= N {
            return None;
        }
        Some(x * N + y)
    }

    fn create_symmetry_board(&self, dst: &mut [f32], src: &[f32], symmetry: usize) {
        let (_, h, w) = CANONICAL_SHAPE;
        if symmetry == 0 {
            dst.copy_from_slice(src);
            return;
        }
        for i in 0..N {
            for x in 0..N {
                for y in 0..N {
                    let src_base = i * h * w + y * w;
                    let dst_base = i * h * w + x * w;
                    dst[dst_base + y] = src[src_base + x];
                    dst[dst_base + y + N] = src[src_base + x + N];
                }
            }
            let row_base = i * h * w + N * w;
            for k in 0..N * 2 {
                dst[row_base + k] = src[row_base + k];
            }
        }
    }

    fn create_symmetry_action(&self, dst: &mut [f32], src: &[f32], symmetry: usize) {
        if symmetry == 0 {
            dst.copy_from_slice(src);
            return;
        }
        for x in 0..N {
            for y in 0..N {
                dst[x * N + y] = src[y * N + x];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_is_forced() {
        let game = Connect4::new();
        assert_eq!(game.valid_moves().iter().filter(|&&v| v).count(), NUM_ACTIONS - 2);
    }

    #[test]
    fn action_string_round_trips() {
        let game = Connect4::new();
        for action in 0..NUM_ACTIONS {
            let text = game.action_to_string(action);
            assert_eq!(game.string_to_action(&text), Some(action));
        }
    }

    #[test]
    fn symmetry_action_is_involution() {
        let game = Connect4::new();
        let src: Vec<f32> = (0..NUM_ACTIONS).map(|i| i as f32).collect();
        let mut once = vec![0.0; NUM_ACTIONS];
        let mut twice = vec![0.0; NUM_ACTIONS];
        game.create_symmetry_action(&mut once, &src, 1);
        game.create_symmetry_action(&mut twice, &once, 1);
        assert_eq!(twice, src);
    }

    #[test]
    fn four_in_a_column_wins() {
        let mut game = Connect4 {
            piece: [[[None; N]; N]; N],
            current_player: Player::P0,
            round: 0,
        };
        for _ in 0..K {
            let action = game.string_to_action("a1").unwrap();
            game.apply_move(action);
            if game.ended() {
                break;
            }
            game.apply_move(game.string_to_action("a2").unwrap());
        }
        assert!(game.ended());
        assert_eq!(game.winner(), Player::P0);
    }
}
