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

//! Plays a fixed tournament of games between two models and reports which
//! one won more often, alternating who moves first each round and stopping
//! early once either side has clinched a majority.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use az_core::backend::InferenceBackend;
use az_core::evaluator::BatchingEvaluator;
use az_core::game::GameRules;
use az_core::search_context::SearchContext;
use az_core::tree::SearchTreeConfig;
use az_core::Player;

use crate::schedule::TemperatureSchedule;

/// `ALPHAZERO_NUM_PLAYOUT`, `ALPHAZERO_TEMPERATURE_*` from `gate_shadow.cpp`.
#[derive(Clone, Copy)]
pub struct GatingConfig {
    pub total_rounds: usize,
    pub thread_count: usize,
    pub playouts: usize,
    pub temperature_start: f32,
    pub temperature_end: f32,
    pub temperature_lambda: f32,
    /// Prints the board after every move and forces single-threaded play,
    /// same as `gate_shadow.cpp`'s `--show-board`.
    pub show_board: bool,
}

impl Default for GatingConfig {
    fn default() -> Self {
        GatingConfig {
            total_rounds: 400,
            thread_count: *az_utils::config::NUM_THREADS,
            playouts: 300,
            temperature_start: 0.5,
            temperature_end: 0.2,
            temperature_lambda: -0.01,
            show_board: false,
        }
    }
}

/// Win totals and per-matchup score/count tables for a two-model gate, kept
/// behind one mutex and only touched at game boundaries.
#[derive(Default)]
struct Scoreboard {
    win_count: [f32; 2],
    total_count: [[u32; 2]; 2],
    total_score: [[f32; 2]; 2],
}

/// Result of a gating tournament: which model (`0` = `model_a`, `1` =
/// `model_b`) reached the win threshold first, plus the full scoreboard for
/// a `--output-data` style report.
pub struct GatingResult {
    pub winner: usize,
    pub win_count: [f32; 2],
    pub rounds_played: usize,
    per_matchup_count: [[u32; 2]; 2],
    per_matchup_score: [[f32; 2]; 2],
}

impl GatingResult {
    /// Renders the TOML-shaped `[[model]]` record `gate_shadow.cpp` writes
    /// for `--output-data`.
    pub fn to_toml(&self, model_a_path: &str, model_b_path: &str) -> String {
        format!(
            "[[model]]\npath = \"{a_path}\"\nfirstplay_count = {a_fp_count}\nfirstplay_score = {a_fp_score}\nsecondplay_count = {a_sp_count}\nsecondplay_score = {a_sp_score}\n\
             [[model]]\npath = \"{b_path}\"\nfirstplay_count = {b_fp_count}\nfirstplay_score = {b_fp_score}\nsecondplay_count = {b_sp_count}\nsecondplay_score = {b_sp_score}\n",
            a_path = model_a_path,
            a_fp_count = self.per_matchup_count[0][0],
            a_fp_score = self.per_matchup_score[0][0],
            a_sp_count = self.per_matchup_count[0][1],
            a_sp_score = self.per_matchup_score[0][1],
            b_path = model_b_path,
            b_fp_count = self.per_matchup_count[1][0],
            b_fp_score = self.per_matchup_score[1][0],
            b_sp_count = self.per_matchup_count[1][1],
            b_sp_score = self.per_matchup_score[1][1],
        )
    }

    pub fn write_data_file(&self, path: impl AsRef<Path>, model_a_path: &str, model_b_path: &str) -> io::Result<()> {
        fs::write(path, self.to_toml(model_a_path, model_b_path))
    }

    pub fn write_best_model_file(&self, path: impl AsRef<Path>, model_a_path: &str, model_b_path: &str) -> io::Result<()> {
        let winner_path = if self.winner == 0 { model_a_path } else { model_b_path };
        fs::write(path, winner_path)
    }
}

/// Runs up to `config.total_rounds` games, alternating which evaluator moves
/// first each round, spread across `config.thread_count` worker threads.
/// Stops as soon as either evaluator has won `ceil((total_rounds + 1) / 2)`
/// rounds.
pub fn run<G, B, F>(config: GatingConfig, evaluators: [Arc<BatchingEvaluator<B>>; 2], new_game: F) -> GatingResult
where
    G: GameRules,
    B: InferenceBackend + 'static,
    F: Fn() -> G + Send + Sync,
{
    let win_threshold = ((config.total_rounds + 1) / 2) as f32;
    let scoreboard = Arc::new(Mutex::new(Scoreboard::default()));
    let next_round = Arc::new(AtomicUsize::new(0));
    let rounds_played = Arc::new(AtomicUsize::new(0));
    let new_game = &new_game;
    // `--show-board` prints moves in order as they're played, which only
    // makes sense with a single game in flight at a time.
    let thread_count = if config.show_board { 1 } else { config.thread_count };

    crossbeam_utils::thread::scope(|scope| {
        for _ in 0..thread_count {
            let evaluators = evaluators.clone();
            let scoreboard = scoreboard.clone();
            let next_round = next_round.clone();
            let rounds_played = rounds_played.clone();

            scope.spawn(move |_| {
                loop {
                    {
                        let board = scoreboard.lock().unwrap();
                        if board.win_count[0] >= win_threshold || board.win_count[1] >= win_threshold {
                            break;
                        }
                    }

                    let round = next_round.fetch_add(1, Ordering::SeqCst);
                    if round >= config.total_rounds {
                        break;
                    }

                    let first_play_evaluator = round % 2;
                    let score = play_one_round(&config, &evaluators, first_play_evaluator, new_game);
                    rounds_played.fetch_add(1, Ordering::SeqCst);

                    let mut board = scoreboard.lock().unwrap();
                    board.win_count[first_play_evaluator] += score;
                    board.win_count[1 - first_play_evaluator] += 1.0 - score;
                    board.total_count[first_play_evaluator][0] += 1;
                    board.total_count[1 - first_play_evaluator][1] += 1;
                    board.total_score[first_play_evaluator][0] += score;
                    board.total_score[1 - first_play_evaluator][1] += 1.0 - score;

                    az_utils::az_progress!("win count: {} - {}", board.win_count[0], board.win_count[1]);
                }
            });
        }
    })
    .expect("gating worker threads must not panic");

    let board = scoreboard.lock().unwrap();
    let winner = if board.win_count[0] >= board.win_count[1] { 0 } else { 1 };
    GatingResult {
        winner,
        win_count: board.win_count,
        rounds_played: rounds_played.load(Ordering::SeqCst),
        per_matchup_count: board.total_count,
        per_matchup_score: board.total_score,
    }
}

/// Plays one game with `evaluators[first_play_evaluator]` moving first.
/// Returns `first_play_evaluator`'s score (`1.0` win, `0.5` draw, `0.0`
/// loss).
fn play_one_round<G, B, F>(config: &GatingConfig, evaluators: &[Arc<BatchingEvaluator<B>>; 2], first_play_evaluator: usize, new_game: &F) -> f32
where
    G: GameRules,
    B: InferenceBackend + 'static,
    F: Fn() -> G,
{
    let game = new_game();
    let mut contexts: [SearchContext<G, B>; 2] = [
        SearchContext::new(game.clone(), evaluators[0].clone(), SearchTreeConfig::default(), 0),
        SearchContext::new(game.clone(), evaluators[1].clone(), SearchTreeConfig::default(), 0),
    ];
    let mut schedule = TemperatureSchedule::new(config.temperature_start, config.temperature_end, config.temperature_lambda);
    let mut turn = 0u32;

    loop {
        let current = contexts[0].game().current_player();
        if contexts[0].game().ended() {
            break;
        }
        if !contexts[0].game().valid_moves().iter().any(|&v| v) {
            break;
        }

        let evaluator_index = current.index() ^ first_play_evaluator;
        let temperature = schedule.step(turn);

        contexts[evaluator_index].step(config.playouts, false, false);
        let mut probs = vec![0.0f32; game.num_actions()];
        let action = contexts[evaluator_index].select_move(temperature, &mut probs);

        for ctx in &mut contexts {
            ctx.advance(action);
        }
        turn += 1;

        if config.show_board {
            println!("{}: {}", current.index(), contexts[0].game().action_to_string(action));
            print_turn(contexts[0].game());
        }
    }

    let no_moves = !contexts[0].game().valid_moves().iter().any(|&v| v) && !contexts[0].game().ended();
    let score = if no_moves {
        if contexts[0].game().current_player() == Player::P0 { 0.0 } else { 1.0 }
    } else {
        contexts[0].game().score()
    };

    if first_play_evaluator == 0 {
        score
    } else {
        1.0 - score
    }
}

/// Prints whose turn it is and the now-legal moves, same report
/// `az`'s interactive REPL gives after every move.
fn print_turn<G: GameRules>(game: &G) {
    println!("{:?} to move", game.current_player());
    let moves: Vec<String> = (0..game.num_actions())
        .filter(|&a| game.valid_moves()[a])
        .map(|a| game.action_to_string(a))
        .collect();
    println!("legal moves: {}", moves.join(" "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use az_core::backend::DummyBackend;

    #[derive(Clone)]
    struct Nim {
        sticks: i32,
        player: Player,
    }

    impl GameRules for Nim {
        fn num_actions(&self) -> usize { 3 }
        fn canonical_shape(&self) -> (usize, usize, usize) { (1, 1, 1) }
        fn current_player(&self) -> Player { self.player }
        fn valid_moves(&self) -> Vec<bool> { (1..=3).map(|take| take <= self.sticks).collect() }
        fn apply_move(&mut self, action: usize) {
            self.sticks -= action as i32 + 1;
            self.player = self.player.opposite();
        }
        fn ended(&self) -> bool { self.sticks <= 0 }
        fn winner(&self) -> Player { self.player.opposite() }
        fn score(&self) -> f32 { if self.winner() == Player::P0 { 1.0 } else { 0.0 } }
        fn canonicalize(&self, out: &mut [f32]) { out[0] = self.sticks as f32; }
        fn action_to_string(&self, action: usize) -> String { (action + 1).to_string() }
        fn string_to_action(&self, text: &str) -> Option<usize> { text.parse::<usize>().ok().map(|n| n - 1) }
        fn create_symmetry_board(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) { dst.copy_from_slice(src); }
        fn create_symmetry_action(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) { dst.copy_from_slice(src); }
    }

    #[test]
    fn terminates_within_the_configured_round_budget_and_tallies_match() {
        let evaluators = [
            Arc::new(BatchingEvaluator::new(DummyBackend, 1, 3)),
            Arc::new(BatchingEvaluator::new(DummyBackend, 1, 3)),
        ];
        let config = GatingConfig { total_rounds: 10, thread_count: 4, playouts: 8, ..GatingConfig::default() };

        let result = run(config, evaluators, || Nim { sticks: 6, player: Player::P0 });

        assert!(result.rounds_played <= 10);
        assert!((result.win_count[0] + result.win_count[1] - result.rounds_played as f32).abs() < 1e-3);
    }
}
