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

//! Interactive REPL: `y`/`Y` runs a burst of search and shows the current
//! candidates, `b`/`B` undoes the last move, `save`/`dump` and `load` persist
//! move history to `game.txt`, anything ending in `!` bypasses the legality
//! check, and everything else is parsed as a move.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use az::model::Backend;
use az_core::backend::DummyBackend;
use az_core::tree::SearchTreeConfig;
use az_core::{BatchingEvaluator, GameRules, SearchContext};
use az_games::Connect4;

const HISTORY_FILE: &str = "game.txt";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let game = Connect4::new();
    let num_actions = game.num_actions();
    let (c, h, w) = game.canonical_shape();
    let feature_len = c * h * w;

    let backend = match args.get(1) {
        Some(path) => match az::model::FileBackend::load(path, feature_len, num_actions) {
            Ok(backend) => Backend::File(backend),
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => Backend::Dummy(DummyBackend),
    };

    let evaluator = Arc::new(BatchingEvaluator::new(backend, feature_len, num_actions));

    let mut game = game;
    let mut history: Vec<Connect4> = Vec::new();
    let mut history_moves: Vec<String> = Vec::new();

    loop {
        print_turn(&game);
        if game.ended() {
            println!("{:?} wins.", game.winner());
            return ExitCode::SUCCESS;
        }

        let mut ctx = SearchContext::new(game.clone(), evaluator.clone(), SearchTreeConfig::default(), 0);

        let action = 'input: loop {
            print!("\nInput action (y to think): ");
            if io::stdout().flush().is_err() {
                return ExitCode::SUCCESS;
            }

            let mut line = String::new();
            if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
                return ExitCode::SUCCESS;
            }
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if input.eq_ignore_ascii_case("y") {
                ctx.step(*az_utils::config::NUM_ROLLOUT, true, true);
                for row in ctx.show_actions(5) {
                    let tag = if row.spec { " (spec)" } else { "" };
                    println!("{:>6}  n={:<6} q={:.3}{tag}", game.action_to_string(row.action), row.n, row.q);
                }
                continue;
            }

            if input.eq_ignore_ascii_case("b") {
                match history.pop() {
                    Some(prev) => {
                        game = prev;
                        history_moves.pop();
                    }
                    None => az_utils::az_warn!("no move to undo"),
                }
                break 'input usize::MAX;
            }

            if input == "save" || input == "dump" {
                if let Err(err) = az::record::dump(HISTORY_FILE, &history_moves) {
                    az_utils::az_warn!("could not save game: {err}");
                }
                continue;
            }

            if input == "load" {
                match az::record::load(HISTORY_FILE) {
                    Ok(moves) => {
                        let (replayed, replayed_history) = replay(&moves);
                        game = replayed;
                        history = replayed_history;
                        history_moves = moves;
                        break 'input usize::MAX;
                    }
                    Err(err) => {
                        az_utils::az_warn!("could not load game: {err}");
                        continue;
                    }
                }
            }

            let mut text = input.to_string();
            let bypass = text.ends_with('!');
            if bypass {
                text.pop();
            }

            match game.string_to_action(&text) {
                Some(action) if bypass || game.valid_moves().get(action).copied().unwrap_or(false) => {
                    history_moves.push(input.to_string());
                    break 'input action;
                }
                Some(_) => az_utils::az_warn!("invalid move: {input}"),
                None => az_utils::az_warn!("could not parse move: {input}"),
            }
        };

        // `b`/`load` resolve the position themselves and loop back to the
        // top without an actual move to apply.
        if action == usize::MAX {
            continue;
        }

        history.push(game.clone());
        game.apply_move(action);
    }
}

fn print_turn(game: &Connect4) {
    println!("\n{:?} to move", game.current_player());
    let moves: Vec<String> = (0..game.num_actions())
        .filter(|&a| game.valid_moves()[a])
        .map(|a| game.action_to_string(a))
        .collect();
    println!("legal moves: {}", moves.join(" "));
}

fn replay(moves: &[String]) -> (Connect4, Vec<Connect4>) {
    let mut game = Connect4::new();
    let mut history = Vec::new();
    for mv in moves {
        let mut text = mv.clone();
        if text.ends_with('!') {
            text.pop();
        }
        if let Some(action) = game.string_to_action(&text) {
            history.push(game.clone());
            game.apply_move(action);
        }
    }
    (game, history)
}
