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

//! `gate_connect4 N MODEL_A MODEL_B [--show-board] [--output-best [FILE]]
//! [--output-data [FILE]]` plays an `N`-round gating tournament between two
//! models and reports which one won more often.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use az::model::Backend;
use az_core::backend::DummyBackend;
use az_core::{BatchingEvaluator, GameRules};
use az_games::Connect4;
use az_selfplay::{GatingConfig, GatingResult};
use az_utils::Error;

const DEFAULT_BEST_MODEL_FILE: &str = "best_model.txt";
const DEFAULT_GATING_DATA_FILE: &str = "gating_data.txt";

struct Args {
    rounds: usize,
    model_a: String,
    model_b: String,
    show_board: bool,
    output_best: Option<String>,
    output_data: Option<String>,
}

fn parse_args(argv: &[String]) -> Result<Args, Error> {
    let rounds = argv.first().ok_or(Error::MissingArgument("N"))?;
    let rounds = rounds.parse().map_err(|_| Error::MissingArgument("N"))?;
    let model_a = argv.get(1).cloned().ok_or(Error::MissingArgument("MODEL_A"))?;
    let model_b = argv.get(2).cloned().ok_or(Error::MissingArgument("MODEL_B"))?;

    let mut show_board = false;
    let mut output_best = None;
    let mut output_data = None;

    let mut i = 3;
    while i < argv.len() {
        match argv[i].as_str() {
            "--show-board" => {
                show_board = true;
                i += 1;
            }
            "--output-best" => {
                let next = argv.get(i + 1).filter(|s| !s.starts_with("--"));
                output_best = Some(next.cloned().unwrap_or_else(|| DEFAULT_BEST_MODEL_FILE.to_string()));
                i += if next.is_some() { 2 } else { 1 };
            }
            "--output-data" => {
                let next = argv.get(i + 1).filter(|s| !s.starts_with("--"));
                output_data = Some(next.cloned().unwrap_or_else(|| DEFAULT_GATING_DATA_FILE.to_string()));
                i += if next.is_some() { 2 } else { 1 };
            }
            _ => i += 1,
        }
    }

    Ok(Args {
        rounds,
        model_a,
        model_b,
        show_board,
        output_best,
        output_data,
    })
}

fn load_backend(path: &str, feature_len: usize, num_actions: usize) -> Result<Backend, Error> {
    if path == "-" {
        Ok(Backend::Dummy(DummyBackend))
    } else {
        az::model::FileBackend::load(path, feature_len, num_actions).map(Backend::File)
    }
}

fn main() -> ExitCode {
    let argv: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("usage: gate_connect4 N MODEL_A MODEL_B [--show-board] [--output-best [FILE]] [--output-data [FILE]]");
            return ExitCode::FAILURE;
        }
    };

    let game = Connect4::new();
    let num_actions = game.num_actions();
    let (c, h, w) = game.canonical_shape();
    let feature_len = c * h * w;

    let backend_a = match load_backend(&args.model_a, feature_len, num_actions) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let backend_b = match load_backend(&args.model_b, feature_len, num_actions) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let evaluator_a = Arc::new(BatchingEvaluator::new(backend_a, feature_len, num_actions));
    let evaluator_b = Arc::new(BatchingEvaluator::new(backend_b, feature_len, num_actions));

    let config = GatingConfig {
        total_rounds: args.rounds,
        show_board: args.show_board,
        ..GatingConfig::default()
    };

    let result: GatingResult = az_selfplay::run_gating(config, [evaluator_a, evaluator_b], Connect4::new);

    println!(
        "win count: {:.1} - {:.1} over {} rounds",
        result.win_count[0], result.win_count[1], result.rounds_played
    );
    println!("model {} wins the gate", if result.winner == 0 { &args.model_a } else { &args.model_b });

    if let Some(path) = &args.output_best {
        if let Err(err) = result.write_best_model_file(path, &args.model_a, &args.model_b) {
            az_utils::az_warn!("could not write {path}: {err}");
        }
    }
    if let Some(path) = &args.output_data {
        if let Err(err) = result.write_data_file(path, &args.model_a, &args.model_b) {
            az_utils::az_warn!("could not write {path}: {err}");
        }
    }

    ExitCode::SUCCESS
}
