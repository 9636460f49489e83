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

//! `selfplay_connect4 -m MODEL -o DIR [-c COUNT]` plays Connect4 games
//! against itself and writes the recorded training turns to `DIR`. A model
//! path of `-` runs the uniform-policy dummy backend, useful for exercising
//! the dataset pipeline without a trained model.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use az::model::Backend;
use az_core::backend::DummyBackend;
use az_core::{BatchingEvaluator, GameRules};
use az_games::Connect4;
use az_selfplay::SelfPlayConfig;
use az_utils::Error;

struct Args {
    model: String,
    output_dir: String,
    count: usize,
}

fn parse_args(argv: &[String]) -> Result<Args, Error> {
    let mut model = None;
    let mut output_dir = None;
    let mut count = 10_000;

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-m" => {
                model = argv.get(i + 1).cloned();
                i += 2;
            }
            "-o" => {
                output_dir = argv.get(i + 1).cloned();
                i += 2;
            }
            "-c" => {
                count = argv.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(count);
                i += 2;
            }
            _ => i += 1,
        }
    }

    Ok(Args {
        model: model.ok_or(Error::MissingArgument("-m"))?,
        output_dir: output_dir.ok_or(Error::MissingArgument("-o"))?,
        count,
    })
}

fn main() -> ExitCode {
    let argv: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("usage: selfplay_connect4 -m MODEL -o DIR [-c COUNT]");
            return ExitCode::FAILURE;
        }
    };

    let game = Connect4::new();
    let num_actions = game.num_actions();
    let (c, h, w) = game.canonical_shape();
    let feature_len = c * h * w;

    let backend = if args.model == "-" {
        Backend::Dummy(DummyBackend)
    } else {
        match az::model::FileBackend::load(&args.model, feature_len, num_actions) {
            Ok(backend) => Backend::File(backend),
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
    };

    let evaluator = Arc::new(BatchingEvaluator::new(backend, feature_len, num_actions));
    let config = SelfPlayConfig::new(&args.output_dir, args.count);

    match az_selfplay::run_selfplay(config, vec![evaluator], Connect4::new) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
