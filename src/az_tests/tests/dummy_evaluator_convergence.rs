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

//! A long, single-threaded search against a uniform evaluator never panics
//! and always settles on a legal move with a sane value -- the baseline
//! sanity check that the PUCT loop itself terminates cleanly regardless of
//! what the network says.

use std::sync::Arc;

use az_core::backend::DummyBackend;
use az_core::{BatchingEvaluator, GameRules, SearchContext};
use az_core::tree::SearchTreeConfig;
use az_games::Connect4;

#[test]
fn hundred_thousand_iterations_from_the_opening_settle_on_a_legal_move() {
    let game = Connect4::new();
    let num_actions = game.num_actions();
    let (c, h, w) = game.canonical_shape();
    let evaluator = Arc::new(BatchingEvaluator::new(DummyBackend, c * h * w, num_actions));

    let mut ctx = SearchContext::with_seed(game.clone(), evaluator, SearchTreeConfig::default(), 0, 1);
    ctx.step(100_000, true, true);

    let best_move = ctx.best_move().expect("100000 iterations must select some move");
    assert!(game.valid_moves()[best_move], "best_move must be legal");

    let best_value = ctx.best_value();
    assert!((0.0..=1.0).contains(&best_value), "best_value {best_value} out of range");
}
