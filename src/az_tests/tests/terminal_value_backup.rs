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

//! A root one move from a forced win should be solved by the shallow
//! tactical pre-check (`init_root`) before a single simulation is spent on
//! it, and `best_move`/`best_value` must reflect that solved state exactly.

mod support;

use std::sync::Arc;

use az_core::backend::DummyBackend;
use az_core::tree::SearchTreeConfig;
use az_core::{BatchingEvaluator, GameRules, SearchContext};

use support::Nim;

#[test]
fn a_single_winning_move_solves_the_root_on_the_first_iteration() {
    // One stick left: the only legal move takes it and wins outright.
    let game = Nim::new(1);
    let evaluator = Arc::new(BatchingEvaluator::new(DummyBackend, 1, 3));
    let mut ctx = SearchContext::with_seed(game, evaluator, SearchTreeConfig::default(), 0, 1);

    ctx.step(1, false, false);

    let best_move = ctx.best_move().expect("a solved root must still report a move");
    assert_eq!(best_move, 0, "the only legal action (take the last stick) must be reported");
    assert_eq!(ctx.best_value(), 1.0, "a forced win is worth 1.0 to the side that is to move");

    let mut probs = vec![0.0f32; 3];
    let selected = ctx.select_move(1.0, &mut probs);
    assert_eq!(selected, 0);
    assert_eq!(probs, vec![1.0, 0.0, 0.0]);
}
