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

//! Two identical evaluators gated against each other over a fixed round
//! budget must still terminate within that budget, and every round played
//! must be accounted for in the combined win tally.

mod support;

use std::sync::Arc;

use az_core::backend::DummyBackend;
use az_core::BatchingEvaluator;
use az_selfplay::{run_gating, GatingConfig};

use support::Nim;

#[test]
fn ten_round_gate_between_identical_evaluators_terminates_and_tallies_up() {
    let evaluators = [
        Arc::new(BatchingEvaluator::new(DummyBackend, 1, 3)),
        Arc::new(BatchingEvaluator::new(DummyBackend, 1, 3)),
    ];
    let config = GatingConfig {
        total_rounds: 10,
        thread_count: 4,
        playouts: 8,
        ..GatingConfig::default()
    };

    let result = run_gating(config, evaluators, || Nim::new(6));

    assert!(result.rounds_played <= 10, "gating ran {} rounds, more than the budget", result.rounds_played);
    let total = result.win_count[0] + result.win_count[1];
    assert!((total - result.rounds_played as f32).abs() < 1e-3, "win tally {total} did not match {} rounds played", result.rounds_played);
}
