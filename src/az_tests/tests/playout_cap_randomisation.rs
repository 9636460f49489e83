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

//! Over many simulated turns, the fraction discarded from training must
//! track the configured cap percentage -- this is what keeps self-play
//! games cheap while still producing full-strength training data on a
//! predictable schedule.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use az_selfplay::PlayoutCapConfig;

#[test]
fn capped_turn_fraction_matches_the_configured_percent_over_a_thousand_turns() {
    let config = PlayoutCapConfig::default_selfplay();
    assert_eq!(config.cap_percent, 0.75);

    let mut rng = SmallRng::seed_from_u64(0xA5A5);
    let total = 1000;
    let mut not_recorded = 0;

    for _ in 0..total {
        let plan = config.decide(&mut rng);
        if !plan.record {
            not_recorded += 1;
            assert_eq!(plan.iterations, config.cap_playouts);
            assert!(!plan.root_noise && !plan.force_playout);
        } else {
            assert_eq!(plan.iterations, config.full_playouts);
            assert!(plan.root_noise && plan.force_playout);
        }
    }

    let fraction = not_recorded as f64 / total as f64;
    assert!((fraction - 0.75).abs() <= 0.03, "fraction discarded was {fraction}");
}
