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

//! 32 worker threads hammering one evaluator at roughly millisecond
//! intervals should see their requests coalesced into batches bigger than
//! one, bounded by the 64-slot ring -- the whole point of the evaluator
//! existing at all.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use az_core::backend::InferenceBackend;
use az_core::BatchingEvaluator;

struct NoOpBackend;

impl InferenceBackend for NoOpBackend {
    fn forward(&self, _batch: &[f32], batch_size: usize, num_actions: usize) -> (Vec<f32>, Vec<f32>) {
        (vec![0.0; batch_size * num_actions], vec![0.0; batch_size * 2])
    }
}

#[test]
fn thirty_two_workers_produce_an_average_batch_size_above_one() {
    let evaluator = Arc::new(BatchingEvaluator::new(NoOpBackend, 4, 2));
    let stop = Arc::new(AtomicBool::new(false));

    crossbeam_utils::thread::scope(|scope| {
        for _ in 0..32 {
            let evaluator = evaluator.clone();
            let stop = stop.clone();
            scope.spawn(move |_| {
                while !stop.load(Ordering::Relaxed) {
                    evaluator.evaluate(|buf| buf.fill(0.0));
                    std::thread::sleep(Duration::from_millis(1));
                }
            });
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }
        stop.store(true, Ordering::Relaxed);
    })
    .expect("worker threads must not panic");

    let (samples, batches) = evaluator.statistics();
    assert!(batches >= 1, "at least one batch must have been processed");
    let average = samples as f64 / batches as f64;
    assert!(average > 1.0, "average batch size {average} was not above 1");
    assert!(average <= 64.0, "average batch size {average} exceeded the 64-slot ring bound");
}
