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

//! Runs a fleet of worker threads that each play full games against a
//! shared pool of evaluators, recording the full-playout turns as training
//! samples until a target dataset size has been produced.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use az_core::backend::InferenceBackend;
use az_core::evaluator::BatchingEvaluator;
use az_core::game::GameRules;
use az_core::search_context::SearchContext;
use az_core::tree::SearchTreeConfig;

use crate::dataset::{DatasetWriter, RecordedTurn};
use crate::schedule::{PlayoutCapConfig, TemperatureSchedule};

/// Tunables for a self-play run, independent of which game or evaluator is
/// plugged in. Defaults mirror `selfplay_shadow.cpp`.
#[derive(Clone)]
pub struct SelfPlayConfig {
    pub worker_threads: usize,
    pub target_dataset_count: usize,
    pub tree: SearchTreeConfig,
    pub playout_cap: PlayoutCapConfig,
    pub output_dir: PathBuf,
}

impl SelfPlayConfig {
    pub fn new(output_dir: impl Into<PathBuf>, target_dataset_count: usize) -> Self {
        SelfPlayConfig {
            worker_threads: *az_utils::config::NUM_THREADS,
            target_dataset_count,
            tree: SearchTreeConfig::default(),
            playout_cap: PlayoutCapConfig::default_selfplay(),
            output_dir: output_dir.into(),
        }
    }
}

/// Drives `config.worker_threads` games at a time, round-robining across
/// `evaluators`, until `config.target_dataset_count` games have been
/// persisted to `config.output_dir`. A background monitor thread prints
/// every evaluator's average-batch-size statistics every 10 seconds, the
/// same cadence the reference driver uses.
pub fn run<G, B, F>(config: SelfPlayConfig, evaluators: Vec<Arc<BatchingEvaluator<B>>>, new_game: F) -> std::io::Result<()>
where
    G: GameRules,
    B: InferenceBackend + 'static,
    F: Fn() -> G + Send + Sync,
{
    assert!(!evaluators.is_empty(), "self-play needs at least one evaluator");

    let writer = Arc::new(DatasetWriter::new(&config.output_dir)?);
    let dataset_count = Arc::new(AtomicUsize::new(0));
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let target = config.target_dataset_count;

    crossbeam_utils::thread::scope(|scope| {
        for worker_id in 0..config.worker_threads {
            let evaluator = evaluators[worker_id % evaluators.len()].clone();
            let writer = writer.clone();
            let dataset_count = dataset_count.clone();
            let stop = stop.clone();
            let config = config.clone();
            let new_game = &new_game;

            scope.spawn(move || {
                let mut rng = SmallRng::seed_from_u64(0x5A1F_0000 ^ worker_id as u64);

                while !stop.load(Ordering::Relaxed) {
                    let game = new_game();
                    if play_one_game(&config, &evaluator, &writer, game, &mut rng) {
                        dataset_count.fetch_add(1, Ordering::Relaxed);
                    }

                    if dataset_count.load(Ordering::Relaxed) >= target {
                        stop.store(true, Ordering::Relaxed);
                    }
                }
            });
        }

        scope.spawn(|| {
            while !stop.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_secs(10));
                for (i, evaluator) in evaluators.iter().enumerate() {
                    let (samples, batches) = evaluator.statistics();
                    let average = if batches > 0 { samples as f64 / batches as f64 } else { 0.0 };
                    az_utils::az_progress!("evaluator {i}: {samples} samples / {batches} batches, average batch size {average:.2}");
                }
            }
        });

        let _ = &dataset_count;
    })
    .expect("self-play worker threads must not panic");

    Ok(())
}

fn play_one_game<G: GameRules, B: InferenceBackend + 'static>(
    config: &SelfPlayConfig,
    evaluator: &Arc<BatchingEvaluator<B>>,
    writer: &Arc<DatasetWriter>,
    game: G,
    rng: &mut SmallRng,
) -> bool {
    let mut ctx = SearchContext::new(game.clone(), evaluator.clone(), config.tree, 0);
    let mut schedule = TemperatureSchedule::default_selfplay();
    let mut recorded = Vec::new();
    let mut turn = 0u32;

    loop {
        if ctx.game().ended() {
            break;
        }

        let plan = config.playout_cap.decide(rng);
        let temperature = schedule.step(turn);

        ctx.step(plan.iterations, plan.root_noise, plan.force_playout);

        let mut move_probs = vec![0.0f32; game.num_actions()];
        let action = ctx.select_move(temperature, &mut move_probs);

        if plan.record {
            let (c, h, w) = game.canonical_shape();
            let mut canonical = vec![0.0f32; c * h * w];
            ctx.game().canonicalize(&mut canonical);

            // The training target is the pruned visit distribution at a
            // fixed temperature, independent of whatever temperature move
            // selection above just sampled with.
            let mut target_policy = vec![0.0f32; game.num_actions()];
            ctx.fill_probs(&mut target_policy);

            recorded.push(RecordedTurn { canonical, policy: target_policy, player: ctx.game().current_player() });
        }

        ctx.advance(action);
        turn += 1;
    }

    if recorded.is_empty() {
        az_utils::az_progress!("no full-playout turns recorded, skipping game");
        return false;
    }

    let score = ctx.game().score();
    match writer.write_game(ctx.game(), &recorded, score) {
        Ok(Some(index)) => {
            az_utils::az_progress!("wrote game {index}, score={score}");
            true
        }
        Ok(None) => {
            az_utils::az_progress!("dropped game (nan detected)");
            false
        }
        Err(err) => {
            az_utils::az_warn!("could not write game: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use az_core::backend::DummyBackend;
    use az_core::Player;

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
    fn produces_the_requested_number_of_games() {
        let dir = std::env::temp_dir().join(format!("az_selfplay_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let evaluator = Arc::new(BatchingEvaluator::new(DummyBackend, 1, 3));
        let mut config = SelfPlayConfig::new(&dir, 2);
        config.worker_threads = 2;
        config.playout_cap = PlayoutCapConfig { cap_percent: 0.0, cap_playouts: 4, full_playouts: 8 };

        run(config, vec![evaluator], || Nim { sticks: 6, player: Player::P0 }).unwrap();

        let written = std::fs::read_dir(&dir).unwrap().filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().starts_with("c_")).count();
        assert!(written >= 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
