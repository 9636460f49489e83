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

//! Drives one or more [`SearchTree`]s against a single position.
//!
//! With zero auxiliary trees this is a plain single-tree PUCT search. With
//! `spec_thread_count > 0`, a handful of auxiliary trees are seeded from the
//! root's highest-prior untried moves and stepped in lockstep with the
//! primary tree: every iteration, the primary tree and every auxiliary tree
//! each find one leaf, and all of them are submitted to the evaluator as a
//! single `evaluate_n` call, so one GPU batch advances `k + 1` trees instead
//! of one. Each auxiliary tree still only ever informs its own move -- it
//! never feeds back into the primary tree's statistics.

use std::sync::Arc;

use crossbeam_channel::bounded;

use crate::backend::InferenceBackend;
use crate::evaluator::BatchingEvaluator;
use crate::game::GameRules;
use crate::node::Node;
use crate::tree::{SearchTree, SearchTreeConfig};

/// Owns the primary tree (and, optionally, its speculative siblings) for one
/// game position and runs iterations of search against it.
pub struct SearchContext<G: GameRules, B: InferenceBackend> {
    game: G,
    evaluator: Arc<BatchingEvaluator<B>>,
    primary: SearchTree,
    specs: Vec<SearchTree>,
    spec_thread_count: usize,
    spec_initialized: bool,
    precalc: bool,
    config: SearchTreeConfig,
}

impl<G: GameRules, B: InferenceBackend + 'static> SearchContext<G, B> {
    pub fn new(game: G, evaluator: Arc<BatchingEvaluator<B>>, config: SearchTreeConfig, spec_thread_count: usize) -> Self {
        let num_actions = game.num_actions();
        SearchContext {
            game,
            evaluator,
            primary: SearchTree::new(num_actions, config),
            specs: Vec::new(),
            spec_thread_count,
            spec_initialized: false,
            precalc: true,
            config,
        }
    }

    pub fn with_seed(game: G, evaluator: Arc<BatchingEvaluator<B>>, config: SearchTreeConfig, spec_thread_count: usize, seed: u64) -> Self {
        let num_actions = game.num_actions();
        SearchContext {
            game,
            evaluator,
            primary: SearchTree::with_seed(num_actions, config, seed),
            specs: Vec::new(),
            spec_thread_count,
            spec_initialized: false,
            precalc: true,
            config,
        }
    }

    /// Disables the two-ply tactical pre-solve. Mostly useful for tests that
    /// want to exercise ordinary PUCT descent even from a position that
    /// would otherwise be solved instantly.
    pub fn set_precalc(&mut self, precalc: bool) {
        self.precalc = precalc;
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn primary(&self) -> &SearchTree {
        &self.primary
    }

    /// Runs `iterations` search simulations against the current position.
    pub fn step(&mut self, iterations: usize, root_noise: bool, force_playout: bool) {
        if self.spec_thread_count == 0 {
            self.step_singlespec(iterations, root_noise, force_playout);
        } else {
            self.step_multispec(iterations, root_noise);
        }
    }

    fn step_singlespec(&mut self, iterations: usize, root_noise: bool, force_playout: bool) {
        if self.precalc && self.primary.root().n == 0 {
            self.primary.init_root(&self.game);
            if !self.primary.root().ended {
                let (pi, v) = self.evaluator.evaluate(|buf| self.game.canonicalize(buf));
                self.primary.process_result(Some(&pi), Some((v[0], v[1])), root_noise);
            }
        }

        for _ in 0..iterations {
            if self.primary.root().ended {
                break;
            }
            let leaf = self.primary.find_leaf(&self.game, force_playout);
            if self.primary.current_ended() {
                self.primary.process_result(None, None, root_noise);
            } else {
                let (pi, v) = self.evaluator.evaluate(|buf| leaf.canonicalize(buf));
                self.primary.process_result(Some(&pi), Some((v[0], v[1])), root_noise);
            }
        }
    }

    /// Seeds each auxiliary tree with exactly one of the root's untried
    /// children, chosen by descending network prior, and removes those
    /// children from the primary tree so it is never double-credited for
    /// the work the auxiliary trees do on its behalf.
    fn init_spec_trees(&mut self) {
        self.primary.init_root(&self.game);
        if self.primary.root().ended {
            self.spec_initialized = true;
            return;
        }

        let (pi, v) = self.evaluator.evaluate(|buf| self.game.canonicalize(buf));

        let count = self
            .primary
            .root()
            .children
            .len()
            .saturating_sub(1)
            .min(self.spec_thread_count);

        let mut order: Vec<usize> = (0..self.primary.root().children.len()).collect();
        order.sort_by(|&a, &b| {
            let pa = pi[self.primary.root().children[a].action.unwrap()];
            let pb = pi[self.primary.root().children[b].action.unwrap()];
            pb.partial_cmp(&pa).unwrap()
        });
        let chosen: Vec<usize> = order.into_iter().take(count).collect();

        let num_actions = self.game.num_actions();
        let current_player = self.game.current_player();

        let mut seed_actions = Vec::with_capacity(count);
        {
            let root = self.primary.root_mut();
            let mut kept = Vec::with_capacity(root.children.len() - chosen.len());
            for (index, child) in root.children.drain(..).enumerate() {
                if chosen.contains(&index) {
                    seed_actions.push(child.action.unwrap());
                } else {
                    kept.push(child);
                }
            }
            root.children = kept;
        }

        // The primary tree's own policy/noise rescaling happens on whatever
        // children remain; root noise is intentionally withheld here, same
        // as in ordinary root evaluation skipped during spec-tree setup.
        self.primary.process_result(Some(&pi), Some((v[0], v[1])), false);

        self.specs = seed_actions
            .into_iter()
            .enumerate()
            .map(|(i, action)| {
                let mut tree = SearchTree::with_seed(num_actions, self.config, 0xC0FFEE ^ i as u64);
                {
                    let root = tree.root_mut();
                    root.player = current_player;
                    root.children = vec![single_child(action)];
                }
                tree.process_result(Some(&pi), Some((v[0], v[1])), false);
                tree
            })
            .collect();

        self.spec_initialized = true;
    }

    fn step_multispec(&mut self, iterations: usize, root_noise: bool) {
        if !self.spec_initialized {
            self.init_spec_trees();
        }
        if self.primary.root().ended {
            return;
        }

        let spec_count = self.specs.len();
        if spec_count == 0 {
            self.step_singlespec(iterations, root_noise, false);
            return;
        }

        let game = &self.game;
        let feature_len = self.evaluator.feature_len();
        let evaluator = &self.evaluator;
        let primary = &mut self.primary;
        let specs = &mut self.specs;

        crossbeam_utils::thread::scope(|scope| {
            let mut go_txs = Vec::with_capacity(spec_count);
            let mut leaf_rxs = Vec::with_capacity(spec_count);
            let mut result_txs = Vec::with_capacity(spec_count);

            for tree in specs.iter_mut() {
                let (go_tx, go_rx) = bounded::<()>(0);
                let (leaf_tx, leaf_rx) = bounded::<G>(0);
                let (result_tx, result_rx) = bounded::<(Vec<f32>, (f32, f32))>(0);

                go_txs.push(go_tx);
                leaf_rxs.push(leaf_rx);
                result_txs.push(result_tx);

                scope.spawn(move |_| {
                    for _ in 0..iterations {
                        if go_rx.recv().is_err() {
                            return;
                        }
                        let leaf = tree.find_leaf(game, false);
                        if leaf_tx.send(leaf).is_err() {
                            return;
                        }
                        if let Ok((pi, v)) = result_rx.recv() {
                            if tree.current_ended() {
                                tree.process_result(None, None, false);
                            } else {
                                tree.process_result(Some(&pi), Some(v), false);
                            }
                        }
                    }
                });
            }

            for _ in 0..iterations {
                for tx in &go_txs {
                    let _ = tx.send(());
                }

                let primary_leaf = primary.find_leaf(game, false);
                let aux_leaves: Vec<G> = leaf_rxs.iter().map(|rx| rx.recv().unwrap()).collect();

                let num_actions = evaluator.num_actions();
                let mut canon = vec![0.0f32; feature_len * (spec_count + 1)];
                for (i, leaf) in aux_leaves.iter().enumerate() {
                    leaf.canonicalize(&mut canon[i * feature_len..(i + 1) * feature_len]);
                }
                primary_leaf.canonicalize(&mut canon[spec_count * feature_len..(spec_count + 1) * feature_len]);

                let results = evaluator.evaluate_n(spec_count + 1, |i, buf| {
                    buf.copy_from_slice(&canon[i * feature_len..(i + 1) * feature_len]);
                });
                let _ = num_actions;

                for (i, tx) in result_txs.iter().enumerate() {
                    let (pi, v) = &results[i];
                    let _ = tx.send((pi.clone(), (v[0], v[1])));
                }

                let (pi_last, v_last) = &results[spec_count];
                if primary.current_ended() {
                    primary.process_result(None, None, root_noise);
                } else {
                    primary.process_result(Some(pi_last), Some((v_last[0], v_last[1])), root_noise);
                }
            }
        })
        .expect("auxiliary search threads must not panic");
    }

    /// The action with the greatest `q` among children with at least one
    /// visit, scanning the primary tree's root and every speculative tree's
    /// single root child. A speculative tree's root carries exactly one
    /// child (its seeded move), so this is the natural generalization of
    /// "most promising child" once auxiliary trees are in play.
    pub fn best_move(&self) -> Option<usize> {
        if let Some(winning) = self.primary.winning_move() {
            return Some(winning);
        }

        let mut best_action = None;
        let mut best_q = 0.0f32;
        for child in self.primary.root().children.iter().chain(self.specs.iter().flat_map(|t| t.root().children.iter())) {
            if child.n > 0 && (best_action.is_none() || child.q > best_q) {
                best_q = child.q;
                best_action = child.action;
            }
        }
        best_action
    }

    /// The `Q` for the action returned by [`SearchContext::best_move`], across
    /// the primary tree and every speculative tree. Note this starts its
    /// internal scan at `0.0` rather than `-infinity`, same as the engine
    /// this was translated from -- a root whose every child currently has a
    /// negative `q` will still report `0.0` here rather than its true
    /// (negative) best value.
    pub fn best_value(&self) -> f32 {
        if self.primary.winning_move().is_some() {
            return self.primary.root().value.map(|v| v.get(self.primary.root().player)).unwrap_or(1.0);
        }
        let mut best = 0.0f32;
        for child in self.primary.root().children.iter().chain(self.specs.iter().flat_map(|t| t.root().children.iter())) {
            if child.n > 0 && child.q > best {
                best = child.q;
            }
        }
        best
    }

    /// Samples a move from the temperature-scaled, pruned visit
    /// distribution, and writes the distribution used into `probs_out` (of
    /// length `num_actions`). This is move selection only -- the
    /// distribution it writes is shaped by whatever temperature the caller's
    /// schedule has decayed to, so it is the wrong thing to persist as a
    /// training target; use [`SearchContext::fill_probs`] for that.
    pub fn select_move(&mut self, temperature: f32, probs_out: &mut [f32]) -> usize {
        if let Some(winning) = self.primary.winning_move() {
            probs_out.iter_mut().for_each(|p| *p = 0.0);
            probs_out[winning] = 1.0;
            return winning;
        }
        self.primary.set_probs(probs_out, temperature);
        SearchTree::pick_move(probs_out, &mut rand::thread_rng())
    }

    /// Writes the pruned visit distribution at a fixed `temperature = 1.0`
    /// into `probs_out`, independent of whatever temperature move selection
    /// is currently using. This is the training-target distribution: callers
    /// that record a turn for a dataset should fill it with this, not with
    /// whatever `probs_out` `select_move` happened to leave behind.
    pub fn fill_probs(&self, probs_out: &mut [f32]) {
        if let Some(winning) = self.primary.winning_move() {
            probs_out.iter_mut().for_each(|p| *p = 0.0);
            probs_out[winning] = 1.0;
            return;
        }
        self.primary.set_probs(probs_out, 1.0);
    }

    /// A human-readable ranking of the primary tree's top `k` children by
    /// visit count, followed by one line per speculative tree's single
    /// seeded child, each tagged `Spec`. Mirrors the REPL's "thinking"
    /// display, which prints the primary candidates plus what every
    /// auxiliary search is currently making of its own seeded move.
    pub fn show_actions(&self, k: usize) -> Vec<ActionLine> {
        let mut primary: Vec<ActionLine> = self
            .primary
            .root()
            .children
            .iter()
            .map(|c| ActionLine { action: c.action.unwrap(), n: c.n, q: c.q, spec: false })
            .collect();
        primary.sort_by(|a, b| b.n.cmp(&a.n));
        primary.truncate(k);

        for tree in &self.specs {
            if let Some(child) = tree.root().children.first() {
                primary.push(ActionLine { action: child.action.unwrap(), n: child.n, q: child.q, spec: true });
            }
        }
        primary
    }

    /// Applies `action` and starts a brand-new primary tree at the resulting
    /// position. No statistics from the explored subtree are carried over --
    /// every turn gets a search grown from scratch, matching the self-play
    /// and gating drivers, which each build a fresh context every move.
    pub fn advance(&mut self, action: usize) {
        self.game.apply_move(action);
        self.primary = SearchTree::new(self.game.num_actions(), self.config);
        self.specs.clear();
        self.spec_initialized = false;
    }
}

/// One row of [`SearchContext::show_actions`]'s report.
#[derive(Copy, Clone, Debug)]
pub struct ActionLine {
    pub action: usize,
    pub n: u32,
    pub q: f32,
    /// `true` if this row came from a speculative tree rather than the
    /// primary one.
    pub spec: bool,
}

fn single_child(action: usize) -> Node {
    let mut root = Node::new_root();
    root.action = Some(action);
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BiasedBackend, DummyBackend};
    use crate::evaluator::BatchingEvaluator;
    use crate::player::Player;
    use crate::tree::SearchTreeConfig;

    #[derive(Clone)]
    struct Nim {
        sticks: i32,
        player: Player,
    }

    impl GameRules for Nim {
        fn num_actions(&self) -> usize {
            3
        }
        fn canonical_shape(&self) -> (usize, usize, usize) {
            (1, 1, 1)
        }
        fn current_player(&self) -> Player {
            self.player
        }
        fn valid_moves(&self) -> Vec<bool> {
            (1..=3).map(|take| take <= self.sticks).collect()
        }
        fn apply_move(&mut self, action: usize) {
            self.sticks -= action as i32 + 1;
            self.player = self.player.opposite();
        }
        fn ended(&self) -> bool {
            self.sticks <= 0
        }
        fn winner(&self) -> Player {
            self.player.opposite()
        }
        fn score(&self) -> f32 {
            if self.winner() == Player::P0 { 1.0 } else { 0.0 }
        }
        fn canonicalize(&self, out: &mut [f32]) {
            out[0] = self.sticks as f32;
        }
        fn action_to_string(&self, action: usize) -> String {
            (action + 1).to_string()
        }
        fn string_to_action(&self, text: &str) -> Option<usize> {
            text.parse::<usize>().ok().map(|n| n - 1)
        }
        fn create_symmetry_board(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) {
            dst.copy_from_slice(src);
        }
        fn create_symmetry_action(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) {
            dst.copy_from_slice(src);
        }
    }

    fn nim() -> Nim {
        Nim { sticks: 10, player: Player::P0 }
    }

    #[test]
    fn single_tree_step_picks_a_legal_move() {
        let evaluator = Arc::new(BatchingEvaluator::new(BiasedBackend, 1, 3));
        let mut ctx = SearchContext::with_seed(nim(), evaluator, SearchTreeConfig::default(), 0, 42);
        ctx.step(64, true, true);
        let mv = ctx.best_move().expect("some move should be selected");
        assert!(ctx.game().valid_moves()[mv]);
    }

    #[test]
    fn speculative_trees_all_advance_together() {
        let evaluator = Arc::new(BatchingEvaluator::new(DummyBackend, 1, 3));
        let mut ctx = SearchContext::with_seed(nim(), evaluator, SearchTreeConfig::default(), 2, 7);
        ctx.step(8, false, false);
        assert!(ctx.primary().simulations() > 0);
        let mv = ctx.best_move().expect("some move should be selected");
        assert!(ctx.game().valid_moves()[mv]);
    }

    #[test]
    fn advance_applies_the_move_and_starts_a_fresh_tree() {
        let evaluator = Arc::new(BatchingEvaluator::new(BiasedBackend, 1, 3));
        let mut ctx = SearchContext::with_seed(nim(), evaluator, SearchTreeConfig::default(), 0, 3);
        ctx.set_precalc(false);
        ctx.step(32, false, false);
        let mv = ctx.best_move().unwrap();
        ctx.advance(mv);
        assert_eq!(ctx.game().sticks, 10 - (mv as i32 + 1));
        assert_eq!(ctx.primary().simulations(), 0, "advance must not carry simulations over into the new tree");
        assert_eq!(ctx.primary().root().children.len(), 0, "advance must not carry the explored subtree over");
    }

    #[test]
    fn select_move_always_returns_a_legal_move() {
        let evaluator = Arc::new(BatchingEvaluator::new(BiasedBackend, 1, 3));
        let mut ctx = SearchContext::with_seed(nim(), evaluator, SearchTreeConfig::default(), 0, 9);
        ctx.step(32, false, false);
        let mut probs = vec![0.0f32; 3];
        let mv = ctx.select_move(1.0, &mut probs);
        assert!(ctx.game().valid_moves()[mv]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }
}
