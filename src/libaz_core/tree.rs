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

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::dirichlet::symmetric_dirichlet;
use crate::game::GameRules;
use crate::node::{backup, node_at, node_at_mut, Node};
use crate::player::Player;
use crate::value::Value;

/// A single PUCT search tree rooted at one game position.
///
/// `find_leaf` / `process_result` are meant to be called in strict
/// alternation: a search iteration descends to an unexpanded or terminal
/// node, the caller evaluates it (or skips evaluation for a terminal node),
/// and the result is backed up before the next `find_leaf`.
pub struct SearchTree {
    root: Node,
    route: Vec<usize>,
    rng: SmallRng,
    cpuct: f32,
    fpu_reduction: f32,
    root_policy_temp: f32,
    noise_alpha_ratio: f32,
    root_noise_epsilon: f32,
    num_actions: usize,
    simulations: u64,
    winning_move: Option<usize>,
}

/// Tunables a [`SearchTree`] is built with; defaults come from
/// [`az_utils::config`].
#[derive(Clone, Copy, Debug)]
pub struct SearchTreeConfig {
    pub cpuct: f32,
    pub fpu_reduction: f32,
    pub root_policy_temp: f32,
    pub noise_alpha_ratio: f32,
    pub root_noise_epsilon: f32,
}

impl Default for SearchTreeConfig {
    fn default() -> Self {
        SearchTreeConfig {
            cpuct: *az_utils::config::CPUCT,
            fpu_reduction: *az_utils::config::FPU_REDUCTION,
            root_policy_temp: *az_utils::config::ROOT_POLICY_TEMP,
            noise_alpha_ratio: *az_utils::config::NOISE_ALPHA_RATIO,
            root_noise_epsilon: *az_utils::config::ROOT_NOISE_EPSILON,
        }
    }
}

impl SearchTree {
    pub fn new(num_actions: usize, config: SearchTreeConfig) -> Self {
        Self::with_rng(num_actions, config, SmallRng::from_entropy())
    }

    pub fn with_seed(num_actions: usize, config: SearchTreeConfig, seed: u64) -> Self {
        Self::with_rng(num_actions, config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(num_actions: usize, config: SearchTreeConfig, rng: SmallRng) -> Self {
        SearchTree {
            root: Node::new_root(),
            route: Vec::new(),
            rng,
            cpuct: config.cpuct,
            fpu_reduction: config.fpu_reduction,
            root_policy_temp: config.root_policy_temp,
            noise_alpha_ratio: config.noise_alpha_ratio,
            root_noise_epsilon: config.root_noise_epsilon,
            num_actions,
            simulations: 0,
            winning_move: None,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn simulations(&self) -> u64 {
        self.simulations
    }

    pub fn winning_move(&self) -> Option<usize> {
        self.winning_move
    }

    /// `true` once `find_leaf` has returned a node whose game has already
    /// ended -- `process_result` must then be called with `None`/`None`.
    pub fn current_ended(&self) -> bool {
        node_at(&self.root, &self.route).ended
    }

    pub fn current_player(&self) -> Player {
        node_at(&self.root, &self.route).player
    }

    /// A shallow, exact two-ply tactical solve: if some legal move at the
    /// root either wins immediately, or wins against every possible reply,
    /// the root is marked solved and search can be skipped entirely. This
    /// mirrors the optional `init_root` precalculation step; always running
    /// it only costs O(branching^2) game-rule calls once per move.
    pub fn init_root<G: GameRules>(&mut self, game: &G) {
        let current_player = game.current_player();
        let mut valid_moves = game.valid_moves();
        let num_actions = game.num_actions();
        let mut fallback_move = None;

        self.root = Node::new_root();
        self.root.player = current_player;
        self.winning_move = None;

        for a in 0..num_actions {
            if !valid_moves[a] {
                continue;
            }

            let mut g1 = game.clone();
            g1.apply_move(a);

            if g1.ended() {
                if g1.winner() == current_player {
                    self.solve_root(current_player, a);
                    return;
                } else {
                    valid_moves[a] = false;
                    fallback_move = Some(a);
                    continue;
                }
            }

            let replies = g1.valid_moves();
            let mut always_wins = true;
            for b in 0..num_actions {
                if !replies[b] {
                    continue;
                }
                let mut g2 = g1.clone();
                g2.apply_move(b);
                if g2.ended() {
                    if g2.winner() != current_player {
                        always_wins = false;
                        break;
                    }
                } else {
                    always_wins = false;
                    break;
                }
            }

            if always_wins {
                self.solve_root(current_player, a);
                return;
            }
        }

        self.root.add_children(&valid_moves, &mut self.rng);
        if self.root.children.is_empty() {
            self.root.ended = true;
            self.root.value = Some(Value::from_player(current_player, 0.0));
            self.winning_move = fallback_move;
        }
    }

    fn solve_root(&mut self, current_player: Player, winning_move: usize) {
        self.root.ended = true;
        self.root.value = Some(Value::from_player(current_player, 1.0));
        self.winning_move = Some(winning_move);
    }

    /// Descends from the root, following the highest-PUCT child at each
    /// already-expanded node, until it reaches a node with no visits yet (or
    /// a terminal node). Expands that node in place. Returns a clone of the
    /// game state at the leaf; `root_game` must be the position this tree is
    /// rooted at.
    pub fn find_leaf<G: GameRules>(&mut self, root_game: &G, force_playout: bool) -> G {
        self.route.clear();
        let mut leaf = root_game.clone();

        loop {
            let node = node_at(&self.root, &self.route);
            if !(node.n > 0 && !node.ended) {
                break;
            }

            let mut fpu_reduction = self.fpu_reduction;
            if self.route.is_empty() {
                fpu_reduction *= 0.5;
            }
            if node.v < 0.2 {
                fpu_reduction *= 0.5;
            }

            let index = node.best_child_index(self.cpuct, fpu_reduction, force_playout);
            let action = node.children[index].action.expect("non-root child has an action");
            self.route.push(index);
            leaf.apply_move(action);
        }

        let node = node_at_mut(&mut self.root, &self.route);
        if node.n == 0 && !node.ended {
            node.player = leaf.current_player();
            node.ended = leaf.ended();
            if node.ended {
                node.value = Some(Value::new(leaf.score()));
            } else {
                let valid = leaf.valid_moves();
                node.add_children(&valid, &mut self.rng);
                if node.children.is_empty() {
                    node.ended = true;
                    node.value = Some(Value::from_player(node.player, 0.0));
                }
            }
        }

        leaf
    }

    /// Consumes the result of evaluating the leaf found by the most recent
    /// `find_leaf`. For a terminal leaf pass `None`/`None`; the cached
    /// terminal value is used instead and the arguments are ignored.
    /// `v_pair` is `(value_for_leaf_player, value_for_opponent)`, canonical
    /// to whichever side is to move at the leaf -- the same convention
    /// `GameRules::canonicalize` uses for the policy/value heads' input.
    pub fn process_result(&mut self, pi: Option<&[f32]>, v_pair: Option<(f32, f32)>, root_noise_enabled: bool) {
        let is_root = self.route.is_empty();

        let value = {
            let node = node_at_mut(&mut self.root, &self.route);
            if node.ended {
                node.value.expect("a terminal node always has a cached value")
            } else {
                let pi = pi.expect("process_result needs a policy for a non-terminal leaf");
                let (own, opponent) = v_pair.expect("process_result needs a value for a non-terminal leaf");
                // `own`/`opponent` are relative to `node.player`; re-seat them
                // as (value_for_p0, value_for_p1) before building a `Value`.
                let (v0, v1) = match node.player {
                    Player::P0 => (own, opponent),
                    Player::P1 => (opponent, own),
                };
                let value = Value::from_logits(v0, v1);

                let sum: f32 = node.children.iter().map(|c| pi[c.action.unwrap()]).sum();
                let sum = if sum > 0.0 { sum } else { 1.0 };
                let mut scaled = vec![0.0f32; self.num_actions];
                for c in &node.children {
                    let a = c.action.unwrap();
                    scaled[a] = pi[a] / sum;
                }

                if is_root {
                    let exponent = 1.0 / self.root_policy_temp;
                    let mut sharp_sum = 0.0f32;
                    for c in &node.children {
                        let a = c.action.unwrap();
                        scaled[a] = scaled[a].max(0.0).powf(exponent);
                        sharp_sum += scaled[a];
                    }
                    if sharp_sum > 0.0 {
                        for c in &node.children {
                            let a = c.action.unwrap();
                            scaled[a] /= sharp_sum;
                        }
                    }
                }

                node.update_policy(&scaled);
                value
            }
        };

        if is_root && !self.root.ended && root_noise_enabled {
            self.add_root_noise();
        }

        if !self.route.is_empty() {
            backup(&mut self.root, &self.route, value);
        }
        self.root.n += 1;
        self.simulations += 1;
    }

    fn add_root_noise(&mut self) {
        let n = self.root.children.len();
        if n == 0 {
            return;
        }
        let alpha = self.noise_alpha_ratio / n as f32;
        let noise = symmetric_dirichlet(n, alpha, &mut self.rng);
        let epsilon = self.root_noise_epsilon;
        for (child, noise_i) in self.root.children.iter_mut().zip(noise) {
            child.policy = child.policy * (1.0 - epsilon) + epsilon * noise_i;
        }
    }

    /// Raw visit counts, one per action (`0` for illegal/unvisited actions).
    pub fn counts(&self) -> Vec<f32> {
        let mut counts = vec![0.0f32; self.num_actions];
        for child in &self.root.children {
            counts[child.action.unwrap()] = child.n as f32;
        }
        counts
    }

    /// Visit counts with policy-target pruning applied. Every non-best
    /// child's count is reduced to the smallest visit count that could still
    /// justify its current `n` against the best child's own PUCT score,
    /// `min(c.n, ceil(cpuct * c.policy * sqrt(root.n) / (best_uct - c.q)))`,
    /// and dropped to `0` once that reduced count is `1` or less. This
    /// strips out the extra visits `force_playout` injected once they're no
    /// longer needed to justify a child's place in the training target.
    pub fn policy_pruned_counts(&self) -> Vec<f32> {
        let mut counts = self.counts();
        if self.root.children.len() < 2 {
            return counts;
        }

        let best_index = self
            .root
            .children
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.n.cmp(&b.n))
            .map(|(i, _)| i)
            .unwrap();
        let best = &self.root.children[best_index];
        if best.n == 0 {
            return counts;
        }

        let sqrt_n = (self.root.n as f32).sqrt();
        let best_uct = best.uct(sqrt_n, self.cpuct, 0.0);

        for child in &self.root.children {
            if std::ptr::eq(child, best) {
                continue;
            }
            if child.n == 0 {
                continue;
            }
            let denom = best_uct - child.q;
            if denom <= 0.0 {
                // `child`'s own q already matches or beats best's PUCT floor;
                // nothing to prune.
                continue;
            }
            let lower_bound = (self.cpuct * child.policy * sqrt_n / denom).ceil();
            let new_count = (child.n as f32).min(lower_bound);
            counts[child.action.unwrap()] = if new_count <= 1.0 { 0.0 } else { new_count };
        }
        counts
    }

    /// Visit-count-derived move probabilities raised to `1 / temperature`
    /// and renormalized. `temperature == 0.0` is treated as argmax.
    pub fn probs(&self, counts: &[f32], temperature: f32) -> Vec<f32> {
        if temperature <= 1e-4 {
            let mut probs = vec![0.0f32; self.num_actions];
            if let Some((best, _)) = counts
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            {
                probs[best] = 1.0;
            }
            return probs;
        }

        let exponent = 1.0 / temperature;
        let mut probs: Vec<f32> = counts.iter().map(|&c| c.max(0.0).powf(exponent)).collect();
        let sum: f32 = probs.iter().sum();
        if sum > 0.0 {
            for p in &mut probs {
                *p /= sum;
            }
        }
        probs
    }

    /// Writes `probs` into `out` (same length as `num_actions`), useful for
    /// callers that keep their own buffer.
    pub fn set_probs(&self, out: &mut [f32], temperature: f32) {
        let counts = self.policy_pruned_counts();
        out.copy_from_slice(&self.probs(&counts, temperature));
    }

    /// Samples a legal move from a probability vector produced by
    /// [`SearchTree::probs`].
    pub fn pick_move(probs: &[f32], rng: &mut impl Rng) -> usize {
        let total: f32 = probs.iter().sum();
        let mut roll = rng.gen_range(0.0..total.max(1e-9));
        for (action, &p) in probs.iter().enumerate() {
            if roll < p {
                return action;
            }
            roll -= p;
        }
        probs
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(a, _)| a)
            .unwrap_or(0)
    }

    pub fn route(&self) -> &[usize] {
        &self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Counter {
        value: i32,
        limit: i32,
        player: Player,
    }

    impl GameRules for Counter {
        fn num_actions(&self) -> usize {
            2
        }
        fn canonical_shape(&self) -> (usize, usize, usize) {
            (1, 1, 1)
        }
        fn current_player(&self) -> Player {
            self.player
        }
        fn valid_moves(&self) -> Vec<bool> {
            vec![true, true]
        }
        fn apply_move(&mut self, action: usize) {
            self.value += if action == 0 { 1 } else { -1 };
            self.player = self.player.opposite();
        }
        fn ended(&self) -> bool {
            self.value.abs() >= self.limit
        }
        fn winner(&self) -> Player {
            if self.value > 0 {
                Player::P0
            } else {
                Player::P1
            }
        }
        fn score(&self) -> f32 {
            if self.value > 0 {
                1.0
            } else {
                0.0
            }
        }
        fn canonicalize(&self, out: &mut [f32]) {
            out[0] = self.value as f32;
        }
        fn action_to_string(&self, action: usize) -> String {
            action.to_string()
        }
        fn string_to_action(&self, text: &str) -> Option<usize> {
            text.parse().ok()
        }
        fn create_symmetry_board(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) {
            dst.copy_from_slice(src);
        }
        fn create_symmetry_action(&self, dst: &mut [f32], src: &[f32], _symmetry: usize) {
            dst.copy_from_slice(src);
        }
    }

    fn game() -> Counter {
        Counter { value: 0, limit: 3, player: Player::P0 }
    }

    #[test]
    fn root_expands_on_first_find_leaf() {
        let mut tree = SearchTree::with_seed(2, SearchTreeConfig::default(), 1);
        let leaf = tree.find_leaf(&game(), false);
        assert_eq!(leaf.value, 0);
        assert_eq!(tree.root().children.len(), 2);
    }

    #[test]
    fn visit_count_equals_one_plus_children_sum() {
        let mut tree = SearchTree::with_seed(2, SearchTreeConfig::default(), 2);
        for _ in 0..20 {
            let leaf = tree.find_leaf(&game(), false);
            if tree.current_ended() {
                tree.process_result(None, None, false);
            } else {
                let pi = vec![0.5, 0.5];
                tree.process_result(Some(&pi), Some((0.5, 0.5)), false);
            }
            let _ = leaf;
        }
        let children_sum: u32 = tree.root().children.iter().map(|c| c.n).sum();
        assert_eq!(tree.root().n, children_sum + 1);
    }

    #[test]
    fn counts_only_cover_legal_moves() {
        let mut tree = SearchTree::with_seed(2, SearchTreeConfig::default(), 3);
        for _ in 0..10 {
            let _ = tree.find_leaf(&game(), false);
            if tree.current_ended() {
                tree.process_result(None, None, false);
            } else {
                tree.process_result(Some(&[0.5, 0.5]), Some((0.5, 0.5)), false);
            }
        }
        let counts = tree.counts();
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().sum::<f32>() > 0.0);
    }

    #[test]
    fn init_root_finds_immediate_win() {
        let mut tree = SearchTree::with_seed(2, SearchTreeConfig::default(), 4);
        let g = Counter { value: 2, limit: 3, player: Player::P0 };
        tree.init_root(&g);
        assert!(tree.root().ended);
        assert_eq!(tree.winning_move(), Some(0));
    }
}
