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

use rand::Rng;

use crate::player::Player;
use crate::value::Value;

/// One node of a search tree. The root has `action == None`; every other
/// node was reached by playing `action` from its parent.
#[derive(Clone, Debug)]
pub struct Node {
    pub action: Option<usize>,
    pub policy: f32,
    pub n: u32,
    pub q: f32,
    pub v: f32,
    pub player: Player,
    pub ended: bool,
    pub value: Option<Value>,
    pub children: Vec<Node>,
}

impl Node {
    /// An as-yet-unexpanded root. `player` is filled in properly the first
    /// time the node is visited.
    pub fn new_root() -> Self {
        Node {
            action: None,
            policy: 0.0,
            n: 0,
            q: 0.0,
            v: 0.0,
            player: Player::P0,
            ended: false,
            value: None,
            children: Vec::new(),
        }
    }

    fn new_child(action: usize) -> Self {
        Node {
            action: Some(action),
            policy: 0.0,
            n: 0,
            q: 0.0,
            v: 0.0,
            player: Player::P0,
            ended: false,
            value: None,
            children: Vec::new(),
        }
    }

    /// Populates `children`, one per legal action in `valid_moves`, in a
    /// randomized order so that a fixed PUCT tie-break does not always favor
    /// the same action index.
    pub fn add_children(&mut self, valid_moves: &[bool], rng: &mut impl Rng) {
        self.children = valid_moves
            .iter()
            .enumerate()
            .filter(|&(_, &valid)| valid)
            .map(|(action, _)| Node::new_child(action))
            .collect();

        for i in (1..self.children.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.children.swap(i, j);
        }
    }

    /// Copies the network's prior over actions into the matching children.
    pub fn update_policy(&mut self, pi: &[f32]) {
        for child in &mut self.children {
            child.policy = pi[child.action.expect("non-root node has an action")];
        }
    }

    /// The PUCT score used to rank this node as a candidate child.
    /// `fpu_value` is what an unvisited node is assumed to be worth.
    pub(crate) fn uct(&self, sqrt_parent_n: f32, cpuct: f32, fpu_value: f32) -> f32 {
        let q = if self.n == 0 { fpu_value } else { self.q };
        q + cpuct * self.policy * sqrt_parent_n / (self.n as f32 + 1.0)
    }

    /// Picks the index into `children` to descend into next. Honors the
    /// force-playout guarantee: a child that hasn't been visited at least
    /// `sqrt(2 * policy * (parent.n - child.n))` times is forced regardless
    /// of its PUCT score, when `force_playout` is enabled.
    pub fn best_child_index(&self, cpuct: f32, fpu_reduction: f32, force_playout: bool) -> usize {
        assert!(!self.children.is_empty());

        let mut seen_policy = 0.0f32;
        for (index, child) in self.children.iter().enumerate() {
            if child.n > 0 {
                if force_playout {
                    let threshold = (2.0 * child.policy * (self.n as f32 - child.n as f32)).max(0.0).sqrt();
                    if (child.n as f32) < threshold {
                        return index;
                    }
                }
                seen_policy += child.policy;
            }
        }

        let fpu_value = self.v - fpu_reduction * seen_policy.sqrt();
        let sqrt_n = (self.n as f32).sqrt();

        let mut best_index = 0;
        let mut best_score = self.children[0].uct(sqrt_n, cpuct, fpu_value);
        for (index, child) in self.children.iter().enumerate().skip(1) {
            let score = child.uct(sqrt_n, cpuct, fpu_value);
            if score > best_score {
                best_score = score;
                best_index = index;
            }
        }
        best_index
    }
}

/// Walks `route` (a sequence of child indices chosen at each level) from
/// `root`, returning an immutable reference to the node it ends at.
pub fn node_at<'a>(root: &'a Node, route: &[usize]) -> &'a Node {
    let mut node = root;
    for &index in route {
        node = &node.children[index];
    }
    node
}

/// Mutable counterpart of [`node_at`].
pub fn node_at_mut<'a>(root: &'a mut Node, route: &[usize]) -> &'a mut Node {
    let mut node = root;
    for &index in route {
        node = &mut node.children[index];
    }
    node
}

/// Backs a simulation result up from the leaf reached by `route` to the
/// node just below the root, each node's `q`/`n`/`v` updated using the
/// *parent's* player. The root itself is never touched here -- its visit
/// count is bumped once by the caller, and its own value never settles to
/// anything but its initial `0.0`, matching the original engine this was
/// grounded on.
pub fn backup(node: &mut Node, route: &[usize], value: Value) {
    if route.is_empty() {
        return;
    }
    let index = route[0];
    let parent_player = node.player;

    if route.len() > 1 {
        backup(&mut node.children[index], &route[1..], value);
    }

    let child = &mut node.children[index];
    let sample = value.get(parent_player);
    child.q = (child.q * child.n as f32 + sample) / (child.n as f32 + 1.0);
    if child.n == 0 {
        child.v = value.get(child.player);
    }
    child.n += 1;
}
