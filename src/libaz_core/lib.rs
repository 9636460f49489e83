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

//! A batched, two-tree-speculating PUCT search engine. The game being played
//! and the network doing the evaluating are both abstracted behind traits
//! ([`game::GameRules`] and [`backend::InferenceBackend`]) so that this crate
//! never needs to know what game it is searching.

mod dirichlet;

pub mod backend;
pub mod evaluator;
pub mod game;
pub mod node;
pub mod player;
pub mod search_context;
pub mod tree;
pub mod value;

pub use self::backend::InferenceBackend;
pub use self::evaluator::BatchingEvaluator;
pub use self::game::GameRules;
pub use self::node::Node;
pub use self::player::Player;
pub use self::search_context::{ActionLine, SearchContext};
pub use self::tree::SearchTree;
pub use self::value::Value;
