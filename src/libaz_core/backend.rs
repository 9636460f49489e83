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

//! Inference backends. A backend turns a batch of canonical board tensors
//! into raw (pre-exponential) policy and value logits; [`BatchingEvaluator`]
//! is the only caller and applies `exp` itself, so a backend never needs to
//! know it is being batched.
//!
//! [`BatchingEvaluator`]: crate::evaluator::BatchingEvaluator

/// A model capable of running one forward pass over a stacked batch of
/// canonical tensors. Implementations wrap whatever actually holds the
/// weights (a libtorch module, an onnxruntime session, ...); none of that is
/// this crate's concern.
pub trait InferenceBackend: Send + Sync {
    /// Runs a forward pass over `batch`, a flattened `[batch_size, C*H*W]`
    /// tensor. Returns `(policy_logits, value_logits)` with shapes
    /// `[batch_size, num_actions]` and `[batch_size, 2]`, both *before* the
    /// exponential is applied.
    fn forward(&self, batch: &[f32], batch_size: usize, num_actions: usize) -> (Vec<f32>, Vec<f32>);
}

/// An [`InferenceBackend`] that returns a uniform policy and a coin-flip
/// value for every input. Used in tests where the point is to exercise the
/// search, not the network.
pub struct DummyBackend;

impl InferenceBackend for DummyBackend {
    fn forward(&self, batch: &[f32], batch_size: usize, num_actions: usize) -> (Vec<f32>, Vec<f32>) {
        let _ = batch;
        let uniform = -(num_actions as f32).ln();
        let policy = vec![uniform; batch_size * num_actions];
        let value = vec![0.0f32; batch_size * 2];
        (policy, value)
    }
}

/// An [`InferenceBackend`] that fabricates a policy favoring low action
/// indices and a value read off the first input feature. Gives tree search
/// tests something non-uniform to converge on without pulling in a real
/// network.
pub struct BiasedBackend;

impl InferenceBackend for BiasedBackend {
    fn forward(&self, batch: &[f32], batch_size: usize, num_actions: usize) -> (Vec<f32>, Vec<f32>) {
        let feature_len = if batch_size > 0 { batch.len() / batch_size } else { 0 };
        let mut policy = vec![0.0f32; batch_size * num_actions];
        let mut value = vec![0.0f32; batch_size * 2];
        for b in 0..batch_size {
            for a in 0..num_actions {
                policy[b * num_actions + a] = -(a as f32 + 1.0).ln();
            }
            let lead = if feature_len > 0 { batch[b * feature_len] } else { 0.0 };
            value[b * 2] = lead;
            value[b * 2 + 1] = -lead;
        }
        (policy, value)
    }
}
