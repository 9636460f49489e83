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

//! A model file format and the [`InferenceBackend`] that reads it.
//!
//! `az_core` treats the network as an opaque external capability -- it never
//! needs to know what is inside a model file, only that `forward` can be
//! called on it. `FileBackend` is the concrete backend the three binaries
//! plug into that seam: a flat linear policy/value head, stored as raw
//! little-endian `f32` in the same self-describing layout `az_selfplay`
//! writes its datasets in. A real deployment would swap this module out for
//! one wrapping an actual trained network; nothing else in this workspace
//! would need to change.

use std::fs;
use std::io::Read;
use std::path::Path;

use az_core::InferenceBackend;
use az_core::backend::DummyBackend;
use az_utils::Error;

/// Either a loaded [`FileBackend`] or the no-op [`DummyBackend`], chosen at
/// startup depending on whether a model path was given on the command line.
pub enum Backend {
    File(FileBackend),
    Dummy(DummyBackend),
}

impl InferenceBackend for Backend {
    fn forward(&self, batch: &[f32], batch_size: usize, num_actions: usize) -> (Vec<f32>, Vec<f32>) {
        match self {
            Backend::File(backend) => backend.forward(batch, batch_size, num_actions),
            Backend::Dummy(backend) => backend.forward(batch, batch_size, num_actions),
        }
    }
}

/// `policy = W_p x + b_p`, `value = W_v x + b_v` over the flattened
/// canonical tensor. A linear head is obviously not a competitive network,
/// but it is a real implementation of the `InferenceBackend` contract and
/// keeps this workspace free of a heavyweight tensor/autograd dependency
/// that nothing else here needs.
pub struct FileBackend {
    feature_len: usize,
    num_actions: usize,
    policy_weight: Vec<f32>,
    policy_bias: Vec<f32>,
    value_weight: Vec<f32>,
    value_bias: Vec<f32>,
}

impl FileBackend {
    /// Reads `path` as `num_actions * feature_len` policy weights, then
    /// `num_actions` policy biases, then `2 * feature_len` value weights,
    /// then 2 value biases, all raw little-endian `f32`.
    pub fn load(path: impl AsRef<Path>, feature_len: usize, num_actions: usize) -> Result<Self, Error> {
        let mut file = fs::File::open(path)?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;
        let floats = bytes_to_f32(&raw).ok_or_else(|| Error::ModelLoad("model file length is not a multiple of 4 bytes".to_string()))?;

        let expected = num_actions * feature_len + num_actions + 2 * feature_len + 2;
        if floats.len() != expected {
            return Err(Error::ModelLoad(format!(
                "expected {} floats for a {}-feature, {}-action model, found {}",
                expected, feature_len, num_actions, floats.len()
            )));
        }

        let mut rest = floats.as_slice();
        let (policy_weight, r) = rest.split_at(num_actions * feature_len);
        rest = r;
        let (policy_bias, r) = rest.split_at(num_actions);
        rest = r;
        let (value_weight, r) = rest.split_at(2 * feature_len);
        let value_bias = r;

        Ok(FileBackend {
            feature_len,
            num_actions,
            policy_weight: policy_weight.to_vec(),
            policy_bias: policy_bias.to_vec(),
            value_weight: value_weight.to_vec(),
            value_bias: value_bias.to_vec(),
        })
    }
}

impl InferenceBackend for FileBackend {
    fn forward(&self, batch: &[f32], batch_size: usize, num_actions: usize) -> (Vec<f32>, Vec<f32>) {
        debug_assert_eq!(num_actions, self.num_actions);

        let mut policy = vec![0.0f32; batch_size * num_actions];
        let mut value = vec![0.0f32; batch_size * 2];

        for b in 0..batch_size {
            let x = &batch[b * self.feature_len..(b + 1) * self.feature_len];

            for a in 0..num_actions {
                let row = &self.policy_weight[a * self.feature_len..(a + 1) * self.feature_len];
                policy[b * num_actions + a] = dot(row, x) + self.policy_bias[a];
            }
            for p in 0..2 {
                let row = &self.value_weight[p * self.feature_len..(p + 1) * self.feature_len];
                value[b * 2 + p] = dot(row, x) + self.value_bias[p];
            }
        }

        (policy, value)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn bytes_to_f32(raw: &[u8]) -> Option<Vec<f32>> {
    if raw.len() % 4 != 0 {
        return None;
    }
    Some(raw.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_truncated_file() {
        let path = std::env::temp_dir().join(format!("az_model_test_{}.bin", std::process::id()));
        fs::write(&path, vec![0u8; 4]).unwrap();
        let result = FileBackend::load(&path, 4, 2);
        assert!(result.is_err());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn a_zeroed_model_produces_zeroed_output() {
        let feature_len = 3;
        let num_actions = 2;
        let floats = vec![0.0f32; num_actions * feature_len + num_actions + 2 * feature_len + 2];
        let bytes: Vec<u8> = floats.iter().flat_map(|f| f.to_le_bytes()).collect();
        let path = std::env::temp_dir().join(format!("az_model_test_zero_{}.bin", std::process::id()));
        fs::write(&path, &bytes).unwrap();

        let backend = FileBackend::load(&path, feature_len, num_actions).unwrap();
        let (policy, value) = backend.forward(&[1.0, 2.0, 3.0], 1, num_actions);
        assert_eq!(policy, vec![0.0, 0.0]);
        assert_eq!(value, vec![0.0, 0.0]);

        fs::remove_file(&path).ok();
    }
}
