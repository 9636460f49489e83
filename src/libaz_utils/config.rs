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

//! Global tunables, each overridable through an environment variable of the
//! same name. Mirrors how the rest of the workspace is meant to be tuned
//! without recompiling -- set `AZ_CPUCT=4.0` before running a binary.

use std::env;
use std::str::FromStr;

/// Parses an environment variable into `T`, falling back to `default` if the
/// variable is unset or fails to parse.
///
/// # Arguments
///
/// * `name` - the environment variable to read
/// * `default` - the value to use if `name` is unset or malformed
///
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name).ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

lazy_static! {
    /// Exploration constant in the PUCT formula.
    pub static ref CPUCT: f32 = env_or("AZ_CPUCT", 3.0);

    /// First-play-urgency reduction applied to not-yet-visited children.
    pub static ref FPU_REDUCTION: f32 = env_or("AZ_FPU_REDUCTION", 0.25);

    /// Dirichlet noise alpha is `NOISE_ALPHA_RATIO / num_legal_root_children`.
    pub static ref NOISE_ALPHA_RATIO: f32 = env_or("AZ_NOISE_ALPHA_RATIO", 10.83);

    /// Fraction of root prior replaced by Dirichlet noise.
    pub static ref ROOT_NOISE_EPSILON: f32 = env_or("AZ_ROOT_NOISE_EPSILON", 0.25);

    /// Root-only prior sharpening exponent `1 / root_policy_temp`.
    pub static ref ROOT_POLICY_TEMP: f32 = env_or("AZ_ROOT_POLICY_TEMP", 1.4);

    /// Number of OS worker threads in the self-play / gating fleet.
    pub static ref NUM_THREADS: usize = env_or("AZ_NUM_THREADS", 32);

    /// Maximum number of samples the batching evaluator accumulates before
    /// handing a batch to the inference backend.
    pub static ref BATCH_SIZE: usize = env_or("AZ_BATCH_SIZE", 64);

    /// Default playout budget for a non-capped self-play turn.
    pub static ref NUM_ROLLOUT: usize = env_or("AZ_NUM_ROLLOUT", 1200);

    /// Move-selection temperature used outside of the self-play schedule.
    pub static ref TEMPERATURE: f32 = env_or("AZ_TEMPERATURE", 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        assert!(*CPUCT > 0.0);
        assert!(*FPU_REDUCTION >= 0.0);
        assert!(*NOISE_ALPHA_RATIO > 0.0);
        assert!(*ROOT_NOISE_EPSILON >= 0.0 && *ROOT_NOISE_EPSILON <= 1.0);
        assert!(*ROOT_POLICY_TEMP > 0.0);
        assert!(*NUM_THREADS > 0);
        assert!(*BATCH_SIZE > 0 && *BATCH_SIZE <= 64);
    }
}
