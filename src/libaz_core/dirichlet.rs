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
use rand_distr::{Distribution, Gamma};

/// Draws a sample from `Dirichlet(alpha, alpha, ..., alpha)` of length `n` by
/// drawing `n` independent `Gamma(alpha, 1)` variates and normalizing, which
/// is the standard construction and avoids needing a dedicated Dirichlet
/// sampler for this one (symmetric) use.
pub fn symmetric_dirichlet(n: usize, alpha: f32, rng: &mut impl Rng) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    let gamma = Gamma::new(alpha.max(1e-3), 1.0).expect("alpha must be positive");
    let mut samples: Vec<f32> = (0..n).map(|_| gamma.sample(rng)).collect();
    let sum: f32 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    } else {
        let uniform = 1.0 / n as f32;
        samples.iter_mut().for_each(|s| *s = uniform);
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn sums_to_one() {
        let mut rng = SmallRng::seed_from_u64(7);
        let sample = symmetric_dirichlet(5, 10.83 / 5.0, &mut rng);
        let sum: f32 = sample.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert_eq!(sample.len(), 5);
    }
}
