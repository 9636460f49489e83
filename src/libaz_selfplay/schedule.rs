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

//! Per-turn move-selection temperature and playout-cap randomisation, the
//! two self-play-only knobs that never apply outside a `SelfPlayDriver`.

use rand::Rng;

/// Decays smoothly from `start` toward `end` as the game goes on: each turn,
/// `current <- exp(lambda * turn) * (current - end) + end`. With the default
/// `lambda = -0.01` this is close to `start` through the opening and has
/// mostly settled to `end` by turn ~100.
#[derive(Clone, Copy, Debug)]
pub struct TemperatureSchedule {
    current: f32,
    end: f32,
    lambda: f32,
}

impl TemperatureSchedule {
    pub fn new(start: f32, end: f32, lambda: f32) -> Self {
        TemperatureSchedule { current: start, end, lambda }
    }

    /// Matches the defaults baked into the original self-play driver.
    pub fn default_selfplay() -> Self {
        TemperatureSchedule::new(1.0, 0.2, -0.01)
    }

    /// Advances the schedule by one turn and returns the temperature to use
    /// for it.
    pub fn step(&mut self, turn: u32) -> f32 {
        self.current = (self.lambda * turn as f32).exp() * (self.current - self.end) + self.end;
        self.current
    }
}

/// Whether a self-play turn runs the full playout budget (and is recorded as
/// a training example) or a cheap capped budget (and is discarded). Running
/// most turns cheap keeps games fast; the full-budget turns are what the
/// search actually learns from, so only those carry root noise and forced
/// playouts.
#[derive(Clone, Copy, Debug)]
pub struct PlayoutCapConfig {
    pub cap_percent: f32,
    pub cap_playouts: usize,
    pub full_playouts: usize,
}

impl PlayoutCapConfig {
    /// `PLAYOUT_NUM`, `PLAYOUT_CAP_NUM`, `PLAYOUT_CAP_PERCENT` from the
    /// self-play driver this was distilled from.
    pub fn default_selfplay() -> Self {
        PlayoutCapConfig { cap_percent: 0.75, cap_playouts: 150, full_playouts: 1200 }
    }

    /// Rolls the dice for one turn.
    pub fn decide(&self, rng: &mut impl Rng) -> TurnPlan {
        let capped = rng.gen::<f32>() < self.cap_percent;
        if capped {
            TurnPlan { iterations: self.cap_playouts, root_noise: false, force_playout: false, record: false }
        } else {
            TurnPlan { iterations: self.full_playouts, root_noise: true, force_playout: true, record: true }
        }
    }
}

/// What one turn of self-play should do, decided once up front.
#[derive(Clone, Copy, Debug)]
pub struct TurnPlan {
    pub iterations: usize,
    pub root_noise: bool,
    pub force_playout: bool,
    pub record: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn temperature_decays_toward_end() {
        let mut schedule = TemperatureSchedule::default_selfplay();
        let mut last = 1.0;
        for turn in 0..200 {
            let t = schedule.step(turn);
            assert!(t <= last + 1e-6);
            last = t;
        }
        assert!((last - 0.2).abs() < 0.01);
    }

    #[test]
    fn playout_cap_rate_matches_configured_percent() {
        let config = PlayoutCapConfig::default_selfplay();
        let mut rng = SmallRng::seed_from_u64(123);
        let mut capped = 0;
        let total = 2000;
        for _ in 0..total {
            if !config.decide(&mut rng).record {
                capped += 1;
            }
        }
        let fraction = capped as f64 / total as f64;
        assert!((fraction - 0.75).abs() < 0.03, "fraction was {fraction}");
    }
}
