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

//! Drivers that run many games to completion: `selfplay` generates training
//! samples, `gating` tournaments one model against another.

pub mod dataset;
pub mod gating;
pub mod schedule;
pub mod selfplay;

pub use self::dataset::{DatasetWriter, RecordedTurn};
pub use self::gating::{run as run_gating, GatingConfig, GatingResult};
pub use self::schedule::{PlayoutCapConfig, TemperatureSchedule, TurnPlan};
pub use self::selfplay::{run as run_selfplay, SelfPlayConfig};
