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

//! Minimal progress reporting. There is no logging crate in this workspace --
//! diagnostics are direct writes to stdout/stderr, same as the rest of the
//! engine, so that a driver running on a remote machine over SSH still shows
//! its progress without any extra setup.

/// Prints a timestamp-free progress line to stdout. Used for per-turn and
/// per-round progress in the self-play and gating drivers.
///
/// # Arguments
///
/// * `args` - a pre-formatted message
///
pub fn progress(args: fmt::Arguments) {
    println!("{}", args);
}

/// Prints a warning to stderr. Used for recoverable per-input failures (an
/// illegal move typed into the REPL, a malformed line in a loaded game
/// history) that should not abort the caller.
///
/// # Arguments
///
/// * `args` - a pre-formatted message
///
pub fn warn(args: fmt::Arguments) {
    eprintln!("warning: {}", args);
}

use std::fmt;

#[macro_export]
macro_rules! az_progress {
    ($($arg:tt)*) => {
        $crate::logging::progress(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! az_warn {
    ($($arg:tt)*) => {
        $crate::logging::warn(format_args!($($arg)*))
    };
}
