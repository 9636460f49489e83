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

use std::fmt;
use std::io;

/// Errors that can occur at the boundaries of the engine -- configuration,
/// model loading, and dataset I/O. The search core itself is panic-free and
/// does not use this type; its invariants are enforced with `assert!`.
#[derive(Debug)]
pub enum Error {
    /// A required CLI argument was missing.
    MissingArgument(&'static str),

    /// The inference backend could not load its model.
    ModelLoad(String),

    /// A dataset file could not be read or written.
    Io(io::Error),

    /// A move string could not be parsed by the active `GameRules`.
    InvalidMove(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingArgument(name) => write!(fmt, "missing required argument: {}", name),
            Error::ModelLoad(reason) => write!(fmt, "could not load model: {}", reason),
            Error::Io(err) => write!(fmt, "i/o error: {}", err),
            Error::InvalidMove(input) => write!(fmt, "invalid move: {}", input),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
