// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Injectable time sources.
//!
//! The rendering pipeline measures its wall-clock budget and cache cadence
//! against a [`TimeSource`] rather than reading the system clock directly, so
//! tests can drive timeouts and eviction deterministically.
//!
//! Times are in seconds. [`TimeSource::Monotonic`] measures from an arbitrary
//! process-local origin; only differences are meaningful.

use std::time::Instant;

/// A source of "now" timestamps in seconds.
#[derive(Clone, Debug)]
pub enum TimeSource {
    /// Always returns the same instant.
    Constant(f64),
    /// Returns the samples in order, repeating the final sample once
    /// exhausted (an empty sequence reads as `0.0`).
    Sequence {
        /// Samples to replay, in seconds.
        samples: Vec<f64>,
        /// Index of the next sample to return.
        cursor: usize,
    },
    /// Reads the process monotonic clock.
    Monotonic {
        /// Origin instant that readings are measured from.
        origin: Instant,
    },
}

impl TimeSource {
    /// Creates a source that always reads `seconds`.
    #[must_use]
    pub const fn constant(seconds: f64) -> Self {
        Self::Constant(seconds)
    }

    /// Creates a source that replays `samples` in order.
    #[must_use]
    pub fn sequence(samples: impl Into<Vec<f64>>) -> Self {
        Self::Sequence {
            samples: samples.into(),
            cursor: 0,
        }
    }

    /// Creates a source backed by the process monotonic clock.
    #[must_use]
    pub fn monotonic() -> Self {
        Self::Monotonic {
            origin: Instant::now(),
        }
    }

    /// Reads the current time in seconds.
    pub fn now(&mut self) -> f64 {
        match self {
            Self::Constant(seconds) => *seconds,
            Self::Sequence { samples, cursor } => {
                let value = samples
                    .get(*cursor)
                    .or_else(|| samples.last())
                    .copied()
                    .unwrap_or(0.0);
                if *cursor < samples.len() {
                    *cursor += 1;
                }
                value
            }
            Self::Monotonic { origin } => origin.elapsed().as_secs_f64(),
        }
    }
}
