// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replay identity for live layers.
//!
//! Every live layer is assigned a [`ReplayId`] the first time it is captured.
//! The id is stable for the layer's lifetime and keys the renderer's image
//! cache and the downstream wireframe diffing, so it must not be reused while
//! the layer is alive.
//!
//! Ids are minted by a [`ReplayIdGenerator`] owned by the layer store. The
//! default generator autoincrements and wraps back to zero after
//! [`i32::MAX`], keeping ids within the signed 32-bit range that downstream
//! wire formats assume. Tests can substitute a custom generator for a bounded
//! scope via
//! [`LayerStore::with_replay_id_generator`](crate::layer::LayerStore::with_replay_id_generator).

use core::fmt;

/// A stable per-live-layer replay identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ReplayId(pub i64);

impl fmt::Debug for ReplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplayId({})", self.0)
    }
}

/// Upper bound for autoincrementing ids; the next mint after this wraps to 0.
const WRAP_BOUNDARY: i64 = i32::MAX as i64;

enum Inner {
    Auto { next: i64 },
    Custom(Box<dyn FnMut() -> i64 + Send>),
}

/// Mints [`ReplayId`]s for a layer store.
pub struct ReplayIdGenerator {
    inner: Inner,
}

impl ReplayIdGenerator {
    /// The default generator: `0, 1, 2, …`, wrapping to `0` after
    /// [`i32::MAX`].
    #[must_use]
    pub const fn autoincrementing() -> Self {
        Self::starting_at(0)
    }

    /// An autoincrementing generator whose first id is `first`.
    #[must_use]
    pub const fn starting_at(first: i64) -> Self {
        Self {
            inner: Inner::Auto { next: first },
        }
    }

    /// A generator backed by an arbitrary closure.
    ///
    /// The closure's values are used verbatim; no wrapping is applied.
    #[must_use]
    pub fn custom(f: impl FnMut() -> i64 + Send + 'static) -> Self {
        Self {
            inner: Inner::Custom(Box::new(f)),
        }
    }

    /// Mints the next id.
    pub fn next_id(&mut self) -> ReplayId {
        match &mut self.inner {
            Inner::Auto { next } => {
                let id = *next;
                *next = if id >= WRAP_BOUNDARY { 0 } else { id + 1 };
                ReplayId(id)
            }
            Inner::Custom(f) => ReplayId(f()),
        }
    }
}

impl Default for ReplayIdGenerator {
    fn default() -> Self {
        Self::autoincrementing()
    }
}

impl fmt::Debug for ReplayIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Auto { next } => write!(f, "ReplayIdGenerator::Auto(next: {next})"),
            Inner::Custom(_) => write!(f, "ReplayIdGenerator::Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autoincrements_from_zero() {
        let mut generator = ReplayIdGenerator::autoincrementing();
        assert_eq!(generator.next_id(), ReplayId(0));
        assert_eq!(generator.next_id(), ReplayId(1));
        assert_eq!(generator.next_id(), ReplayId(2));
    }

    #[test]
    fn wraps_to_zero_after_i32_max() {
        let mut generator = ReplayIdGenerator::starting_at(i64::from(i32::MAX) - 1);
        assert_eq!(generator.next_id(), ReplayId(i64::from(i32::MAX) - 1));
        assert_eq!(generator.next_id(), ReplayId(i64::from(i32::MAX)));
        assert_eq!(generator.next_id(), ReplayId(0));
        assert_eq!(generator.next_id(), ReplayId(1));
    }

    #[test]
    fn custom_values_pass_through() {
        let mut value = 100;
        let mut generator = ReplayIdGenerator::custom(move || {
            value -= 1;
            value
        });
        assert_eq!(generator.next_id(), ReplayId(99));
        assert_eq!(generator.next_id(), ReplayId(98));
    }
}
