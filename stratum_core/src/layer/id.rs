// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer, content, and embedded-slot identity types.

use core::fmt;

/// Sentinel value indicating "no layer" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a layer in a [`LayerStore`](super::LayerStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a layer is destroyed and the slot is reused. This is
/// the non-owning reference a snapshot keeps to its source layer: holding a
/// `LayerId` never extends the layer's life, and
/// [`LayerStore::is_alive`](super::LayerStore::is_alive) is the recoverable
/// validity check.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter — must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl LayerId {
    /// Returns the raw slot index, as found in
    /// [`LayerChangeset`](super::LayerChangeset) lists.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({}@gen{})", self.idx, self.generation)
    }
}

/// An opaque reference to a platform content buffer.
///
/// Content buffers are produced and managed outside this system (decoded
/// images, drawn text runs, video frames). A layer with `Some(ContentId)` has
/// a non-empty backing store; the capture pipeline only cares about presence.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(pub u64);

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

/// A stable identifier for an embedded rendering subsystem instance (for
/// example an embedded web renderer).
///
/// A slot outlives the layers that host it: the embedded instance may be
/// detached from the visual tree during a transition without being destroyed,
/// and downstream replay needs a continuous identifier across that gap.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u64);

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}
