// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for stratum captures.
//!
//! This crate provides [`PrettyPrinter`], a human-readable dump of a
//! captured snapshot tree — one line per node with geometry, opacity, and
//! semantics at a glance. Intended for debugging capture issues, not for
//! production output.

mod pretty;

pub use pretty::PrettyPrinter;
