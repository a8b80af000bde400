// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Telemetry sink for unexpected internal conditions.
//!
//! The capture pipeline reports anomalies (non-finite transforms, impossible
//! geometry) through a [`Telemetry`] sink so the hosting SDK can surface them
//! to its own diagnostics channel. Telemetry is observational only — no code
//! path branches on whether or what was sent.

use core::fmt;
use std::sync::Mutex;

/// A single telemetry message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelemetryMessage {
    /// An unexpected condition that did not abort the capture.
    Error {
        /// Human-readable description.
        message: String,
    },
    /// Diagnostic breadcrumb.
    Debug {
        /// Human-readable description.
        message: String,
    },
}

/// Receives telemetry messages from the capture pipeline.
pub trait Telemetry: fmt::Debug + Send + Sync {
    /// Delivers one message. Implementations must not block.
    fn send(&self, message: TelemetryMessage);
}

/// A sink that drops every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopTelemetry;

impl Telemetry for NopTelemetry {
    fn send(&self, _message: TelemetryMessage) {}
}

/// A sink that records every message, for assertions in tests.
#[derive(Debug, Default)]
pub struct CollectingTelemetry {
    messages: Mutex<Vec<TelemetryMessage>>,
}

impl CollectingTelemetry {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and clears the recorded messages.
    pub fn drain(&self) -> Vec<TelemetryMessage> {
        match self.messages.lock() {
            Ok(mut messages) => messages.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Telemetry for CollectingTelemetry {
    fn send(&self, message: TelemetryMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }
}
