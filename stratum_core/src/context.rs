// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording context passed into each capture tick.
//!
//! The context bundles everything a single capture needs from the hosting
//! SDK: privacy levels that gate what gets captured, the identifiers that tie
//! the capture to a session and view, the capture date, an optional
//! server-time offset, and the telemetry sink.

use std::sync::Arc;

use crate::telemetry::{NopTelemetry, Telemetry};

/// How text and input content is masked in captured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextPrivacy {
    /// Mask only text that is likely sensitive (inputs, credentials).
    MaskSensitive,
    /// Mask all input fields, show other text.
    MaskInputs,
    /// Mask all text.
    #[default]
    MaskAll,
}

/// How image content is masked in captured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImagePrivacy {
    /// Capture all images.
    MaskNone,
    /// Mask images that do not ship with the application bundle.
    MaskExternal,
    /// Mask all images.
    #[default]
    MaskAll,
}

/// Whether touch interactions are captured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TouchPrivacy {
    /// Record touch locations.
    Show,
    /// Drop touch information.
    #[default]
    Hide,
}

/// Everything one capture tick needs from the hosting SDK.
#[derive(Clone, Debug)]
pub struct RecordingContext {
    /// Text/input masking level.
    pub text_privacy: TextPrivacy,
    /// Image masking level.
    pub image_privacy: ImagePrivacy,
    /// Touch capture level.
    pub touch_privacy: TouchPrivacy,
    /// Application identifier.
    pub application_id: String,
    /// Session identifier.
    pub session_id: String,
    /// Active view identifier.
    pub view_id: String,
    /// Capture date in seconds since the epoch.
    pub date: f64,
    /// Correction to apply to [`date`](Self::date) to align with server time.
    pub server_time_offset: Option<f64>,
    /// Sink for unexpected internal conditions.
    pub telemetry: Arc<dyn Telemetry>,
}

impl RecordingContext {
    /// Returns the capture date with the server-time offset applied.
    #[must_use]
    pub fn corrected_date(&self) -> f64 {
        self.date + self.server_time_offset.unwrap_or(0.0)
    }
}

impl Default for RecordingContext {
    /// A context with maximal privacy, empty identifiers, epoch date, and a
    /// no-op telemetry sink. Primarily useful in tests.
    fn default() -> Self {
        Self {
            text_privacy: TextPrivacy::default(),
            image_privacy: ImagePrivacy::default(),
            touch_privacy: TouchPrivacy::default(),
            application_id: String::new(),
            session_id: String::new(),
            view_id: String::new(),
            date: 0.0,
            server_time_offset: None,
            telemetry: Arc::new(NopTelemetry),
        }
    }
}
