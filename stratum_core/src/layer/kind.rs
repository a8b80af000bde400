// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer kind tags.

/// The kind of a layer, supplied at creation.
///
/// The kind serves two purposes in capture: it names the layer in debug paths
/// (`"TextLayer#0"`), and it declares whether the layer draws its own content
/// even when no content buffer is attached — a text layer renders glyphs on
/// demand, so it is an image candidate with an empty content slot, while a
/// plain layer with no content draws nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// A plain container/content layer.
    #[default]
    Plain,
    /// Draws text runs.
    Text,
    /// Draws a vector path.
    Shape,
    /// Draws a color gradient.
    Gradient,
}

impl LayerKind {
    /// Returns the name used in snapshot debug paths.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "Layer",
            Self::Text => "TextLayer",
            Self::Shape => "ShapeLayer",
            Self::Gradient => "GradientLayer",
        }
    }

    /// Returns whether layers of this kind draw content of their own even
    /// without a content buffer attached.
    #[must_use]
    pub const fn draws_content(self) -> bool {
        !matches!(self, Self::Plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_layers_do_not_draw() {
        assert!(!LayerKind::Plain.draws_content());
        assert!(LayerKind::Text.draws_content());
        assert!(LayerKind::Shape.draws_content());
        assert!(LayerKind::Gradient.draws_content());
    }

    #[test]
    fn names_are_distinct() {
        let names = [
            LayerKind::Plain.name(),
            LayerKind::Text.name(),
            LayerKind::Shape.name(),
            LayerKind::Gradient.name(),
        ];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b, "kind names must be distinct");
            }
        }
    }
}
