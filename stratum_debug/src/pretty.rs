// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable snapshot-tree output.
//!
//! [`PrettyPrinter`] writes one line per node to a
//! [`Write`](std::io::Write) destination (default: stderr), indented by
//! depth.

use std::io::Write;

use stratum_capture::{LayerSnapshot, Semantics};

/// Writes human-readable snapshot-tree lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrinter<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrinter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrinter").finish_non_exhaustive()
    }
}

impl PrettyPrinter {
    /// Creates a printer that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrinter<W> {
    /// Creates a printer that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the tree rooted at `snapshot`, one line per node.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from the underlying writer.
    pub fn print(&mut self, snapshot: &LayerSnapshot) -> std::io::Result<()> {
        self.print_node(snapshot, 0)
    }

    /// Consumes the printer and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn print_node(&mut self, node: &LayerSnapshot, depth: usize) -> std::io::Result<()> {
        let indent = "  ".repeat(depth);
        let f = node.frame;
        write!(
            self.writer,
            "{indent}{} id={} frame=({:.1},{:.1} {:.1}x{:.1}) opacity={:.2}",
            node.path,
            node.replay_id.0,
            f.x0,
            f.y0,
            f.width(),
            f.height(),
            node.resolved_opacity,
        )?;
        if node.is_hidden {
            write!(self.writer, " hidden")?;
        }
        if node.has_contents {
            write!(self.writer, " contents")?;
        }
        if node.has_mask {
            write!(self.writer, " masked")?;
        }
        if !node.is_axis_aligned {
            write!(self.writer, " rotated")?;
        }
        match node.semantics {
            Semantics::WebView { slot } => writeln!(self.writer, " webview={}", slot.0)?,
            Semantics::Generic => writeln!(self.writer)?,
        }
        for child in &node.children {
            self.print_node(child, depth + 1)?;
        }
        Ok(())
    }
}
