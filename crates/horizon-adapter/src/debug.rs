//! Human readable dumps of composite layouts.
//!
//! ```ignore
//! use horizon_adapter::debug::CompositeLayoutDebug;
//!
//! println!("{}", CompositeLayoutDebug::new().format(&composite));
//! // Composite (2 pieces, 6 positions, 3 view types):
//! // ├── piece 0: positions [0, 4) view types [0, 1) {0}
//! // └── piece 1: positions [4, 6) view types [1, 3) {0, 1}
//! ```

use std::fmt::Write;

use horizon_adapter_core::logging::targets;

use crate::composite::{CompositeAdapter, PieceLayout};
use crate::platform::ViewHolder;

/// Style of tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII-only characters.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for layout output.
#[derive(Debug, Clone)]
pub struct LayoutFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show view type ranges.
    pub show_view_types: bool,
    /// Whether to show the cached piece-local view type sets.
    pub show_cached_types: bool,
    /// Maximum nesting depth to descend into (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for LayoutFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_view_types: true,
            show_cached_types: true,
            max_depth: None,
        }
    }
}

impl LayoutFormatOptions {
    /// Positions only.
    pub fn minimal() -> Self {
        Self {
            show_view_types: false,
            show_cached_types: false,
            ..Default::default()
        }
    }
}

/// Formats a [`CompositeAdapter`]'s piece table as a tree.
#[derive(Debug, Clone, Default)]
pub struct CompositeLayoutDebug {
    options: LayoutFormatOptions,
}

impl CompositeLayoutDebug {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: LayoutFormatOptions) -> Self {
        Self { options }
    }

    /// Formats the composite's current layout.
    pub fn format<H: ViewHolder>(&self, composite: &CompositeAdapter<H>) -> String {
        let layout = composite.layout();
        let mut output = String::new();
        let _ = writeln!(
            output,
            "Composite ({} pieces, {} positions, {} view types):",
            layout.len(),
            composite.count(),
            composite.item_view_type_count()
        );
        if layout.is_empty() {
            output.push_str("  (empty)\n");
        } else {
            self.format_pieces(&layout, 0, "", &mut output);
        }
        output
    }

    /// Emits the formatted layout at debug level.
    pub fn log<H: ViewHolder>(&self, composite: &CompositeAdapter<H>) {
        tracing::debug!(target: targets::COMPOSITE, "\n{}", self.format(composite));
    }

    fn format_pieces(&self, pieces: &[PieceLayout], depth: usize, indent: &str, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        let (branch, corner, last, blank) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- ", "    "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "    "),
        };

        for (i, piece) in pieces.iter().enumerate() {
            let is_last = i + 1 == pieces.len();
            output.push_str(indent);
            output.push_str(if is_last { last } else { corner });
            let _ = write!(
                output,
                "piece {}: positions [{}, {})",
                piece.index,
                piece.start_position,
                piece.start_position + piece.count
            );
            if self.options.show_view_types {
                let _ = write!(
                    output,
                    " view types [{}, {})",
                    piece.view_type_offset,
                    piece.view_type_offset + piece.view_type_count
                );
            }
            if self.options.show_cached_types {
                let types: Vec<String> = piece
                    .cached_view_types
                    .iter()
                    .map(usize::to_string)
                    .collect();
                let _ = write!(output, " {{{}}}", types.join(", "));
            }
            output.push('\n');

            if !piece.children.is_empty() {
                let child_indent = format!("{indent}{}", if is_last { blank } else { branch });
                self.format_pieces(&piece.children, depth + 1, &child_indent, output);
            }
        }
    }
}
