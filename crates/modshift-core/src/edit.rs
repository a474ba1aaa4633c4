//! Batch edit infrastructure for applying span-based edits atomically.
//!
//! [`BatchSpanEditor`] is the printer side of every modshift operation: the
//! original source text is kept and only the spans named by queued edits are
//! replaced. Everything outside those spans is reproduced byte for byte.
//!
//! # Edit Primitives
//!
//! | Primitive | Description | Span Semantics |
//! |-----------|-------------|----------------|
//! | `Replace(span, text)` | Replace content at span with new text | `span.start..span.end` becomes `text` |
//! | `InsertAt(position, text)` | Insert at absolute position | Zero-width span at position |
//!
//! # Example
//!
//! ```
//! use modshift_core::edit::{BatchSpanEditor, EditPrimitive};
//! use modshift_core::span::Span;
//!
//! let source = "require('./foo');";
//!
//! let mut editor = BatchSpanEditor::new(source);
//! editor.add(EditPrimitive::Replace {
//!     span: Span::new(8, 15),
//!     new_text: "'./bar'".to_string(),
//! });
//!
//! let result = editor.apply().unwrap();
//! assert_eq!(result, "require('./bar');");
//! ```

use std::cmp::Ordering;

use thiserror::Error;

use crate::span::Span;

/// An atomic edit operation on source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPrimitive {
    /// Replace content at span with new text.
    Replace { span: Span, new_text: String },

    /// Insert text at an absolute byte position.
    InsertAt { position: usize, text: String },
}

impl EditPrimitive {
    /// Returns the span this edit operates on.
    /// For InsertAt, returns a zero-width span at the position.
    pub fn effective_span(&self) -> Span {
        match self {
            EditPrimitive::Replace { span, .. } => *span,
            EditPrimitive::InsertAt { position, .. } => Span::empty_at(*position),
        }
    }

    /// Returns the insertion point (byte offset where new text begins).
    pub fn insertion_point(&self) -> usize {
        match self {
            EditPrimitive::Replace { span, .. } => span.start,
            EditPrimitive::InsertAt { position, .. } => *position,
        }
    }

    /// Returns true if this is an insertion.
    pub fn is_insertion(&self) -> bool {
        matches!(self, EditPrimitive::InsertAt { .. })
    }
}

/// Error type for batch edit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Two edits have overlapping spans.
    #[error("overlapping edits: {edit1_span} and {edit2_span}")]
    OverlappingEdits { edit1_span: Span, edit2_span: Span },

    /// An edit span extends beyond source length.
    #[error("span {span} is out of bounds for source of length {source_len}")]
    SpanOutOfBounds { span: Span, source_len: usize },

    /// An edit span starts or ends inside a multi-byte character.
    #[error("span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },
}

/// Result type for batch edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// A batch editor that collects edit primitives and applies them atomically.
///
/// Edits are applied in descending position order so earlier spans stay valid
/// while later text changes length. Insertions queued at the same position
/// keep their queue order in the output.
pub struct BatchSpanEditor<'src> {
    source: &'src str,
    edits: Vec<EditPrimitive>,
}

impl<'src> BatchSpanEditor<'src> {
    /// Create a new BatchSpanEditor for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    /// Add an edit primitive to the batch.
    pub fn add(&mut self, edit: EditPrimitive) {
        self.edits.push(edit);
    }

    /// Add multiple edit primitives.
    pub fn add_all(&mut self, edits: impl IntoIterator<Item = EditPrimitive>) {
        self.edits.extend(edits);
    }

    /// Returns the number of edits currently queued.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if no edits are queued.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all queued edits and return the transformed source.
    ///
    /// # Errors
    ///
    /// - `EditError::OverlappingEdits` if any two edits overlap
    /// - `EditError::SpanOutOfBounds` if any span exceeds source length
    /// - `EditError::NotCharBoundary` if a span splits a character
    pub fn apply(self) -> EditResult<String> {
        let ordered = self.ordered()?;

        let mut result = self.source.to_string();
        for edit in ordered {
            match edit {
                EditPrimitive::Replace { span, new_text } => {
                    result.replace_range(span.start..span.end, new_text);
                }
                EditPrimitive::InsertAt { position, text } => {
                    result.insert_str(*position, text);
                }
            }
        }

        Ok(result)
    }

    /// Check bounds and overlaps, returning the edits in application order.
    fn ordered(&self) -> EditResult<Vec<&EditPrimitive>> {
        let source_len = self.source.len();
        for edit in &self.edits {
            let span = edit.effective_span();
            if span.end > source_len {
                return Err(EditError::SpanOutOfBounds { span, source_len });
            }
            if !self.source.is_char_boundary(span.start) || !self.source.is_char_boundary(span.end)
            {
                return Err(EditError::NotCharBoundary { span });
            }
        }

        // Descending position. At equal positions, replacements go before
        // insertions, and later insertions go before earlier ones so the
        // earlier text ends up first in the output.
        let mut indexed: Vec<(usize, &EditPrimitive)> = self.edits.iter().enumerate().collect();
        indexed.sort_by(|(seq_a, a), (seq_b, b)| {
            match b.insertion_point().cmp(&a.insertion_point()) {
                Ordering::Equal => match (a.is_insertion(), b.is_insertion()) {
                    (false, true) => Ordering::Less,
                    (true, false) => Ordering::Greater,
                    _ => seq_b.cmp(seq_a),
                },
                other => other,
            }
        });

        for pair in indexed.windows(2) {
            let prev = pair[0].1.effective_span();
            let curr = pair[1].1.effective_span();
            if spans_overlap_for_edits(&prev, &curr) {
                return Err(EditError::OverlappingEdits {
                    edit1_span: curr,
                    edit2_span: prev,
                });
            }
        }

        Ok(indexed.into_iter().map(|(_, edit)| edit).collect())
    }
}

/// Overlap check used during validation.
///
/// Zero-width insertions never conflict with each other; an insertion
/// strictly inside a replaced span does. Adjacent replacements are fine.
fn spans_overlap_for_edits(a: &Span, b: &Span) -> bool {
    if a.is_empty() && b.is_empty() {
        return false;
    }
    if a.is_empty() || b.is_empty() {
        let (point, span) = if a.is_empty() { (a.start, b) } else { (b.start, a) };
        return span.start < point && point < span.end;
    }
    a.overlaps(b)
}
