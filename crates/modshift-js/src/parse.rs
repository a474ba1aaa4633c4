//! Parsed JavaScript modules.
//!
//! [`JsModule`] owns a source string and its tree-sitter syntax tree. Edits are
//! applied as byte-span replacements on the source, after which the module is
//! reparsed, so the tree always matches the text. Node handles borrowed from a
//! module cannot outlive an edit; the borrow checker enforces that.

use modshift_core::edit::{BatchSpanEditor, EditPrimitive};
use modshift_core::span::Span;
use modshift_core::text::byte_offset_to_position_str;
use tracing::{debug, trace};
use tree_sitter::{Node, Parser, Tree};

use crate::error::{JsError, JsResult};
use crate::walk::{walk_preorder, VisitResult};

/// A parsed JavaScript source file.
pub struct JsModule {
    source: String,
    tree: Tree,
}

impl std::fmt::Debug for JsModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsModule")
            .field("len", &self.source.len())
            .finish_non_exhaustive()
    }
}

impl JsModule {
    /// Parse `source`.
    ///
    /// # Errors
    ///
    /// Returns `JsError::Parse` with the position of the first syntax error if
    /// the tree contains ERROR or MISSING nodes. No recovery is attempted.
    pub fn parse(source: impl Into<String>) -> JsResult<Self> {
        let source = source.into();
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_javascript::LANGUAGE.into())?;
        let tree = parser.parse(&source, None).ok_or(JsError::NoTree)?;

        if let Some(err) = syntax_error(&source, tree.root_node()) {
            debug!(%err, "rejecting malformed module");
            return Err(err);
        }

        trace!(bytes = source.len(), "parsed module");
        Ok(JsModule { source, tree })
    }

    /// The current source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The syntax tree for the current source text.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The `program` node.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        node_span(node).slice(&self.source).unwrap_or("")
    }

    /// Consume the module, returning its source text.
    pub fn into_source(self) -> String {
        self.source
    }

    /// Apply `edits` to the source and reparse.
    ///
    /// Returns the number of edits applied. On error the module is left
    /// unchanged.
    pub fn apply_edits(&mut self, edits: Vec<EditPrimitive>) -> JsResult<usize> {
        if edits.is_empty() {
            return Ok(0);
        }

        let count = edits.len();
        let mut editor = BatchSpanEditor::new(&self.source);
        editor.add_all(edits);
        let edited = editor.apply()?;

        *self = JsModule::parse(edited)?;
        debug!(edits = count, "applied edits");
        Ok(count)
    }
}

/// Byte span of `node`.
pub fn node_span(node: Node<'_>) -> Span {
    Span::from(node.byte_range())
}

/// First ERROR or MISSING node under `root`, as a parse error.
fn syntax_error(source: &str, root: Node<'_>) -> Option<JsError> {
    if !root.has_error() {
        return None;
    }

    let mut found: Option<Node<'_>> = None;
    walk_preorder(root, |node| {
        if node.is_error() || node.is_missing() {
            found = Some(node);
            VisitResult::Stop
        } else if node.has_error() {
            VisitResult::Continue
        } else {
            VisitResult::SkipChildren
        }
    });

    let node = found.unwrap_or(root);
    let (line, col) = byte_offset_to_position_str(source, node.start_byte());
    let message = if node.is_missing() {
        format!("missing `{}`", node.kind())
    } else {
        let text = source.get(node.byte_range()).unwrap_or("");
        let snippet: String = text.lines().next().unwrap_or("").chars().take(24).collect();
        format!("unexpected `{}`", snippet)
    };

    Some(JsError::Parse { line, col, message })
}
