//! Module reference rewriting.
//!
//! Rewriting a module move is a collect-then-apply pass over one file:
//!
//! 1. Locate every reference site ([`crate::locate`])
//! 2. Compare each literal's canonical path with the moved module's old path
//! 3. For each match, replace the literal with the new path relative to the
//!    referencing file, keeping the original quote character
//! 4. Apply all replacements with the batch span editor
//!
//! Bytes outside matched literals are never touched.

use modshift_core::config::RewriteOptions;
use modshift_core::edit::EditPrimitive;
use modshift_core::span::Span;
use modshift_core::specifier::{canonicalize, relativize};
use modshift_core::text::byte_offset_to_position_str;
use serde::Serialize;
use tracing::debug;

use crate::error::JsResult;
use crate::literal::StringLiteral;
use crate::locate::{reference_sites, ReferenceForm};
use crate::parse::JsModule;

// ============================================================================
// Literal Rewriter
// ============================================================================

/// Decides, literal by literal, whether a reference names the moved module.
///
/// The old module's canonical path and the replacement specifier are computed
/// once, so checking a literal costs one canonicalization.
#[derive(Debug, Clone)]
pub struct LiteralRewriter<'a> {
    options: &'a RewriteOptions,
    referencing_file: &'a str,
    from_canonical: String,
    to_specifier: String,
}

impl<'a> LiteralRewriter<'a> {
    /// Prepare a rewriter for moving `from` to `to`, as seen from
    /// `referencing_file`.
    pub fn new(options: &'a RewriteOptions, referencing_file: &'a str, from: &str, to: &str) -> Self {
        let from_canonical = canonicalize(options, referencing_file, from);
        let to_specifier = relativize(referencing_file, &canonicalize(options, referencing_file, to));
        LiteralRewriter {
            options,
            referencing_file,
            from_canonical,
            to_specifier,
        }
    }

    /// The specifier written into matching literals.
    pub fn replacement_specifier(&self) -> &str {
        &self.to_specifier
    }

    /// Raw replacement text for `literal`, if it names the moved module and
    /// the text would change.
    pub fn replacement_for(&self, literal: &StringLiteral) -> Option<String> {
        if canonicalize(self.options, self.referencing_file, &literal.value) != self.from_canonical {
            return None;
        }
        let new_text = literal.requoted(&self.to_specifier);
        (new_text != literal.raw).then_some(new_text)
    }

    /// Replacement edit for `literal`, if it names the moved module.
    pub fn rewrite_if_matching(&self, literal: &StringLiteral) -> Option<EditPrimitive> {
        self.replacement_for(literal).map(|new_text| EditPrimitive::Replace {
            span: literal.span,
            new_text,
        })
    }
}

// ============================================================================
// Planned Rewrites
// ============================================================================

/// A planned literal replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralRewrite {
    /// The byte span to replace.
    pub span: Span,
    /// The original literal text, quotes included.
    pub old_text: String,
    /// The replacement literal text, quotes included.
    pub new_text: String,
    /// How the literal references the module.
    pub form: ReferenceForm,
    /// The line number (1-based).
    pub line: u32,
    /// The column number (1-based).
    pub col: u32,
}

impl LiteralRewrite {
    /// The edit that performs this rewrite.
    pub fn to_edit(&self) -> EditPrimitive {
        EditPrimitive::Replace {
            span: self.span,
            new_text: self.new_text.clone(),
        }
    }
}

/// Collect the literal rewrites for moving `from` to `to`, without applying
/// them.
///
/// # Arguments
///
/// * `module` - The parsed referencing file
/// * `referencing_file` - Path of the referencing file, used only for path
///   arithmetic
/// * `from` - Old path of the moved module
/// * `to` - New path of the moved module
/// * `options` - Canonicalization and locator options
///
/// # Returns
///
/// One rewrite per matching literal, sorted by position.
pub fn collect_rewrites(
    module: &JsModule,
    referencing_file: &str,
    from: &str,
    to: &str,
    options: &RewriteOptions,
) -> Vec<LiteralRewrite> {
    let rewriter = LiteralRewriter::new(options, referencing_file, from, to);
    let rewrites: Vec<LiteralRewrite> = reference_sites(module, options)
        .into_iter()
        .filter_map(|site| {
            let new_text = rewriter.replacement_for(&site.literal)?;
            let (line, col) = byte_offset_to_position_str(module.source(), site.literal.span.start);
            Some(LiteralRewrite {
                span: site.literal.span,
                old_text: site.literal.raw,
                new_text,
                form: site.form,
                line,
                col,
            })
        })
        .collect();

    debug!(
        file = referencing_file,
        from,
        to = rewriter.replacement_specifier(),
        count = rewrites.len(),
        "planned reference rewrites"
    );
    rewrites
}

/// Rewrite references to the moved module inside a parsed module.
///
/// Returns the number of literals replaced. On error the module is left
/// unchanged.
pub fn rewrite_in_module(
    module: &mut JsModule,
    referencing_file: &str,
    from: &str,
    to: &str,
    options: &RewriteOptions,
) -> JsResult<usize> {
    let edits: Vec<EditPrimitive> = collect_rewrites(module, referencing_file, from, to, options)
        .iter()
        .map(LiteralRewrite::to_edit)
        .collect();
    module.apply_edits(edits)
}

/// Rewrite references to a moved module in `source` with default options.
///
/// # Arguments
///
/// * `source` - JavaScript source of the referencing file
/// * `referencing_file` - Path of the referencing file (never read from disk)
/// * `old_module_path` - Path the module was moved from
/// * `new_module_path` - Path the module was moved to
///
/// # Returns
///
/// The regenerated source. Only matching literals differ from the input.
///
/// # Errors
///
/// Returns `JsError::Parse` if `source` is not valid JavaScript.
pub fn rewrite_module_reference(
    source: &str,
    referencing_file: &str,
    old_module_path: &str,
    new_module_path: &str,
) -> JsResult<String> {
    rewrite_module_reference_with_options(
        source,
        referencing_file,
        old_module_path,
        new_module_path,
        &RewriteOptions::default(),
    )
}

/// [`rewrite_module_reference`] with explicit options.
pub fn rewrite_module_reference_with_options(
    source: &str,
    referencing_file: &str,
    old_module_path: &str,
    new_module_path: &str,
    options: &RewriteOptions,
) -> JsResult<String> {
    let mut module = JsModule::parse(source)?;
    rewrite_in_module(&mut module, referencing_file, old_module_path, new_module_path, options)?;
    Ok(module.into_source())
}
