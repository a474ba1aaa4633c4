//! modshift: rewrite module references after a JavaScript module moves.
//!
//! Given one referencing file, the old path of a moved module and its new
//! path, modshift finds every literal that names the module (imports,
//! re-exports, `import()`, `require()` and `require.context()`, including
//! calls through `const r = require` aliases) and rewrites it relative to the
//! referencing file. Everything else in the file is left byte for byte.
//!
//! It also edits `angular.module` dependency declarations, for hosts that
//! wire moved modules into a dependency-injection graph.

// Core infrastructure - re-exported from modshift-core
pub use modshift_core::config;
pub use modshift_core::edit;
pub use modshift_core::error;
pub use modshift_core::span;
pub use modshift_core::specifier;
pub use modshift_core::text;

// Language adapters
pub use modshift_js as js;

pub use modshift_core::error::{ErrorCode, ModshiftError, ModshiftResult};

// Error bridges - converts adapter errors to ModshiftError
mod error_bridges;

use modshift_core::config::RewriteOptions;

/// Rewrite references to a moved module in one JavaScript file.
///
/// `referencing_file` is only used for path arithmetic; nothing is read from
/// disk.
pub fn rewrite_module_reference(
    source: &str,
    referencing_file: &str,
    old_module_path: &str,
    new_module_path: &str,
) -> ModshiftResult<String> {
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
) -> ModshiftResult<String> {
    let rewritten = modshift_js::rewrite_module_reference_with_options(
        source,
        referencing_file,
        old_module_path,
        new_module_path,
        options,
    )?;
    Ok(rewritten)
}
