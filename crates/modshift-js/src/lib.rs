//! JavaScript support for modshift.
//!
//! This crate provides the JavaScript side of a module move, built on
//! tree-sitter. It includes:
//! - Parsing into a [`JsModule`] that owns its source and syntax tree
//! - Lexical binding lookup and alias resolution (`const r = require`)
//! - Discovery of module reference literals in imports, re-exports,
//!   `import()`, `require()` and `require.context()`
//! - Rewriting of references after a module moves, keeping quote style
//! - Editing of `angular.module` dependency declarations
//!
//! ```
//! use modshift_js::rewrite_module_reference;
//!
//! let out = rewrite_module_reference(
//!     "const foo = require(\"./foo\");",
//!     "/a/b/c.js",
//!     "/a/b/foo.js",
//!     "/a/b/bar.js",
//! )
//! .unwrap();
//! assert_eq!(out, "const foo = require(\"./bar\");");
//! ```

pub mod error;
pub mod literal;
pub mod locate;
pub mod parse;
pub mod registry;
pub mod rewrite;
pub mod scope;
pub mod walk;

pub use error::{JsError, JsResult};
pub use literal::StringLiteral;
pub use locate::{locate, reference_sites, ReferenceForm, ReferenceSite};
pub use parse::JsModule;
pub use registry::{
    find_context, DeclarationEditor, Dependency, EntityRegistration, ModuleDeclaration,
    RegistryError,
};
pub use rewrite::{
    collect_rewrites, rewrite_in_module, rewrite_module_reference,
    rewrite_module_reference_with_options, LiteralRewrite, LiteralRewriter,
};
pub use scope::{resolve, Resolution};
