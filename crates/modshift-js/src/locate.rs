// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Module reference discovery.
//!
//! A *reference site* is a string literal that names a module: the source of
//! an `import`/`export ... from` statement, or a target of a dynamic
//! `import(...)`, `require(...)` or `require.context(...)` call. Calls are
//! recognized by what their callee resolves to, so `const r = require;
//! r("./x")` is found just like `require("./x")`, while a locally declared
//! `require` is ignored.

use std::collections::HashSet;

use modshift_core::config::RewriteOptions;
use modshift_core::span::Span;
use serde::Serialize;
use tracing::{debug, trace};
use tree_sitter::Node;

use crate::literal::StringLiteral;
use crate::parse::JsModule;
use crate::scope::{resolve, Resolution};
use crate::walk::{call_arguments, named_children, unparenthesize, walk_preorder, VisitResult};

// ============================================================================
// Types
// ============================================================================

/// Syntactic form through which a literal references a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceForm {
    /// `import x from "a"`, `import "a"`
    StaticImport,
    /// `export { x } from "a"`, `export * from "a"`
    ReExport,
    /// `import("a")`
    DynamicImport,
    /// `require("a")`, directly or through an alias
    Require,
    /// `require.context("a", ...)`
    RequireContext,
    /// A string element of an array passed to `require`
    BatchElement,
    /// A reference call that is the first argument of another reference call
    Nested,
}

/// A string literal naming a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSite {
    pub form: ReferenceForm,
    pub literal: StringLiteral,
}

impl ReferenceSite {
    /// Byte span of the literal.
    pub fn span(&self) -> Span {
        self.literal.span
    }
}

/// Call forms that take module specifiers as arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallForm {
    DynamicImport,
    Require,
    RequireContext,
}

impl From<CallForm> for ReferenceForm {
    fn from(form: CallForm) -> Self {
        match form {
            CallForm::DynamicImport => ReferenceForm::DynamicImport,
            CallForm::Require => ReferenceForm::Require,
            CallForm::RequireContext => ReferenceForm::RequireContext,
        }
    }
}

// ============================================================================
// Locator
// ============================================================================

/// Visit every reference site in `module`, once each, in source order.
pub fn locate(module: &JsModule, options: &RewriteOptions, mut visit: impl FnMut(&ReferenceSite)) {
    for site in reference_sites(module, options) {
        visit(&site);
    }
}

/// Every reference site in `module`, sorted by position.
pub fn reference_sites(module: &JsModule, options: &RewriteOptions) -> Vec<ReferenceSite> {
    let mut sites = Vec::new();
    let mut seen: HashSet<Span> = HashSet::new();
    let mut push = |form: ReferenceForm, node: Node<'_>| {
        if let Some(literal) = StringLiteral::from_node(module, node) {
            if seen.insert(literal.span) {
                trace!(?form, value = %literal.value, span = %literal.span, "reference site");
                sites.push(ReferenceSite { form, literal });
            }
        }
    };

    walk_preorder(module.root(), |node| {
        match node.kind() {
            "import_statement" => {
                if let Some(source) = node.child_by_field_name("source") {
                    push(ReferenceForm::StaticImport, source);
                }
                return VisitResult::SkipChildren;
            }
            "export_statement" => {
                if let Some(source) = node.child_by_field_name("source") {
                    push(ReferenceForm::ReExport, source);
                    return VisitResult::SkipChildren;
                }
            }
            "call_expression" => {
                let Some(form) = classify_call(module, options, node) else {
                    return VisitResult::Continue;
                };
                let Some(first) = call_arguments(node).into_iter().next() else {
                    return VisitResult::Continue;
                };
                let first = unparenthesize(first);
                match first.kind() {
                    "string" => {
                        let form = if is_nested_reference(module, options, node) {
                            ReferenceForm::Nested
                        } else {
                            form.into()
                        };
                        push(form, first);
                    }
                    "array" if form == CallForm::Require => {
                        for element in named_children(first) {
                            push(ReferenceForm::BatchElement, element);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        VisitResult::Continue
    });

    sites.sort_by_key(|site| site.literal.span);
    debug!(count = sites.len(), "located reference sites");
    sites
}

/// Reference call form of `call`, judged by its resolved callee.
fn classify_call(module: &JsModule, options: &RewriteOptions, call: Node<'_>) -> Option<CallForm> {
    let callee = call.child_by_field_name("function")?;
    if callee.kind() == "import" {
        return Some(CallForm::DynamicImport);
    }

    match resolve(module, callee) {
        resolution if resolution.is_free_identifier(module, &options.require_name) => {
            Some(CallForm::Require)
        }
        Resolution::Value(member) if member.kind() == "member_expression" => {
            let property = member.child_by_field_name("property")?;
            let object = member.child_by_field_name("object")?;
            let is_context = module.text(property) == options.context_property
                && resolve(module, object).is_free_identifier(module, &options.require_name);
            is_context.then_some(CallForm::RequireContext)
        }
        _ => None,
    }
}

/// True if `call` is the first argument of another reference call.
fn is_nested_reference(module: &JsModule, options: &RewriteOptions, call: Node<'_>) -> bool {
    let Some(outer) = call
        .parent()
        .filter(|parent| parent.kind() == "arguments")
        .and_then(|arguments| arguments.parent())
    else {
        return false;
    };
    call_arguments(outer).first() == Some(&call) && classify_call(module, options, outer).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites(source: &str) -> Vec<(ReferenceForm, String)> {
        let module = JsModule::parse(source).unwrap();
        reference_sites(&module, &RewriteOptions::default())
            .into_iter()
            .map(|site| (site.form, site.literal.value))
            .collect()
    }

    fn site(form: ReferenceForm, value: &str) -> (ReferenceForm, String) {
        (form, value.to_string())
    }

    mod forms {
        use super::*;

        #[test]
        fn require_call() {
            assert_eq!(sites("require('foo');"), vec![site(ReferenceForm::Require, "foo")]);
        }

        #[test]
        fn require_context_call() {
            assert_eq!(
                sites("require.context('./dir', true, /\\.js$/);"),
                vec![site(ReferenceForm::RequireContext, "./dir")]
            );
        }

        #[test]
        fn static_imports() {
            assert_eq!(
                sites("import a from './a';\nimport './side-effect';\nimport * as b from \"./b\";"),
                vec![
                    site(ReferenceForm::StaticImport, "./a"),
                    site(ReferenceForm::StaticImport, "./side-effect"),
                    site(ReferenceForm::StaticImport, "./b"),
                ]
            );
        }

        #[test]
        fn re_exports() {
            assert_eq!(
                sites("export { a } from './a';\nexport * from './b';\nexport const c = 1;"),
                vec![
                    site(ReferenceForm::ReExport, "./a"),
                    site(ReferenceForm::ReExport, "./b"),
                ]
            );
        }

        #[test]
        fn dynamic_import() {
            assert_eq!(
                sites("import('./lazy').then(m => m);"),
                vec![site(ReferenceForm::DynamicImport, "./lazy")]
            );
        }

        #[test]
        fn batch_elements_and_callback() {
            assert_eq!(
                sites("require(['./a', './b'], () => require('./c'));"),
                vec![
                    site(ReferenceForm::BatchElement, "./a"),
                    site(ReferenceForm::BatchElement, "./b"),
                    site(ReferenceForm::Require, "./c"),
                ]
            );
        }

        #[test]
        fn nested_require() {
            assert_eq!(
                sites("require(require('./inner'));"),
                vec![site(ReferenceForm::Nested, "./inner")]
            );
        }

        #[test]
        fn require_inside_other_call_is_not_nested() {
            assert_eq!(
                sites("wrap(require('./a'));"),
                vec![site(ReferenceForm::Require, "./a")]
            );
        }

        #[test]
        fn parenthesized_argument() {
            assert_eq!(sites("require(('./a'));"), vec![site(ReferenceForm::Require, "./a")]);
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn aliased_require_is_found() {
            assert_eq!(
                sites("const r = require;\nr('./a');"),
                vec![site(ReferenceForm::Require, "./a")]
            );
        }

        #[test]
        fn aliased_require_context_is_found() {
            assert_eq!(
                sites("const ctx = require.context;\nctx('./dir');"),
                vec![site(ReferenceForm::RequireContext, "./dir")]
            );
        }

        #[test]
        fn context_on_aliased_require_is_found() {
            assert_eq!(
                sites("var r = require;\nr.context('./dir');"),
                vec![site(ReferenceForm::RequireContext, "./dir")]
            );
        }

        #[test]
        fn shadowed_require_is_ignored() {
            assert!(sites("function load(require) { require('./a'); }").is_empty());
        }

        #[test]
        fn other_member_calls_are_ignored() {
            assert!(sites("require.resolve('./a');\nfoo.context('./b');").is_empty());
        }

        #[test]
        fn configured_require_name() {
            let module = JsModule::parse("define('./a');\nrequire('./b');").unwrap();
            let options = RewriteOptions {
                require_name: "define".to_string(),
                ..RewriteOptions::default()
            };
            let values: Vec<String> = reference_sites(&module, &options)
                .into_iter()
                .map(|site| site.literal.value)
                .collect();
            assert_eq!(values, vec!["./a"]);
        }
    }

    mod non_targets {
        use super::*;

        #[test]
        fn empty_calls_are_skipped() {
            assert!(sites("require();\nrequire.context();\nrequire([]);").is_empty());
        }

        #[test]
        fn template_and_identifier_arguments_are_skipped() {
            assert!(sites("require(`./a`);\nrequire(name);").is_empty());
        }

        #[test]
        fn only_first_argument_is_a_target() {
            assert_eq!(
                sites("require.context('./dir', true, './not-a-path');"),
                vec![site(ReferenceForm::RequireContext, "./dir")]
            );
        }

        #[test]
        fn other_strings_are_ignored() {
            assert!(sites("const path = './a';\nconsole.log('./b');").is_empty());
        }
    }

    #[test]
    fn locate_visits_in_source_order() {
        let module = JsModule::parse("require([require('./b'), './c']);\nimport './a';").unwrap();
        let mut seen = Vec::new();
        locate(&module, &RewriteOptions::default(), |site| seen.push(site.literal.value.clone()));
        assert_eq!(seen, vec!["./b", "./c", "./a"]);
    }
}
