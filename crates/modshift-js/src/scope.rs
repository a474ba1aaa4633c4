// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lexical binding lookup and alias resolution.
//!
//! This module answers two questions about an identifier in a parsed module:
//!
//! - **Which declaration binds it?** [`lookup_binding`] walks outward through
//!   the enclosing scopes and returns the nearest declaration of the name.
//! - **What does it ultimately stand for?** [`resolve`] follows a binding
//!   chain of `const a = b` style aliases until it reaches a non-identifier
//!   value, a declaration that is not an alias, or a name with no binding.
//!
//! The second question is what makes `const r = require; r("./x")` a require
//! call: `r` resolves through one alias to a `require` with no local binding.
//!
//! # JavaScript Scoping Rules
//!
//! | Scope node | Names bound |
//! |------------|-------------|
//! | `program` | imports, top-level declarations, hoisted `var` |
//! | block | `let`, `const`, `class`, function declarations |
//! | function | parameters, own name (function expressions), hoisted `var` |
//! | `for` / `for-in` / `for-of` head | loop variables |
//! | `catch` | the catch parameter |
//!
//! `var` declarations are found through nested blocks but never through
//! nested functions.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::parse::JsModule;
use crate::walk::{is_function_like, named_children, unparenthesize, walk_preorder, VisitResult};

/// Upper bound on alias links followed by [`resolve`].
pub const MAX_ALIAS_DEPTH: usize = 32;

/// How a name was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Parameter,
    Import,
    CatchParameter,
}

/// A declaration that binds a name.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'t> {
    /// How the name was declared.
    pub kind: BindingKind,
    /// The declaring identifier.
    pub name: Node<'t>,
    /// The `variable_declarator` for `var`/`let`/`const` bindings.
    pub declarator: Option<Node<'t>>,
}

impl<'t> Binding<'t> {
    /// Initializer of a plain `name = value` declarator.
    ///
    /// Destructured declarators return `None`: they bind the name but do not
    /// make it an alias of the initializer.
    pub fn alias_target(&self) -> Option<Node<'t>> {
        let declarator = self.declarator?;
        let target = declarator.child_by_field_name("name")?;
        if target.kind() != "identifier" {
            return None;
        }
        declarator
            .child_by_field_name("value")
            .map(unparenthesize)
    }
}

/// Outcome of resolving an expression through its binding chain.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'t> {
    /// An identifier with no visible declaration (a global).
    Free(Node<'t>),
    /// An identifier declared by something other than an alias.
    Declared(Node<'t>),
    /// A non-identifier expression.
    Value(Node<'t>),
}

impl<'t> Resolution<'t> {
    /// The node the resolution stopped at.
    pub fn node(&self) -> Node<'t> {
        match self {
            Resolution::Free(node) | Resolution::Declared(node) | Resolution::Value(node) => *node,
        }
    }

    /// True if this is the free (undeclared) identifier `name`.
    pub fn is_free_identifier(&self, module: &JsModule, name: &str) -> bool {
        matches!(self, Resolution::Free(node) if module.text(*node) == name)
    }
}

/// Follow `expression` through variable aliases.
///
/// Resolution never fails: unbound identifiers resolve to
/// [`Resolution::Free`], cycles and over-long chains stop at
/// [`Resolution::Declared`].
pub fn resolve<'t>(module: &'t JsModule, expression: Node<'t>) -> Resolution<'t> {
    let mut current = unparenthesize(expression);
    let mut seen: HashSet<usize> = HashSet::new();

    for _ in 0..MAX_ALIAS_DEPTH {
        if current.kind() != "identifier" {
            return Resolution::Value(current);
        }

        let Some(binding) = lookup_binding(module, current, module.text(current)) else {
            return Resolution::Free(current);
        };
        let Some(target) = binding.alias_target() else {
            return Resolution::Declared(current);
        };
        if !binding.declarator.is_some_and(|d| seen.insert(d.id())) {
            return Resolution::Declared(current);
        }
        current = target;
    }

    Resolution::Declared(current)
}

/// Nearest declaration of `name` visible from `at`.
pub fn lookup_binding<'t>(module: &'t JsModule, at: Node<'t>, name: &str) -> Option<Binding<'t>> {
    let mut child = at;
    while let Some(scope) = child.parent() {
        if let Some(binding) = scope_binds(module, scope, name) {
            return Some(binding);
        }
        child = scope;
    }
    None
}

/// Declaration of `name` introduced directly by `scope`, if any.
fn scope_binds<'t>(module: &'t JsModule, scope: Node<'t>, name: &str) -> Option<Binding<'t>> {
    match scope.kind() {
        "program" => statements_bind(module, scope, name).or_else(|| hoisted_var(module, scope, name)),
        "statement_block" | "class_static_block" => statements_bind(module, scope, name),
        "for_statement" => scope
            .child_by_field_name("initializer")
            .and_then(|init| declaration_binds(module, init, name)),
        "for_in_statement" => loop_head_binds(module, scope, name),
        "catch_clause" => {
            let parameter = scope.child_by_field_name("parameter")?;
            pattern_binds(module, parameter, name).map(|ident| Binding {
                kind: BindingKind::CatchParameter,
                name: ident,
                declarator: None,
            })
        }
        kind if is_function_like(kind) => function_binds(module, scope, name),
        _ => None,
    }
}

/// Declarations among the direct statements of a program or block.
fn statements_bind<'t>(module: &'t JsModule, list: Node<'t>, name: &str) -> Option<Binding<'t>> {
    named_children(list)
        .into_iter()
        .find_map(|statement| statement_binds(module, statement, name))
}

fn statement_binds<'t>(module: &'t JsModule, statement: Node<'t>, name: &str) -> Option<Binding<'t>> {
    match statement.kind() {
        "lexical_declaration" | "variable_declaration" => declaration_binds(module, statement, name),
        "function_declaration" | "generator_function_declaration" => {
            named_binding(module, statement, name, BindingKind::Function)
        }
        "class_declaration" => named_binding(module, statement, name, BindingKind::Class),
        "import_statement" => import_binds(module, statement, name),
        "export_statement" => statement
            .child_by_field_name("declaration")
            .and_then(|declaration| statement_binds(module, declaration, name)),
        _ => None,
    }
}

fn named_binding<'t>(
    module: &'t JsModule,
    node: Node<'t>,
    name: &str,
    kind: BindingKind,
) -> Option<Binding<'t>> {
    let ident = node.child_by_field_name("name")?;
    (module.text(ident) == name).then_some(Binding {
        kind,
        name: ident,
        declarator: None,
    })
}

/// `var`, `let` or `const` declaration binding `name`.
fn declaration_binds<'t>(module: &'t JsModule, declaration: Node<'t>, name: &str) -> Option<Binding<'t>> {
    let kind = match declaration.kind() {
        "variable_declaration" => BindingKind::Var,
        "lexical_declaration" => match declaration.child_by_field_name("kind").map(|k| module.text(k)) {
            Some("const") => BindingKind::Const,
            _ => BindingKind::Let,
        },
        _ => return None,
    };

    named_children(declaration)
        .into_iter()
        .filter(|child| child.kind() == "variable_declarator")
        .find_map(|declarator| {
            let pattern = declarator.child_by_field_name("name")?;
            pattern_binds(module, pattern, name).map(|ident| Binding {
                kind,
                name: ident,
                declarator: Some(declarator),
            })
        })
}

fn import_binds<'t>(module: &'t JsModule, import: Node<'t>, name: &str) -> Option<Binding<'t>> {
    let mut found = None;
    walk_preorder(import, |node| match node.kind() {
        "string" => VisitResult::SkipChildren,
        "import_specifier" => {
            let local = node
                .child_by_field_name("alias")
                .or_else(|| node.child_by_field_name("name"));
            if let Some(local) = local.filter(|l| module.text(*l) == name) {
                found = Some(local);
                return VisitResult::Stop;
            }
            VisitResult::SkipChildren
        }
        "identifier" if module.text(node) == name => {
            found = Some(node);
            VisitResult::Stop
        }
        _ => VisitResult::Continue,
    });
    found.map(|ident| Binding {
        kind: BindingKind::Import,
        name: ident,
        declarator: None,
    })
}

/// Parameters, own name and hoisted `var`s of a function.
fn function_binds<'t>(module: &'t JsModule, function: Node<'t>, name: &str) -> Option<Binding<'t>> {
    let parameter = match function.child_by_field_name("parameters") {
        Some(parameters) => named_children(parameters)
            .into_iter()
            .find_map(|pattern| pattern_binds(module, pattern, name)),
        None => function
            .child_by_field_name("parameter")
            .and_then(|pattern| pattern_binds(module, pattern, name)),
    };
    if let Some(ident) = parameter {
        return Some(Binding {
            kind: BindingKind::Parameter,
            name: ident,
            declarator: None,
        });
    }

    // A named function expression binds its own name inside its body.
    if matches!(
        function.kind(),
        "function_expression" | "function" | "generator_function"
    ) {
        if let Some(binding) = named_binding(module, function, name, BindingKind::Function) {
            return Some(binding);
        }
    }

    function
        .child_by_field_name("body")
        .filter(|body| body.kind() == "statement_block")
        .and_then(|body| hoisted_var(module, body, name))
}

/// `var` declaration of `name` anywhere under `root`, outside nested functions.
fn hoisted_var<'t>(module: &'t JsModule, root: Node<'t>, name: &str) -> Option<Binding<'t>> {
    let mut found = None;
    walk_preorder(root, |node| {
        if node != root && is_function_like(node.kind()) {
            return VisitResult::SkipChildren;
        }
        let binding = match node.kind() {
            "variable_declaration" => declaration_binds(module, node, name),
            "for_in_statement" => loop_head_binds(module, node, name)
                .filter(|binding| binding.kind == BindingKind::Var),
            _ => None,
        };
        match binding {
            Some(binding) => {
                found = Some(binding);
                VisitResult::Stop
            }
            None => VisitResult::Continue,
        }
    });
    found
}

/// Loop variable of `for (<kind> <left> in/of ...)`.
fn loop_head_binds<'t>(module: &'t JsModule, statement: Node<'t>, name: &str) -> Option<Binding<'t>> {
    let kind = match statement.child_by_field_name("kind").map(|k| module.text(k)) {
        Some("var") => BindingKind::Var,
        Some("let") => BindingKind::Let,
        Some("const") => BindingKind::Const,
        _ => return None,
    };
    let left = statement.child_by_field_name("left")?;
    pattern_binds(module, left, name).map(|ident| Binding {
        kind,
        name: ident,
        declarator: None,
    })
}

/// Identifier bound to `name` by a binding pattern.
fn pattern_binds<'t>(module: &'t JsModule, pattern: Node<'t>, name: &str) -> Option<Node<'t>> {
    let mut stack = vec![pattern];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                if module.text(node) == name {
                    return Some(node);
                }
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                stack.extend(node.child_by_field_name("left"));
            }
            "pair_pattern" => stack.extend(node.child_by_field_name("value")),
            "rest_pattern" | "object_pattern" | "array_pattern" => {
                stack.extend(named_children(node));
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolve the callee of the last call expression in `source`.
    fn resolve_last_callee(module: &JsModule) -> Resolution<'_> {
        let mut callee = None;
        walk_preorder(module.root(), |node| {
            if node.kind() == "call_expression" {
                callee = node.child_by_field_name("function");
            }
            VisitResult::Continue
        });
        resolve(module, callee.expect("source should contain a call"))
    }

    fn callee_is_free_require(source: &str) -> bool {
        let module = JsModule::parse(source).unwrap();
        let resolution = resolve_last_callee(&module);
        resolution.is_free_identifier(&module, "require")
    }

    mod resolution {
        use super::*;

        #[test]
        fn undeclared_require_is_free() {
            assert!(callee_is_free_require("require('./x');"));
        }

        #[test]
        fn single_alias_resolves_to_require() {
            assert!(callee_is_free_require("const r = require; r('./x');"));
        }

        #[test]
        fn alias_chain_resolves_to_require() {
            assert!(callee_is_free_require(
                "var a = require; let b = a; const c = (b); c('./x');"
            ));
        }

        #[test]
        fn alias_declared_in_outer_function_scope() {
            assert!(callee_is_free_require(
                "const r = require;\nfunction load() { return r('./x'); }"
            ));
        }

        #[test]
        fn parameter_named_require_is_declared() {
            let module = JsModule::parse("function f(require) { require('./x'); }").unwrap();
            assert!(matches!(resolve_last_callee(&module), Resolution::Declared(_)));
        }

        #[test]
        fn local_function_named_require_is_declared() {
            assert!(!callee_is_free_require(
                "function require(x) { return x; }\nrequire('./x');"
            ));
        }

        #[test]
        fn imported_require_is_declared() {
            assert!(!callee_is_free_require(
                "import { load as require } from 'loader';\nrequire('./x');"
            ));
        }

        #[test]
        fn alias_to_member_expression_is_a_value() {
            let module = JsModule::parse("const ctx = require.context; ctx('./dir');").unwrap();
            match resolve_last_callee(&module) {
                Resolution::Value(node) => {
                    assert_eq!(node.kind(), "member_expression");
                    assert_eq!(module.text(node), "require.context");
                }
                other => panic!("expected value, got {other:?}"),
            }
        }

        #[test]
        fn cyclic_aliases_terminate() {
            let module = JsModule::parse("var a = b; var b = a; a('./x');").unwrap();
            assert!(matches!(resolve_last_callee(&module), Resolution::Declared(_)));
        }

        #[test]
        fn self_alias_terminates() {
            let module = JsModule::parse("var a = a; a('./x');").unwrap();
            assert!(matches!(resolve_last_callee(&module), Resolution::Declared(_)));
        }

        #[test]
        fn destructuring_is_not_an_alias() {
            let module = JsModule::parse("const { r } = require; r('./x');").unwrap();
            assert!(matches!(resolve_last_callee(&module), Resolution::Declared(_)));
        }

        #[test]
        fn uninitialized_declaration_is_declared() {
            let module = JsModule::parse("let r; r = require; r('./x');").unwrap();
            assert!(matches!(resolve_last_callee(&module), Resolution::Declared(_)));
        }
    }

    mod lookup {
        use super::*;

        fn binding_kind(source: &str) -> Option<BindingKind> {
            let module = JsModule::parse(source).unwrap();
            let mut target = None;
            walk_preorder(module.root(), |node| {
                if node.kind() == "call_expression" {
                    target = node.child_by_field_name("function");
                }
                VisitResult::Continue
            });
            let ident = target.expect("source should contain a call");
            lookup_binding(&module, ident, module.text(ident)).map(|b| b.kind)
        }

        #[test]
        fn var_in_nested_block_is_hoisted() {
            assert_eq!(
                binding_kind("function f() { if (x) { var r = require; } r('./a'); }"),
                Some(BindingKind::Var)
            );
        }

        #[test]
        fn var_in_nested_function_is_not_visible() {
            assert_eq!(
                binding_kind("function f() { var r = require; }\nr('./a');"),
                None
            );
        }

        #[test]
        fn block_scoped_const_is_not_visible_outside() {
            assert_eq!(binding_kind("{ const r = require; }\nr('./a');"), None);
        }

        #[test]
        fn const_binding_kind() {
            assert_eq!(
                binding_kind("const r = require; r('./a');"),
                Some(BindingKind::Const)
            );
        }

        #[test]
        fn arrow_parameter_binds() {
            assert_eq!(
                binding_kind("const f = r => r('./a');"),
                Some(BindingKind::Parameter)
            );
        }

        #[test]
        fn destructured_parameter_binds() {
            assert_eq!(
                binding_kind("function f({ a: [r = 1] }) { r('./a'); }"),
                Some(BindingKind::Parameter)
            );
        }

        #[test]
        fn catch_parameter_binds() {
            assert_eq!(
                binding_kind("try {} catch (r) { r('./a'); }"),
                Some(BindingKind::CatchParameter)
            );
        }

        #[test]
        fn for_of_head_binds() {
            assert_eq!(
                binding_kind("for (const r of loaders) { r('./a'); }"),
                Some(BindingKind::Const)
            );
        }

        #[test]
        fn named_function_expression_binds_itself() {
            assert_eq!(
                binding_kind("const g = function r() { r('./a'); };"),
                Some(BindingKind::Function)
            );
        }

        #[test]
        fn exported_declaration_binds() {
            assert_eq!(
                binding_kind("export const r = require;\nr('./a');"),
                Some(BindingKind::Const)
            );
        }

        #[test]
        fn default_import_binds() {
            assert_eq!(
                binding_kind("import r from 'loader';\nr('./a');"),
                Some(BindingKind::Import)
            );
        }
    }
}
