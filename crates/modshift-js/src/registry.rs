//! Editing of `angular.module` style dependency declarations.
//!
//! A module declaration is a two-argument registry call, optionally followed
//! by a chain of entity registrations:
//!
//! ```text
//! angular.module("app", ["core", "ui"])
//!     .controller("MainCtrl", MainCtrl)
//!     .service("api", Api);
//! ```
//!
//! A one-argument call (`angular.module("app")`) is a *lookup*: it can carry
//! entity registrations but has no dependency list, so it is not a
//! declaration.
//!
//! [`ModuleDeclaration`] is an owned snapshot. Editing operations take the
//! snapshot, find the live declaration again by its anchor (the start byte of
//! the registry call), and fail with [`RegistryError::DeclarationNotFound`]
//! if it has gone. Take a fresh snapshot after each edit.

use modshift_core::config::{Quote, RewriteOptions};
use modshift_core::edit::EditPrimitive;
use modshift_core::span::Span;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tree_sitter::Node;

use crate::error::JsResult;
use crate::literal::StringLiteral;
use crate::locate::reference_sites;
use crate::parse::{node_span, JsModule};
use crate::walk::{call_arguments, named_children, unparenthesize, walk_preorder, VisitResult};

// ============================================================================
// Errors
// ============================================================================

/// Misuse of a declaration editing operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No registry call starts at the anchor.
    #[error("no module declaration at byte {anchor}")]
    DeclarationNotFound { anchor: usize },

    /// The registry call at the anchor is a lookup, not a declaration.
    #[error("registry call at byte {anchor} is not a module declaration")]
    NotADeclaration { anchor: usize },

    /// The dependency argument is not an array literal.
    #[error("dependencies of the declaration at byte {anchor} are not an array literal")]
    DependenciesNotLiteral { anchor: usize },

    /// The entity kind is not a registered entity method.
    #[error("unknown entity kind: {kind}")]
    UnknownEntity { kind: String },
}

/// Result type for registry lookups.
pub type RegistryResult<T> = Result<T, RegistryError>;

// ============================================================================
// Snapshots
// ============================================================================

/// A dependency string in a declaration's dependency array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub value: String,
    pub span: Span,
    pub quote: Quote,
}

/// An entity registration: `.kind(args...)`.
///
/// Arguments are kept as raw source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRegistration {
    pub kind: String,
    pub args: Vec<String>,
}

impl EntityRegistration {
    pub fn new<I, S>(kind: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EntityRegistration {
            kind: kind.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Source text of the chained call, leading dot included.
    pub fn to_call_text(&self) -> String {
        format!(".{}({})", self.kind, self.args.join(", "))
    }
}

/// Owned view of a module declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDeclaration {
    /// Start byte of the registry call; identifies the declaration for edits.
    pub anchor: usize,
    /// Span of the registry call itself.
    pub span: Span,
    /// Span of the whole call chain, entity registrations included.
    pub chain_span: Span,
    /// Module name, if the first argument is a string literal.
    pub name: Option<String>,
    /// String dependencies, in array order.
    pub dependencies: Vec<Dependency>,
    /// Span of the dependency array, if it is an array literal.
    pub dependency_array: Option<Span>,
    /// Entity registrations chained onto the declaration.
    pub entities: Vec<EntityRegistration>,
}

impl ModuleDeclaration {
    pub fn dependency_values(&self) -> Vec<&str> {
        self.dependencies.iter().map(|d| d.value.as_str()).collect()
    }

    pub fn has_dependency(&self, value: &str) -> bool {
        self.dependencies.iter().any(|d| d.value == value)
    }
}

// ============================================================================
// Chain Navigation
// ============================================================================

/// Root call of a call chain.
///
/// Follows `callee.object` while it is itself a call, so for
/// `a.b().c().d()` any of the three calls yields `a.b()`. Non-call nodes are
/// returned unchanged.
pub fn find_context(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "call_expression" {
        let next = current
            .child_by_field_name("function")
            .filter(|callee| callee.kind() == "member_expression")
            .and_then(|callee| callee.child_by_field_name("object"))
            .map(unparenthesize)
            .filter(|object| object.kind() == "call_expression");
        match next {
            Some(object) => current = object,
            None => break,
        }
    }
    current
}

/// Calls chained onto `root`, innermost first, with their method names.
fn chain_links<'t>(module: &'t JsModule, root: Node<'t>) -> Vec<(&'t str, Node<'t>)> {
    let mut links = Vec::new();
    let mut current = root;
    loop {
        let Some(member) = current
            .parent()
            .filter(|parent| parent.kind() == "member_expression")
            .filter(|parent| parent.child_by_field_name("object") == Some(current))
        else {
            break;
        };
        let Some(call) = member
            .parent()
            .filter(|parent| parent.kind() == "call_expression")
            .filter(|parent| parent.child_by_field_name("function") == Some(member))
        else {
            break;
        };
        let method = member
            .child_by_field_name("property")
            .map(|property| module.text(property))
            .unwrap_or("");
        links.push((method, call));
        current = call;
    }
    links
}

// ============================================================================
// Declaration Editor
// ============================================================================

/// Structural operations on module declarations.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationEditor<'o> {
    options: &'o RewriteOptions,
}

impl<'o> DeclarationEditor<'o> {
    pub fn new(options: &'o RewriteOptions) -> Self {
        DeclarationEditor { options }
    }

    /// True if `node` is the registry member access (`angular.module`).
    pub fn is_registry_callee(&self, module: &JsModule, node: Node<'_>) -> bool {
        if node.kind() != "member_expression" {
            return false;
        }
        let registry = &self.options.registry;
        let object = node.child_by_field_name("object");
        let property = node.child_by_field_name("property");
        match (object, property) {
            (Some(object), Some(property)) => {
                object.kind() == "identifier"
                    && module.text(object) == registry.object
                    && module.text(property) == registry.method
            }
            _ => false,
        }
    }

    /// True if `node` is a call to the registry member access.
    fn is_registry_call(&self, module: &JsModule, node: Node<'_>) -> bool {
        node.kind() == "call_expression"
            && node
                .child_by_field_name("function")
                .is_some_and(|callee| self.is_registry_callee(module, callee))
    }

    /// True if `node` is a registry call with a name and a dependency list.
    pub fn is_declaration(&self, module: &JsModule, node: Node<'_>) -> bool {
        self.is_registry_call(module, node) && call_arguments(node).len() >= 2
    }

    /// Visit every module declaration in source order.
    pub fn visit_module_declarations(&self, module: &JsModule, mut visit: impl FnMut(&ModuleDeclaration)) {
        walk_preorder(module.root(), |node| {
            if self.is_declaration(module, node) {
                visit(&self.snapshot(module, node));
            }
            VisitResult::Continue
        });
    }

    /// Every module declaration in source order.
    pub fn module_declarations(&self, module: &JsModule) -> Vec<ModuleDeclaration> {
        let mut declarations = Vec::new();
        self.visit_module_declarations(module, |declaration| declarations.push(declaration.clone()));
        declarations
    }

    /// Entity registrations chained onto any declaration or lookup.
    pub fn entity_registrations(&self, module: &JsModule) -> Vec<EntityRegistration> {
        let mut registrations = Vec::new();
        walk_preorder(module.root(), |node| {
            if self.is_registry_call(module, node) {
                registrations.extend(self.entities_of(module, node));
            }
            VisitResult::Continue
        });
        registrations
    }

    /// Live declaration node for a snapshot.
    pub fn declaration_at<'t>(&self, module: &'t JsModule, anchor: usize) -> RegistryResult<Node<'t>> {
        let mut found = None;
        walk_preorder(module.root(), |node| {
            if node.start_byte() > anchor || node.end_byte() <= anchor {
                return VisitResult::SkipChildren;
            }
            if node.start_byte() == anchor && self.is_registry_call(module, node) {
                found = Some(node);
                return VisitResult::Stop;
            }
            VisitResult::Continue
        });

        let node = found.ok_or(RegistryError::DeclarationNotFound { anchor })?;
        if self.is_declaration(module, node) {
            Ok(node)
        } else {
            Err(RegistryError::NotADeclaration { anchor })
        }
    }

    /// Chain `entity` onto the end of the declaration's call chain.
    ///
    /// # Errors
    ///
    /// - `RegistryError::UnknownEntity` if `entity.kind` is not an entity method
    /// - `RegistryError::DeclarationNotFound` / `NotADeclaration` if the
    ///   declaration is no longer in the module
    pub fn append_entity(
        &self,
        module: &mut JsModule,
        declaration: &ModuleDeclaration,
        entity: &EntityRegistration,
    ) -> JsResult<()> {
        if !self.options.registry.is_entity_method(&entity.kind) {
            return Err(RegistryError::UnknownEntity {
                kind: entity.kind.clone(),
            }
            .into());
        }

        let position = {
            let root = self.declaration_at(module, declaration.anchor)?;
            chain_links(module, root)
                .last()
                .map_or(root, |(_, call)| *call)
                .end_byte()
        };

        module.apply_edits(vec![EditPrimitive::InsertAt {
            position,
            text: entity.to_call_text(),
        }])?;
        debug!(kind = %entity.kind, anchor = declaration.anchor, "appended entity registration");
        Ok(())
    }

    /// Add `value` to the declaration's dependency array.
    ///
    /// The new literal copies the quote style of the existing elements, or
    /// uses the configured default for an empty array. Returns `false`
    /// without editing if a dependency with the same value already exists.
    pub fn add_dependency(
        &self,
        module: &mut JsModule,
        declaration: &ModuleDeclaration,
        value: &str,
    ) -> JsResult<bool> {
        let anchor = declaration.anchor;
        let edit = {
            let root = self.declaration_at(module, anchor)?;
            let array = call_arguments(root)
                .get(1)
                .map(|arg| unparenthesize(*arg))
                .filter(|arg| arg.kind() == "array")
                .ok_or(RegistryError::DependenciesNotLiteral { anchor })?;

            let elements = named_children(array);
            let existing: Vec<StringLiteral> = elements
                .iter()
                .filter_map(|element| StringLiteral::from_node(module, *element))
                .collect();
            if existing.iter().any(|literal| literal.value == value) {
                debug!(value, anchor, "dependency already present");
                return Ok(false);
            }

            let quote = existing
                .first()
                .map_or(self.options.default_quote, |literal| literal.quote);
            let literal = quote.wrap(value);
            match elements.last() {
                Some(last) => EditPrimitive::InsertAt {
                    position: last.end_byte(),
                    text: format!(", {}", literal),
                },
                None => EditPrimitive::InsertAt {
                    position: array.end_byte().saturating_sub(1),
                    text: literal,
                },
            }
        };

        module.apply_edits(vec![edit])?;
        debug!(value, anchor, "added dependency");
        Ok(true)
    }

    /// Append `require("<module_path>");` as a new last statement.
    ///
    /// Uses the quote style of the module's first reference, or the
    /// configured default.
    pub fn insert_side_effect_import(&self, module: &mut JsModule, module_path: &str) -> JsResult<()> {
        let quote = reference_sites(module, self.options)
            .first()
            .map_or(self.options.default_quote, |site| site.literal.quote);

        let source = module.source();
        let separator = if source.is_empty() || source.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        let text = format!(
            "{}{}({});\n",
            separator,
            self.options.require_name,
            quote.wrap(module_path)
        );

        let position = source.len();
        module.apply_edits(vec![EditPrimitive::InsertAt { position, text }])?;
        debug!(module_path, "inserted side-effect require");
        Ok(())
    }

    fn snapshot(&self, module: &JsModule, root: Node<'_>) -> ModuleDeclaration {
        let args = call_arguments(root);
        let name = args
            .first()
            .and_then(|arg| StringLiteral::from_node(module, unparenthesize(*arg)))
            .map(|literal| literal.value);

        let array = args
            .get(1)
            .map(|arg| unparenthesize(*arg))
            .filter(|arg| arg.kind() == "array");
        let dependencies = array
            .map(|array| {
                named_children(array)
                    .into_iter()
                    .filter_map(|element| StringLiteral::from_node(module, element))
                    .map(|literal| Dependency {
                        value: literal.value,
                        span: literal.span,
                        quote: literal.quote,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let chain_top = chain_links(module, root)
            .last()
            .map_or(root, |(_, call)| *call);

        ModuleDeclaration {
            anchor: root.start_byte(),
            span: node_span(root),
            chain_span: node_span(chain_top),
            name,
            dependencies,
            dependency_array: array.map(node_span),
            entities: self.entities_of(module, root),
        }
    }

    fn entities_of(&self, module: &JsModule, root: Node<'_>) -> Vec<EntityRegistration> {
        chain_links(module, root)
            .into_iter()
            .filter(|(method, _)| self.options.registry.is_entity_method(method))
            .map(|(method, call)| EntityRegistration {
                kind: method.to_string(),
                args: call_arguments(call)
                    .into_iter()
                    .map(|arg| module.text(arg).to_string())
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsError;

    fn first_call(module: &JsModule) -> Node<'_> {
        let mut found = None;
        walk_preorder(module.root(), |node| {
            if node.kind() == "call_expression" {
                found = Some(node);
                VisitResult::Stop
            } else {
                VisitResult::Continue
            }
        });
        found.expect("source should contain a call")
    }

    mod detection {
        use super::*;

        #[test]
        fn registry_callee() {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);
            let module = JsModule::parse("angular.module;\nangular.other;\nng.module;").unwrap();
            let members: Vec<bool> = named_children(module.root())
                .into_iter()
                .filter_map(|statement| statement.named_child(0))
                .map(|expr| editor.is_registry_callee(&module, expr))
                .collect();
            assert_eq!(members, vec![true, false, false]);
        }

        #[test]
        fn declaration_needs_two_arguments() {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);

            let module = JsModule::parse("angular.module('app', []);").unwrap();
            assert!(editor.is_declaration(&module, first_call(&module)));

            let module = JsModule::parse("angular.module('app');").unwrap();
            assert!(!editor.is_declaration(&module, first_call(&module)));
        }

        #[test]
        fn find_context_returns_chain_root() {
            let module = JsModule::parse("angular.module(\"foo\").bar().zoo().moo();").unwrap();
            let root = find_context(first_call(&module));
            let callee = root.child_by_field_name("function").unwrap();
            assert_eq!(module.text(callee), "angular.module");
            assert_eq!(module.text(root), "angular.module(\"foo\")");
        }

        #[test]
        fn find_context_on_root_is_identity() {
            let module = JsModule::parse("angular.module('foo');").unwrap();
            let call = first_call(&module);
            assert_eq!(find_context(call), call);
        }
    }

    mod snapshots {
        use super::*;

        #[test]
        fn declaration_view() {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);
            let module = JsModule::parse(
                "angular.module(\"foo\", [\"a\", \"b\"]).controller('Ctrl', Ctrl).bar().service('api', Api);",
            )
            .unwrap();
            let declarations = editor.module_declarations(&module);
            assert_eq!(declarations.len(), 1);

            let declaration = &declarations[0];
            assert_eq!(declaration.anchor, 0);
            assert_eq!(declaration.name.as_deref(), Some("foo"));
            assert_eq!(declaration.dependency_values(), vec!["a", "b"]);
            assert_eq!(
                declaration.entities,
                vec![
                    EntityRegistration::new("controller", ["'Ctrl'", "Ctrl"]),
                    EntityRegistration::new("service", ["'api'", "Api"]),
                ]
            );
            assert_eq!(declaration.chain_span.end, module.source().len() - 1);
        }

        #[test]
        fn lookups_are_not_declarations() {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);
            let module = JsModule::parse("angular.module('app').factory('f', F);").unwrap();
            assert!(editor.module_declarations(&module).is_empty());
            assert_eq!(
                editor.entity_registrations(&module),
                vec![EntityRegistration::new("factory", ["'f'", "F"])]
            );
        }

        #[test]
        fn non_literal_dependencies() {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);
            let module = JsModule::parse("angular.module('app', deps);").unwrap();
            let declaration = &editor.module_declarations(&module)[0];
            assert!(declaration.dependencies.is_empty());
            assert!(declaration.dependency_array.is_none());
        }
    }

    mod edits {
        use super::*;

        fn edit<T>(
            source: &str,
            op: impl FnOnce(&DeclarationEditor<'_>, &mut JsModule, &ModuleDeclaration) -> JsResult<T>,
        ) -> (JsResult<T>, String) {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);
            let mut module = JsModule::parse(source).unwrap();
            let declaration = editor.module_declarations(&module).remove(0);
            let result = op(&editor, &mut module, &declaration);
            (result, module.into_source())
        }

        #[test]
        fn add_dependency_appends_with_existing_quote() {
            let (added, source) = edit("angular.module('app', [\"a\"]);", |e, m, d| {
                e.add_dependency(m, d, "b")
            });
            assert!(added.unwrap());
            assert_eq!(source, "angular.module('app', [\"a\", \"b\"]);");
        }

        #[test]
        fn add_dependency_to_empty_array_uses_default_quote() {
            let (added, source) = edit("angular.module(\"app\", []);", |e, m, d| {
                e.add_dependency(m, d, "core")
            });
            assert!(added.unwrap());
            assert_eq!(source, "angular.module(\"app\", ['core']);");
        }

        #[test]
        fn add_dependency_ignores_duplicates() {
            let (added, source) = edit("angular.module('app', ['a']);", |e, m, d| {
                e.add_dependency(m, d, "a")
            });
            assert!(!added.unwrap());
            assert_eq!(source, "angular.module('app', ['a']);");
        }

        #[test]
        fn add_dependency_requires_array_literal() {
            let (result, _) = edit("angular.module('app', deps);", |e, m, d| {
                e.add_dependency(m, d, "a")
            });
            assert!(matches!(
                result,
                Err(JsError::Registry(RegistryError::DependenciesNotLiteral { anchor: 0 }))
            ));
        }

        #[test]
        fn append_entity_chains_onto_end() {
            let (result, source) = edit(
                "angular.module('app', []).controller('A', A);\n",
                |e, m, d| e.append_entity(m, d, &EntityRegistration::new("service", ["'b'", "B"])),
            );
            result.unwrap();
            assert_eq!(
                source,
                "angular.module('app', []).controller('A', A).service('b', B);\n"
            );
        }

        #[test]
        fn append_entity_rejects_unknown_kind() {
            let (result, source) = edit("angular.module('app', []);", |e, m, d| {
                e.append_entity(m, d, &EntityRegistration::new("widget", ["'w'"]))
            });
            assert!(matches!(
                result,
                Err(JsError::Registry(RegistryError::UnknownEntity { .. }))
            ));
            assert_eq!(source, "angular.module('app', []);");
        }

        #[test]
        fn stale_snapshot_is_rejected() {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);
            let mut module = JsModule::parse("angular.module('app', []);").unwrap();
            let mut declaration = editor.module_declarations(&module).remove(0);
            declaration.anchor = 3;
            let err = editor.add_dependency(&mut module, &declaration, "a").unwrap_err();
            assert!(matches!(
                err,
                JsError::Registry(RegistryError::DeclarationNotFound { anchor: 3 })
            ));
        }

        #[test]
        fn side_effect_import_copies_quote() {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);
            let mut module = JsModule::parse("require(\"./a\");").unwrap();
            editor.insert_side_effect_import(&mut module, "./b").unwrap();
            assert_eq!(module.source(), "require(\"./a\");\nrequire(\"./b\");\n");
        }

        #[test]
        fn side_effect_import_into_empty_module() {
            let options = RewriteOptions::default();
            let editor = DeclarationEditor::new(&options);
            let mut module = JsModule::parse("").unwrap();
            editor.insert_side_effect_import(&mut module, "./b").unwrap();
            assert_eq!(module.source(), "require('./b');\n");
        }
    }
}
