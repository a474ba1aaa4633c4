// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tree traversal helpers over tree-sitter nodes.

use tree_sitter::Node;

/// Result of visiting a node, controlling further traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitResult {
    /// Continue traversal into children.
    Continue,
    /// Skip children, continue with siblings.
    SkipChildren,
    /// Stop traversal entirely.
    Stop,
}

/// Pre-order walk from `root` in source order.
///
/// Uses an explicit stack, so deeply nested expressions cannot overflow the
/// call stack.
pub fn walk_preorder<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>) -> VisitResult) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match visit(node) {
            VisitResult::Stop => return,
            VisitResult::SkipChildren => continue,
            VisitResult::Continue => {
                let mut cursor = node.walk();
                let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }
}

/// Named children of `node`, without comments.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Arguments of a `call_expression`, without comments.
pub fn call_arguments<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    call.child_by_field_name("arguments")
        .map(named_children)
        .unwrap_or_default()
}

/// Strip any number of wrapping parentheses.
pub fn unparenthesize(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match named_children(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// True for nodes that introduce a function scope.
pub fn is_function_like(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
    )
}
