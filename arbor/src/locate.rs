//! Resolve byte ranges and kind hints to tree nodes.
//!
//! Resolution failure is an expected outcome (stale offsets, absent kind);
//! every function here returns `Option` and never panics on bad input.

use indextree::NodeId;

use crate::kinds;
use crate::tree::{Span, SyntaxTree};

/// Find the node that a byte range denotes.
///
/// Descends from the root through the children whose span contains `range`.
/// Among the nodes on that path whose span equals `range`, the innermost one
/// wins; with a `kind` hint, the innermost one of that kind wins. When no span
/// equals the range and the hint is one of [`kinds::CONTAINER_KINDS`], falls
/// back to the innermost node of that kind whose span contains the range.
pub fn resolve(tree: &SyntaxTree, range: Span, kind: Option<&str>) -> Option<NodeId> {
    if !tree.span(tree.root).contains(range) {
        trace!(range = %range, "resolve: range outside tree");
        return None;
    }

    let mut exact = None;
    let mut containing = None;
    let mut current = tree.root;
    loop {
        let kind_ok = kind.is_none_or(|k| tree.kind(current) == k);
        if kind_ok {
            if tree.span(current) == range {
                exact = Some(current);
            }
            containing = Some(current);
        }
        match tree
            .children(current)
            .find(|&child| tree.span(child).contains(range))
        {
            Some(child) => current = child,
            None => break,
        }
    }

    match (exact, kind) {
        (Some(node), _) => Some(node),
        (None, Some(k)) if kinds::CONTAINER_KINDS.contains(&k) => containing,
        (None, _) => {
            trace!(range = %range, "resolve: no node spans exactly");
            None
        }
    }
}

/// First child of `node` with the given kind.
pub fn find_child_by_kind(tree: &SyntaxTree, node: NodeId, kind: &str) -> Option<NodeId> {
    tree.children(node).find(|&c| tree.kind(c) == kind)
}

/// First child of `node` with the given kind and label.
pub fn find_child_by_kind_and_label(
    tree: &SyntaxTree,
    node: NodeId,
    kind: &str,
    label: &str,
) -> Option<NodeId> {
    tree.children(node)
        .find(|&c| tree.kind(c) == kind && tree.label(c) == Some(label))
}

/// First child of a field declaration carrying `label`, searching only the
/// children that precede the first variable fragment.
///
/// Modifiers and the declared type always come before the fragments, so the
/// search stops there.
pub fn find_field_child_by_label(
    tree: &SyntaxTree,
    field_declaration: NodeId,
    label: &str,
) -> Option<NodeId> {
    for child in tree.children(field_declaration) {
        if tree.label(child) == Some(label) {
            return Some(child);
        }
        if tree.kind(child) == kinds::VARIABLE_DECLARATION_FRAGMENT {
            break;
        }
    }
    None
}

/// First child of a field declaration with the given kind, searching only the
/// children that precede the first variable fragment.
pub fn find_field_child_by_kind(
    tree: &SyntaxTree,
    field_declaration: NodeId,
    kind: &str,
) -> Option<NodeId> {
    for child in tree.children(field_declaration) {
        if tree.kind(child) == kind {
            return Some(child);
        }
        if tree.kind(child) == kinds::VARIABLE_DECLARATION_FRAGMENT {
            break;
        }
    }
    None
}

/// Locate the same-kind child on both sides.
pub fn match_child_by_kind(
    src_tree: &SyntaxTree,
    src: NodeId,
    dst_tree: &SyntaxTree,
    dst: NodeId,
    kind: &str,
) -> Option<(NodeId, NodeId)> {
    Some((
        find_child_by_kind(src_tree, src, kind)?,
        find_child_by_kind(dst_tree, dst, kind)?,
    ))
}
