//! Fixture helpers: trees from their text form, locations taken from the
//! trees themselves so offsets always agree.

#![allow(dead_code)]

use astdiff::arbor::{NodeId, SyntaxTree, kinds, sexp};
use astdiff::{
    ClassDescriptor, CodeFragment, CodeMapping, Container, Location, MappingKind, Operation,
    VariableDeclaration, Visibility,
};

pub fn parse(text: &str) -> SyntaxTree {
    sexp::parse(text).unwrap()
}

/// First node in pre-order with this kind and label.
pub fn find(tree: &SyntaxTree, kind: &str, label: &str) -> NodeId {
    tree.pre_order()
        .find(|&n| tree.kind(n) == kind && tree.label(n) == Some(label))
        .unwrap_or_else(|| panic!("no {kind}:{label} in tree"))
}

/// The `n`th node in pre-order with this kind.
pub fn nth(tree: &SyntaxTree, kind: &str, n: usize) -> NodeId {
    tree.pre_order()
        .filter(|&id| tree.kind(id) == kind)
        .nth(n)
        .unwrap_or_else(|| panic!("no {kind} #{n} in tree"))
}

pub fn first(tree: &SyntaxTree, kind: &str) -> NodeId {
    nth(tree, kind, 0)
}

pub fn at(file: &str, tree: &SyntaxTree, node: NodeId) -> Location {
    Location::new(file, tree.span(node))
}

/// Descriptor for the `n`th type declaration of a file.
pub fn class(file: &str, tree: &SyntaxTree, n: usize, name: &str) -> ClassDescriptor {
    ClassDescriptor {
        name: name.into(),
        location: at(file, tree, nth(tree, kinds::TYPE_DECLARATION, n)),
        visibility: Visibility::Public,
        ..Default::default()
    }
}

pub fn operation(file: &str, tree: &SyntaxTree, node: NodeId, class_name: &str) -> Operation {
    let name = tree
        .children(node)
        .find(|&c| tree.kind(c) == kinds::SIMPLE_NAME)
        .and_then(|c| tree.label(c))
        .unwrap_or_default();
    Operation {
        name: name.into(),
        class_name: class_name.into(),
        location: at(file, tree, node),
        visibility: Visibility::Public,
        ..Default::default()
    }
}

pub fn container(file: &str, tree: &SyntaxTree, node: NodeId, class_name: &str) -> Container {
    Container::Operation(operation(file, tree, node, class_name))
}

pub fn fragment(file: &str, tree: &SyntaxTree, node: NodeId) -> CodeFragment {
    CodeFragment {
        location: at(file, tree, node),
        ..Default::default()
    }
}

pub fn variable(file: &str, tree: &SyntaxTree, node: NodeId, name: &str) -> VariableDeclaration {
    VariableDeclaration {
        name: name.into(),
        location: at(file, tree, node),
        type_: None,
    }
}

pub fn leaf_mapping(fragment1: CodeFragment, fragment2: CodeFragment) -> CodeMapping {
    CodeMapping {
        kind: MappingKind::Leaf,
        fragment1,
        fragment2,
    }
}

pub fn composite_mapping(fragment1: CodeFragment, fragment2: CodeFragment) -> CodeMapping {
    CodeMapping {
        kind: MappingKind::Composite,
        fragment1,
        fragment2,
    }
}

/// Whether `node` lies in the subtree rooted at `root`.
pub fn within(tree: &SyntaxTree, node: NodeId, root: NodeId) -> bool {
    tree.is_within(node, root)
}
