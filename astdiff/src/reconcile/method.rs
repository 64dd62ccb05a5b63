//! Operation-level passes: signature, parameters, body statements.

use arbor::{NodeId, SyntaxTree, is_isomorphic, is_iso_structural, kinds, locate};

use super::{Endpoints, Reconciler};
use crate::matchers::{CompositeMatcher, match_blocks};
use crate::model::{BodyMapper, CodeMapping, Container, MappingKind, Operation, VariableDeclaration};

/// Children of an operation located independently of each other: the name,
/// a primitive return type and the body.
const SIGNATURE_ANCHORS: [&str; 3] = [kinds::SIMPLE_NAME, kinds::PRIMITIVE_TYPE, kinds::BLOCK];

impl<'a> Reconciler<'a> {
    /// Map an operation (or initializer) pair and everything inside it.
    pub(super) fn process_method(&mut self, ends: Endpoints<'a>, mapper: &'a BodyMapper) {
        self.process_signature_diff(ends, mapper);
        self.process_parameters(ends, &mapper.matched_variables);

        match (&mapper.container1, &mapper.container2) {
            (Container::Operation(op1), Container::Operation(op2)) => {
                self.process_javadoc_pair(ends, op1, op2);
                if let Some((s, d)) = ends.resolve_pair(&op1.location, &op2.location) {
                    self.add_pair(ends, s, d);
                    self.process_method_signature(ends, s, d, Some((op1, op2)));
                }
            }
            (container1, container2) => {
                if let Some((s, d)) = ends.resolve_pair(container1.location(), container2.location()) {
                    self.add_pair(ends, s, d);
                    if let (Container::Initializer(i1), Container::Initializer(i2)) = (container1, container2)
                        && i1.is_static
                        && i2.is_static
                        && let Some(pair) = ends.src().child(s, 0).zip(ends.dst().child(d, 0))
                    {
                        self.add_pair(ends, pair.0, pair.1);
                    }
                    self.process_method_signature(ends, s, d, None);
                }
            }
        }

        self.process_body(ends, mapper);
    }

    fn process_signature_diff(&mut self, ends: Endpoints<'a>, mapper: &'a BodyMapper) {
        let Some(signature) = &mapper.signature_diff else {
            return;
        };
        let wholesale = signature
            .common_type_parameters
            .iter()
            .chain(&signature.common_annotations)
            .chain(&signature.common_exception_types);
        for (before, after) in wholesale {
            if let Some((s, d)) = ends.resolve_pair(before, after) {
                self.add_pair_recursively(ends, s, d);
            }
        }
        if let Some((before, after)) = &signature.return_types
            && let Some((s, d)) = ends.resolve_pair(before, after)
            && is_iso_structural(ends.src(), s, ends.dst(), d)
        {
            self.add_pair_recursively(ends, s, d);
        }
    }

    /// Map matched parameters of the two operations.
    ///
    /// A pair is mapped wholesale when only identifiers differ: the shapes
    /// agree and every part other than the name is identical, so a changed
    /// type is never conflated.
    fn process_parameters(&mut self, ends: Endpoints<'a>, matched: &'a [(VariableDeclaration, VariableDeclaration)]) {
        let (src, dst) = (ends.src(), ends.dst());
        for (before, after) in matched {
            let Some((s, d)) = ends.resolve_pair(&before.location, &after.location) else {
                continue;
            };
            let in_signature = |tree: &SyntaxTree, node: NodeId| {
                tree.parent(node)
                    .is_some_and(|p| tree.kind(p) == kinds::METHOD_DECLARATION)
            };
            if !in_signature(src, s) || !in_signature(dst, d) {
                continue;
            }
            if same_parameter(src, s, dst, d) {
                self.add_pair_recursively(ends, s, d);
            } else {
                trace!(parameter = %before.name, "parameter changed beyond its name");
            }
        }
    }

    fn process_javadoc_pair(&mut self, ends: Endpoints<'a>, op1: &'a Operation, op2: &'a Operation) {
        if let (Some(before), Some(after)) = (&op1.javadoc, &op2.javadoc)
            && before.equal_text(after)
            && let Some((s, d)) = ends.resolve_pair(&before.location, &after.location)
        {
            self.add_pair_recursively(ends, s, d);
        }
    }

    fn process_method_signature(
        &mut self,
        ends: Endpoints<'a>,
        src_op: NodeId,
        dst_op: NodeId,
        operations: Option<(&'a Operation, &'a Operation)>,
    ) {
        for kind in SIGNATURE_ANCHORS {
            if let Some((s, d)) = locate::match_child_by_kind(ends.src(), src_op, ends.dst(), dst_op, kind) {
                self.add_pair(ends, s, d);
            }
        }

        let Some((op1, op2)) = operations else {
            return;
        };
        for keyword in op1.modifiers.shared_keywords(&op2.modifiers) {
            self.match_modifier(ends, src_op, dst_op, keyword);
        }
        if op1.visibility == op2.visibility
            && let Some(keyword) = op1.visibility.keyword()
        {
            self.match_modifier(ends, src_op, dst_op, keyword);
        }
    }

    /// Statement and expression mappings of a body, anonymous classes first.
    pub(super) fn process_body(&mut self, ends: Endpoints<'a>, mapper: &'a BodyMapper) {
        for anonymous in &mapper.anonymous_class_diffs {
            self.process_anonymous_class(ends, anonymous);
        }
        for mapping in &mapper.mappings {
            match mapping.kind {
                MappingKind::Leaf => self.process_leaf_mapping(ends, mapping),
                MappingKind::Composite => self.process_composite_mapping(ends, mapping),
            }
        }
    }

    fn process_leaf_mapping(&mut self, ends: Endpoints<'a>, mapping: &'a CodeMapping) {
        let Some((s, d)) = ends.resolve_pair(&mapping.fragment1.location, &mapping.fragment2.location) else {
            return;
        };
        if ends.src().kind(s) == ends.dst().kind(d) {
            self.add_pair(ends, s, d);
        }
        if mapping.involves_expression() {
            self.deferred.push((ends, mapping));
        } else {
            let matcher = self.leaf_matcher(false);
            matcher.align(ends.trees, s, d, self.store(ends));
        }
    }

    fn process_composite_mapping(&mut self, ends: Endpoints<'a>, mapping: &'a CodeMapping) {
        let Some((s, d)) = ends.resolve_pair(&mapping.fragment1.location, &mapping.fragment2.location) else {
            return;
        };
        self.add_pair(ends, s, d);

        let (src_kind, dst_kind) = (ends.src().kind(s), ends.dst().kind(d));
        let matcher = CompositeMatcher::new(&self.config.matching);
        let both = |kind: &str| src_kind == kind && dst_kind == kind;
        if both(kinds::TRY_STATEMENT) || both(kinds::CATCH_CLAUSE) {
            match_blocks(ends.trees, s, d, self.store(ends));
            if both(kinds::CATCH_CLAUSE) {
                matcher.align(ends.trees, s, d, self.store(ends));
            }
        } else if src_kind != kinds::BLOCK && dst_kind != kinds::BLOCK {
            matcher.align(ends.trees, s, d, self.store(ends));
        }
    }
}

/// Same shape, and every child other than the name identical.
fn same_parameter(src: &SyntaxTree, s: NodeId, dst: &SyntaxTree, d: NodeId) -> bool {
    is_iso_structural(src, s, dst, d)
        && src
            .children(s)
            .zip(dst.children(d))
            .filter(|&(x, _)| src.kind(x) != kinds::SIMPLE_NAME)
            .all(|(x, y)| is_isomorphic(src, x, dst, y))
}
