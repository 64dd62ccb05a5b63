//! Structural alignment of two nodes the structural model says correspond.

use arbor::{
    MatchingConfig, MultiMappingStore, NodeId, SyntaxTree, align_subtrees, is_isomorphic,
    is_iso_structural, kinds, locate,
};

/// The before and after trees an alignment reads from.
#[derive(Debug, Clone, Copy)]
pub struct Trees<'t> {
    pub src: &'t SyntaxTree,
    pub dst: &'t SyntaxTree,
}

/// Aligns two simple statements or expressions.
#[derive(Debug, Clone, Copy)]
pub struct LeafMatcher<'c> {
    recursive: bool,
    config: &'c MatchingConfig,
}

impl<'c> LeafMatcher<'c> {
    /// With `recursive`, shape-isomorphic subtrees are mapped wholesale.
    pub fn new(recursive: bool, config: &'c MatchingConfig) -> Self {
        Self { recursive, config }
    }

    pub fn align(&self, trees: Trees<'_>, src: NodeId, dst: NodeId, store: &mut MultiMappingStore) {
        if self.recursive && is_iso_structural(trees.src, src, trees.dst, dst) {
            trace!(src = usize::from(src), dst = usize::from(dst), "leaf: shape-isomorphic");
            store.add_pair_recursively(trees.src, trees.dst, src, dst);
            return;
        }
        store.add_pair(src, dst);
        let matching = align_subtrees(trees.src, trees.dst, src, dst, self.config);
        store.extend(matching.pairs());
    }
}

/// Aligns two block-bearing statements: the statement's own parts (conditions,
/// catch parameters, loop headers) are aligned, nested blocks are only paired.
/// Statements inside the blocks have correspondences of their own.
#[derive(Debug, Clone, Copy)]
pub struct CompositeMatcher<'c> {
    config: &'c MatchingConfig,
}

impl<'c> CompositeMatcher<'c> {
    pub fn new(config: &'c MatchingConfig) -> Self {
        Self { config }
    }

    pub fn align(&self, trees: Trees<'_>, src: NodeId, dst: NodeId, store: &mut MultiMappingStore) {
        store.add_pair(src, dst);

        let (src_kind, dst_kind) = (trees.src.kind(src), trees.dst.kind(dst));
        if src_kind == dst_kind && matches!(src_kind, kinds::TRY_STATEMENT | kinds::CATCH_CLAUSE) {
            match_blocks(trees, src, dst, store);
        }

        let (src_blocks, src_parts) = split_children(trees.src, src);
        let (dst_blocks, dst_parts) = split_children(trees.dst, dst);

        for (s, d) in src_blocks.into_iter().zip(dst_blocks) {
            if trees.src.kind(s) == trees.dst.kind(d) {
                store.add_pair(s, d);
            }
        }

        let mut used = vec![false; dst_parts.len()];
        let mut unmatched = Vec::new();
        for &s in &src_parts {
            let kind = trees.src.kind(s);
            let found = dst_parts
                .iter()
                .enumerate()
                .find(|&(i, &d)| !used[i] && trees.dst.kind(d) == kind);
            match found {
                Some((i, &d)) => {
                    used[i] = true;
                    self.align_part(trees, s, d, store);
                }
                None => unmatched.push(s),
            }
        }

        // Parts whose kind changed (a split or merged condition): look for
        // an isomorphic copy of one side inside the other.
        for s in unmatched {
            for (i, &d) in dst_parts.iter().enumerate() {
                if used[i] {
                    continue;
                }
                if let Some(x) = isomorphic_descendant(trees.src, s, trees.dst, d) {
                    store.add_pair_recursively(trees.src, trees.dst, x, d);
                    used[i] = true;
                    break;
                }
                if let Some(y) = isomorphic_descendant(trees.dst, d, trees.src, s) {
                    store.add_pair_recursively(trees.src, trees.dst, s, y);
                    used[i] = true;
                    break;
                }
            }
        }
    }

    fn align_part(&self, trees: Trees<'_>, src: NodeId, dst: NodeId, store: &mut MultiMappingStore) {
        if is_isomorphic(trees.src, src, trees.dst, dst) {
            store.add_pair_recursively(trees.src, trees.dst, src, dst);
        } else {
            let matching = align_subtrees(trees.src, trees.dst, src, dst, self.config);
            store.extend(matching.pairs());
        }
    }
}

/// Map the first `Block` child on each side.
pub fn match_blocks(trees: Trees<'_>, src: NodeId, dst: NodeId, store: &mut MultiMappingStore) {
    if let Some((s, d)) = locate::match_child_by_kind(trees.src, src, trees.dst, dst, kinds::BLOCK) {
        store.add_pair(s, d);
    }
}

/// Children split into nested blocks (and catch clauses) and the statement's
/// own parts. Other nested statements are left out: they have mappings of
/// their own.
fn split_children(tree: &SyntaxTree, node: NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
    let mut blocks = Vec::new();
    let mut parts = Vec::new();
    for child in tree.children(node) {
        match tree.kind(child) {
            kinds::BLOCK | kinds::CATCH_CLAUSE => blocks.push(child),
            kind if kinds::is_statement(kind) => {}
            _ => parts.push(child),
        }
    }
    (blocks, parts)
}

/// First strict descendant of `container` isomorphic to `target`.
fn isomorphic_descendant(
    container_tree: &SyntaxTree,
    container: NodeId,
    target_tree: &SyntaxTree,
    target: NodeId,
) -> Option<NodeId> {
    let hash = target_tree.hash(target);
    container_tree
        .descendants(container)
        .skip(1)
        .filter(|&n| container_tree.hash(n) == hash)
        .find(|&n| is_isomorphic(container_tree, n, target_tree, target))
}
