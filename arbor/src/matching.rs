//! GumTree-style alignment of two subtrees already known to correspond.
//!
//! Runs in two phases, both confined to the two subtrees:
//! 1. Top-down: match identical subtrees by hash
//! 2. Bottom-up: match remaining nodes by position and kind under a matched
//!    parent, falling back to the Dice coefficient for inner nodes
//!
//! The result is a one-to-one [`Matching`]; callers fold it into a
//! [`MultiMappingStore`](crate::MultiMappingStore).

use core::cell::RefCell;

use indextree::NodeId;
use rapidhash::{RapidHashMap as HashMap, RapidHashSet as HashSet};

use crate::tree::SyntaxTree;

/// A bidirectional one-to-one mapping between nodes in two trees.
/// Uses Vec for O(1) lookups indexed by NodeId.
#[derive(Debug, Default)]
pub struct Matching {
    /// Map from source node to destination node (indexed by source NodeId)
    src_to_dst: Vec<Option<NodeId>>,
    /// Map from destination node to source node (indexed by destination NodeId)
    dst_to_src: Vec<Option<NodeId>>,
    /// All matched pairs, in the order they were found
    pairs: Vec<(NodeId, NodeId)>,
}

impl Matching {
    /// Create a new empty matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a match between two nodes.
    #[inline]
    pub fn add(&mut self, src: NodeId, dst: NodeId) {
        let src_idx = usize::from(src);
        let dst_idx = usize::from(dst);

        if src_idx >= self.src_to_dst.len() {
            self.src_to_dst.resize(src_idx + 1, None);
        }
        if dst_idx >= self.dst_to_src.len() {
            self.dst_to_src.resize(dst_idx + 1, None);
        }

        self.src_to_dst[src_idx] = Some(dst);
        self.dst_to_src[dst_idx] = Some(src);
        self.pairs.push((src, dst));
    }

    /// Check if a source node is matched.
    #[inline(always)]
    pub fn contains_src(&self, src: NodeId) -> bool {
        self.get_dst(src).is_some()
    }

    /// Check if a destination node is matched.
    #[inline(always)]
    pub fn contains_dst(&self, dst: NodeId) -> bool {
        self.get_src(dst).is_some()
    }

    /// Get the match for a source node.
    #[inline(always)]
    pub fn get_dst(&self, src: NodeId) -> Option<NodeId> {
        self.src_to_dst.get(usize::from(src)).copied().flatten()
    }

    /// Get the match for a destination node.
    #[inline(always)]
    pub fn get_src(&self, dst: NodeId) -> Option<NodeId> {
        self.dst_to_src.get(usize::from(dst)).copied().flatten()
    }

    /// Get all matched pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.pairs.iter().copied()
    }

    /// Get the number of matched pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if there are no matches.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Configuration for the matching algorithm.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Minimum Dice coefficient for bottom-up matching.
    /// Nodes with similarity below this threshold won't be matched.
    pub similarity_threshold: f64,

    /// Minimum height for a node to be considered in top-down matching.
    /// Smaller subtrees are left for bottom-up matching.
    pub min_height: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            min_height: 1,
        }
    }
}

/// Align the subtree rooted at `src` with the subtree rooted at `dst`.
///
/// The two roots are always paired. No node outside either subtree is ever
/// matched.
pub fn align_subtrees(
    src_tree: &SyntaxTree,
    dst_tree: &SyntaxTree,
    src: NodeId,
    dst: NodeId,
    config: &MatchingConfig,
) -> Matching {
    debug!(
        src_size = src_tree.size(src),
        dst_size = dst_tree.size(dst),
        "align_subtrees start"
    );
    let mut matching = Matching::new();

    top_down_phase(src_tree, dst_tree, src, dst, &mut matching, config);
    if !matching.contains_src(src) && !matching.contains_dst(dst) {
        matching.add(src, dst);
    }
    trace!(matched = matching.len(), "after top_down_phase");

    bottom_up_phase(src_tree, dst_tree, src, dst, &mut matching, config);
    debug!(matched = matching.len(), "align_subtrees done");

    matching
}

/// Phase 1: Top-down matching.
///
/// Greedily matches nodes with identical subtree hashes, starting from the
/// roots and working down. Child pairs with equal hashes are explored before
/// pairs that merely share a kind.
fn top_down_phase(
    src_tree: &SyntaxTree,
    dst_tree: &SyntaxTree,
    src: NodeId,
    dst: NodeId,
    matching: &mut Matching,
    config: &MatchingConfig,
) {
    let mut candidates: Vec<(NodeId, NodeId)> = vec![(src, dst)];

    while let Some((a, b)) = candidates.pop() {
        if matching.contains_src(a) || matching.contains_dst(b) {
            continue;
        }
        if src_tree.height(a) < config.min_height {
            continue;
        }

        if src_tree.hash(a) == dst_tree.hash(b) && src_tree.kind(a) == dst_tree.kind(b) {
            trace!(a = usize::from(a), kind = src_tree.kind(a), b = usize::from(b), "top_down: hash match");
            match_subtrees(src_tree, dst_tree, a, b, matching);
            continue;
        }

        // Only children of b, never arbitrary nodes of the destination tree
        let mut by_kind = Vec::new();
        let mut by_hash = Vec::new();
        for a_child in src_tree.children(a) {
            let a_hash = src_tree.hash(a_child);
            let a_kind = src_tree.kind(a_child);
            for b_child in dst_tree.children(b) {
                if matching.contains_dst(b_child) {
                    continue;
                }
                if a_hash == dst_tree.hash(b_child) {
                    by_hash.push((a_child, b_child));
                } else if a_kind == dst_tree.kind(b_child) {
                    by_kind.push((a_child, b_child));
                }
            }
        }
        // Stack order: hash pairs are popped first, each group in child order
        candidates.extend(by_kind.into_iter().rev());
        candidates.extend(by_hash.into_iter().rev());
    }
}

/// Match two subtrees position by position (when their hashes match).
fn match_subtrees(
    src_tree: &SyntaxTree,
    dst_tree: &SyntaxTree,
    a: NodeId,
    b: NodeId,
    matching: &mut Matching,
) {
    let mut stack = vec![(a, b)];
    while let Some((x, y)) = stack.pop() {
        // A descendant may already be matched through an earlier candidate
        if matching.contains_src(x) || matching.contains_dst(y) {
            continue;
        }
        matching.add(x, y);
        stack.extend(src_tree.children(x).zip(dst_tree.children(y)));
    }
}

/// Lazily computed descendant sets for nodes in a tree.
/// Only computes descendants for nodes that are actually queried.
struct LazyDescendantMap<'a> {
    tree: &'a SyntaxTree,
    cache: RefCell<HashMap<NodeId, HashSet<NodeId>>>,
}

impl<'a> LazyDescendantMap<'a> {
    fn new(tree: &'a SyntaxTree) -> Self {
        Self {
            tree,
            cache: RefCell::new(HashMap::default()),
        }
    }

    /// Run `f` on the descendant set of a node, computing it if needed.
    fn with<R>(&self, node: NodeId, f: impl FnOnce(&HashSet<NodeId>) -> R) -> R {
        let mut cache = self.cache.borrow_mut();
        let set = cache
            .entry(node)
            .or_insert_with(|| self.tree.descendants(node).filter(|&d| d != node).collect());
        f(set)
    }
}

/// Check if `b` is a valid match for `a` based on ancestry constraints.
///
/// If a's parent is matched to some node P, then b must lie under P, and
/// symmetrically for b's parent.
fn ancestry_compatible(
    a: NodeId,
    b: NodeId,
    src_tree: &SyntaxTree,
    dst_tree: &SyntaxTree,
    matching: &Matching,
) -> bool {
    if let Some(a_parent) = src_tree.parent(a)
        && let Some(b_parent) = matching.get_dst(a_parent)
        && !dst_tree.is_within(b, b_parent)
    {
        trace!(a = usize::from(a), b = usize::from(b), "ancestry check failed: b outside matched parent");
        return false;
    }

    if let Some(b_parent) = dst_tree.parent(b)
        && let Some(a_parent) = matching.get_src(b_parent)
        && !src_tree.is_within(a, a_parent)
    {
        trace!(a = usize::from(a), b = usize::from(b), "ancestry check failed: a outside matched parent");
        return false;
    }

    true
}

/// Phase 2: Bottom-up matching.
///
/// Two passes in pre-order so parents are settled before their children:
/// inner nodes first (position+kind under a matched parent, else Dice), then
/// leaves (same label preferred, then same position).
fn bottom_up_phase(
    src_tree: &SyntaxTree,
    dst_tree: &SyntaxTree,
    src: NodeId,
    dst: NodeId,
    matching: &mut Matching,
    config: &MatchingConfig,
) {
    let desc_src = LazyDescendantMap::new(src_tree);
    let desc_dst = LazyDescendantMap::new(dst_tree);

    let mut dst_by_kind: HashMap<&'static str, Vec<NodeId>> = HashMap::default();
    for b in dst_tree.descendants(dst) {
        if !matching.contains_dst(b) {
            dst_by_kind.entry(dst_tree.kind(b)).or_default().push(b);
        }
    }

    // PASS 1: inner nodes
    for a in src_tree.descendants(src) {
        if matching.contains_src(a) || src_tree.is_leaf(a) {
            continue;
        }
        let kind = src_tree.kind(a);
        let position = src_tree.position(a);

        if let Some(parent_b) = src_tree.parent(a).and_then(|p| matching.get_dst(p)) {
            let best = dst_tree.children(parent_b).find(|&b| {
                !matching.contains_dst(b)
                    && dst_tree.kind(b) == kind
                    && dst_tree.position(b) == position
            });
            if let Some(b) = best {
                trace!(a = usize::from(a), kind, b = usize::from(b), position, "bottom_up pass1: position+kind match");
                matching.add(a, b);
                continue;
            }
        }

        let mut best: Option<(NodeId, f64)> = None;
        for &b in dst_by_kind.get(kind).map(Vec::as_slice).unwrap_or(&[]) {
            if matching.contains_dst(b) || dst_tree.is_leaf(b) {
                continue;
            }
            if !ancestry_compatible(a, b, src_tree, dst_tree, matching) {
                continue;
            }
            let score = dice_coefficient(a, b, matching, &desc_src, &desc_dst);
            if score >= config.similarity_threshold && best.is_none_or(|(_, s)| score > s) {
                best = Some((b, score));
            }
        }
        if let Some((b, _score)) = best {
            trace!(a = usize::from(a), kind, b = usize::from(b), score = _score, "bottom_up pass1: dice match");
            matching.add(a, b);
        }
    }

    // PASS 2: leaves
    for a in src_tree.descendants(src) {
        if matching.contains_src(a) || !src_tree.is_leaf(a) {
            continue;
        }
        let kind = src_tree.kind(a);
        let label = src_tree.label(a);
        let position = src_tree.position(a);

        let Some(parent_b) = src_tree.parent(a).and_then(|p| matching.get_dst(p)) else {
            continue;
        };
        let candidates: Vec<NodeId> = dst_tree
            .children(parent_b)
            .filter(|&b| {
                !matching.contains_dst(b) && dst_tree.is_leaf(b) && dst_tree.kind(b) == kind
            })
            .collect();

        let best = candidates
            .iter()
            .find(|&&b| dst_tree.position(b) == position && dst_tree.label(b) == label)
            .or_else(|| candidates.iter().find(|&&b| dst_tree.label(b) == label))
            .or_else(|| candidates.iter().find(|&&b| dst_tree.position(b) == position))
            .copied();

        if let Some(b) = best {
            trace!(a = usize::from(a), kind, b = usize::from(b), "bottom_up pass2: leaf match");
            matching.add(a, b);
        }
    }
}

/// Dice coefficient between two nodes based on matched descendants.
///
/// dice(A, B) = 2 × |matched descendants| / (|descendants A| + |descendants B|)
fn dice_coefficient(
    a: NodeId,
    b: NodeId,
    matching: &Matching,
    desc_src: &LazyDescendantMap<'_>,
    desc_dst: &LazyDescendantMap<'_>,
) -> f64 {
    let (common, len_a) = desc_src.with(a, |set_a| {
        let common = desc_dst.with(b, |set_b| {
            set_a
                .iter()
                .filter(|&&x| matching.get_dst(x).is_some_and(|y| set_b.contains(&y)))
                .count()
        });
        (common, set_a.len())
    });
    let len_b = desc_dst.with(b, |set_b| set_b.len());

    if len_a == 0 && len_b == 0 {
        1.0
    } else {
        2.0 * common as f64 / (len_a + len_b) as f64
    }
}
