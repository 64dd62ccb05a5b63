//! Arena-backed syntax trees.
//!
//! Every node lives in an [`indextree::Arena`] and is addressed by a
//! [`NodeId`]. Children are ordered; parents are reachable through the arena
//! links, never through owning references. Two trees never share nodes, so a
//! `NodeId` is only meaningful together with the tree that produced it.

use core::fmt;
use core::hash::{Hash, Hasher};

use indextree::{Arena, NodeEdge, NodeId};
use rapidhash::RapidHasher;
use smallvec::SmallVec;

use crate::kinds;

/// A half-open byte range `[start, end)` in the file a tree was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First byte covered by the node.
    pub start: u32,
    /// One past the last byte covered by the node.
    pub end: u32,
}

impl Span {
    /// Create a span from its two offsets.
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely inside this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// Merkle-style hash of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeHash(pub u64);

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Data stored in each arena node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Grammar kind, e.g. `MethodDeclaration`.
    pub kind: &'static str,
    /// Text label for identifiers, literals and keywords.
    pub label: Option<String>,
    /// Byte range in the source file.
    pub span: Span,
    /// Hash over kind, label and children. Filled in by [`SyntaxTree::finish`].
    pub hash: NodeHash,
    /// Hash over kinds (and keyword labels) only. Filled in by [`SyntaxTree::finish`].
    pub shape: NodeHash,
    /// Height of the subtree; leaves have height 1.
    pub height: usize,
    /// Number of nodes in the subtree, including this one.
    pub size: usize,
}

impl NodeData {
    /// An unlabelled node.
    pub fn new(kind: &'static str, span: Span) -> Self {
        Self {
            kind,
            label: None,
            span,
            hash: NodeHash::default(),
            shape: NodeHash::default(),
            height: 1,
            size: 1,
        }
    }

    /// A labelled node, typically a leaf.
    pub fn labelled(kind: &'static str, label: impl Into<String>, span: Span) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(kind, span)
        }
    }
}

/// One version of one file, as a typed, positioned, ordered tree.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    arena: Arena<NodeData>,
    /// The compilation unit.
    pub root: NodeId,
}

impl SyntaxTree {
    /// Start a tree from its root node.
    pub fn new(root: NodeData) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(root);
        Self { arena, root }
    }

    /// Append a child under `parent` and return its id.
    ///
    /// Call [`finish`](Self::finish) once the last child has been added.
    pub fn add_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    /// Compute hashes, heights and sizes bottom-up.
    pub fn finish(&mut self) {
        let nodes: Vec<NodeId> = self.post_order().collect();

        for node_id in nodes {
            let mut hasher = RapidHasher::default();
            let mut shape_hasher = RapidHasher::default();
            let mut height = 0;
            let mut size = 1;

            let data = self.get(node_id);
            data.kind.hash(&mut hasher);
            data.label.hash(&mut hasher);
            data.kind.hash(&mut shape_hasher);
            if kinds::is_keyword(data.kind) {
                data.label.hash(&mut shape_hasher);
            }

            for child in node_id.children(&self.arena) {
                let child_data = self.arena[child].get();
                child_data.hash.0.hash(&mut hasher);
                child_data.shape.0.hash(&mut shape_hasher);
                height = height.max(child_data.height);
                size += child_data.size;
            }

            let data = self.arena[node_id].get_mut();
            data.hash = NodeHash(hasher.finish());
            data.shape = NodeHash(shape_hasher.finish());
            data.height = height + 1;
            data.size = size;
        }
    }

    /// Node data for an id.
    #[inline]
    pub fn get(&self, id: NodeId) -> &NodeData {
        self.arena[id].get()
    }

    /// Grammar kind of a node.
    #[inline]
    pub fn kind(&self, id: NodeId) -> &'static str {
        self.get(id).kind
    }

    /// Label of a node, if it has one.
    #[inline]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.get(id).label.as_deref()
    }

    /// Byte range of a node.
    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).span
    }

    /// Subtree hash over kinds and labels.
    #[inline]
    pub fn hash(&self, id: NodeId) -> NodeHash {
        self.get(id).hash
    }

    /// Subtree hash over kinds and keyword labels.
    #[inline]
    pub fn shape_hash(&self, id: NodeId) -> NodeHash {
        self.get(id).shape
    }

    /// Height of the subtree rooted at `id`.
    #[inline]
    pub fn height(&self, id: NodeId) -> usize {
        self.get(id).height
    }

    /// Number of nodes in the subtree rooted at `id`.
    #[inline]
    pub fn size(&self, id: NodeId) -> usize {
        self.get(id).size
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.arena.count()
    }

    /// Parent of a node; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// Children in source order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// The `index`-th child.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// Number of children.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Whether the node has no children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.arena[id].first_child().is_none()
    }

    /// Position among siblings (0-indexed).
    pub fn position(&self, id: NodeId) -> usize {
        // preceding_siblings includes the node itself
        id.preceding_siblings(&self.arena).count() - 1
    }

    /// The subtree rooted at `id` in pre-order, starting with `id`.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    /// Whole tree in pre-order.
    pub fn pre_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root)
    }

    /// Whole tree in post-order (children before parents).
    pub fn post_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root.traverse(&self.arena).filter_map(|edge| match edge {
            NodeEdge::End(id) => Some(id),
            NodeEdge::Start(_) => None,
        })
    }

    /// Whether `node` lies in the subtree rooted at `ancestor` (inclusive).
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        node.ancestors(&self.arena).any(|a| a == ancestor)
    }

    /// Kinds of the children, in order.
    pub fn child_kinds(&self, id: NodeId) -> SmallVec<[&'static str; 8]> {
        self.children(id).map(|c| self.kind(c)).collect()
    }
}

/// Whether two subtrees are identical: same kinds, same labels, same shape.
pub fn is_isomorphic(src: &SyntaxTree, a: NodeId, dst: &SyntaxTree, b: NodeId) -> bool {
    if src.hash(a) != dst.hash(b) || src.size(a) != dst.size(b) {
        return false;
    }
    compare_subtrees(src, a, dst, b, |s, x, d, y| {
        s.kind(x) == d.kind(y) && s.label(x) == d.label(y)
    })
}

/// Whether two subtrees have the same shape: same kinds at every position,
/// ignoring labels except those of keyword kinds.
pub fn is_iso_structural(src: &SyntaxTree, a: NodeId, dst: &SyntaxTree, b: NodeId) -> bool {
    if src.shape_hash(a) != dst.shape_hash(b) || src.size(a) != dst.size(b) {
        return false;
    }
    compare_subtrees(src, a, dst, b, |s, x, d, y| {
        let kind = s.kind(x);
        kind == d.kind(y) && (!kinds::is_keyword(kind) || s.label(x) == d.label(y))
    })
}

fn compare_subtrees(
    src: &SyntaxTree,
    a: NodeId,
    dst: &SyntaxTree,
    b: NodeId,
    same_node: impl Fn(&SyntaxTree, NodeId, &SyntaxTree, NodeId) -> bool,
) -> bool {
    let mut stack = vec![(a, b)];
    while let Some((x, y)) = stack.pop() {
        if !same_node(src, x, dst, y) || src.child_count(x) != dst.child_count(y) {
            return false;
        }
        stack.extend(src.children(x).zip(dst.children(y)));
    }
    true
}
