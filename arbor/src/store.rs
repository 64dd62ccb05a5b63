//! Many-to-many node relation between a source and a destination tree.
//!
//! Unlike a GumTree matching, a node may be linked to several counterparts:
//! two independent passes can both assert a correspondence and neither wins.
//! Insertion is idempotent and there is no removal.

use core::fmt;

use indextree::NodeId;
use rapidhash::{RapidHashMap as HashMap, RapidHashSet as HashSet};
use smallvec::SmallVec;

use crate::tree::SyntaxTree;

type Counterparts = SmallVec<[NodeId; 2]>;

/// Bidirectional multi-valued mapping, indexed both ways for O(1) queries.
#[derive(Clone, Default)]
pub struct MultiMappingStore {
    src_to_dst: HashMap<NodeId, Counterparts>,
    dst_to_src: HashMap<NodeId, Counterparts>,
    pairs: HashSet<(NodeId, NodeId)>,
    /// Insertion order, for deterministic iteration.
    order: Vec<(NodeId, NodeId)>,
}

impl MultiMappingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair. Returns `false` if it was already present.
    pub fn add_pair(&mut self, src: NodeId, dst: NodeId) -> bool {
        if !self.pairs.insert((src, dst)) {
            return false;
        }
        self.src_to_dst.entry(src).or_default().push(dst);
        self.dst_to_src.entry(dst).or_default().push(src);
        self.order.push((src, dst));
        true
    }

    /// Insert a pair and, position by position, all pairs of descendants.
    ///
    /// Only meaningful when the caller has established the two subtrees have
    /// the same shape; extra children on either side are ignored.
    pub fn add_pair_recursively(
        &mut self,
        src_tree: &SyntaxTree,
        dst_tree: &SyntaxTree,
        src: NodeId,
        dst: NodeId,
    ) {
        let mut stack = vec![(src, dst)];
        while let Some((s, d)) = stack.pop() {
            self.add_pair(s, d);
            stack.extend(src_tree.children(s).zip(dst_tree.children(d)));
        }
    }

    /// Whether the exact pair is present.
    #[inline]
    pub fn contains(&self, src: NodeId, dst: NodeId) -> bool {
        self.pairs.contains(&(src, dst))
    }

    /// Whether a source node has at least one counterpart.
    #[inline]
    pub fn contains_src(&self, src: NodeId) -> bool {
        self.src_to_dst.contains_key(&src)
    }

    /// Whether a destination node has at least one counterpart.
    #[inline]
    pub fn contains_dst(&self, dst: NodeId) -> bool {
        self.dst_to_src.contains_key(&dst)
    }

    /// Counterparts of a source node, in insertion order.
    pub fn dsts(&self, src: NodeId) -> &[NodeId] {
        self.src_to_dst
            .get(&src)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Counterparts of a destination node, in insertion order.
    pub fn srcs(&self, dst: NodeId) -> &[NodeId] {
        self.dst_to_src
            .get(&dst)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a source node is linked to exactly one destination node.
    pub fn is_src_unique(&self, src: NodeId) -> bool {
        self.dsts(src).len() == 1
    }

    /// Whether a destination node is linked to exactly one source node.
    pub fn is_dst_unique(&self, dst: NodeId) -> bool {
        self.srcs(dst).len() == 1
    }

    /// All pairs, in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.order.iter().copied()
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no pair has been inserted.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Union `other` into this store.
    pub fn merge(&mut self, other: &MultiMappingStore) {
        for (src, dst) in other.pairs() {
            self.add_pair(src, dst);
        }
    }

    /// Whether both stores hold the same relation, regardless of insertion order.
    pub fn same_relation(&self, other: &MultiMappingStore) -> bool {
        self.pairs == other.pairs
    }
}

impl PartialEq for MultiMappingStore {
    fn eq(&self, other: &Self) -> bool {
        self.same_relation(other)
    }
}

impl Eq for MultiMappingStore {}

impl fmt::Debug for MultiMappingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.order
                    .iter()
                    .map(|(s, d)| (usize::from(*s), usize::from(*d))),
            )
            .finish()
    }
}

impl Extend<(NodeId, NodeId)> for MultiMappingStore {
    fn extend<I: IntoIterator<Item = (NodeId, NodeId)>>(&mut self, iter: I) {
        for (src, dst) in iter {
            self.add_pair(src, dst);
        }
    }
}
