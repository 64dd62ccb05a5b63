//! Reconciliation output: one store per file pair.

use arbor::{MultiMappingStore, SyntaxTree};
use facet::Facet;
use rapidhash::RapidHashMap as HashMap;

use crate::error::ReconcileWarning;
use crate::reconcile::Outcome;

/// Node mappings between one file before and one file after, plus both trees.
///
/// This triple is what an edit-script generator consumes.
#[derive(Debug)]
pub struct AstDiff<'t> {
    pub src_path: String,
    pub dst_path: String,
    pub src_tree: &'t SyntaxTree,
    pub dst_tree: &'t SyntaxTree,
    pub mappings: MultiMappingStore,
}

impl<'t> AstDiff<'t> {
    pub fn new(
        src_path: impl Into<String>,
        dst_path: impl Into<String>,
        src_tree: &'t SyntaxTree,
        dst_tree: &'t SyntaxTree,
    ) -> Self {
        Self {
            src_path: src_path.into(),
            dst_path: dst_path.into(),
            src_tree,
            dst_tree,
            mappings: MultiMappingStore::new(),
        }
    }

    pub fn file_pair(&self) -> (&str, &str) {
        (&self.src_path, &self.dst_path)
    }

    /// Union another diff's mappings for the same file pair into this one.
    pub fn merge(&mut self, other: &AstDiff<'_>) {
        debug_assert_eq!(self.file_pair(), other.file_pair());
        self.mappings.merge(&other.mappings);
    }

    /// Source nodes with no counterpart.
    pub fn unmapped_src_count(&self) -> usize {
        self.src_tree
            .pre_order()
            .filter(|&n| !self.mappings.contains_src(n))
            .count()
    }

    /// Destination nodes with no counterpart.
    pub fn unmapped_dst_count(&self) -> usize {
        self.dst_tree
            .pre_order()
            .filter(|&n| !self.mappings.contains_dst(n))
            .count()
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            src_path: self.src_path.clone(),
            dst_path: self.dst_path.clone(),
            mapped_pairs: self.mappings.len(),
            unmapped_src: self.unmapped_src_count(),
            unmapped_dst: self.unmapped_dst_count(),
        }
    }
}

/// Per-file-pair counts, for listing modified files.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct FileSummary {
    pub src_path: String,
    pub dst_path: String,
    pub mapped_pairs: usize,
    pub unmapped_src: usize,
    pub unmapped_dst: usize,
}

/// Diffs of a whole project, in first-seen order, at most one per file pair.
#[derive(Debug, Default)]
pub struct DiffSet<'t> {
    diffs: Vec<AstDiff<'t>>,
    index: HashMap<(String, String), usize>,
    warnings: Vec<ReconcileWarning>,
}

impl<'t> DiffSet<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diff, unioning it into an existing one for the same file pair.
    pub fn insert(&mut self, diff: AstDiff<'t>) {
        let key = (diff.src_path.clone(), diff.dst_path.clone());
        match self.index.get(&key) {
            Some(&i) => {
                trace!(src = %key.0, dst = %key.1, "merging diff for known file pair");
                self.diffs[i].merge(&diff);
            }
            None => {
                self.index.insert(key, self.diffs.len());
                self.diffs.push(diff);
            }
        }
    }

    /// Take in everything one reconciliation produced.
    pub fn absorb(&mut self, outcome: Outcome<'t>) {
        for diff in outcome.diffs {
            self.insert(diff);
        }
        self.warnings.extend(outcome.warnings);
    }

    pub fn get(&self, src_path: &str, dst_path: &str) -> Option<&AstDiff<'t>> {
        self.index
            .get(&(src_path.to_owned(), dst_path.to_owned()))
            .map(|&i| &self.diffs[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AstDiff<'t>> {
        self.diffs.iter()
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    /// Recoverable problems met along the way.
    pub fn warnings(&self) -> &[ReconcileWarning] {
        &self.warnings
    }

    pub fn summaries(&self) -> Vec<FileSummary> {
        self.diffs.iter().map(AstDiff::summary).collect()
    }
}

impl<'s, 't> IntoIterator for &'s DiffSet<'t> {
    type Item = &'s AstDiff<'t>;
    type IntoIter = std::slice::Iter<'s, AstDiff<'t>>;

    fn into_iter(self) -> Self::IntoIter {
        self.diffs.iter()
    }
}
