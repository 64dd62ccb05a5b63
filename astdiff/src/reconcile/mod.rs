//! Per-class-pair reconciliation.
//!
//! A [`Reconciler`] walks one matched class pair (or the project-wide
//! refactoring list) through a fixed sequence of passes, each adding pairs to
//! the store of the file pair it touches:
//!
//! 1. compilation units, package declaration, imports
//! 2. enum constants, then the methods of their anonymous class bodies
//! 3. class header and attributes
//! 4. methods and their statements
//! 5. refactoring overrides
//! 6. deferred expression-level mappings
//!
//! Most mappings stay within the class pair's two files; moved members link
//! a third file, and their pairs land in a store of their own.

mod field;
mod method;
mod overrides;

use arbor::{MultiMappingStore, NodeId, SyntaxTree, is_isomorphic, is_iso_structural, kinds, locate};

use crate::config::ReconcileConfig;
use crate::diff::AstDiff;
use crate::error::ReconcileWarning;
use crate::matchers::{LeafMatcher, Trees};
use crate::model::{
    AnonymousClassDiff, ClassKind, ClassPairDiff, CodeMapping, EnumConstant, Location,
    VersionTrees,
};
use crate::refactoring::Refactoring;

/// Two files and their trees: the unit a store is keyed by.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Endpoints<'a> {
    pub src_path: &'a str,
    pub dst_path: &'a str,
    pub trees: Trees<'a>,
}

impl<'a> Endpoints<'a> {
    fn src(&self) -> &'a SyntaxTree {
        self.trees.src
    }

    fn dst(&self) -> &'a SyntaxTree {
        self.trees.dst
    }

    /// Resolve a location on each side; `None` if either is stale or belongs
    /// to another file.
    fn resolve_pair(&self, src: &Location, dst: &Location) -> Option<(NodeId, NodeId)> {
        self.resolve_pair_with(src, dst, |loc, tree| loc.resolve(tree))
    }

    /// [`Self::resolve_pair`] with an explicit kind hint on both sides.
    fn resolve_pair_as(&self, src: &Location, dst: &Location, kind: &str) -> Option<(NodeId, NodeId)> {
        self.resolve_pair_with(src, dst, |loc, tree| loc.resolve_as(tree, kind))
    }

    fn resolve_pair_with(
        &self,
        src: &Location,
        dst: &Location,
        resolve: impl Fn(&Location, &SyntaxTree) -> Option<NodeId>,
    ) -> Option<(NodeId, NodeId)> {
        if src.file != self.src_path || dst.file != self.dst_path {
            trace!(
                src = %src.file,
                dst = %dst.file,
                expected_src = self.src_path,
                expected_dst = self.dst_path,
                "location outside file pair"
            );
            return None;
        }
        let pair = resolve(src, self.src()).zip(resolve(dst, self.dst()));
        if pair.is_none() {
            trace!(src = %src.span, dst = %dst.span, "skipping unresolvable pair");
        }
        pair
    }
}

/// Everything one reconciliation produced.
#[derive(Debug, Default)]
pub struct Outcome<'a> {
    /// One diff per file pair touched, the class pair's own files first.
    pub diffs: Vec<AstDiff<'a>>,
    pub warnings: Vec<ReconcileWarning>,
}

/// Drives the ordered passes for one class pair or one refactoring list.
pub struct Reconciler<'a> {
    config: &'a ReconcileConfig,
    before: &'a VersionTrees,
    after: &'a VersionTrees,
    diffs: Vec<AstDiff<'a>>,
    /// Expression-level mappings, resolved after every other pass.
    deferred: Vec<(Endpoints<'a>, &'a CodeMapping)>,
    warnings: Vec<ReconcileWarning>,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a ReconcileConfig, before: &'a VersionTrees, after: &'a VersionTrees) -> Self {
        Self {
            config,
            before,
            after,
            diffs: Vec::new(),
            deferred: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Run every pass for one matched class pair.
    pub fn reconcile_class_pair(mut self, diff: &'a ClassPairDiff) -> Outcome<'a> {
        let ends = match self.endpoints(diff.original.source_file(), diff.next.source_file()) {
            Ok(ends) => ends,
            Err(warning) => {
                warn!(class = %diff.original.name, %warning, "skipping class pair");
                self.warnings.push(warning);
                return self.finish();
            }
        };
        debug!(
            original = %diff.original.name,
            next = %diff.next.name,
            src = ends.src_path,
            dst = ends.dst_path,
            "reconcile class pair"
        );

        let (src_root, dst_root) = (ends.src().root, ends.dst().root);
        self.store(ends).add_pair(src_root, dst_root);

        self.process_package_declaration(ends);
        self.process_imports(ends, &diff.common_imports);
        self.process_enum_constants(ends, &diff.common_enum_constants);
        for constant_diff in &diff.enum_constant_diffs {
            match &constant_diff.anonymous_class_diff {
                Some(anonymous) => {
                    for mapper in &anonymous.body_mappers {
                        self.process_method(ends, mapper);
                    }
                }
                None => self.warnings.push(ReconcileWarning::MissingAnonymousClassDiff {
                    constant: constant_diff.name.clone(),
                }),
            }
        }
        self.process_class_declaration(ends, diff);
        for mapper in &diff.body_mappers {
            self.process_method(ends, mapper);
        }
        self.apply_refactorings(diff.refactorings.iter());
        self.process_deferred();

        debug!(
            original = %diff.original.name,
            mapped = self.diffs.first().map_or(0, |d| d.mappings.len()),
            "class pair done"
        );
        self.finish()
    }

    /// Run the override table over the project-wide refactoring list.
    ///
    /// Each override resolves against the files its own locations name, so a
    /// class-local refactoring listed here lands in the same store it would
    /// have reached through its class pair.
    pub fn reconcile_refactorings(mut self, refactorings: &'a [Refactoring]) -> Outcome<'a> {
        debug!(count = refactorings.len(), "project refactorings");
        self.apply_refactorings(refactorings.iter());
        self.process_deferred();
        self.finish()
    }

    fn finish(self) -> Outcome<'a> {
        Outcome {
            diffs: self.diffs,
            warnings: self.warnings,
        }
    }

    fn apply_refactorings(&mut self, refactorings: impl Iterator<Item = &'a Refactoring>) {
        for refactoring in refactorings {
            if let Err(warning) = self.apply_refactoring(refactoring) {
                warn!(refactoring = refactoring.name(), %warning, "refactoring override skipped");
                self.warnings.push(warning);
            }
        }
    }

    /// Look up the trees for a file pair.
    fn endpoints(&self, src_path: &'a str, dst_path: &'a str) -> Result<Endpoints<'a>, ReconcileWarning> {
        let src = self
            .before
            .get(src_path)
            .ok_or_else(|| ReconcileWarning::MissingTree { path: src_path.to_owned() })?;
        let dst = self
            .after
            .get(dst_path)
            .ok_or_else(|| ReconcileWarning::MissingTree { path: dst_path.to_owned() })?;
        Ok(Endpoints {
            src_path,
            dst_path,
            trees: Trees { src, dst },
        })
    }

    /// The store for a file pair, created on first use.
    fn store(&mut self, ends: Endpoints<'a>) -> &mut MultiMappingStore {
        let index = match self
            .diffs
            .iter()
            .position(|d| d.src_path == ends.src_path && d.dst_path == ends.dst_path)
        {
            Some(index) => index,
            None => {
                self.diffs.push(AstDiff::new(
                    ends.src_path,
                    ends.dst_path,
                    ends.trees.src,
                    ends.trees.dst,
                ));
                self.diffs.len() - 1
            }
        };
        &mut self.diffs[index].mappings
    }

    fn leaf_matcher(&self, recursive: bool) -> LeafMatcher<'a> {
        LeafMatcher::new(recursive, &self.config.matching)
    }

    fn add_pair(&mut self, ends: Endpoints<'a>, src: NodeId, dst: NodeId) {
        self.store(ends).add_pair(src, dst);
    }

    fn add_pair_recursively(&mut self, ends: Endpoints<'a>, src: NodeId, dst: NodeId) {
        self.store(ends)
            .add_pair_recursively(ends.trees.src, ends.trees.dst, src, dst);
    }

    fn process_package_declaration(&mut self, ends: Endpoints<'a>) {
        let (src, dst) = (ends.src(), ends.dst());
        if let Some((s, d)) =
            locate::match_child_by_kind(src, src.root, dst, dst.root, kinds::PACKAGE_DECLARATION)
        {
            self.add_pair_recursively(ends, s, d);
        }
    }

    fn process_imports(&mut self, ends: Endpoints<'a>, common_imports: &[String]) {
        for name in common_imports {
            let found = find_import(ends.src(), name).zip(find_import(ends.dst(), name));
            match found {
                Some((s, d)) => self.add_pair_recursively(ends, s, d),
                None => trace!(import = %name, "import not found on both sides"),
            }
        }
    }

    fn process_enum_constants(&mut self, ends: Endpoints<'a>, constants: &'a [(EnumConstant, EnumConstant)]) {
        for (before, after) in constants {
            if let Some((s, d)) = ends.resolve_pair(&before.location, &after.location) {
                let matcher = self.leaf_matcher(false);
                matcher.align(ends.trees, s, d, self.store(ends));
            }
        }
    }

    fn process_class_declaration(&mut self, ends: Endpoints<'a>, diff: &'a ClassPairDiff) {
        let (original, next) = (&diff.original, &diff.next);
        let hint = match original.kind {
            ClassKind::Enum => kinds::ENUM_DECLARATION,
            ClassKind::Class | ClassKind::Interface => kinds::TYPE_DECLARATION,
        };
        let (src, dst) = (ends.src(), ends.dst());
        let Some((src_decl, dst_decl)) = ends.resolve_pair_as(&original.location, &next.location, hint) else {
            trace!(class = %original.name, "type declaration not found");
            return;
        };
        self.add_pair(ends, src_decl, dst_decl);

        if original.visibility == next.visibility
            && let Some(keyword) = original.visibility.keyword()
        {
            self.match_modifier(ends, src_decl, dst_decl, keyword);
        }
        for kind in [kinds::SIMPLE_NAME, kinds::TYPE_DECLARATION_KIND] {
            if let Some((s, d)) = locate::match_child_by_kind(src, src_decl, dst, dst_decl, kind) {
                self.add_pair(ends, s, d);
            }
        }
        for keyword in original.modifiers.shared_keywords(&next.modifiers) {
            self.match_modifier(ends, src_decl, dst_decl, keyword);
        }

        for (before, after) in &diff.common_type_parameters {
            if let Some((s, d)) = ends.resolve_pair(before, after)
                && is_iso_structural(src, s, dst, d)
            {
                self.add_pair_recursively(ends, s, d);
            }
        }

        if let (Some(before), Some(after)) = (&original.superclass, &next.superclass)
            && let Some((s, d)) = ends.resolve_pair(&before.location, &after.location)
            && is_isomorphic(src, s, dst, d)
        {
            self.add_pair_recursively(ends, s, d);
        }

        for interface in &original.interfaces {
            if diff.removed_interfaces.contains(&interface.name) {
                continue;
            }
            if let Some(counterpart) = next.interfaces.iter().find(|i| i.name == interface.name)
                && let Some((s, d)) = ends.resolve_pair(&interface.location, &counterpart.location)
            {
                self.add_pair_recursively(ends, s, d);
            }
        }

        self.process_attributes(ends, &diff.common_attributes);

        if let (Some(before), Some(after)) = (&original.javadoc, &next.javadoc)
            && before.equal_text(after)
            && let Some((s, d)) = ends.resolve_pair(&before.location, &after.location)
        {
            self.add_pair_recursively(ends, s, d);
        }

        for (before, after) in &diff.common_annotations {
            if let Some((s, d)) = ends.resolve_pair(before, after)
                && is_iso_structural(src, s, dst, d)
            {
                self.add_pair_recursively(ends, s, d);
            }
        }
    }

    fn process_anonymous_class(&mut self, ends: Endpoints<'a>, anonymous: &'a AnonymousClassDiff) {
        self.process_attributes(ends, &anonymous.common_attributes);
        for mapper in &anonymous.body_mappers {
            self.process_method(ends, mapper);
        }
    }

    /// Map a modifier keyword present on both declarations.
    fn match_modifier(&mut self, ends: Endpoints<'a>, src_decl: NodeId, dst_decl: NodeId, keyword: &str) {
        let found = locate::find_child_by_kind_and_label(ends.src(), src_decl, kinds::MODIFIER, keyword)
            .zip(locate::find_child_by_kind_and_label(ends.dst(), dst_decl, kinds::MODIFIER, keyword));
        if let Some((s, d)) = found {
            self.add_pair(ends, s, d);
        }
    }

    /// Resolve expression-level mappings queued by earlier passes.
    fn process_deferred(&mut self) {
        let deferred = std::mem::take(&mut self.deferred);
        trace!(count = deferred.len(), "deferred pass");
        for (ends, mapping) in deferred {
            if let Some((s, d)) = ends.resolve_pair(&mapping.fragment1.location, &mapping.fragment2.location) {
                let matcher = self.leaf_matcher(false);
                matcher.align(ends.trees, s, d, self.store(ends));
            }
        }
    }
}

/// The import declaration whose first child is labelled `name`.
fn find_import(tree: &SyntaxTree, name: &str) -> Option<NodeId> {
    tree.children(tree.root).find(|&child| {
        tree.kind(child) == kinds::IMPORT_DECLARATION
            && tree
                .child(child, 0)
                .is_some_and(|first| tree.label(first) == Some(name))
    })
}
