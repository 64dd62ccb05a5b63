//! Extra alignment injected per detected refactoring.
//!
//! Each handler takes its file pair from the locations inside the refactoring
//! payload, so a move between files lands in the store of that file pair.

use arbor::{NodeId, SyntaxTree, kinds, locate};

use super::{Endpoints, Reconciler};
use crate::error::ReconcileWarning;
use crate::matchers::CompositeMatcher;
use crate::model::{CodeFragment, Location, VariableDeclaration};
use crate::refactoring::{
    AttributeMove, AttributeRename, ConditionalSplit, FragmentMerge, LoopRewrite, OperationBody,
    OperationMove, Refactoring, VariableMerge, VariableSplit,
};

/// Which side of a loop rewrite holds the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopSide {
    Before,
    After,
}

impl<'a> Reconciler<'a> {
    pub(super) fn apply_refactoring(&mut self, refactoring: &'a Refactoring) -> Result<(), ReconcileWarning> {
        trace!(
            refactoring = refactoring.name(),
            cross_class = refactoring.is_cross_class(),
            before = ?refactoring.classes_before(),
            after = ?refactoring.classes_after(),
            "applying override"
        );
        match refactoring {
            Refactoring::MoveOperation(m) | Refactoring::PullUpOperation(m) | Refactoring::PushDownOperation(m) => {
                self.move_operation(m)
            }
            Refactoring::MoveAttribute(m) | Refactoring::PullUpAttribute(m) | Refactoring::PushDownAttribute(m) => {
                self.move_attribute(m)
            }
            Refactoring::ExtractOperation(b) | Refactoring::InlineOperation(b) => self.operation_body(b),
            Refactoring::RenameAttribute(r) => self.rename_attribute(r),
            Refactoring::MergeVariable(m) => self.merge_variable(m),
            Refactoring::SplitVariable(s) => self.split_variable(s),
            Refactoring::SplitConditional(s) => self.split_conditional(s),
            Refactoring::MergeConditional(m) | Refactoring::MergeCatch(m) => self.merge_fragments(m),
            Refactoring::ReplaceLoopWithPipeline(r) => self.rewrite_loop(refactoring.name(), r, LoopSide::Before),
            Refactoring::ReplacePipelineWithLoop(r) => self.rewrite_loop(refactoring.name(), r, LoopSide::After),
            // Nothing to add beyond the statement mappings already made.
            Refactoring::ExtractVariable(_) => Ok(()),
        }
    }

    fn endpoints_of(&self, before: &'a Location, after: &'a Location) -> Result<Endpoints<'a>, ReconcileWarning> {
        self.endpoints(&before.file, &after.file)
    }

    fn move_operation(&mut self, m: &'a OperationMove) -> Result<(), ReconcileWarning> {
        let ends = self.endpoints_of(&m.original.location, &m.moved.location)?;
        debug!(
            from = ends.src_path,
            to = ends.dst_path,
            operation = %m.original.name,
            "aligning moved operation"
        );
        self.process_method(ends, &m.body_mapper);
        Ok(())
    }

    fn move_attribute(&mut self, m: &'a AttributeMove) -> Result<(), ReconcileWarning> {
        let ends = self.endpoints_of(&m.original.location, &m.moved.location)?;
        self.process_field(ends, &m.original, &m.moved);
        Ok(())
    }

    fn operation_body(&mut self, b: &'a OperationBody) -> Result<(), ReconcileWarning> {
        let mapper = &b.body_mapper;
        let ends = self.endpoints_of(mapper.container1.location(), mapper.container2.location())?;
        self.process_body(ends, mapper);
        Ok(())
    }

    fn rename_attribute(&mut self, r: &'a AttributeRename) -> Result<(), ReconcileWarning> {
        let ends = self.endpoints_of(&r.original.location, &r.renamed.location)?;
        self.process_field(ends, &r.original, &r.renamed);
        Ok(())
    }

    fn merge_variable(&mut self, m: &'a VariableMerge) -> Result<(), ReconcileWarning> {
        for merged in &m.merged {
            let ends = self.endpoints_of(&merged.location, &m.new_variable.location)?;
            self.match_variable_parts(ends, merged, &m.new_variable);
        }
        Ok(())
    }

    fn split_variable(&mut self, s: &'a VariableSplit) -> Result<(), ReconcileWarning> {
        for split in &s.split {
            let ends = self.endpoints_of(&s.old_variable.location, &split.location)?;
            self.match_variable_parts(ends, &s.old_variable, split);
        }
        Ok(())
    }

    /// Map the type node and the name leaf of two declarations, each on its own.
    fn match_variable_parts(&mut self, ends: Endpoints<'a>, before: &'a VariableDeclaration, after: &'a VariableDeclaration) {
        if let (Some(t1), Some(t2)) = (&before.type_, &after.type_)
            && let Some((s, d)) = ends.resolve_pair(&t1.location, &t2.location)
        {
            self.add_pair(ends, s, d);
        }
        if let Some((s, d)) = ends.resolve_pair(&before.location, &after.location)
            && let Some(pair) = variable_name(ends.src(), s).zip(variable_name(ends.dst(), d))
        {
            self.add_pair(ends, pair.0, pair.1);
        }
    }

    fn split_conditional(&mut self, s: &'a ConditionalSplit) -> Result<(), ReconcileWarning> {
        for split in &s.split {
            self.align_composite(&s.original, split)?;
        }
        Ok(())
    }

    fn merge_fragments(&mut self, m: &'a FragmentMerge) -> Result<(), ReconcileWarning> {
        for merged in &m.merged {
            self.align_composite(merged, &m.new)?;
        }
        Ok(())
    }

    fn align_composite(&mut self, before: &'a CodeFragment, after: &'a CodeFragment) -> Result<(), ReconcileWarning> {
        let ends = self.endpoints_of(&before.location, &after.location)?;
        if let Some((s, d)) = ends.resolve_pair(&before.location, &after.location) {
            let matcher = CompositeMatcher::new(&self.config.matching);
            matcher.align(ends.trees, s, d, self.store(ends));
        }
        Ok(())
    }

    /// Link lambda parameters to the loop variables they replace, then the
    /// loop statement to the pipeline statement.
    ///
    /// The pipeline side must be a single fragment and the loop side must
    /// contain an enhanced for statement. Going from loop to pipeline, every
    /// lambda parameter must name a loop variable.
    fn rewrite_loop(
        &mut self,
        name: &'static str,
        r: &'a LoopRewrite,
        loop_side: LoopSide,
    ) -> Result<(), ReconcileWarning> {
        let (loop_fragments, pipeline_fragments) = match loop_side {
            LoopSide::Before => (&r.fragments_before, &r.fragments_after),
            LoopSide::After => (&r.fragments_after, &r.fragments_before),
        };
        let [pipeline] = pipeline_fragments.as_slice() else {
            return Err(ReconcileWarning::ExpectedSingleFragment {
                refactoring: name.to_owned(),
                count: pipeline_fragments.len(),
            });
        };
        let versions = match loop_side {
            LoopSide::Before => self.before,
            LoopSide::After => self.after,
        };
        let enhanced_for = loop_fragments
            .iter()
            .find(|f| {
                versions
                    .get(&f.location.file)
                    .and_then(|tree| f.location.resolve(tree).map(|n| tree.kind(n)))
                    .is_some_and(|kind| kind == kinds::ENHANCED_FOR_STATEMENT)
            })
            .ok_or_else(|| ReconcileWarning::MissingEnhancedFor {
                refactoring: name.to_owned(),
            })?;

        let mut pairs = Vec::new();
        for parameter in pipeline.lambdas.iter().flat_map(|l| &l.parameters) {
            match enhanced_for.variable(&parameter.name) {
                Some(variable) => pairs.push((variable, parameter)),
                None if loop_side == LoopSide::Before => {
                    return Err(ReconcileWarning::UnknownLoopVariable {
                        refactoring: name.to_owned(),
                        name: parameter.name.clone(),
                    });
                }
                None => trace!(parameter = %parameter.name, "no loop variable for lambda parameter"),
            }
        }

        let (before, after) = match loop_side {
            LoopSide::Before => (enhanced_for, pipeline),
            LoopSide::After => (pipeline, enhanced_for),
        };
        let ends = self.endpoints_of(&before.location, &after.location)?;
        let matcher = self.leaf_matcher(false);
        for (variable, parameter) in pairs {
            let (src_var, dst_var) = match loop_side {
                LoopSide::Before => (variable, parameter),
                LoopSide::After => (parameter, variable),
            };
            if let Some((s, d)) = ends.resolve_pair(&src_var.location, &dst_var.location) {
                matcher.align(ends.trees, s, d, self.store(ends));
            }
        }
        if let Some((s, d)) = ends.resolve_pair(&before.location, &after.location) {
            self.add_pair(ends, s, d);
        }
        Ok(())
    }
}

/// The name leaf of a variable declaration: its first simple name child,
/// or its last child when it has none.
fn variable_name(tree: &SyntaxTree, declaration: NodeId) -> Option<NodeId> {
    locate::find_child_by_kind(tree, declaration, kinds::SIMPLE_NAME).or_else(|| {
        let count = tree.child_count(declaration);
        count.checked_sub(1).and_then(|last| tree.child(declaration, last))
    })
}
