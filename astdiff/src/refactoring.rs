//! Detected refactorings, as a closed variant type.
//!
//! Each variant carries the structural elements it connects. Reconciliation
//! dispatches on the variant with one exhaustive `match`, so a new kind of
//! refactoring cannot be silently ignored.

use smallvec::{SmallVec, smallvec};

use crate::model::{Attribute, BodyMapper, CodeFragment, Operation, VariableDeclaration};

/// An operation that moved to another class, possibly in another file.
#[derive(Debug, Clone, Default)]
pub struct OperationMove {
    pub original: Operation,
    pub moved: Operation,
    pub body_mapper: BodyMapper,
}

/// An attribute that moved to another class, possibly in another file.
#[derive(Debug, Clone, Default)]
pub struct AttributeMove {
    pub original: Attribute,
    pub moved: Attribute,
}

/// A method extracted from, or inlined into, an existing operation. The body
/// mapper pairs statements of the source operation with the other method.
#[derive(Debug, Clone, Default)]
pub struct OperationBody {
    pub body_mapper: BodyMapper,
}

#[derive(Debug, Clone, Default)]
pub struct AttributeRename {
    pub original: Attribute,
    pub renamed: Attribute,
}

/// Names of the classes a statement-level refactoring happened in.
#[derive(Debug, Clone, Default)]
pub struct InvolvedClasses {
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Default)]
pub struct VariableMerge {
    pub merged: Vec<VariableDeclaration>,
    pub new_variable: VariableDeclaration,
    pub classes: InvolvedClasses,
}

#[derive(Debug, Clone, Default)]
pub struct VariableSplit {
    pub old_variable: VariableDeclaration,
    pub split: Vec<VariableDeclaration>,
    pub classes: InvolvedClasses,
}

#[derive(Debug, Clone, Default)]
pub struct ConditionalSplit {
    pub original: CodeFragment,
    pub split: Vec<CodeFragment>,
    pub classes: InvolvedClasses,
}

/// Several fragments merged into one: conditionals or catch clauses.
#[derive(Debug, Clone, Default)]
pub struct FragmentMerge {
    pub merged: Vec<CodeFragment>,
    pub new: CodeFragment,
    pub classes: InvolvedClasses,
}

/// A loop replaced by a stream pipeline, or the reverse.
#[derive(Debug, Clone, Default)]
pub struct LoopRewrite {
    pub fragments_before: Vec<CodeFragment>,
    pub fragments_after: Vec<CodeFragment>,
    pub classes: InvolvedClasses,
}

#[derive(Debug, Clone, Default)]
pub struct VariableExtraction {
    pub variable: VariableDeclaration,
    pub classes: InvolvedClasses,
}

#[derive(Debug, Clone)]
pub enum Refactoring {
    MoveOperation(OperationMove),
    PullUpOperation(OperationMove),
    PushDownOperation(OperationMove),
    MoveAttribute(AttributeMove),
    PullUpAttribute(AttributeMove),
    PushDownAttribute(AttributeMove),
    ExtractOperation(OperationBody),
    InlineOperation(OperationBody),
    RenameAttribute(AttributeRename),
    MergeVariable(VariableMerge),
    SplitVariable(VariableSplit),
    SplitConditional(ConditionalSplit),
    MergeConditional(FragmentMerge),
    MergeCatch(FragmentMerge),
    ReplaceLoopWithPipeline(LoopRewrite),
    ReplacePipelineWithLoop(LoopRewrite),
    ExtractVariable(VariableExtraction),
}

impl Refactoring {
    /// Display name, as refactoring detectors report it.
    pub fn name(&self) -> &'static str {
        match self {
            Refactoring::MoveOperation(_) => "Move Method",
            Refactoring::PullUpOperation(_) => "Pull Up Method",
            Refactoring::PushDownOperation(_) => "Push Down Method",
            Refactoring::MoveAttribute(_) => "Move Attribute",
            Refactoring::PullUpAttribute(_) => "Pull Up Attribute",
            Refactoring::PushDownAttribute(_) => "Push Down Attribute",
            Refactoring::ExtractOperation(_) => "Extract Method",
            Refactoring::InlineOperation(_) => "Inline Method",
            Refactoring::RenameAttribute(_) => "Rename Attribute",
            Refactoring::MergeVariable(_) => "Merge Variable",
            Refactoring::SplitVariable(_) => "Split Variable",
            Refactoring::SplitConditional(_) => "Split Conditional",
            Refactoring::MergeConditional(_) => "Merge Conditional",
            Refactoring::MergeCatch(_) => "Merge Catch",
            Refactoring::ReplaceLoopWithPipeline(_) => "Replace Loop With Pipeline",
            Refactoring::ReplacePipelineWithLoop(_) => "Replace Pipeline With Loop",
            Refactoring::ExtractVariable(_) => "Extract Variable",
        }
    }

    /// Classes touched in the old version.
    pub fn classes_before(&self) -> SmallVec<[&str; 2]> {
        match self {
            Refactoring::MoveOperation(m)
            | Refactoring::PullUpOperation(m)
            | Refactoring::PushDownOperation(m) => smallvec![m.original.class_name.as_str()],
            Refactoring::MoveAttribute(m)
            | Refactoring::PullUpAttribute(m)
            | Refactoring::PushDownAttribute(m) => smallvec![m.original.class_name.as_str()],
            Refactoring::ExtractOperation(b) | Refactoring::InlineOperation(b) => {
                smallvec![b.body_mapper.container1.class_name()]
            }
            Refactoring::RenameAttribute(r) => smallvec![r.original.class_name.as_str()],
            Refactoring::MergeVariable(VariableMerge { classes, .. })
            | Refactoring::SplitVariable(VariableSplit { classes, .. })
            | Refactoring::SplitConditional(ConditionalSplit { classes, .. })
            | Refactoring::MergeConditional(FragmentMerge { classes, .. })
            | Refactoring::MergeCatch(FragmentMerge { classes, .. })
            | Refactoring::ReplaceLoopWithPipeline(LoopRewrite { classes, .. })
            | Refactoring::ReplacePipelineWithLoop(LoopRewrite { classes, .. })
            | Refactoring::ExtractVariable(VariableExtraction { classes, .. }) => {
                smallvec![classes.before.as_str()]
            }
        }
    }

    /// Classes touched in the new version.
    pub fn classes_after(&self) -> SmallVec<[&str; 2]> {
        match self {
            Refactoring::MoveOperation(m)
            | Refactoring::PullUpOperation(m)
            | Refactoring::PushDownOperation(m) => smallvec![m.moved.class_name.as_str()],
            Refactoring::MoveAttribute(m)
            | Refactoring::PullUpAttribute(m)
            | Refactoring::PushDownAttribute(m) => smallvec![m.moved.class_name.as_str()],
            Refactoring::ExtractOperation(b) | Refactoring::InlineOperation(b) => {
                smallvec![b.body_mapper.container2.class_name()]
            }
            Refactoring::RenameAttribute(r) => smallvec![r.renamed.class_name.as_str()],
            Refactoring::MergeVariable(VariableMerge { classes, .. })
            | Refactoring::SplitVariable(VariableSplit { classes, .. })
            | Refactoring::SplitConditional(ConditionalSplit { classes, .. })
            | Refactoring::MergeConditional(FragmentMerge { classes, .. })
            | Refactoring::MergeCatch(FragmentMerge { classes, .. })
            | Refactoring::ReplaceLoopWithPipeline(LoopRewrite { classes, .. })
            | Refactoring::ReplacePipelineWithLoop(LoopRewrite { classes, .. })
            | Refactoring::ExtractVariable(VariableExtraction { classes, .. }) => {
                smallvec![classes.after.as_str()]
            }
        }
    }

    /// Whether the refactoring links elements across class boundaries and is
    /// handled at project level rather than by one class pair.
    pub fn is_cross_class(&self) -> bool {
        matches!(
            self,
            Refactoring::MoveOperation(_)
                | Refactoring::PullUpOperation(_)
                | Refactoring::PushDownOperation(_)
                | Refactoring::MoveAttribute(_)
                | Refactoring::PullUpAttribute(_)
                | Refactoring::PushDownAttribute(_)
        )
    }
}
