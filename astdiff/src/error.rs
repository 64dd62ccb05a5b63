use facet::Facet;

/// Recoverable problems met while reconciling.
///
/// None of these abort the run: the affected class pair or refactoring is
/// skipped and the warning is recorded on the [`DiffSet`](crate::DiffSet).
#[derive(Facet, Debug, Clone, PartialEq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum ReconcileWarning {
    /// no syntax tree for {path}
    MissingTree { path: String },

    /// {refactoring}: expected exactly one code fragment, found {count}
    ExpectedSingleFragment { refactoring: String, count: usize },

    /// {refactoring}: no enhanced for statement among the code fragments
    MissingEnhancedFor { refactoring: String },

    /// {refactoring}: loop declares no variable named {name}
    UnknownLoopVariable { refactoring: String, name: String },

    /// enum constant {constant} has no anonymous class diff
    MissingAnonymousClassDiff { constant: String },
}
