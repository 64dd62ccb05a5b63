//! # Astdiff
//!
//! Refactoring-aware reconciliation of two versions of a codebase into
//! node-level mappings between their syntax trees.
//!
//! A structural model (classes, members, statements) and a list of detected
//! refactorings say *what* corresponds across versions. This crate turns
//! those correspondences into concrete node pairs, one
//! [`MultiMappingStore`](arbor::MultiMappingStore) per file pair, ready for an
//! edit-script generator.
//!
//! ## Passes
//!
//! For every matched class pair, in order:
//!
//! 1. package declaration and common imports
//! 2. enum constants and their class bodies
//! 3. class header, attributes
//! 4. methods: signature anchors, parameters, statements
//! 5. refactoring overrides
//! 6. deferred expression-level mappings
//!
//! Moves, pull-ups and push-downs cross class boundaries and are applied once
//! for the whole project, after every class pair.
//!
//! ## Usage
//!
//! ```
//! use astdiff::{ModelDiff, ProjectDiffer, VersionTrees, arbor::sexp};
//!
//! let mut model = ModelDiff::default();
//! model.before = VersionTrees::from_iter([("A.java", sexp::parse("CompilationUnit").unwrap())]);
//! model.after = VersionTrees::from_iter([("A.java", sexp::parse("CompilationUnit").unwrap())]);
//!
//! let differ = ProjectDiffer::new(&model);
//! let diffs = differ.diff();
//! assert!(diffs.is_empty());
//! ```

#[macro_use]
mod tracing_macros;

pub mod config;
pub mod diff;
pub mod error;
pub mod matchers;
pub mod model;
pub mod project;
pub mod reconcile;
pub mod refactoring;

pub use arbor;

pub use config::ReconcileConfig;
pub use diff::{AstDiff, DiffSet, FileSummary};
pub use error::ReconcileWarning;
pub use matchers::{CompositeMatcher, LeafMatcher, Trees};
pub use model::{
    AnonymousClassDiff, Attribute, BodyMapper, ClassDescriptor, ClassKind, ClassPairDiff,
    CodeFragment, CodeMapping, Container, EnumConstant, EnumConstantDiff, Initializer, Javadoc,
    LambdaExpression, Location, MappingKind, ModelDiff, Modifiers, Operation,
    OperationSignatureDiff, TypeRef, VariableDeclaration, VersionTrees, Visibility,
};
pub use project::ProjectDiffer;
pub use reconcile::{Outcome, Reconciler};
pub use refactoring::Refactoring;
