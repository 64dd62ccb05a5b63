//! # Arbor
//!
//! Arena syntax trees and the node-level relations built on top of them.
//!
//! - [`SyntaxTree`]: a typed, positioned, ordered tree per file version, with
//!   Merkle hashes for exact and shape-only comparison
//! - [`locate`]: byte range (plus optional kind hint) to node resolution
//! - [`MultiMappingStore`]: a many-to-many relation between two trees
//! - [`align_subtrees`]: GumTree-style alignment of two corresponding subtrees
//! - [`sexp`]: a compact text form for building and dumping trees
//!
//! ## Usage
//!
//! ```
//! use arbor::{MultiMappingStore, MatchingConfig, align_subtrees, sexp};
//!
//! let before = sexp::parse("(Block (ReturnStatement SimpleName:a))").unwrap();
//! let after = sexp::parse("(Block (ReturnStatement SimpleName:b))").unwrap();
//!
//! let matching = align_subtrees(&before, &after, before.root, after.root, &MatchingConfig::default());
//! let mut store = MultiMappingStore::new();
//! store.extend(matching.pairs());
//! assert_eq!(store.len(), 3);
//! ```

#[macro_use]
mod tracing_macros;

pub mod kinds;
pub mod locate;
pub mod matching;
pub mod sexp;
pub mod store;
pub mod tree;

pub use indextree;
pub use indextree::NodeId;

pub use matching::{Matching, MatchingConfig, align_subtrees};
pub use sexp::SexpError;
pub use store::MultiMappingStore;
pub use tree::{NodeData, NodeHash, Span, SyntaxTree, is_isomorphic, is_iso_structural};
