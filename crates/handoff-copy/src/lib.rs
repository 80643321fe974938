//! Handoff copy primitive
//!
//! Copies files selected by an ordered glob instruction set from one
//! directory tree into an isomorphic layout under another. Copies only add
//! or overwrite; nothing is ever deleted from the destination.

pub mod copy;
pub mod error;
pub mod pattern;

pub use copy::{copy_tree, CopyReport};
pub use error::CopyError;
pub use pattern::{PatternMatcher, PatternSet, NEGATION_MARKER};
