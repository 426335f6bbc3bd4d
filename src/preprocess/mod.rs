//! Indentation preprocessing (`spec.md` §4.2).
//!
//! FlowScript source is written with Python-style significant indentation.
//! Before the grammar parser ever sees a token, this stage rewrites the
//! source into an equivalent form where every indented block is wrapped in
//! explicit `{` / `}` delimiters, and records a line map from the rewritten
//! text back to the original source so every downstream position is still
//! reportable to the author in terms of the file they wrote.

pub mod indentation;

pub use indentation::{preprocess, LineMap, PreprocessOptions, Preprocessed};
