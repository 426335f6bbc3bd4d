//! FlowScript: a thought-graph markup language, compiled to a
//! content-addressed intermediate representation, linted for semantic
//! consistency, and queried with graph traversals (`spec.md` §1-§2).
//!
//! ```text
//! source text ──▶ preprocess ──▶ parser ──▶ ir
//!                                            │
//!                                   ┌────────┴────────┐
//!                                   ▼                 ▼
//!                                linter           query engine
//! ```
//!
//! [`compile`] runs the full pipeline (preprocessing, parsing,
//! post-processing, and linting) in one call; the stage modules are public
//! for callers that need only part of it (e.g. parsing without linting).

pub mod error;
pub mod hash;
pub mod ir;
pub mod lexer;
pub mod linter;
pub mod parser;
pub mod preprocess;
pub mod query;

pub use error::CompileError;
pub use ir::Ir;
pub use linter::Diagnostic;
pub use parser::CompileOptions;

/// Parse `source` and lint the result in one step (`spec.md` §2 pipeline).
///
/// This is the entry point most callers want; it is equivalent to
/// [`parser::parse`] followed by [`linter::lint_and_annotate`].
pub fn compile(
    source: &str,
    source_file: &str,
    options: CompileOptions,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(Ir, Vec<Diagnostic>), CompileError> {
    let ir = parser::parse(source, source_file, options, now)?;
    Ok(linter::lint_and_annotate(ir))
}
