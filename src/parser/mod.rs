//! Grammar parser + post-processor (`spec.md` §4.3): turns preprocessed
//! source into a finished [`crate::ir::Ir`].

pub mod grammar;
pub mod postprocess;
pub mod state;

use crate::error::CompileError;
use crate::ir::Ir;
use crate::lexer::Scanner;
use crate::preprocess::{preprocess, PreprocessOptions};
use state::ParserState;

/// Options accepted by [`parse`] (`spec.md` §4.8 AMBIENT Configuration).
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub indent_size: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { indent_size: 2 }
    }
}

/// Preprocess, parse, and post-process `source` into an [`Ir`].
pub fn parse(
    source: &str,
    source_file: &str,
    options: CompileOptions,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Ir, CompileError> {
    let preprocessed = preprocess(
        source,
        PreprocessOptions {
            indent_size: options.indent_size,
        },
    )?;
    log::debug!(
        "preprocessed {} into {} lines",
        source_file,
        preprocessed.line_map.len()
    );

    let mut scanner = Scanner::new(&preprocessed.transformed_text, &preprocessed.line_map);
    let mut parser_state = ParserState::new(source_file, now);
    grammar::parse_document(&mut scanner, &mut parser_state)?;
    log::info!(
        "parsed {} into {} nodes, {} relationships",
        source_file,
        parser_state.nodes.len(),
        parser_state.relationships.len()
    );

    Ok(postprocess::finalize(parser_state, vec![source_file.to_string()]))
}
