//! Recursive-descent semantic actions building IR directly from the scanner
//! (`spec.md` §4.3). Each function corresponds to one grammar production and
//! mutates the threaded [`ParserState`] rather than returning an AST.

use crate::error::ParseError;
use crate::ir::{Modifier, NodeType, RelationshipType};
use crate::lexer::scanner::node_type_for_marker;
use crate::lexer::{RelOp, Scanner};
use crate::parser::state::ParserState;
use std::collections::BTreeSet;

/// Parse an entire (already preprocessed) document.
pub fn parse_document(scanner: &mut Scanner, state: &mut ParserState) -> Result<(), ParseError> {
    parse_lines(scanner, state, false)
}

fn parse_lines(
    scanner: &mut Scanner,
    state: &mut ParserState,
    stop_at_rbrace: bool,
) -> Result<(), ParseError> {
    loop {
        scanner.skip_separators();
        if scanner.at_eof() {
            break;
        }
        if stop_at_rbrace && scanner.peek() == Some('}') {
            break;
        }
        parse_line(scanner, state)?;
    }
    Ok(())
}

fn line_is_over(scanner: &Scanner) -> bool {
    scanner.at_eof() || matches!(scanner.peek(), Some('\n') | Some('\r') | Some(';') | Some('}'))
}

fn parse_line(scanner: &mut Scanner, state: &mut ParserState) -> Result<(), ParseError> {
    let line = scanner.position().line;
    let mut modifiers = BTreeSet::new();
    while let Some(m) = scanner.consume_modifier() {
        modifiers.insert(m);
    }

    if let Some((state_type, fields)) = scanner.consume_state_marker()? {
        state.push_pending_state(state_type, fields, line);
        scanner.skip_inline_whitespace();
        if !line_is_over(scanner) {
            parse_remaining_content(scanner, state, modifiers, line)?;
        }
        return Ok(());
    }

    parse_remaining_content(scanner, state, modifiers, line)
}

fn parse_remaining_content(
    scanner: &mut Scanner,
    state: &mut ParserState,
    modifiers: BTreeSet<Modifier>,
    line: usize,
) -> Result<(), ParseError> {
    if let Some(marker) = scanner.consume_content_marker() {
        parse_marker_line(scanner, state, marker, modifiers, line)
    } else {
        parse_relationship_expression(scanner, state, modifiers, line)
    }
}

/// `marker TEXT Block? ContinuationRel*` (`spec.md` §4.3).
fn parse_marker_line(
    scanner: &mut Scanner,
    state: &mut ParserState,
    marker: crate::lexer::ContentMarker,
    modifiers: BTreeSet<Modifier>,
    line: usize,
) -> Result<(), ParseError> {
    let node_type = node_type_for_marker(&marker);
    let text = scanner.read_text_segment();
    let id = state.intern_node(node_type, text, modifiers, line);
    state.record_line_result(id.clone());

    scanner.skip_inline_whitespace();
    if scanner.peek() == Some('{') {
        state.reused_block_owners.insert(id.clone());
        parse_braced_content(scanner, state, Some(id.clone()))?;
    }

    parse_continuation_chain(scanner, state, id, line)
}

/// Consume `ContinuationRel*` from `source`, threading the chain tail.
fn parse_continuation_chain(
    scanner: &mut Scanner,
    state: &mut ParserState,
    mut source: String,
    line: usize,
) -> Result<(), ParseError> {
    loop {
        let Some(rel_op) = scanner.peek_rel_op() else {
            break;
        };
        let target = parse_rel_node(scanner, state, line)?;
        emit_relationship(state, &rel_op, source.clone(), target.clone(), line);
        state.record_line_result(target.clone());
        source = target;
    }
    Ok(())
}

/// `'{' BlockContent? '}'` attached to `owner` (`None` only for an anonymous
/// block's own frame is never the case here; callers always know an owner —
/// see [`parse_block`] for the node-creating variant).
fn parse_braced_content(
    scanner: &mut Scanner,
    state: &mut ParserState,
    owner: Option<String>,
) -> Result<(), ParseError> {
    if !scanner.consume_lbrace() {
        return Err(ParseError::new(scanner.position(), "expected '{'"));
    }
    state.push_frame(owner);
    parse_lines(scanner, state, true)?;
    state.pop_frame();
    if !scanner.consume_rbrace() {
        return Err(ParseError::new(scanner.position(), "expected '}'"));
    }
    Ok(())
}

/// A `Block` used as its own `RelNode`/line content: creates the anonymous
/// `block` node up front (its identity needs no content beyond its
/// modifiers) and parses its content into that node's frame.
fn parse_block(
    scanner: &mut Scanner,
    state: &mut ParserState,
    modifiers: BTreeSet<Modifier>,
    line: usize,
) -> Result<String, ParseError> {
    if scanner.peek() != Some('{') {
        return Err(ParseError::new(scanner.position(), "expected '{'"));
    }
    let block_id = state.intern_node(NodeType::Block, "", modifiers, line);
    parse_braced_content(scanner, state, Some(block_id.clone()))?;
    Ok(block_id)
}

/// `RelationshipExpression := RelNode (RelOp RelNode)*`, including the
/// owner-less `ContinuationRel`-only form (no leading `RelNode`).
fn parse_relationship_expression(
    scanner: &mut Scanner,
    state: &mut ParserState,
    modifiers: BTreeSet<Modifier>,
    line: usize,
) -> Result<(), ParseError> {
    scanner.skip_inline_whitespace();

    let source = if scanner.peek() == Some('{') {
        let block_id = parse_block(scanner, state, modifiers, line)?;
        state.record_line_result(block_id.clone());
        block_id
    } else {
        let text = scanner.read_text_segment();
        if !text.is_empty() {
            let id = state.intern_node(NodeType::Statement, text, modifiers, line);
            state.record_line_result(id.clone());
            id
        } else {
            resolve_implicit_source(state).ok_or_else(|| {
                ParseError::new(
                    scanner.position(),
                    "relationship operator with no preceding node",
                )
            })?
        }
    };

    parse_continuation_chain(scanner, state, source, line)
}

/// Source for an owner-less `ContinuationRel`: the last node completed in
/// this frame, or — when nothing has been parsed in this frame yet because
/// indentation wrapped the continuation in its own nested anonymous block —
/// the node that block itself continues from (walking past further
/// anonymous blocks if indentation nested more than one level deep).
fn resolve_implicit_source(state: &ParserState) -> Option<String> {
    if let Some(last) = state.current_last_node() {
        return Some(last);
    }
    let mut current = state.current_owner()?;
    while state.node_type_of(&current) == Some(NodeType::Block) {
        current = state.predecessor.get(&current).cloned()?;
    }
    Some(current)
}

fn parse_rel_node(
    scanner: &mut Scanner,
    state: &mut ParserState,
    line: usize,
) -> Result<String, ParseError> {
    scanner.skip_inline_whitespace();
    if scanner.peek() == Some('{') {
        return parse_block(scanner, state, BTreeSet::new(), line);
    }
    let text = scanner.read_text_segment();
    if text.is_empty() {
        return Err(ParseError::new(
            scanner.position(),
            "expected relationship operand",
        ));
    }
    Ok(state.intern_node(NodeType::Statement, text, BTreeSet::new(), line))
}

/// Build the relationship for one `RelOp` application (`spec.md` §4.3
/// "Relationship construction and orientation").
fn emit_relationship(
    state: &mut ParserState,
    rel_op: &RelOp,
    source: String,
    target: String,
    line: usize,
) {
    match rel_op {
        RelOp::Bidirectional => {
            state.intern_relationship(
                RelationshipType::Bidirectional,
                source,
                target,
                None,
                true,
                line,
            );
        }
        RelOp::Tension(axis) => {
            state.intern_relationship(
                RelationshipType::Tension,
                source,
                target,
                axis.clone(),
                false,
                line,
            );
        }
        other => {
            state.intern_relationship(
                other.relationship_type(),
                source,
                target,
                None,
                false,
                line,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeType;
    use crate::preprocess::{preprocess, PreprocessOptions};
    use chrono::Utc;

    fn parse_source(src: &str) -> ParserState {
        let pre = preprocess(src, PreprocessOptions::default()).unwrap();
        let mut scanner = Scanner::new(&pre.transformed_text, &pre.line_map);
        let mut state = ParserState::new("test.flow", Utc::now());
        parse_document(&mut scanner, &mut state).unwrap();
        state
    }

    #[test]
    fn causal_chain_produces_three_nodes_two_edges() {
        let state = parse_source("A -> B -> C");
        assert_eq!(state.nodes.len(), 3);
        assert_eq!(state.relationships.len(), 2);
        assert!(state
            .nodes
            .iter()
            .all(|n| n.node_type == NodeType::Statement));
    }

    #[test]
    fn unlabeled_tension_has_null_axis() {
        let state = parse_source("speed >< quality");
        assert_eq!(state.relationships.len(), 1);
        assert_eq!(state.relationships[0].axis_label, None);
    }

    #[test]
    fn bidirectional_edges_are_marked_feedback() {
        let state = parse_source("A <-> B\nB -> C");
        let bidi = state
            .relationships
            .iter()
            .find(|r| r.rel_type == RelationshipType::Bidirectional)
            .unwrap();
        assert!(bidi.feedback);
    }

    #[test]
    fn repeated_content_dedupes_to_one_node() {
        let state = parse_source("A -> B\nA -> C");
        let a_count = state.nodes.iter().filter(|n| n.content == "A").count();
        assert_eq!(a_count, 1);
    }

    /// A `ContinuationRel` wrapped in its own indentation-driven anonymous
    /// block must still attribute its source to the alternative it follows,
    /// not to that anonymous block.
    #[test]
    fn indented_continuation_under_alternative_attaches_to_alternative() {
        let state = parse_source("|| JWT tokens\n   -> stateless");
        let jwt = state.nodes.iter().find(|n| n.content == "JWT tokens").unwrap();
        let causes: Vec<_> = state
            .relationships
            .iter()
            .filter(|r| r.rel_type == RelationshipType::Causes)
            .collect();
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0].source, jwt.id);
        assert!(!state.nodes.iter().any(|n| n.node_type == NodeType::Block && n.id == causes[0].source));
    }
}
