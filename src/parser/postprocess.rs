//! Post-processing passes that turn parse-time bookkeeping into the final
//! IR (`spec.md` §4.3: state attachment, question→alternative linking,
//! hierarchical children).

use crate::ir::{envelope::IR_VERSION, Invariants, Ir, Metadata, NodeExt, NodeType, RelationshipType};
use crate::parser::state::ParserState;
use std::collections::HashMap;

/// Consume the accumulated parser state and produce the final [`Ir`].
/// Order matters: block `ext` must exist before hierarchical children reads
/// child lists; reused-marker children must be assigned before the
/// question/alternative pass, since that pass overwrites question children.
pub fn finalize(mut state: ParserState, source_files: Vec<String>) -> Ir {
    assign_block_ext(&mut state);
    graft_hierarchical_children(&mut state);
    assign_reused_marker_children(&mut state);
    link_questions_to_alternatives(&mut state);

    let states = state.resolve_states();

    Ir {
        version: IR_VERSION.to_string(),
        nodes: state.nodes,
        relationships: state.relationships,
        states,
        invariants: Invariants::default(),
        metadata: Metadata {
            source_files,
            parsed_at: state.now,
            parser: "flowscript".to_string(),
        },
    }
}

fn assign_block_ext(state: &mut ParserState) {
    let block_ids: Vec<String> = state
        .nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Block)
        .map(|n| n.id.clone())
        .collect();
    for id in block_ids {
        let children = state.block_children.get(&id).cloned().unwrap_or_default();
        let node = state.node_mut(&id).expect("block node must exist");
        let modifiers = node.modifiers.clone();
        node.ext = Some(NodeExt { children, modifiers });
    }
}

/// `spec.md` §4.3 "Hierarchical children". A block's own recorded
/// predecessor (the node that preceded it in its enclosing frame) always
/// immediately precedes the block's first child by construction, so using
/// the block's predecessor is equivalent to "the node immediately preceding
/// the first non-block child in source order".
///
/// The anonymous block node itself is pure indentation bookkeeping and is
/// never a meaningful query/linter result on its own, so it is also grafted
/// onto its predecessor's `children` alongside its non-block children —
/// otherwise it ends up referenced by nothing and the orphan-node rule
/// (E004) flags it.
fn graft_hierarchical_children(state: &mut ParserState) {
    let block_ids: Vec<String> = state
        .nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Block)
        .map(|n| n.id.clone())
        .collect();

    for block_id in block_ids {
        let Some(pred) = nearest_real_predecessor(state, &block_id) else {
            continue;
        };
        let non_block: Vec<String> = state
            .block_children
            .get(&block_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|c| state.node_type_of(c) != Some(NodeType::Block))
            .collect();
        if let Some(pred_node) = state.node_mut(&pred) {
            pred_node.children.push(block_id.clone());
            pred_node.children.extend(non_block);
        }
    }
}

/// Walk `id`'s predecessor chain past any further anonymous blocks (nested
/// indentation can wrap a block around another block with nothing real in
/// between) to the nearest non-block predecessor.
fn nearest_real_predecessor(state: &ParserState, id: &str) -> Option<String> {
    let mut current = state.predecessor.get(id).cloned()?;
    while state.node_type_of(&current) == Some(NodeType::Block) {
        current = state.predecessor.get(&current).cloned()?;
    }
    Some(current)
}

fn assign_reused_marker_children(state: &mut ParserState) {
    let owners: Vec<String> = state.reused_block_owners.iter().cloned().collect();
    for owner in owners {
        if state.node_type_of(&owner) == Some(NodeType::Question) {
            continue; // overwritten by the question/alternative pass below
        }
        let children = state.block_children.get(&owner).cloned().unwrap_or_default();
        if let Some(node) = state.node_mut(&owner) {
            node.children = children;
        }
    }
}

fn link_questions_to_alternatives(state: &mut ParserState) {
    let mut alt_map: HashMap<String, Vec<String>> = HashMap::new();
    let mut current_question: Option<String> = None;
    let mut alt_lines: HashMap<String, usize> = HashMap::new();

    for (id, line) in state.node_occurrences.clone() {
        match state.node_type_of(&id) {
            Some(NodeType::Question) => {
                current_question = Some(id.clone());
                alt_map.entry(id).or_default();
            }
            Some(NodeType::Alternative) => {
                if let Some(q) = &current_question {
                    let list = alt_map.entry(q.clone()).or_default();
                    if !list.contains(&id) {
                        list.push(id.clone());
                        alt_lines.insert(id, line);
                    }
                }
            }
            _ => {}
        }
    }

    for (question, alts) in alt_map {
        for alt in &alts {
            let line = alt_lines.get(alt).copied().unwrap_or(1);
            state.intern_relationship(
                RelationshipType::Alternative,
                question.clone(),
                alt.clone(),
                None,
                false,
                line,
            );
        }
        if let Some(q_node) = state.node_mut(&question) {
            q_node.children = alts;
        }
    }
}
