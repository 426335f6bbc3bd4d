//! `alternatives(questionId, options)` (`spec.md` §4.5.5): compare the
//! options considered under a `question` node.

use crate::error::QueryError;
use crate::ir::{Ir, NodeType, RelationshipType, StateType};
use crate::query::index::Indexes;
use crate::query::what_if::{self, WhatIfOptions};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlternativesFormat {
    #[default]
    Comparison,
    Tree,
    Simple,
}

#[derive(Debug, Clone, Default)]
pub struct AlternativesOptions {
    pub format: AlternativesFormat,
    pub include_consequences: bool,
    pub show_rejected_reasons: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TensionRef {
    pub source: String,
    pub target: String,
    pub axis_label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlternativeItem {
    pub node_id: String,
    pub content: String,
    pub chosen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_on: Option<String>,
    pub tensions: Vec<TensionRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reasons: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionSummary {
    pub chosen: Option<String>,
    pub rationale: Option<String>,
    pub rejected: Vec<String>,
    pub key_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlternativeTreeNode {
    pub node_id: String,
    pub content: String,
    pub chosen: bool,
    pub children: Vec<AlternativeTreeNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "format")]
pub enum AlternativesResult {
    #[serde(rename = "comparison")]
    Comparison {
        question: String,
        alternatives: Vec<AlternativeItem>,
        decision_summary: DecisionSummary,
    },
    #[serde(rename = "tree")]
    Tree {
        question: String,
        alternatives: Vec<AlternativeTreeNode>,
    },
    #[serde(rename = "simple")]
    Simple {
        question: String,
        options_considered: Vec<String>,
        chosen: Option<String>,
        reason: Option<String>,
    },
}

/// Tensions touching `node_id` or any of its `causes` descendants.
fn tensions_in_scope<'a>(idx: &Indexes<'a>, node_id: &'a str) -> Vec<TensionRef> {
    let descendants: HashSet<&str> = what_if::descendants(idx, node_id, false, false, None)
        .into_iter()
        .map(|(id, _)| id)
        .chain(std::iter::once(node_id))
        .collect();
    idx.ir
        .relationships
        .iter()
        .filter(|r| r.rel_type == RelationshipType::Tension)
        .filter(|r| descendants.contains(r.source.as_str()) || descendants.contains(r.target.as_str()))
        .map(|r| TensionRef {
            source: r.source.clone(),
            target: r.target.clone(),
            axis_label: r.axis_label.clone(),
        })
        .collect()
}

/// Whether a `decided` state anywhere in the IR matches `alt_id` by node-id
/// or by content string (`spec.md` §4.5.5: either match counts).
fn decided_state_for<'a>(
    idx: &Indexes<'a>,
    alt_id: &str,
    alt_content: &str,
) -> Option<&'a crate::ir::State> {
    idx.ir.states.iter().find(|s| {
        s.state_type == StateType::Decided
            && (s.node_id == alt_id || idx.content_of(&s.node_id) == alt_content)
    })
}

fn rejection_reasons<'a>(idx: &Indexes<'a>, alt_id: &'a str) -> Vec<String> {
    what_if::descendants(idx, alt_id, false, false, None)
        .into_iter()
        .filter_map(|(id, _)| idx.node_by_id.get(id))
        .filter(|n| n.node_type == NodeType::Thought)
        .map(|n| n.content.clone())
        .collect()
}

fn build_tree<'a>(idx: &Indexes<'a>, alt_id: &'a str, visited: &mut HashSet<&'a str>) -> AlternativeTreeNode {
    let content = idx.content_of(alt_id);
    let chosen = decided_state_for(idx, alt_id, &content).is_some();
    let mut children = Vec::new();
    if visited.insert(alt_id) {
        for rel in idx.from_source.get(alt_id).into_iter().flatten() {
            if rel.rel_type == RelationshipType::Causes && !visited.contains(rel.target.as_str()) {
                children.push(build_tree(idx, rel.target.as_str(), visited));
            }
        }
    }
    AlternativeTreeNode {
        node_id: alt_id.to_string(),
        content,
        chosen,
        children,
    }
}

pub fn alternatives(
    ir: &Ir,
    question_id: &str,
    options: &AlternativesOptions,
) -> Result<AlternativesResult, QueryError> {
    let idx = Indexes::build(ir);
    let question = idx.node(question_id)?;
    if question.node_type != NodeType::Question {
        return Err(QueryError::WrongNodeType {
            id: question_id.to_string(),
            expected: "question".to_string(),
            found: question.node_type.as_str().to_string(),
        });
    }

    let alt_ids: Vec<&str> = idx
        .from_source
        .get(question_id)
        .into_iter()
        .flatten()
        .filter(|r| r.rel_type == RelationshipType::Alternative)
        .map(|r| r.target.as_str())
        .collect();

    match options.format {
        AlternativesFormat::Simple => {
            let mut chosen = None;
            let mut reason = None;
            let options_considered = alt_ids.iter().map(|&id| idx.content_of(id)).collect();
            for &id in &alt_ids {
                let content = idx.content_of(id);
                if let Some(state) = decided_state_for(&idx, id, &content) {
                    chosen = Some(content);
                    reason = state.fields.get("rationale").cloned();
                    break;
                }
            }
            Ok(AlternativesResult::Simple {
                question: question_id.to_string(),
                options_considered,
                chosen,
                reason,
            })
        }
        AlternativesFormat::Tree => {
            let mut visited = HashSet::new();
            let alternatives = alt_ids
                .iter()
                .map(|&id| build_tree(&idx, id, &mut visited))
                .collect();
            Ok(AlternativesResult::Tree {
                question: question_id.to_string(),
                alternatives,
            })
        }
        AlternativesFormat::Comparison => {
            let mut items = Vec::new();
            let mut chosen_content = None;
            let mut chosen_rationale = None;
            let mut rejected = Vec::new();
            let mut key_factors: Vec<String> = Vec::new();

            for &id in &alt_ids {
                let content = idx.content_of(id);
                let decided = decided_state_for(&idx, id, &content);
                let chosen = decided.is_some();
                let rationale = decided.and_then(|s| s.fields.get("rationale").cloned());
                let decided_on = decided.and_then(|s| s.fields.get("on").cloned());
                let tensions = tensions_in_scope(&idx, id);
                for t in &tensions {
                    if let Some(axis) = &t.axis_label {
                        if !key_factors.contains(axis) {
                            key_factors.push(axis.clone());
                        }
                    }
                }

                if chosen {
                    chosen_content = Some(content.clone());
                    chosen_rationale = rationale.clone();
                } else {
                    rejected.push(content.clone());
                }

                let consequences = options
                    .include_consequences
                    .then(|| match what_if::what_if(ir, id, &WhatIfOptions::default()) {
                        Ok(what_if::WhatIfResult::Tree { impact_tree, .. }) => {
                            impact_tree.direct.into_iter().chain(impact_tree.indirect).map(|n| n.content).collect()
                        }
                        _ => Vec::new(),
                    });
                let rejection_reasons_field = (options.show_rejected_reasons && !chosen)
                    .then(|| rejection_reasons(&idx, id));

                items.push(AlternativeItem {
                    node_id: id.to_string(),
                    content,
                    chosen,
                    rationale,
                    decided_on,
                    tensions,
                    consequences,
                    rejection_reasons: rejection_reasons_field,
                });
            }

            Ok(AlternativesResult::Comparison {
                question: question_id.to_string(),
                alternatives: items,
                decision_summary: DecisionSummary {
                    chosen: chosen_content,
                    rationale: chosen_rationale,
                    rejected,
                    key_factors,
                },
            })
        }
    }
}
