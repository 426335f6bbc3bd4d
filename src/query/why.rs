//! `why(nodeId, options)` (`spec.md` §4.5.1): backward traversal over
//! `derives_from` and `causes` (optionally `equivalent`) edges — the causal
//! mirror of `what_if`'s forward traversal.

use crate::error::QueryError;
use crate::ir::{Ir, RelationshipType};
use crate::query::index::Indexes;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhyFormat {
    #[default]
    Chain,
    Minimal,
}

#[derive(Debug, Clone, Default)]
pub struct WhyOptions {
    pub format: WhyFormat,
    pub max_depth: Option<usize>,
    pub include_equivalent: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhyStep {
    pub node_id: String,
    pub content: String,
    pub depth: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhyMetadata {
    pub ancestor_count: usize,
    pub has_multiple_paths: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "format")]
pub enum WhyResult {
    #[serde(rename = "chain")]
    Chain {
        target: String,
        causal_chain: Vec<WhyStep>,
        root_cause: String,
        metadata: WhyMetadata,
    },
    #[serde(rename = "minimal")]
    Minimal { root_cause: String, chain: Vec<String> },
}

pub fn why(ir: &Ir, node_id: &str, options: &WhyOptions) -> Result<WhyResult, QueryError> {
    let idx = Indexes::build(ir);
    idx.node(node_id)?;

    let mut depth_of: HashMap<&str, usize> = HashMap::new();
    let mut reach_count: HashMap<&str, u32> = HashMap::new();
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();

    depth_of.insert(node_id, 0);
    queue.push_back((node_id, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if options.max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        for rel in idx.from_source.get(current).into_iter().flatten() {
            let follows = rel.rel_type == RelationshipType::DerivesFrom
                || (options.include_equivalent && rel.rel_type == RelationshipType::Equivalent);
            if !follows {
                continue;
            }
            let next = rel.target.as_str();
            *reach_count.entry(next).or_insert(0) += 1;
            if !depth_of.contains_key(next) {
                depth_of.insert(next, depth + 1);
                order.push((next, depth + 1));
                queue.push_back((next, depth + 1));
            }
        }
        // `causes`/`equivalent` point the other way: their source is the
        // cause, so walking backward to an ancestor means following
        // `to_target` and stepping to `rel.source`.
        for rel in idx.to_target.get(current).into_iter().flatten() {
            let follows = (rel.rel_type == RelationshipType::Causes && !rel.feedback)
                || (options.include_equivalent && rel.rel_type == RelationshipType::Equivalent);
            if !follows {
                continue;
            }
            let next = rel.source.as_str();
            *reach_count.entry(next).or_insert(0) += 1;
            if !depth_of.contains_key(next) {
                depth_of.insert(next, depth + 1);
                order.push((next, depth + 1));
                queue.push_back((next, depth + 1));
            }
        }
    }

    let root_cause_id = order
        .iter()
        .max_by_key(|(_, depth)| *depth)
        .map(|(id, _)| *id)
        .unwrap_or(node_id);
    let has_multiple_paths = reach_count.values().any(|&count| count > 1);

    match options.format {
        WhyFormat::Chain => {
            let causal_chain = order
                .iter()
                .map(|&(id, depth)| WhyStep {
                    node_id: id.to_string(),
                    content: idx.content_of(id),
                    depth,
                })
                .collect();
            Ok(WhyResult::Chain {
                target: node_id.to_string(),
                causal_chain,
                root_cause: idx.content_of(root_cause_id),
                metadata: WhyMetadata {
                    ancestor_count: order.len(),
                    has_multiple_paths,
                },
            })
        }
        WhyFormat::Minimal => Ok(WhyResult::Minimal {
            root_cause: idx.content_of(root_cause_id),
            chain: order.iter().map(|&(id, _)| idx.content_of(id)).collect(),
        }),
    }
}
