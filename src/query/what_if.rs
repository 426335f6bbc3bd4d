//! `what_if(nodeId, options)` (`spec.md` §4.5.2): forward traversal over
//! `causes` (and optionally `temporal`/`equivalent`) edges.

use crate::error::QueryError;
use crate::ir::{Ir, RelationshipType};
use crate::query::index::Indexes;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhatIfFormat {
    #[default]
    Tree,
    Summary,
}

#[derive(Debug, Clone)]
pub struct WhatIfOptions {
    pub format: WhatIfFormat,
    pub include_temporal_consequences: bool,
    pub include_equivalent: bool,
    pub max_depth: Option<usize>,
}

impl Default for WhatIfOptions {
    fn default() -> Self {
        Self {
            format: WhatIfFormat::default(),
            include_temporal_consequences: true,
            include_equivalent: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactNode {
    pub node_id: String,
    pub content: String,
    pub depth: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactTree {
    pub direct: Vec<ImpactNode>,
    pub indirect: Vec<ImpactNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TensionEdge {
    pub source: String,
    pub target: String,
    pub axis_label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhatIfMetadata {
    pub tension_count: usize,
    pub total_impacted: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "format")]
pub enum WhatIfResult {
    #[serde(rename = "tree")]
    Tree {
        source: String,
        impact_tree: ImpactTree,
        tensions_in_impact_zone: Vec<TensionEdge>,
        metadata: WhatIfMetadata,
    },
    #[serde(rename = "summary")]
    Summary {
        source: String,
        benefits: Vec<String>,
        risks: Vec<String>,
        key_tradeoff: Option<String>,
        metadata: WhatIfMetadata,
    },
}

/// Forward closure from `node_id` over causal (and configured) edges, as
/// `(node_id, depth)` pairs in discovery order. Shared with `alternatives`'
/// consequence/tension-zone computation.
pub fn descendants<'a>(
    idx: &Indexes<'a>,
    node_id: &'a str,
    include_temporal: bool,
    include_equivalent: bool,
    max_depth: Option<usize>,
) -> Vec<(&'a str, usize)> {
    let mut depth_of: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    depth_of.insert(node_id, 0);
    queue.push_back((node_id, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        for rel in idx.from_source.get(current).into_iter().flatten() {
            let follows = rel.rel_type == RelationshipType::Causes
                || (include_temporal && rel.rel_type == RelationshipType::Temporal)
                || (include_equivalent && rel.rel_type == RelationshipType::Equivalent);
            if !follows {
                continue;
            }
            let next = rel.target.as_str();
            if !depth_of.contains_key(next) {
                depth_of.insert(next, depth + 1);
                order.push((next, depth + 1));
                queue.push_back((next, depth + 1));
            }
        }
    }
    order
}

pub fn what_if(ir: &Ir, node_id: &str, options: &WhatIfOptions) -> Result<WhatIfResult, QueryError> {
    let idx = Indexes::build(ir);
    idx.node(node_id)?;

    let order = descendants(
        &idx,
        node_id,
        options.include_temporal_consequences,
        options.include_equivalent,
        options.max_depth,
    );
    let descendant_set: HashSet<&str> = order.iter().map(|&(id, _)| id).collect();

    let tension_zone: Vec<&crate::ir::Relationship> = ir
        .relationships
        .iter()
        .filter(|r| r.rel_type == RelationshipType::Tension)
        .filter(|r| descendant_set.contains(r.source.as_str()) || descendant_set.contains(r.target.as_str()))
        .collect();

    let metadata = WhatIfMetadata {
        tension_count: tension_zone.len(),
        total_impacted: order.len(),
    };

    match options.format {
        WhatIfFormat::Tree => {
            let direct = order
                .iter()
                .filter(|&&(_, d)| d == 1)
                .map(|&(id, depth)| ImpactNode {
                    node_id: id.to_string(),
                    content: idx.content_of(id),
                    depth,
                })
                .collect();
            let indirect = order
                .iter()
                .filter(|&&(_, d)| d > 1)
                .map(|&(id, depth)| ImpactNode {
                    node_id: id.to_string(),
                    content: idx.content_of(id),
                    depth,
                })
                .collect();
            let tensions_in_impact_zone = tension_zone
                .iter()
                .map(|r| TensionEdge {
                    source: r.source.clone(),
                    target: r.target.clone(),
                    axis_label: r.axis_label.clone(),
                })
                .collect();
            Ok(WhatIfResult::Tree {
                source: node_id.to_string(),
                impact_tree: ImpactTree { direct, indirect },
                tensions_in_impact_zone,
                metadata,
            })
        }
        WhatIfFormat::Summary => {
            let tension_endpoints: HashSet<&str> = ir
                .relationships
                .iter()
                .filter(|r| r.rel_type == RelationshipType::Tension)
                .flat_map(|r| [r.source.as_str(), r.target.as_str()])
                .collect();

            let mut benefits = Vec::new();
            let mut risks = Vec::new();
            for &(id, depth) in order.iter().filter(|&&(_, d)| d == 1) {
                let content = idx.content_of(id);
                if tension_endpoints.contains(id) {
                    risks.push(content);
                } else {
                    benefits.push(content);
                }
                let _ = depth;
            }
            let key_tradeoff = tension_zone.first().and_then(|r| r.axis_label.clone());

            Ok(WhatIfResult::Summary {
                source: node_id.to_string(),
                benefits,
                risks,
                key_tradeoff,
                metadata,
            })
        }
    }
}
