//! `tensions(options)` (`spec.md` §4.5.3): every `tension` edge, grouped by
//! axis, by node, or not at all.

use crate::ir::{Ir, RelationshipType};
use crate::query::index::Indexes;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TensionsGroupBy {
    #[default]
    Axis,
    Node,
    None,
}

#[derive(Debug, Clone, Default)]
pub struct TensionsOptions {
    pub group_by: TensionsGroupBy,
    pub filter_by_axis: Option<String>,
    pub include_context: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TensionItem {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TensionsMetadata {
    pub total_tensions: usize,
    pub unique_axes: usize,
    pub most_common_axis: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TensionsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tensions_by_axis: Option<BTreeMap<String, Vec<TensionItem>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tensions_by_node: Option<BTreeMap<String, Vec<TensionItem>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tensions: Option<Vec<TensionItem>>,
    pub metadata: TensionsMetadata,
}

/// Nearest causal ancestor's content, for `includeContext` (`spec.md` §4.5.3).
fn nearest_causal_ancestor<'a>(idx: &Indexes<'a>, node_id: &str) -> Option<String> {
    idx.to_target
        .get(node_id)
        .into_iter()
        .flatten()
        .find(|rel| rel.rel_type == RelationshipType::Causes)
        .map(|rel| idx.content_of(&rel.source))
}

pub fn tensions(ir: &Ir, options: &TensionsOptions) -> TensionsResult {
    let idx = Indexes::build(ir);

    let mut axis_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut items: Vec<(&crate::ir::Relationship, TensionItem)> = Vec::new();

    for rel in ir.relationships.iter().filter(|r| r.rel_type == RelationshipType::Tension) {
        if let Some(filter) = &options.filter_by_axis {
            let matches = rel.axis_label.as_deref() == Some(filter.as_str());
            if !matches {
                continue;
            }
        }
        if let Some(axis) = &rel.axis_label {
            *axis_counts.entry(axis.clone()).or_insert(0) += 1;
        }
        let context = if options.include_context {
            nearest_causal_ancestor(&idx, &rel.source)
        } else {
            None
        };
        items.push((
            rel,
            TensionItem {
                source: rel.source.clone(),
                target: rel.target.clone(),
                context,
            },
        ));
    }

    let most_common_axis = axis_counts
        .iter()
        .max_by_key(|&(_, count)| *count)
        .map(|(axis, _)| axis.clone());
    let metadata = TensionsMetadata {
        total_tensions: items.len(),
        unique_axes: axis_counts.len(),
        most_common_axis,
    };

    match options.group_by {
        TensionsGroupBy::Axis => {
            let mut by_axis: BTreeMap<String, Vec<TensionItem>> = BTreeMap::new();
            for (rel, item) in items {
                let key = rel.axis_label.clone().unwrap_or_else(|| "unlabeled".to_string());
                by_axis.entry(key).or_default().push(item);
            }
            TensionsResult {
                tensions_by_axis: Some(by_axis),
                tensions_by_node: None,
                tensions: None,
                metadata,
            }
        }
        TensionsGroupBy::Node => {
            let mut by_node: BTreeMap<String, Vec<TensionItem>> = BTreeMap::new();
            for (rel, item) in items {
                by_node.entry(rel.source.clone()).or_default().push(item.clone());
                by_node.entry(rel.target.clone()).or_default().push(item);
            }
            TensionsResult {
                tensions_by_axis: None,
                tensions_by_node: Some(by_node),
                tensions: None,
                metadata,
            }
        }
        TensionsGroupBy::None => TensionsResult {
            tensions_by_axis: None,
            tensions_by_node: None,
            tensions: Some(items.into_iter().map(|(_, item)| item).collect()),
            metadata,
        },
    }
}
