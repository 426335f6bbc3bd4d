use super::Provenance;
use crate::ir::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `spec.md` §3.1 node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Statement,
    Question,
    Thought,
    Action,
    Completion,
    Alternative,
    Block,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Statement => "statement",
            NodeType::Question => "question",
            NodeType::Thought => "thought",
            NodeType::Action => "action",
            NodeType::Completion => "completion",
            NodeType::Alternative => "alternative",
            NodeType::Block => "block",
        }
    }
}

/// Prefix emphasis/confidence markers (`!`, `++`, `*`, `~`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Urgent,
    StrongPositive,
    HighConfidence,
    LowConfidence,
}

impl Modifier {
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "!" => Some(Modifier::Urgent),
            "++" => Some(Modifier::StrongPositive),
            "*" => Some(Modifier::HighConfidence),
            "~" => Some(Modifier::LowConfidence),
            _ => None,
        }
    }
}

/// Block-only ancillary fields (`spec.md` §3.1 `ext`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExt {
    /// Ordered node-ids produced while parsing this block's content, before
    /// the hierarchical-children post-processing step rewires them onto a
    /// preceding sibling (`spec.md` §4.3 "Hierarchical children").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<Modifier>,
}

/// An atomic unit of thought (`spec.md` §3.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub content: String,
    #[serde(default)]
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<NodeExt>,
    pub provenance: Provenance,
}

/// The subset of a node's fields that determine its content-hash identity.
/// Serialized separately from [`Node`] so that adding non-defining fields
/// (e.g. `children`, which is populated after hashing) never perturbs ids.
#[derive(Debug, Clone, Serialize)]
pub struct NodeIdentity<'a> {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub content: &'a str,
    pub modifiers: &'a BTreeSet<Modifier>,
}

impl Node {
    pub fn identity_hash(node_type: NodeType, content: &str, modifiers: &BTreeSet<Modifier>) -> NodeId {
        crate::hash::hash_value(&NodeIdentity {
            node_type,
            content,
            modifiers,
        })
    }

    pub fn new(
        node_type: NodeType,
        content: impl Into<String>,
        modifiers: BTreeSet<Modifier>,
        provenance: Provenance,
    ) -> Self {
        let content = content.into();
        let id = Self::identity_hash(node_type, &content, &modifiers);
        Self {
            id,
            node_type,
            content,
            modifiers,
            children: Vec::new(),
            ext: None,
            provenance,
        }
    }
}
