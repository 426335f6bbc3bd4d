use super::Provenance;
use crate::ir::NodeId;
use serde::{Deserialize, Serialize};

/// `spec.md` §3.1 relationship types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Causes,
    DerivesFrom,
    Bidirectional,
    Temporal,
    Tension,
    Alternative,
    Equivalent,
    NotEquivalent,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Causes => "causes",
            RelationshipType::DerivesFrom => "derives_from",
            RelationshipType::Bidirectional => "bidirectional",
            RelationshipType::Temporal => "temporal",
            RelationshipType::Tension => "tension",
            RelationshipType::Alternative => "alternative",
            RelationshipType::Equivalent => "equivalent",
            RelationshipType::NotEquivalent => "not_equivalent",
        }
    }
}

/// A directed edge between two nodes (`spec.md` §3.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub rel_type: RelationshipType,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_label: Option<String>,
    /// True iff this edge belongs to a `bidirectional` pair; excluded from
    /// causal cycle detection (`spec.md` I5, §9 "Cycles in bidirectional
    /// relationships").
    pub feedback: bool,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Serialize)]
struct RelationshipIdentity<'a> {
    #[serde(rename = "type")]
    rel_type: RelationshipType,
    source: &'a str,
    target: &'a str,
    axis_label: &'a Option<String>,
}

impl Relationship {
    pub fn identity_hash(
        rel_type: RelationshipType,
        source: &str,
        target: &str,
        axis_label: &Option<String>,
    ) -> NodeId {
        crate::hash::hash_value(&RelationshipIdentity {
            rel_type,
            source,
            target,
            axis_label,
        })
    }

    pub fn new(
        rel_type: RelationshipType,
        source: NodeId,
        target: NodeId,
        axis_label: Option<String>,
        feedback: bool,
        provenance: Provenance,
    ) -> Self {
        let id = Self::identity_hash(rel_type, &source, &target, &axis_label);
        Self {
            id,
            rel_type,
            source,
            target,
            axis_label,
            feedback,
            provenance,
        }
    }
}
