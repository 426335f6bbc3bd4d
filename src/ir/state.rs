use super::Provenance;
use crate::ir::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `spec.md` §3.1 state types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    Decided,
    Exploring,
    Blocked,
    Parking,
}

impl StateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::Decided => "decided",
            StateType::Exploring => "exploring",
            StateType::Blocked => "blocked",
            StateType::Parking => "parking",
        }
    }

    /// Fields `spec.md` §3.1 requires for this state type (E002).
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            StateType::Decided => &["rationale", "on"],
            StateType::Blocked => &["reason", "since"],
            StateType::Parking => &[],
            StateType::Exploring => &[],
        }
    }

    /// Fields that W001 recommends but does not require for `parking`.
    pub fn recommended_fields(&self) -> &'static [&'static str] {
        match self {
            StateType::Parking => &["why", "until"],
            _ => &[],
        }
    }
}

/// A lifecycle annotation attached to a single node (`spec.md` §3.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub state_type: StateType,
    pub node_id: NodeId,
    pub fields: BTreeMap<String, String>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Serialize)]
struct StateIdentity<'a> {
    #[serde(rename = "type")]
    state_type: StateType,
    node_id: &'a str,
    fields: &'a BTreeMap<String, String>,
}

impl State {
    pub fn identity_hash(
        state_type: StateType,
        node_id: &str,
        fields: &BTreeMap<String, String>,
    ) -> NodeId {
        crate::hash::hash_value(&StateIdentity {
            state_type,
            node_id,
            fields,
        })
    }

    pub fn new(
        state_type: StateType,
        node_id: NodeId,
        fields: BTreeMap<String, String>,
        provenance: Provenance,
    ) -> Self {
        let id = Self::identity_hash(state_type, &node_id, &fields);
        Self {
            id,
            state_type,
            node_id,
            fields,
            provenance,
        }
    }

    /// Fields named in `required_fields()` that are missing or empty.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        self.state_type
            .required_fields()
            .iter()
            .filter(|f| !self.fields.get(**f).is_some_and(|v| !v.is_empty()))
            .copied()
            .collect()
    }

    pub fn missing_recommended_fields(&self) -> Vec<&'static str> {
        self.state_type
            .recommended_fields()
            .iter()
            .filter(|f| !self.fields.get(**f).is_some_and(|v| !v.is_empty()))
            .copied()
            .collect()
    }
}
