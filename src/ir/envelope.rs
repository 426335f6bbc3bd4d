use super::{Node, Relationship, State};
use serde::{Deserialize, Serialize};

/// Booleans asserted by the linter after a successful run (`spec.md` §3.1,
/// I4). Before linting these reflect parser-local guarantees only: the
/// parser always emits `tension_axes_labeled` / `causal_acyclic` as `false`
/// since it makes no claim about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Invariants {
    pub causal_acyclic: bool,
    pub all_nodes_reachable: bool,
    pub tension_axes_labeled: bool,
    pub state_fields_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source_files: Vec<String>,
    pub parsed_at: chrono::DateTime<chrono::Utc>,
    pub parser: String,
}

/// The immutable intermediate representation (`spec.md` §3.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ir {
    pub version: String,
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
    pub states: Vec<State>,
    pub invariants: Invariants,
    pub metadata: Metadata,
}

pub const IR_VERSION: &str = "1.0";

impl Ir {
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
