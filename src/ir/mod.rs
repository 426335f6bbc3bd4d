//! The FlowScript intermediate representation (`spec.md` §3).
//!
//! Entities are created exclusively by the parser and its post-processors;
//! once emitted an [`Ir`] value is immutable. The linter and query engine
//! only ever read it.

pub mod envelope;
pub mod node;
pub mod relationship;
pub mod state;

pub use envelope::{Invariants, Ir, Metadata};
pub use node::{Modifier, Node, NodeExt, NodeType};
pub use relationship::{Relationship, RelationshipType};
pub use state::{State, StateType};

use serde::{Deserialize, Serialize};

/// Where a piece of the IR came from: which file, which original source
/// line, and when it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source_file: String,
    pub line_number: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// A 64-hex-character SHA-256 content hash; used as the id of every node,
/// relationship, and state.
pub type NodeId = String;
