//! Token fragments recognized by the scanner at grammar-specified positions.

use crate::ir::RelationshipType;

/// The marker that introduces a piece of `Content` (`spec.md` §4.3). State
/// markers (`[decided(...)]`, ...) are recognized separately by
/// `Scanner::consume_state_marker` since their grammar shape (bracketed
/// field list) differs from these bare prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMarker {
    Thought,
    Action,
    Question,
    Completion,
    Alternative,
}

/// A `RelOp` from `spec.md` §4.3's grammar shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelOp {
    Causes,
    DerivesFrom,
    Bidirectional,
    Temporal,
    /// `><[axis]` or bare `><`; axis is `None` when unlabeled (triggers E001).
    Tension(Option<String>),
    Equivalent,
    NotEquivalent,
}

impl RelOp {
    pub fn relationship_type(&self) -> RelationshipType {
        match self {
            RelOp::Causes => RelationshipType::Causes,
            RelOp::DerivesFrom => RelationshipType::DerivesFrom,
            RelOp::Bidirectional => RelationshipType::Bidirectional,
            RelOp::Temporal => RelationshipType::Temporal,
            RelOp::Tension(_) => RelationshipType::Tension,
            RelOp::Equivalent => RelationshipType::Equivalent,
            RelOp::NotEquivalent => RelationshipType::NotEquivalent,
        }
    }
}
