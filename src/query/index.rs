//! Adjacency indexes built once per loaded IR (`spec.md` §4.5 preamble):
//! `node_by_id`, `relationships_from_source`, `relationships_to_target`,
//! `states_by_node`. Every query is a pure function over these plus the IR.

use crate::error::QueryError;
use crate::ir::{Ir, Node, Relationship, State};
use std::collections::HashMap;

pub struct Indexes<'a> {
    pub ir: &'a Ir,
    pub node_by_id: HashMap<&'a str, &'a Node>,
    pub from_source: HashMap<&'a str, Vec<&'a Relationship>>,
    pub to_target: HashMap<&'a str, Vec<&'a Relationship>>,
    pub states_by_node: HashMap<&'a str, Vec<&'a State>>,
}

impl<'a> Indexes<'a> {
    pub fn build(ir: &'a Ir) -> Self {
        let node_by_id = ir.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut from_source: HashMap<&str, Vec<&Relationship>> = HashMap::new();
        let mut to_target: HashMap<&str, Vec<&Relationship>> = HashMap::new();
        for rel in &ir.relationships {
            from_source.entry(rel.source.as_str()).or_default().push(rel);
            to_target.entry(rel.target.as_str()).or_default().push(rel);
        }
        let mut states_by_node: HashMap<&str, Vec<&State>> = HashMap::new();
        for state in &ir.states {
            states_by_node.entry(state.node_id.as_str()).or_default().push(state);
        }
        Self {
            ir,
            node_by_id,
            from_source,
            to_target,
            states_by_node,
        }
    }

    pub fn node(&self, id: &str) -> Result<&'a Node, QueryError> {
        self.node_by_id
            .get(id)
            .copied()
            .ok_or_else(|| QueryError::NodeNotFound(id.to_string()))
    }

    pub fn content_of(&self, id: &str) -> String {
        self.node_by_id.get(id).map(|n| n.content.clone()).unwrap_or_default()
    }
}
