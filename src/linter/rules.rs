//! The nine `spec.md` §4.4 validation rules, trait-based per the teacher's
//! `ValidationRule` (`examples/cyrup-ai-yyaml/src/semantic/validation/rules.rs`):
//! one small struct per rule, all run over a single shared [`Adjacency`].

use crate::ir::{Ir, Node, NodeType, RelationshipType, State, StateType};
use crate::linter::diagnostic::{Diagnostic, Location};
use std::collections::{HashMap, HashSet};

/// Indexes built once per lint run and shared by every rule (`spec.md` §4.4
/// "the linter builds whatever indexes each needs from a common adjacency
/// built once").
pub struct Adjacency<'a> {
    ir: &'a Ir,
    by_id: HashMap<&'a str, &'a Node>,
    causes_out: HashMap<&'a str, Vec<&'a str>>,
    referenced: HashSet<&'a str>,
    states_by_node: HashMap<&'a str, Vec<&'a State>>,
}

impl<'a> Adjacency<'a> {
    pub fn build(ir: &'a Ir) -> Self {
        let by_id: HashMap<&str, &Node> = ir.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut causes_out: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut referenced: HashSet<&str> = HashSet::new();
        for rel in &ir.relationships {
            referenced.insert(rel.source.as_str());
            referenced.insert(rel.target.as_str());
            if rel.rel_type == RelationshipType::Causes && !rel.feedback {
                causes_out.entry(rel.source.as_str()).or_default().push(rel.target.as_str());
            }
        }
        for node in &ir.nodes {
            if let Some(ext) = &node.ext {
                referenced.extend(ext.children.iter().map(|c| c.as_str()));
            }
            referenced.extend(node.children.iter().map(|c| c.as_str()));
        }
        let mut states_by_node: HashMap<&str, Vec<&State>> = HashMap::new();
        for state in &ir.states {
            referenced.insert(state.node_id.as_str());
            states_by_node.entry(state.node_id.as_str()).or_default().push(state);
        }

        Self {
            ir,
            by_id,
            causes_out,
            referenced,
            states_by_node,
        }
    }

    fn location(&self, line: usize) -> Location {
        Location {
            file: self
                .ir
                .metadata
                .source_files
                .first()
                .cloned()
                .unwrap_or_default(),
            line,
        }
    }
}

pub trait LintRule {
    fn code(&self) -> &'static str;
    fn run(&self, adjacency: &Adjacency) -> Vec<Diagnostic>;
}

pub struct TensionMissingAxis;
impl LintRule for TensionMissingAxis {
    fn code(&self) -> &'static str {
        "E001"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        adj.ir
            .relationships
            .iter()
            .filter(|r| r.rel_type == RelationshipType::Tension)
            .filter(|r| r.axis_label.as_deref().is_none_or(str::is_empty))
            .map(|r| {
                Diagnostic::error(
                    self.code(),
                    format!(
                        "tension between '{}' and '{}' has no axis label",
                        r.source, r.target
                    ),
                    adj.location(r.provenance.line_number),
                )
                .with_suggestion("add `><[axis name]` instead of bare `><`")
            })
            .collect()
    }
}

pub struct RequiredStateFieldsMissing;
impl LintRule for RequiredStateFieldsMissing {
    fn code(&self) -> &'static str {
        "E002"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        adj.ir
            .states
            .iter()
            .map(|s| (s, s.missing_required_fields()))
            .filter(|(_, missing)| !missing.is_empty())
            .map(|(s, missing)| {
                Diagnostic::error(
                    self.code(),
                    format!(
                        "{} state is missing required field(s): {}",
                        s.state_type.as_str(),
                        missing.join(", ")
                    ),
                    adj.location(s.provenance.line_number),
                )
            })
            .collect()
    }
}

pub struct MultipleStatesOnOneNode;
impl LintRule for MultipleStatesOnOneNode {
    fn code(&self) -> &'static str {
        "E003"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        adj.states_by_node
            .iter()
            .filter(|(_, states)| states.len() > 1)
            .map(|(node_id, states)| {
                let line = states.iter().map(|s| s.provenance.line_number).min().unwrap_or(1);
                Diagnostic::error(
                    self.code(),
                    format!("node {node_id} carries {} states, at most one is allowed", states.len()),
                    adj.location(line),
                )
            })
            .collect()
    }
}

pub struct OrphanedNode;
impl LintRule for OrphanedNode {
    fn code(&self) -> &'static str {
        "E004"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        adj.ir
            .nodes
            .iter()
            .filter(|n| !matches!(n.node_type, NodeType::Action | NodeType::Completion))
            .filter(|n| !adj.referenced.contains(n.id.as_str()))
            .map(|n| {
                Diagnostic::error(
                    self.code(),
                    format!("{} node '{}' is not referenced by anything", n.node_type.as_str(), n.content),
                    adj.location(n.provenance.line_number),
                )
            })
            .collect()
    }
}

pub struct CausalCycle;
impl LintRule for CausalCycle {
    fn code(&self) -> &'static str {
        "E005"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        #[derive(PartialEq, Eq, Clone, Copy)]
        enum Color {
            White,
            Gray,
            Black,
        }
        let mut color: HashMap<&str, Color> = adj.by_id.keys().map(|&id| (id, Color::White)).collect();
        let mut stack: Vec<&str> = Vec::new();

        fn visit<'a>(
            node: &'a str,
            adj: &Adjacency<'a>,
            color: &mut HashMap<&'a str, Color>,
            stack: &mut Vec<&'a str>,
        ) -> Option<Vec<&'a str>> {
            color.insert(node, Color::Gray);
            stack.push(node);
            if let Some(next) = adj.causes_out.get(node) {
                for &n in next {
                    match color.get(n).copied().unwrap_or(Color::White) {
                        Color::White => {
                            if let Some(cycle) = visit(n, adj, color, stack) {
                                return Some(cycle);
                            }
                        }
                        Color::Gray => {
                            let start = stack.iter().position(|&x| x == n).unwrap_or(0);
                            let mut cycle: Vec<&str> = stack[start..].to_vec();
                            cycle.push(n);
                            return Some(cycle);
                        }
                        Color::Black => {}
                    }
                }
            }
            stack.pop();
            color.insert(node, Color::Black);
            None
        }

        for &id in adj.by_id.keys() {
            if color[id] == Color::White {
                if let Some(cycle) = visit(id, adj, &mut color, &mut stack) {
                    let contents: Vec<&str> = cycle
                        .iter()
                        .map(|&id| adj.by_id.get(id).map(|n| n.content.as_str()).unwrap_or(id))
                        .collect();
                    let line = adj.by_id.get(cycle[0]).map(|n| n.provenance.line_number).unwrap_or(1);
                    return vec![Diagnostic::error(
                        self.code(),
                        format!("causal cycle: {}", contents.join(" -> ")),
                        adj.location(line),
                    )];
                }
            }
        }
        Vec::new()
    }
}

pub struct AlternativesWithoutClosure;
impl LintRule for AlternativesWithoutClosure {
    fn code(&self) -> &'static str {
        "E006"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        let has_alternative = adj.ir.nodes.iter().any(|n| n.node_type == NodeType::Alternative);
        if !has_alternative {
            return Vec::new();
        }
        let has_decided = adj.ir.states.iter().any(|s| s.state_type == StateType::Decided);
        if has_decided {
            return Vec::new();
        }
        let has_parked_question = adj.ir.states.iter().any(|s| {
            s.state_type == StateType::Parking
                && adj.by_id.get(s.node_id.as_str()).is_some_and(|n| n.node_type == NodeType::Question)
        });
        if has_parked_question {
            return Vec::new();
        }
        vec![Diagnostic::error(
            self.code(),
            "alternatives exist but no `decided` state resolves them and the question is not `parking`",
            adj.location(1),
        )]
    }
}

pub struct ParkingMissingRecommendedFields;
impl LintRule for ParkingMissingRecommendedFields {
    fn code(&self) -> &'static str {
        "W001"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        adj.ir
            .states
            .iter()
            .filter(|s| s.state_type == StateType::Parking)
            .map(|s| (s, s.missing_recommended_fields()))
            .filter(|(_, missing)| !missing.is_empty())
            .map(|(s, missing)| {
                Diagnostic::warning(
                    self.code(),
                    format!("parking state is missing recommended field(s): {}", missing.join(", ")),
                    adj.location(s.provenance.line_number),
                )
            })
            .collect()
    }
}

pub struct DeepBlockNesting;
impl LintRule for DeepBlockNesting {
    fn code(&self) -> &'static str {
        "W002"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        fn depth<'a>(id: &'a str, adj: &Adjacency<'a>, memo: &mut HashMap<&'a str, usize>, visiting: &mut HashSet<&'a str>) -> usize {
            if let Some(&d) = memo.get(id) {
                return d;
            }
            if !visiting.insert(id) {
                return 0;
            }
            let node = adj.by_id.get(id);
            let d = match node {
                Some(n) if n.node_type == NodeType::Block => {
                    let children = n.ext.as_ref().map(|e| e.children.as_slice()).unwrap_or(&[]);
                    let best = children
                        .iter()
                        .map(|c| depth(c, adj, memo, visiting))
                        .max()
                        .unwrap_or(0);
                    1 + best
                }
                _ => 0,
            };
            visiting.remove(id);
            memo.insert(id, d);
            d
        }

        let mut memo = HashMap::new();
        let mut diags = Vec::new();
        for node in &adj.ir.nodes {
            if node.node_type != NodeType::Block {
                continue;
            }
            let mut visiting = HashSet::new();
            let d = depth(node.id.as_str(), adj, &mut memo, &mut visiting);
            if d > 5 {
                diags.push(Diagnostic::warning(
                    self.code(),
                    format!("block nesting depth {d} exceeds 5"),
                    adj.location(node.provenance.line_number),
                ));
            }
        }
        diags
    }
}

pub struct LongCausalChain;
impl LintRule for LongCausalChain {
    fn code(&self) -> &'static str {
        "W003"
    }
    fn run(&self, adj: &Adjacency) -> Vec<Diagnostic> {
        fn longest<'a>(
            id: &'a str,
            adj: &Adjacency<'a>,
            memo: &mut HashMap<&'a str, Vec<&'a str>>,
            visiting: &mut HashSet<&'a str>,
        ) -> Vec<&'a str> {
            if let Some(path) = memo.get(id) {
                return path.clone();
            }
            if !visiting.insert(id) {
                return vec![id];
            }
            let best = adj
                .causes_out
                .get(id)
                .into_iter()
                .flatten()
                .map(|&next| longest(next, adj, memo, visiting))
                .max_by_key(|p| p.len());
            visiting.remove(id);
            let mut path = vec![id];
            if let Some(mut rest) = best {
                path.append(&mut rest);
            }
            memo.insert(id, path.clone());
            path
        }

        let mut memo = HashMap::new();
        for &id in adj.by_id.keys() {
            let mut visiting = HashSet::new();
            let path = longest(id, adj, &mut memo, &mut visiting);
            if path.len() > 10 {
                let contents: Vec<&str> = path
                    .iter()
                    .map(|&id| adj.by_id.get(id).map(|n| n.content.as_str()).unwrap_or(id))
                    .collect();
                let line = adj.by_id.get(path[0]).map(|n| n.provenance.line_number).unwrap_or(1);
                return vec![Diagnostic::warning(
                    self.code(),
                    format!("causal chain of {} nodes: {}", path.len(), contents.join(" -> ")),
                    adj.location(line),
                )];
            }
        }
        Vec::new()
    }
}

/// All nine rules in `spec.md` §4.4 table order.
pub fn all_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(TensionMissingAxis),
        Box::new(RequiredStateFieldsMissing),
        Box::new(MultipleStatesOnOneNode),
        Box::new(OrphanedNode),
        Box::new(CausalCycle),
        Box::new(AlternativesWithoutClosure),
        Box::new(ParkingMissingRecommendedFields),
        Box::new(DeepBlockNesting),
        Box::new(LongCausalChain),
    ]
}

