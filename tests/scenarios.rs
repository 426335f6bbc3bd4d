//! Concrete end-to-end scenarios from `spec.md` §8 (S1-S6).

use chrono::Utc;
use flowscript::linter::lint;
use flowscript::parser::{parse, CompileOptions};
use flowscript::query::{alternatives, what_if, why, AlternativesOptions, AlternativesResult, WhatIfResult, WhyOptions, WhyResult};

fn compile(src: &str) -> flowscript::Ir {
    parse(src, "test.flow", CompileOptions::default(), Utc::now()).unwrap()
}

#[test]
fn s1_causal_chain() {
    let ir = compile("A -> B -> C");
    assert_eq!(ir.nodes.len(), 3);
    assert_eq!(ir.relationships.len(), 2);
    assert!(ir.states.is_empty());

    let c = ir.nodes.iter().find(|n| n.content == "C").unwrap();
    match why(&ir, &c.id, &WhyOptions::default()).unwrap() {
        WhyResult::Chain {
            root_cause,
            causal_chain,
            ..
        } => {
            assert_eq!(root_cause, "A");
            let contents: Vec<_> = causal_chain.iter().map(|s| s.content.as_str()).collect();
            assert_eq!(contents, vec!["A", "B"]);
        }
        other => panic!("expected chain format, got {other:?}"),
    }

    let a = ir.nodes.iter().find(|n| n.content == "A").unwrap();
    match what_if(&ir, &a.id, &Default::default()).unwrap() {
        WhatIfResult::Tree { impact_tree, .. } => {
            assert_eq!(impact_tree.direct.iter().map(|n| n.content.as_str()).collect::<Vec<_>>(), vec!["B"]);
            assert_eq!(impact_tree.indirect.iter().map(|n| n.content.as_str()).collect::<Vec<_>>(), vec!["C"]);
        }
        other => panic!("expected tree format, got {other:?}"),
    }
}

#[test]
fn s2_decision_with_alternatives() {
    let src = "? authentication strategy\n  || JWT tokens\n     -> stateless\n  || session tokens\n     -> instant revocation\n[decided(rationale: \"security first\", on: \"2025-10-15\")] session tokens";
    let ir = compile(src);

    assert_eq!(ir.nodes.iter().filter(|n| n.node_type == flowscript::ir::NodeType::Question).count(), 1);
    assert_eq!(ir.nodes.iter().filter(|n| n.node_type == flowscript::ir::NodeType::Alternative).count(), 2);
    assert_eq!(
        ir.relationships
            .iter()
            .filter(|r| r.rel_type == flowscript::ir::RelationshipType::Alternative)
            .count(),
        2
    );
    assert_eq!(
        ir.relationships
            .iter()
            .filter(|r| r.rel_type == flowscript::ir::RelationshipType::Causes)
            .count(),
        2
    );
    assert_eq!(ir.states.len(), 1);
    assert_eq!(ir.states[0].fields.get("rationale").map(String::as_str), Some("security first"));

    let question = ir.nodes.iter().find(|n| n.content == "authentication strategy").unwrap();
    match alternatives(&ir, &question.id, &AlternativesOptions::default()).unwrap() {
        AlternativesResult::Comparison { decision_summary, .. } => {
            assert_eq!(decision_summary.chosen.as_deref(), Some("session tokens"));
            assert_eq!(decision_summary.rejected, vec!["JWT tokens".to_string()]);
            assert_eq!(decision_summary.rationale.as_deref(), Some("security first"));
        }
        other => panic!("expected comparison format, got {other:?}"),
    }
}

#[test]
fn s3_unlabeled_tension_triggers_e001() {
    let ir = compile("speed >< quality");
    assert_eq!(ir.relationships.len(), 1);
    assert_eq!(ir.relationships[0].axis_label, None);

    let diagnostics = lint(&ir);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "E001");
}

#[test]
fn s4_causal_cycle_with_bidirectional_escape() {
    let cyclic = compile("A -> B\nB -> C\nC -> A");
    assert!(lint(&cyclic).iter().any(|d| d.code == "E005"));

    let escaped = compile("A <-> B\nB -> C");
    assert!(!lint(&escaped).iter().any(|d| d.code == "E005"));
}

#[test]
fn s5_indentation_equivalence() {
    let s1 = compile("? q\n  || a\n  || b");
    let s2 = compile("? q\n{|| a; || b}");

    assert_eq!(s1.nodes.len(), s2.nodes.len());
    assert_eq!(s1.relationships.len(), s2.relationships.len());

    let ids1: std::collections::BTreeMap<_, _> = s1.nodes.iter().map(|n| (n.content.clone(), n.id.clone())).collect();
    let ids2: std::collections::BTreeMap<_, _> = s2.nodes.iter().map(|n| (n.content.clone(), n.id.clone())).collect();
    assert_eq!(ids1, ids2);

    let alt_count = |ir: &flowscript::Ir| {
        ir.relationships
            .iter()
            .filter(|r| r.rel_type == flowscript::ir::RelationshipType::Alternative)
            .count()
    };
    assert_eq!(alt_count(&s1), alt_count(&s2));
}

#[test]
fn s6_hybrid_decision_accepted_by_e006() {
    let src = "? pick\n  || alpha\n  || beta\n  || gamma\n[decided(rationale: \"blend of alpha and gamma\", on: \"2025-03-01\")] hybrid of alpha and gamma";
    let ir = compile(src);
    assert!(ir.states.iter().any(|s| s.state_type == flowscript::ir::StateType::Decided));
    assert!(!lint(&ir).iter().any(|d| d.code == "E006"));
}
