//! Linter rule coverage (`spec.md` §4.4, scenarios S3/S4/S6).

use chrono::Utc;
use flowscript::linter::{has_errors, lint, lint_and_annotate};
use flowscript::parser::{parse, CompileOptions};

fn compile(src: &str) -> flowscript::Ir {
    parse(src, "test.flow", CompileOptions::default(), Utc::now()).unwrap()
}

#[test]
fn unlabeled_tension_triggers_e001() {
    let ir = compile("speed >< quality");
    let diagnostics = lint(&ir);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "E001");
}

#[test]
fn labeled_tension_passes() {
    let ir = compile("speed ><[cost vs quality] quality");
    let diagnostics = lint(&ir);
    assert!(!diagnostics.iter().any(|d| d.code == "E001"));
}

#[test]
fn causal_cycle_triggers_e005() {
    let ir = compile("A -> B\nB -> C\nC -> A");
    let diagnostics = lint(&ir);
    assert!(diagnostics.iter().any(|d| d.code == "E005"));
}

#[test]
fn bidirectional_escape_avoids_e005() {
    let ir = compile("A <-> B\nB -> C");
    let diagnostics = lint(&ir);
    assert!(!diagnostics.iter().any(|d| d.code == "E005"));
}

#[test]
fn alternatives_without_any_decided_state_trigger_e006() {
    let ir = compile("? pick\n  || a\n  || b");
    let diagnostics = lint(&ir);
    assert!(diagnostics.iter().any(|d| d.code == "E006"));
}

#[test]
fn hybrid_decision_satisfies_e006() {
    let src = "? pick\n  || a\n  || b\n  || c\n[decided(rationale: \"mix of a and c\", on: \"2025-01-01\")] hybrid approach";
    let ir = compile(src);
    let diagnostics = lint(&ir);
    assert!(!diagnostics.iter().any(|d| d.code == "E006"));
}

#[test]
fn parking_question_also_satisfies_e006() {
    let src = "[parking(why: \"waiting on data\", until: \"2025-02-01\")] ? pick\n  || a\n  || b";
    let ir = compile(src);
    let diagnostics = lint(&ir);
    assert!(!diagnostics.iter().any(|d| d.code == "E006"));
}

#[test]
fn decided_missing_rationale_triggers_e002() {
    let src = "thought: idea\n[decided(on: \"2025-01-01\")] idea";
    let ir = compile(src);
    let diagnostics = lint(&ir);
    assert!(diagnostics.iter().any(|d| d.code == "E002"));
}

#[test]
fn parking_missing_fields_triggers_w001_not_e002() {
    let src = "thought: idea\n[parking] idea";
    let ir = compile(src);
    let diagnostics = lint(&ir);
    assert!(diagnostics.iter().any(|d| d.code == "W001"));
    assert!(!diagnostics.iter().any(|d| d.code == "E002"));
}

#[test]
fn indentation_wrapped_blocks_are_not_orphaned() {
    let src = "? authentication strategy\n  || JWT tokens\n     -> stateless\n  || session tokens\n     -> instant revocation\n[decided(rationale: \"security first\", on: \"2025-10-15\")] session tokens";
    let ir = compile(src);
    let diagnostics = lint(&ir);
    assert!(!diagnostics.iter().any(|d| d.code == "E004"));
    let (annotated, _) = lint_and_annotate(compile(src));
    assert!(annotated.invariants.all_nodes_reachable);
}

#[test]
fn action_and_completion_nodes_are_exempt_from_orphan_check() {
    let ir = compile("action: do the thing\n✓ shipped it");
    let diagnostics = lint(&ir);
    assert!(!diagnostics.iter().any(|d| d.code == "E004"));
}

#[test]
fn lint_and_annotate_sets_invariants_from_result() {
    let ir = compile("speed >< quality");
    let (annotated, diagnostics) = lint_and_annotate(ir);
    assert!(has_errors(&diagnostics));
    assert!(!annotated.invariants.tension_axes_labeled);
}

#[test]
fn clean_document_has_all_invariants_true() {
    let ir = compile("A -> B");
    let (annotated, diagnostics) = lint_and_annotate(ir);
    assert!(!has_errors(&diagnostics));
    assert!(annotated.invariants.causal_acyclic);
    assert!(annotated.invariants.all_nodes_reachable);
    assert!(annotated.invariants.tension_axes_labeled);
    assert!(annotated.invariants.state_fields_present);
}
