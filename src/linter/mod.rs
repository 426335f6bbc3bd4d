//! Semantic linter (`spec.md` §4.4): nine read-only validation rules over
//! an [`Ir`], built on one shared adjacency.

pub mod diagnostic;
pub mod rules;

pub use diagnostic::{Diagnostic, Location, Severity};

use crate::ir::{Invariants, Ir};
use rules::{all_rules, Adjacency};

/// Run every rule, in `spec.md` §4.4 table order, and return the full
/// diagnostic list. The linter never stops early; ERROR severity is
/// caller-visible, not fatal at this boundary (`spec.md` §7).
pub fn lint(ir: &Ir) -> Vec<Diagnostic> {
    let adjacency = Adjacency::build(ir);
    all_rules().iter().flat_map(|rule| rule.run(&adjacency)).collect()
}

/// Lint `ir` and return a copy with `invariants` set from the result
/// (`spec.md` §6.2: "set to the linter result" after a successful lint).
pub fn lint_and_annotate(mut ir: Ir) -> (Ir, Vec<Diagnostic>) {
    let diagnostics = lint(&ir);
    let has = |code: &str| diagnostics.iter().any(|d| d.code == code);
    ir.invariants = Invariants {
        causal_acyclic: !has("E005"),
        all_nodes_reachable: !has("E004"),
        tension_axes_labeled: !has("E001"),
        state_fields_present: !has("E002"),
    };
    (ir, diagnostics)
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}
