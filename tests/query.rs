//! Query engine coverage (`spec.md` §4.5, scenarios S1/S2).

use chrono::Utc;
use flowscript::parser::{parse, CompileOptions};
use flowscript::query::{
    alternatives, blocked, tensions, what_if, why, AlternativesFormat, AlternativesOptions,
    AlternativesResult, BlockedOptions, TensionsGroupBy, TensionsOptions, WhatIfFormat, WhatIfOptions,
    WhatIfResult, WhyOptions, WhyResult,
};

fn compile(src: &str) -> flowscript::Ir {
    parse(src, "test.flow", CompileOptions::default(), Utc::now()).unwrap()
}

#[test]
fn why_finds_root_cause_and_chain_for_causal_chain() {
    let ir = compile("A -> B -> C");
    let c = ir.nodes.iter().find(|n| n.content == "C").unwrap();
    let result = why(&ir, &c.id, &WhyOptions::default()).unwrap();
    match result {
        WhyResult::Chain {
            root_cause,
            causal_chain,
            ..
        } => {
            assert_eq!(root_cause, "A");
            assert_eq!(causal_chain.len(), 2);
        }
        other => panic!("expected chain format, got {other:?}"),
    }
}

#[test]
fn why_on_unknown_node_fails() {
    let ir = compile("A -> B");
    let err = why(&ir, "not-a-real-id", &WhyOptions::default()).unwrap_err();
    assert!(matches!(err, flowscript::error::QueryError::NodeNotFound(_)));
}

#[test]
fn what_if_from_root_returns_direct_and_indirect_descendants() {
    let ir = compile("A -> B -> C");
    let a = ir.nodes.iter().find(|n| n.content == "A").unwrap();
    let result = what_if(&ir, &a.id, &WhatIfOptions::default()).unwrap();
    match result {
        WhatIfResult::Tree { impact_tree, .. } => {
            assert_eq!(impact_tree.direct.iter().map(|n| n.content.as_str()).collect::<Vec<_>>(), vec!["B"]);
            assert_eq!(impact_tree.indirect.iter().map(|n| n.content.as_str()).collect::<Vec<_>>(), vec!["C"]);
        }
        other => panic!("expected tree format, got {other:?}"),
    }
}

#[test]
fn what_if_summary_buckets_tension_endpoints_as_risk() {
    let ir = compile("invest in speed -> ship faster\ninvest in speed ><[cost vs quality] quality");
    let root = ir.nodes.iter().find(|n| n.content == "invest in speed").unwrap();
    let options = WhatIfOptions {
        format: WhatIfFormat::Summary,
        ..Default::default()
    };
    let result = what_if(&ir, &root.id, &options).unwrap();
    match result {
        WhatIfResult::Summary { benefits, risks, .. } => {
            assert!(benefits.iter().any(|b| b == "ship faster"));
            assert!(!risks.iter().any(|r| r == "ship faster"));
        }
        other => panic!("expected summary format, got {other:?}"),
    }
}

#[test]
fn tensions_groups_by_axis_by_default() {
    let ir = compile("speed ><[cost] quality\nspeed ><[cost] reliability");
    let result = tensions(&ir, &TensionsOptions::default());
    let by_axis = result.tensions_by_axis.expect("axis grouping by default");
    assert_eq!(by_axis.get("cost").map(Vec::len), Some(2));
    assert_eq!(result.metadata.total_tensions, 2);
    assert_eq!(result.metadata.unique_axes, 1);
    assert_eq!(result.metadata.most_common_axis.as_deref(), Some("cost"));
}

#[test]
fn tensions_can_be_ungrouped() {
    let ir = compile("speed ><[cost] quality");
    let options = TensionsOptions {
        group_by: TensionsGroupBy::None,
        ..Default::default()
    };
    let result = tensions(&ir, &options);
    assert_eq!(result.tensions.expect("flat list").len(), 1);
}

#[test]
fn blocked_reports_days_blocked_and_sorts_by_impact() {
    let src = "low impact item\n[blocked(reason: \"waiting\", since: \"2025-01-01\")] low impact item\nhigh impact cause -> consequence one -> consequence two\n[blocked(reason: \"waiting\", since: \"2025-06-01\")] high impact cause";
    let ir = compile(src);
    let as_of = chrono::NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    let result = blocked(&ir, as_of, &BlockedOptions::default());
    assert_eq!(result.metadata.total_blockers, 2);
    assert_eq!(result.blockers[0].content, "high impact cause");
    assert!(result.blockers[0].impact_score >= result.blockers[1].impact_score);
    let low = result.blockers.iter().find(|b| b.content == "low impact item").unwrap();
    assert_eq!(low.days_blocked, 181);
}

#[test]
fn alternatives_rejects_non_question_node() {
    let ir = compile("A -> B");
    let a = ir.nodes.iter().find(|n| n.content == "A").unwrap();
    let err = alternatives(&ir, &a.id, &AlternativesOptions::default()).unwrap_err();
    assert!(matches!(err, flowscript::error::QueryError::WrongNodeType { .. }));
}

#[test]
fn alternatives_comparison_reports_chosen_and_rejected() {
    let src = "? authentication strategy\n  || JWT tokens\n     -> stateless\n  || session tokens\n     -> instant revocation\n[decided(rationale: \"security first\", on: \"2025-10-15\")] session tokens";
    let ir = compile(src);
    let question = ir.nodes.iter().find(|n| n.content == "authentication strategy").unwrap();
    let result = alternatives(&ir, &question.id, &AlternativesOptions::default()).unwrap();
    match result {
        AlternativesResult::Comparison {
            decision_summary, ..
        } => {
            assert_eq!(decision_summary.chosen.as_deref(), Some("session tokens"));
            assert_eq!(decision_summary.rationale.as_deref(), Some("security first"));
            assert_eq!(decision_summary.rejected, vec!["JWT tokens".to_string()]);
        }
        other => panic!("expected comparison format, got {other:?}"),
    }
}

#[test]
fn alternatives_simple_format_is_compact() {
    let src = "? pick\n  || a\n  || b";
    let ir = compile(src);
    let question = ir.nodes.iter().find(|n| n.content == "pick").unwrap();
    let options = AlternativesOptions {
        format: AlternativesFormat::Simple,
        ..Default::default()
    };
    let result = alternatives(&ir, &question.id, &options).unwrap();
    match result {
        AlternativesResult::Simple { options_considered, chosen, .. } => {
            assert_eq!(options_considered.len(), 2);
            assert!(chosen.is_none());
        }
        other => panic!("expected simple format, got {other:?}"),
    }
}
