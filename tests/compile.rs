//! End-to-end compile behavior: determinism, boundary cases, IR shape.

use chrono::Utc;
use flowscript::parser::{parse, CompileOptions};

fn compile(src: &str) -> flowscript::Ir {
    parse(src, "test.flow", CompileOptions::default(), Utc::now()).unwrap()
}

#[test]
fn empty_source_yields_empty_ir_with_version_set() {
    let ir = compile("");
    assert!(ir.nodes.is_empty());
    assert!(ir.relationships.is_empty());
    assert!(ir.states.is_empty());
    assert_eq!(ir.version, "1.0");
}

#[test]
fn single_statement_yields_one_node_no_relationships() {
    let ir = compile("just a thought with no operators");
    assert_eq!(ir.nodes.len(), 1);
    assert!(ir.relationships.is_empty());
}

#[test]
fn tab_in_indentation_fails_citing_the_line() {
    let src = "top\n\tindented with a tab";
    let err = parse(src, "test.flow", CompileOptions::default(), Utc::now()).unwrap_err();
    match err {
        flowscript::CompileError::Indent(flowscript::error::IndentError::TabInIndentation { line }) => {
            assert_eq!(line, 2);
        }
        other => panic!("expected TabInIndentation, got {other:?}"),
    }
}

#[test]
fn dedent_to_unseen_column_fails_listing_valid_columns() {
    let src = "top\n  one\n    two\n   bad";
    let err = parse(src, "test.flow", CompileOptions::default(), Utc::now()).unwrap_err();
    match err {
        flowscript::CompileError::Indent(flowscript::error::IndentError::InvalidDedent {
            column,
            valid_columns,
            ..
        }) => {
            assert_eq!(column, 3);
            assert!(!valid_columns.contains(&3));
        }
        other => panic!("expected InvalidDedent, got {other:?}"),
    }
}

#[test]
fn parse_is_deterministic_across_runs() {
    let src = "A -> B -> C\n? pick one\n  || x\n  || y";
    let ir1 = compile(src);
    let ir2 = compile(src);
    let json1 = serde_json::to_string(&ir1.nodes).unwrap();
    let json2 = serde_json::to_string(&ir2.nodes).unwrap();
    assert_eq!(json1, json2);
    assert_eq!(ir1.relationships, ir2.relationships);
}

#[test]
fn repeated_content_dedupes_to_one_node() {
    let ir = compile("A -> B\nA -> C");
    let a_count = ir.nodes.iter().filter(|n| n.content == "A").count();
    assert_eq!(a_count, 1);
}

#[test]
fn provenance_line_numbers_are_always_original_source_lines() {
    let src = "top\n  one\n  two\n  three";
    let ir = compile(src);
    let max_line = src.lines().count();
    for node in &ir.nodes {
        assert!(node.provenance.line_number >= 1 && node.provenance.line_number <= max_line);
    }
}

#[test]
fn vertical_and_horizontal_syntax_produce_equivalent_ir() {
    let vertical = "? q\n  || a\n  || b";
    let horizontal = "? q\n{|| a; || b}";
    let v = compile(vertical);
    let h = compile(horizontal);

    assert_eq!(v.nodes.len(), h.nodes.len());
    assert_eq!(v.relationships.len(), h.relationships.len());

    let v_ids: std::collections::BTreeSet<_> = v.nodes.iter().map(|n| (n.content.clone(), n.id.clone())).collect();
    let h_ids: std::collections::BTreeSet<_> = h.nodes.iter().map(|n| (n.content.clone(), n.id.clone())).collect();
    assert_eq!(v_ids, h_ids);

    let v_rels: std::collections::HashSet<_> = v
        .relationships
        .iter()
        .map(|r| (r.rel_type, r.source.clone(), r.target.clone()))
        .collect();
    let h_rels: std::collections::HashSet<_> = h
        .relationships
        .iter()
        .map(|r| (r.rel_type, r.source.clone(), r.target.clone()))
        .collect();
    assert_eq!(v_rels, h_rels);
}
