// tests/roundtrip_tests.rs

use graft::ast::NodeRef;
use graft::{to_nodes, to_text, ErrorKind};

fn reparse(source: &str) -> (Vec<NodeRef>, String) {
    let nodes = to_nodes(source).expect("source parses");
    let text = to_text(&nodes);
    (nodes, text)
}

fn assert_round_trip_stable(source: &str) {
    let (first, text) = reparse(source);
    let second = to_nodes(&text).expect("generated text reparses");
    assert_eq!(first.len(), second.len(), "statement count for {source:?}");
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(*a.borrow(), *b.borrow(), "structure drifted for {source:?}");
    }
}

#[test]
fn expressions_round_trip_structurally() {
    assert_round_trip_stable("a + b * c;");
    assert_round_trip_stable("(a + b) * c;");
    assert_round_trip_stable("a = b = c;");
    assert_round_trip_stable("a.b.c(d)[e];");
    assert_round_trip_stable("!x && y || z;");
    assert_round_trip_stable("typeof x === 'number';");
    assert_round_trip_stable("x++ + ++y;");
    assert_round_trip_stable("a & b | c ^ d;");
    assert_round_trip_stable("x << 2 >>> 1;");
    assert_round_trip_stable("k in o && o instanceof C;");
}

#[test]
fn statements_round_trip_structurally() {
    assert_round_trip_stable("var a = 1, b;");
    assert_round_trip_stable("let x = [1, 2, 3];");
    assert_round_trip_stable("const o = { a: 1, 'b': 2, [k]: 3 };");
    assert_round_trip_stable("if (a) { b(); } else if (c) { d(); } else { e(); }");
    assert_round_trip_stable("while (i < 10) { i++; }");
    assert_round_trip_stable("switch (x) { case 1: a(); break; default: b(); }");
    assert_round_trip_stable("function f(a, b) { return a + b; }");
    assert_round_trip_stable("var g = function named(n) { return n; };");
}

#[test]
fn hex_literal_is_not_decimalized() {
    let (_, text) = reparse("var mask = 0x1F;");
    assert_eq!(text, "var mask = 0x1F;");
}

#[test]
fn scientific_notation_keeps_its_spelling() {
    let (_, text) = reparse("var k = 1e3;");
    assert_eq!(text, "var k = 1e3;");
}

#[test]
fn string_quote_style_is_preserved() {
    let (_, text) = reparse("var s = 'hi';");
    assert_eq!(text, "var s = 'hi';");
    let (_, text) = reparse("var s = \"hi\";");
    assert_eq!(text, "var s = \"hi\";");
}

#[test]
fn comments_are_dropped() {
    let (_, text) = reparse("var a = 1; // trailing note\n/* block */ var b = 2;");
    assert_eq!(text, "var a = 1;\nvar b = 2;");
}

#[test]
fn blocks_are_indented_four_spaces() {
    let (_, text) = reparse("function f(a, b) { if (a < b) { return a; } return b; }");
    assert_eq!(
        text,
        "function f(a, b) {\n    if (a < b) {\n        return a;\n    }\n    return b;\n}"
    );
}

#[test]
fn grouping_parentheses_survive_where_meaningful() {
    let (_, text) = reparse("(1 + 2) * 3;");
    assert_eq!(text, "(1 + 2) * 3;");
    // Redundant grouping is dropped.
    let (_, text) = reparse("(a) + (b);");
    assert_eq!(text, "a + b;");
}

#[test]
fn leading_object_literal_statement_reparses() {
    let (_, text) = reparse("({ a: 1 }).a;");
    assert_eq!(text, "({ a: 1 }.a);");
    assert_round_trip_stable(&text);
}

#[test]
fn unterminated_input_reports_a_syntax_error() {
    let err = to_nodes("if (").expect_err("must not parse");
    assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
}

#[test]
fn assigning_to_a_literal_is_rejected() {
    let err = to_nodes("1 = x;").expect_err("must not parse");
    assert!(matches!(err.kind, ErrorKind::InvalidAssignmentTarget));
}

#[test]
fn keywords_are_not_identifiers() {
    assert!(to_nodes("var function = 1;").is_err());
    assert!(to_nodes("return = 2;").is_err());
}
