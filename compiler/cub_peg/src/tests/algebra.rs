//! Tree algebra and conversion tests.

use pretty_assertions::assert_eq;

use super::parser_for;
use crate::{
    any, edge, fail, fold, hide, lit, many, node, one_many, seq, GrammarBuilder, ParseOptions,
    Parser, ParseTree, RawTree, Span,
};

/// Two-level arithmetic grammar built on the fold primitive, the shape the
/// engine exists to support: `Primary (op Primary)*` with left-fold instead
/// of left recursion.
fn arith() -> Parser {
    let mut g = GrammarBuilder::new();
    let digit = g.class("", "09");
    g.define("Int", node(one_many(digit), "Int", 0));

    let prod_op = g.class("*/", "");
    let int1 = g.rule_ref("Int");
    let int2 = g.rule_ref("Int");
    g.define(
        "Prod",
        seq(vec![
            int1,
            many(fold(
                "left",
                seq(vec![
                    edge("name", node(prod_op, "Name", 0), 0),
                    edge("right", int2, 0),
                ]),
                "Infix",
                0,
            )),
        ]),
    );

    let sum_op = g.class("+-", "");
    let prod1 = g.rule_ref("Prod");
    let prod2 = g.rule_ref("Prod");
    g.define(
        "Sum",
        seq(vec![
            prod1,
            many(fold(
                "left",
                seq(vec![
                    edge("name", node(sum_op, "Name", 0), 0),
                    edge("right", prod2, 0),
                ]),
                "Infix",
                0,
            )),
        ]),
    );

    let sum = g.rule_ref("Sum");
    g.define("Start", node(sum, "Source", 0));
    parser_for(g, "Start")
}

#[test]
fn multiplication_folds_at_the_tighter_level() {
    let tree = arith().parse("1+2*3");
    assert_eq!(
        tree.to_string(),
        "[#Source [#Infix right = [#Infix right = [#Int '3'] name = [#Name '*'] \
         left = [#Int '2']] name = [#Name '+'] left = [#Int '1']]]"
    );
}

#[test]
fn folds_are_left_associative() {
    let tree = arith().parse("1-2-3");
    assert_eq!(
        tree.to_string(),
        "[#Source [#Infix right = [#Int '3'] name = [#Name '-'] \
         left = [#Infix right = [#Int '2'] name = [#Name '-'] left = [#Int '1']]]]"
    );
}

#[test]
fn single_operand_needs_no_fold() {
    let tree = arith().parse("7");
    assert_eq!(tree.to_string(), "[#Source [#Int '7']]");
}

#[test]
fn root_token_round_trips_the_input() {
    let input = "1+2*3";
    let tree = arith().parse(input);
    assert_eq!(tree.token(), input);
    assert_eq!(tree.span(), Span::new(0, 5));
}

#[test]
fn node_shift_pulls_a_delimiter_into_the_span() {
    let mut g = GrammarBuilder::new();
    let content = g.class("", "az");
    g.define(
        "Start",
        seq(vec![
            lit("\""),
            node(seq(vec![many(content), lit("\"")]), "Str", -1),
        ]),
    );
    let tree = parser_for(g, "Start").parse("\"hi\"");
    assert_eq!(tree.to_string(), "[#Str '\"hi\"']");
    assert_eq!(tree.span(), Span::new(0, 4));
}

#[test]
fn token_only_edges_wrap_anonymously() {
    let mut g = GrammarBuilder::new();
    g.define("Start", node(edge("x", lit("a"), 0), "N", 0));
    let tree = parser_for(g, "Start").parse("a");
    assert_eq!(tree.to_string(), "[#N x = [# 'a']]");
}

#[test]
fn field_order_is_most_recent_first() {
    let mut g = GrammarBuilder::new();
    g.define(
        "Start",
        node(
            seq(vec![
                edge("k", node(lit("a"), "K", 0), 0),
                edge("v", node(lit("b"), "V", 0), 0),
            ]),
            "Pair",
            0,
        ),
    );
    let tree = parser_for(g, "Start").parse("ab");
    assert_eq!(tree.to_string(), "[#Pair v = [#V 'b'] k = [#K 'a']]");
    let keys: Vec<&str> = tree.keys().collect();
    assert_eq!(keys, ["v", "k"]);
}

#[test]
fn hide_discards_inner_fragments() {
    let mut g = GrammarBuilder::new();
    g.define(
        "Start",
        node(
            seq(vec![
                node(lit("a"), "A", 0),
                hide(node(lit("b"), "B", 0)),
            ]),
            "P",
            0,
        ),
    );
    let tree = parser_for(g, "Start").parse("ab");
    assert_eq!(tree.to_string(), "[#P [#A 'a']]");
    // The hidden fragment still consumed input.
    assert_eq!(tree.token(), "ab");
}

#[test]
fn sibling_chain_converts_to_an_anonymous_root_in_source_order() {
    let mut g = GrammarBuilder::new();
    let letter = g.class("", "az");
    g.define("Start", many(node(letter, "C", 0)));
    let tree = parser_for(g, "Start").parse("ab");
    assert_eq!(tree.to_string(), "[# [#C 'a'] [#C 'b']]");
    assert_eq!(tree.size(), 2);
    assert_eq!(tree.get(0).token(), "a");
    assert_eq!(tree.get(1).token(), "b");
}

#[test]
fn tagless_success_synthesizes_an_anonymous_span() {
    let mut g = GrammarBuilder::new();
    g.define("Start", many(lit(" ")));
    let tree = parser_for(g, "Start").parse("   ");
    assert!(!tree.is_syntax_error());
    assert_eq!(tree.to_string(), "[# '   ']");
    assert_eq!(tree.token(), "   ");
}

#[test]
fn failure_yields_an_err_tree_at_the_furthest_reach() {
    let mut g = GrammarBuilder::new();
    g.define("Start", seq(vec![lit("ab"), lit("c")]));
    let parser = parser_for(g, "Start");
    let options = ParseOptions {
        urn: Some("demo.cub"),
        ..ParseOptions::default()
    };
    let tree = parser.parse_with("abd", &options);
    assert!(tree.is_syntax_error());
    assert_eq!(tree.span(), Span::new(2, 2));
    assert_eq!(tree.message("Syntax Error"), "(demo.cub:1+2) Syntax Error");
}

#[test]
fn err_position_prefers_the_deepest_alternative() {
    let mut g = GrammarBuilder::new();
    g.define(
        "Start",
        crate::choice(vec![seq(vec![lit("abc"), fail()]), lit("zz")]),
    );
    let tree = parser_for(g, "Start").parse("abcd");
    assert!(tree.is_syntax_error());
    assert_eq!(tree.span(), Span::new(3, 3));
}

#[test]
fn options_select_a_window_of_the_input() {
    let mut g = GrammarBuilder::new();
    g.define("Start", node(many(any()), "All", 0));
    let parser = parser_for(g, "Start");
    let options = ParseOptions {
        pos: 2,
        epos: Some(4),
        ..ParseOptions::default()
    };
    let tree = parser.parse_with("abcdef", &options);
    assert_eq!(tree.token(), "cd");
    assert_eq!(tree.span(), Span::new(2, 4));
}

fn custom_conv(raw: RawTree<'_>) -> ParseTree {
    let span = raw.span().unwrap_or(Span::new(0, 0));
    ParseTree::new("Custom", raw.input(), raw.urn(), span, Vec::new(), Vec::new())
}

#[test]
fn conversion_can_be_overridden() {
    let mut g = GrammarBuilder::new();
    g.define("Start", node(many(any()), "All", 0));
    let parser = parser_for(g, "Start");
    let options = ParseOptions {
        conv: Some(custom_conv),
        ..ParseOptions::default()
    };
    let tree = parser.parse_with("xy", &options);
    assert!(tree.is("Custom"));
    assert_eq!(tree.token(), "xy");
}
