//! Packrat memoization tests: transparency and adaptive self-disable.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::parser_for;
use crate::{choice, edge, lit, many, node, one_many, seq, GrammarBuilder, Parser};

/// A grammar whose alternatives re-parse `Term` at the same offsets, the
/// shape packrat memoization exists for. `memoized` toggles the cache so
/// the two variants can be compared.
fn expr_parser(memoized: bool) -> Parser {
    let mut g = GrammarBuilder::new();
    let digit = g.class("", "09");
    let term_body = node(one_many(digit), "Int", 0);
    let term_body = if memoized { g.memo(term_body) } else { term_body };
    g.define("Term", term_body);

    let t1 = g.rule_ref("Term");
    let e1 = g.rule_ref("Expr");
    let t2 = g.rule_ref("Term");
    let e2 = g.rule_ref("Expr");
    let t3 = g.rule_ref("Term");
    g.define(
        "Expr",
        choice(vec![
            node(
                seq(vec![edge("left", t1, 0), lit("+"), edge("right", e1, 0)]),
                "Add",
                0,
            ),
            node(
                seq(vec![edge("left", t2, 0), lit("-"), edge("right", e2, 0)]),
                "Sub",
                0,
            ),
            t3,
        ]),
    );

    let e = g.rule_ref("Expr");
    g.define("Start", node(e, "Source", 0));
    parser_for(g, "Start")
}

#[test]
fn memoized_and_plain_parses_agree() {
    let with = expr_parser(true);
    let without = expr_parser(false);
    for input in ["1", "1+2", "1-2+3", "12+34-5", "1+2-", "1+", "+", ""] {
        assert_eq!(
            with.parse(input).to_string(),
            without.parse(input).to_string(),
            "memoization changed the outcome for {input:?}"
        );
    }
}

#[test]
fn replay_reproduces_tree_context() {
    // The first alternative parses Term, fails on the operator, and the
    // later alternatives re-enter Term at the same offset through the memo.
    let tree = expr_parser(true).parse("1-2");
    assert_eq!(
        tree.to_string(),
        "[#Source [#Sub right = [#Int '2'] left = [#Int '1']]]"
    );
}

#[test]
fn a_cold_site_disables_itself_and_stays_correct() {
    let mut g = GrammarBuilder::new();
    let a = g.memo(node(lit("a"), "A", 0));
    g.define("Item", a);
    let item = g.rule_ref("Item");
    g.define("Start", many(item));
    let parser = parser_for(g, "Start");

    // Every call sits at a fresh offset, so the site never hits and trips
    // the self-disable threshold partway through.
    let input = "a".repeat(200);
    let tree = parser.parse(&input);
    assert_eq!(tree.size(), 200);

    // The same (now cache-less) grammar still parses correctly.
    let again = parser.parse(&input);
    assert_eq!(again.to_string(), tree.to_string());
}

proptest! {
    /// Memoization must never change the resulting tree.
    #[test]
    fn memo_transparency(input in "[0-9+\\-]{0,12}") {
        let with = expr_parser(true);
        let without = expr_parser(false);
        prop_assert_eq!(with.parse(&input).to_string(), without.parse(&input).to_string());
    }
}
