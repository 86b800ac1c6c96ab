//! The type-annotation mini-grammar.
//!
//! A separate, self-contained rule table for annotations like `int`,
//! `list[int]`, `(int,int)->bool`, or `int|str`. Arrow and union types are
//! built with the same fold primitive as the expression grammar; the arrow
//! folds rightward operand-by-operand, the union collects alternatives
//! under one node.

use cub_peg::{
    choice, fold, lit, many, node, one_many, opt, seq, Grammar, GrammarBuilder, GrammarError,
    Matcher,
};

/// Inline spacing inside annotations.
fn spacing(g: &mut GrammarBuilder) -> Matcher {
    many(g.class(" \t", ""))
}

pub(crate) fn grammar() -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new();

    let head = g.class("_", "AZaz");
    let tail = g.class("_", "AZaz09");
    g.define("NAME", seq(vec![head, many(tail)]));

    // `[T,U]` applied to the type to its left.
    let sp_a = spacing(&mut g);
    let first = g.rule_ref("Type");
    let sp_b = spacing(&mut g);
    let rest = g.rule_ref("Type");
    let sp_c = spacing(&mut g);
    g.define(
        "ParamSuffix",
        seq(vec![
            lit("["),
            fold(
                "",
                seq(vec![
                    sp_a,
                    opt(seq(vec![
                        first,
                        many(seq(vec![seq(vec![lit(","), sp_b]), rest])),
                    ])),
                    seq(vec![lit("]"), sp_c]),
                ]),
                "ParamType",
                -1,
            ),
        ]),
    );

    let sp_a = spacing(&mut g);
    let first = g.rule_ref("Type");
    let sp_b = spacing(&mut g);
    let rest = g.rule_ref("Type");
    let sp_c = spacing(&mut g);
    let params_a = g.rule_ref("ParamSuffix");
    let name = g.rule_ref("NAME");
    let sp_d = spacing(&mut g);
    let params_b = g.rule_ref("ParamSuffix");
    g.define(
        "PrimaryType",
        choice(vec![
            seq(vec![
                lit("("),
                node(
                    seq(vec![
                        sp_a,
                        opt(seq(vec![
                            first,
                            many(seq(vec![seq(vec![lit(","), sp_b]), rest])),
                        ])),
                        seq(vec![lit(")"), sp_c]),
                    ]),
                    "TupleType",
                    -1,
                ),
                many(params_a),
            ]),
            seq(vec![node(name, "BaseType", 0), sp_d, many(params_b)]),
        ]),
    );

    let primary = g.rule_ref("PrimaryType");
    let sp = spacing(&mut g);
    let result = g.rule_ref("Type");
    g.define(
        "FuncType",
        seq(vec![
            primary,
            many(seq(vec![
                lit("->"),
                fold("", seq(vec![sp, result]), "FuncType", -2),
            ])),
        ]),
    );

    let func = g.rule_ref("FuncType");
    let sp = spacing(&mut g);
    let alternative = g.rule_ref("Type");
    g.define(
        "Type",
        seq(vec![
            func,
            opt(fold(
                "",
                one_many(seq(vec![seq(vec![lit("|"), sp]), alternative])),
                "UnionType",
                0,
            )),
        ]),
    );

    g.finish()
}
