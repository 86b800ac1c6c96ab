//! Expression tier: constants, collections, the precedence chain, and the
//! suffix chain (calls, attributes, indexing, slices).
//!
//! Every binary level is `Tighter (op Tighter)*` with a left-fold, so the
//! finished trees are left-associative without any rule recursing leftward.
//! The reused levels are memoized; the backtracking between statement
//! alternatives re-enters them at the same offsets constantly.

use cub_peg::{
    choice, dict, edge, empty, fold, lit, many, node, not, opt, peek, seq, GrammarBuilder, Matcher,
};

use crate::lexical::{ID_CHARS, ID_RANGES, SPACE};

/// Keyword boundary: the next character must not continue an identifier.
fn no_id(g: &mut GrammarBuilder) -> Matcher {
    not(g.class(ID_CHARS, ID_RANGES))
}

pub(crate) fn install(g: &mut GrammarBuilder) {
    // ── Constants ─────────────────────────────────────────────────────

    let t = g.class("Tt", "");
    let ws = g.rule_ref("_");
    g.define(
        "TrueExpr",
        seq(vec![t, lit("rue"), node(empty(), "TrueExpr", -4), ws]),
    );

    let f = g.class("Ff", "");
    let ws = g.rule_ref("_");
    g.define(
        "FalseExpr",
        seq(vec![f, lit("alse"), node(empty(), "FalseExpr", -5), ws]),
    );

    let ws = g.rule_ref("_");
    g.define("NullExpr", seq(vec![node(dict("None null"), "Null", 0), ws]));

    let string = g.rule_ref("StringExpr");
    let ch = g.rule_ref("CharExpr");
    let number = g.rule_ref("Number");
    let true_expr = g.rule_ref("TrueExpr");
    let false_expr = g.rule_ref("FalseExpr");
    let null_expr = g.rule_ref("NullExpr");
    g.define(
        "Constant",
        choice(vec![string, ch, number, true_expr, false_expr, null_expr]),
    );

    // ── Recovery points for unclosed brackets ─────────────────────────
    //
    // Each succeeds (producing a Recover node) at the next delimiter or at
    // the end of input, letting an unclosed bracket end its expression
    // instead of failing the whole statement.

    let delim = g.class(".:+-*/%<>=!(){}[],\n", "");
    let rp = g.rule_ref("RP");
    let eof = g.rule_ref("EOF");
    g.define(
        "CloseP",
        seq(vec![not(rp), node(choice(vec![peek(delim), eof]), "RecoverP", 0)]),
    );

    let delim = g.class(".:+-*/%<>=!(){}[],\n", "");
    let rs = g.rule_ref("RS");
    let eof = g.rule_ref("EOF");
    g.define(
        "CloseS",
        seq(vec![not(rs), node(choice(vec![peek(delim), eof]), "RecoverS", 0)]),
    );

    let delim = g.class(".:+-*/%<>=!(){}[],\n", "");
    let rb = g.rule_ref("RB");
    let eof = g.rule_ref("EOF");
    g.define(
        "CloseB",
        seq(vec![not(rb), node(choice(vec![peek(delim), eof]), "RecoverB", 0)]),
    );

    // ── Operator vocabularies ─────────────────────────────────────────

    let prod_class = g.class("*/%^&＊・／％＾＆×÷", "");
    g.define(
        "PROD",
        choice(vec![
            lit("//"),
            lit("<<"),
            lit(">>"),
            lit("／／"),
            lit("＜＜"),
            lit("＞＞"),
            prod_class,
        ]),
    );

    let space = g.class(SPACE, "");
    g.define(
        "EQ",
        choice(vec![
            seq(vec![
                lit("="),
                choice(vec![seq(vec![lit("="), not(lit("="))]), not(lit("="))]),
            ]),
            seq(vec![
                lit("＝"),
                choice(vec![seq(vec![lit("＝"), not(lit("＝"))]), not(lit("＝"))]),
            ]),
            seq(vec![lit("!="), not(lit("="))]),
            seq(vec![lit("！＝"), not(lit("＝"))]),
            seq(vec![
                lit("<"),
                choice(vec![seq(vec![lit("="), not(lit("="))]), not(lit("<"))]),
            ]),
            seq(vec![
                lit("＜"),
                choice(vec![seq(vec![lit("＝"), not(lit("＝"))]), not(lit("＜"))]),
            ]),
            seq(vec![
                lit(">"),
                choice(vec![seq(vec![lit("="), not(lit("="))]), not(lit(">"))]),
            ]),
            seq(vec![
                lit("＞"),
                choice(vec![seq(vec![lit("＝"), not(lit("＝"))]), not(lit("＞"))]),
            ]),
            seq(vec![lit("in"), space]),
        ]),
    );

    let boundary = no_id(g);
    g.define(
        "AND",
        choice(vec![seq(vec![lit("and"), boundary]), lit("&&"), lit("＆＆")]),
    );

    let boundary = no_id(g);
    g.define(
        "OR",
        choice(vec![seq(vec![lit("or"), boundary]), lit("||"), lit("｜｜")]),
    );

    let boundary = no_id(g);
    let ws = g.rule_ref("_");
    let bang = g.class("!！", "");
    g.define("NOT", choice(vec![seq(vec![lit("not"), boundary, ws]), bang]));

    // ── Collections ───────────────────────────────────────────────────

    let name = g.rule_ref("Name");
    let string = g.rule_ref("StringExpr");
    let ch = g.rule_ref("CharExpr");
    let colon = g.rule_ref("COLON");
    let value = g.rule_ref("Expression");
    g.define(
        "KeyValue",
        node(
            seq(vec![
                edge("name", choice(vec![name, string, ch]), 0),
                colon,
                edge("value", value, 0),
            ]),
            "KeyValue",
            0,
        ),
    );

    let lp = g.rule_ref("LP");
    let first = g.rule_ref("Expression");
    let comma = g.rule_ref("COMMA");
    let skip = g.rule_ref("__");
    let rest = g.rule_ref("Expression");
    let skip_close = g.rule_ref("__");
    let rp = g.rule_ref("RP");
    let recover = g.rule_ref("CloseP");
    g.define(
        "GroupExpr",
        node(
            seq(vec![
                lp,
                first,
                many(seq(vec![comma, skip, rest])),
                choice(vec![seq(vec![skip_close, rp]), recover]),
            ]),
            "Tuple",
            0,
        ),
    );

    let ls = g.rule_ref("LS");
    let first = g.rule_ref("Expression");
    let comma = g.rule_ref("COMMA");
    let skip = g.rule_ref("__");
    let rest = g.rule_ref("Expression");
    let trailing = g.rule_ref("COMMA");
    let skip_close = g.rule_ref("__");
    let rs = g.rule_ref("RS");
    let recover = g.rule_ref("CloseS");
    g.define(
        "ListExpr",
        node(
            seq(vec![
                ls,
                opt(seq(vec![first, many(seq(vec![comma, skip, rest]))])),
                opt(trailing),
                choice(vec![seq(vec![skip_close, rs]), recover]),
            ]),
            "List",
            0,
        ),
    );

    let lb = g.rule_ref("LB");
    let first = g.rule_ref("KeyValue");
    let comma = g.rule_ref("COMMA");
    let skip = g.rule_ref("__");
    let rest = g.rule_ref("KeyValue");
    let trailing = g.rule_ref("COMMA");
    let skip_close = g.rule_ref("__");
    let rb = g.rule_ref("RB");
    let recover = g.rule_ref("CloseB");
    g.define(
        "DataExpr",
        node(
            seq(vec![
                lb,
                opt(seq(vec![
                    first,
                    many(seq(vec![comma, skip, rest])),
                    opt(trailing),
                ])),
                choice(vec![seq(vec![skip_close, rb]), recover]),
            ]),
            "Data",
            0,
        ),
    );

    // ── Lambda ────────────────────────────────────────────────────────

    let name = g.rule_ref("Name");
    let comma = g.rule_ref("COMMA");
    let more = g.rule_ref("Name");
    g.define(
        "LambdaParams",
        node(seq(vec![opt(name), many(seq(vec![comma, more]))]), "Param", 0),
    );

    let space = g.class(SPACE, "");
    let ws = g.rule_ref("_");
    let params = g.rule_ref("LambdaParams");
    let colon = g.rule_ref("COLON");
    let block = g.rule_ref("Block");
    let body_expr = g.rule_ref("Expression");
    g.define(
        "Lambda",
        seq(vec![
            lit("lambda"),
            node(
                seq(vec![
                    opt(seq(vec![space, ws, edge("params", params, 0)])),
                    colon,
                    edge("body", choice(vec![block, body_expr]), 0),
                ]),
                "FuncExpr",
                -6,
            ),
        ]),
    );

    // ── Call arguments ────────────────────────────────────────────────

    let name = g.rule_ref("Name");
    let assign = g.rule_ref("ASSIGN");
    let ws = g.rule_ref("_");
    let value = g.rule_ref("Expression");
    g.define(
        "Argument",
        node(
            seq(vec![
                edge("name", name, 0),
                assign,
                ws,
                edge("value", value, 0),
            ]),
            "KeyValue",
            0,
        ),
    );

    let comma_a = g.rule_ref("COMMA");
    let skip_a = g.rule_ref("__");
    let first = g.rule_ref("Argument");
    let comma_b = g.rule_ref("COMMA");
    let skip_b = g.rule_ref("__");
    let rest = g.rule_ref("Argument");
    g.define(
        "KeywordArgument",
        node(
            seq(vec![
                opt(seq(vec![comma_a, skip_a])),
                first,
                many(seq(vec![comma_b, skip_b, rest])),
            ]),
            "Data",
            0,
        ),
    );

    // A positional argument must not be the start of a `name = value`
    // keyword argument.
    let raw_name_a = g.rule_ref("NAME");
    let ws_a = g.rule_ref("_");
    let first = g.rule_ref("Expression");
    let comma = g.rule_ref("COMMA");
    let skip = g.rule_ref("__");
    let raw_name_b = g.rule_ref("NAME");
    let ws_b = g.rule_ref("_");
    let rest = g.rule_ref("Expression");
    let keyword = g.rule_ref("KeywordArgument");
    g.define(
        "Arguments",
        node(
            seq(vec![
                opt(seq(vec![
                    not(seq(vec![raw_name_a, ws_a, lit("=")])),
                    first,
                ])),
                many(seq(vec![
                    comma,
                    skip,
                    not(seq(vec![raw_name_b, ws_b, lit("=")])),
                    rest,
                ])),
                opt(keyword),
            ]),
            "Arguments",
            0,
        ),
    );

    // ── Primary and suffixes ──────────────────────────────────────────

    let group = g.rule_ref("GroupExpr");
    let list = g.rule_ref("ListExpr");
    let data = g.rule_ref("DataExpr");
    let lambda = g.rule_ref("Lambda");
    let constant = g.rule_ref("Constant");
    let name = g.rule_ref("Name");
    let primary = g.memo(choice(vec![group, list, data, lambda, constant, name]));
    g.define("Primary", primary);

    let dot_a = g.rule_ref("DOT");
    let method_name = g.rule_ref("Name");
    let lp_a = g.rule_ref("LP");
    let method_args = g.rule_ref("Arguments");
    let skip_a = g.rule_ref("__");
    let rp_a = g.rule_ref("RP");
    let close_a = g.rule_ref("CloseP");
    let method = fold(
        "recv",
        seq(vec![
            dot_a,
            edge("name", method_name, 0),
            lp_a,
            edge("params", method_args, 0),
            choice(vec![seq(vec![skip_a, rp_a]), edge("err", close_a, 0)]),
        ]),
        "MethodExpr",
        0,
    );

    let dot_b = g.rule_ref("DOT");
    let attr_name = g.rule_ref("Name");
    let get = fold(
        "recv",
        seq(vec![dot_b, edge("name", attr_name, 0)]),
        "GetExpr",
        0,
    );

    let lp_b = g.rule_ref("LP");
    let call_args = g.rule_ref("Arguments");
    let skip_b = g.rule_ref("__");
    let rp_b = g.rule_ref("RP");
    let close_b = g.rule_ref("CloseP");
    let apply = fold(
        "name",
        seq(vec![
            lp_b,
            edge("params", call_args, 0),
            choice(vec![seq(vec![skip_b, rp_b]), edge("err", close_b, 0)]),
        ]),
        "ApplyExpr",
        0,
    );

    let ls_a = g.rule_ref("LS");
    let slice_left = g.rule_ref("Expression");
    let colon = g.rule_ref("COLON");
    let slice_right = g.rule_ref("Expression");
    let rs_a = g.rule_ref("RS");
    let close_c = g.rule_ref("CloseS");
    let slice = fold(
        "recv",
        seq(vec![
            ls_a,
            opt(edge("left", slice_left, 0)),
            colon,
            opt(edge("right", slice_right, 0)),
            choice(vec![rs_a, edge("err", close_c, 0)]),
        ]),
        "Slice",
        0,
    );

    let ls_b = g.rule_ref("LS");
    let index = g.rule_ref("Expression");
    let rs_b = g.rule_ref("RS");
    let close_d = g.rule_ref("CloseS");
    let index_expr = fold(
        "recv",
        seq(vec![
            ls_b,
            edge("index", index, 0),
            choice(vec![rs_b, edge("err", close_d, 0)]),
        ]),
        "IndexExpr",
        0,
    );

    let primary = g.rule_ref("Primary");
    let suffix = g.memo(seq(vec![
        primary,
        many(choice(vec![method, get, apply, slice, index_expr])),
    ]));
    g.define("SuffixExpr", suffix);

    // Assignment targets: attribute and index suffixes only, no calls.
    let name = g.rule_ref("Name");
    let dot = g.rule_ref("DOT");
    let attr = g.rule_ref("Name");
    let ls = g.rule_ref("LS");
    let index = g.rule_ref("Expression");
    let rs = g.rule_ref("RS");
    g.define(
        "LeftHand",
        seq(vec![
            name,
            many(choice(vec![
                fold("recv", seq(vec![dot, edge("name", attr, 0)]), "GetExpr", 0),
                fold(
                    "recv",
                    seq(vec![ls, edge("index", index, 0), rs]),
                    "IndexExpr",
                    0,
                ),
            ])),
        ]),
    );

    // ── Precedence chain ──────────────────────────────────────────────

    let pre = g.class("+-~＋ー〜", "");
    let ws = g.rule_ref("_");
    let operand = g.rule_ref("UnaryExpr");
    let suffix = g.rule_ref("SuffixExpr");
    let unary = g.memo(choice(vec![
        seq(vec![
            pre,
            node(
                seq(vec![
                    edge("name", node(empty(), "Name", -1), -1),
                    ws,
                    edge("expr", operand, 0),
                ]),
                "Unary",
                -1,
            ),
        ]),
        suffix,
    ]));
    g.define("UnaryExpr", unary);

    let base = g.rule_ref("UnaryExpr");
    let ws = g.rule_ref("_");
    let right = g.rule_ref("UnaryExpr");
    let power = g.memo(seq(vec![
        base,
        many(seq(vec![
            lit("**"),
            fold(
                "left",
                seq(vec![
                    edge("name", node(empty(), "Name", -2), -2),
                    ws,
                    edge("right", right, 0),
                ]),
                "Infix",
                -2,
            ),
        ])),
    ]));
    g.define("PowExpr", power);

    let base = g.rule_ref("PowExpr");
    let op = g.rule_ref("PROD");
    let ws = g.rule_ref("_");
    let right = g.rule_ref("PowExpr");
    let product = g.memo(seq(vec![
        base,
        many(fold(
            "left",
            seq(vec![
                edge("name", node(op, "Name", 0), 0),
                ws,
                edge("right", right, 0),
            ]),
            "Infix",
            0,
        )),
    ]));
    g.define("ProdExpr", product);

    let base = g.rule_ref("ProdExpr");
    let sum_op = g.class("+-|＋ー｜", "");
    let ws = g.rule_ref("_");
    let right = g.rule_ref("ProdExpr");
    let sum = g.memo(seq(vec![
        base,
        many(seq(vec![
            sum_op,
            fold(
                "left",
                seq(vec![
                    edge("name", node(empty(), "Name", -1), -1),
                    ws,
                    edge("right", right, 0),
                ]),
                "Infix",
                -1,
            ),
        ])),
    ]));
    g.define("SumExpr", sum);

    let base = g.rule_ref("SumExpr");
    let op = g.rule_ref("EQ");
    let ws = g.rule_ref("_");
    let right = g.rule_ref("SumExpr");
    let equality = g.memo(seq(vec![
        base,
        many(fold(
            "left",
            seq(vec![
                edge("name", node(op, "Name", 0), 0),
                ws,
                edge("right", right, 0),
            ]),
            "Infix",
            0,
        )),
    ]));
    g.define("EqExpr", equality);

    let op = g.rule_ref("NOT");
    let ws = g.rule_ref("_");
    let operand = g.rule_ref("NotExpr");
    let eq_expr = g.rule_ref("EqExpr");
    let negation = g.memo(choice(vec![
        node(seq(vec![op, ws, operand]), "Not", 0),
        eq_expr,
    ]));
    g.define("NotExpr", negation);

    let base = g.rule_ref("NotExpr");
    let op = g.rule_ref("AND");
    let ws = g.rule_ref("_");
    let right = g.rule_ref("NotExpr");
    let conjunction = g.memo(seq(vec![
        base,
        many(fold(
            "left",
            seq(vec![op, ws, edge("right", right, 0)]),
            "And",
            0,
        )),
    ]));
    g.define("AndExpr", conjunction);

    let base = g.rule_ref("AndExpr");
    let op = g.rule_ref("OR");
    let ws = g.rule_ref("_");
    let right = g.rule_ref("AndExpr");
    let disjunction = g.memo(seq(vec![
        base,
        many(fold(
            "left",
            seq(vec![op, ws, edge("right", right, 0)]),
            "Or",
            0,
        )),
    ]));
    g.define("Operator", disjunction);

    let base = g.rule_ref("Operator");
    let boundary = no_id(g);
    let ws = g.rule_ref("_");
    let cond = g.rule_ref("Expression");
    let boundary_else = no_id(g);
    let ws_else = g.rule_ref("_");
    let alt = g.rule_ref("Expression");
    let conditional = g.memo(seq(vec![
        base,
        opt(seq(vec![
            lit("if"),
            boundary,
            fold(
                "then",
                seq(vec![
                    ws,
                    edge("cond", cond, 0),
                    lit("else"),
                    boundary_else,
                    ws_else,
                    edge("else", alt, 0),
                ]),
                "IfExpr",
                -2,
            ),
        ])),
    ]));
    g.define("Expression", conditional);
}
