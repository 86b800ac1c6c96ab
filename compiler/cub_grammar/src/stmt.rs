//! Statement tier: declarations, control flow, assignment, indentation
//! blocks, and the `Source` start rule.
//!
//! Blocks are the context-sensitive part: a block's first line captures its
//! exact leading whitespace under `indent`, every further line must recall
//! it, and the whole block is scoped so nested blocks cannot leak their
//! deeper indentation outward.

use cub_peg::{
    choice, edge, lit, many, node, not, one_many, opt, peek, scoped, seq, GrammarBuilder, Matcher,
};

use crate::lexical::{ID_CHARS, ID_RANGES, SPACE};

fn no_id(g: &mut GrammarBuilder) -> Matcher {
    not(g.class(ID_CHARS, ID_RANGES))
}

/// One logical statement line: statements separated by `;` with an optional
/// trailing `;`.
fn statement_line(g: &mut GrammarBuilder) -> Matcher {
    let first = g.rule_ref("Statement");
    let semi = g.rule_ref("SEMI");
    let rest = g.rule_ref("Statement");
    let trailing = g.rule_ref("SEMI");
    seq(vec![
        first,
        many(seq(vec![semi, rest])),
        opt(trailing),
    ])
}

/// A blank (or comment-only) line inside a block.
fn blank_line(g: &mut GrammarBuilder) -> Matcher {
    let ws = g.rule_ref("_");
    let eol = g.rule_ref("EOL");
    seq(vec![ws, peek(eol)])
}

pub(crate) fn install(g: &mut GrammarBuilder) {
    // ── Simple statements ─────────────────────────────────────────────

    let ws = g.rule_ref("_");
    g.define("Pass", seq(vec![lit("pass"), node(ws, "Pass", -4)]));

    let ws = g.rule_ref("_");
    g.define("Break", seq(vec![lit("break"), node(ws, "Break", -5)]));

    let ws = g.rule_ref("_");
    g.define(
        "Continue",
        seq(vec![lit("continue"), node(ws, "Continue", -8)]),
    );

    let boundary = no_id(g);
    let ws = g.rule_ref("_");
    let value = g.rule_ref("Expression");
    g.define(
        "Return",
        seq(vec![
            lit("return"),
            node(
                opt(seq(vec![boundary, ws, edge("expr", value, 0)])),
                "Return",
                -6,
            ),
        ]),
    );

    // ── Assignment ────────────────────────────────────────────────────

    let compound = g.class("+=*/%&|^＋＝＊／％＆｜＾×÷", "");
    let eq = g.class("=＝", "");
    let ws = g.rule_ref("_");
    g.define(
        "SelfAssignOp",
        seq(vec![
            node(
                seq(vec![
                    choice(vec![
                        lit("<<"),
                        lit(">>"),
                        lit("**"),
                        lit("//"),
                        compound,
                    ]),
                    eq,
                ]),
                "",
                0,
            ),
            ws,
        ]),
    );

    let target = g.rule_ref("LeftHand");
    let op = g.rule_ref("SelfAssignOp");
    let value = g.rule_ref("Expression");
    g.define(
        "SelfAssign",
        node(
            seq(vec![
                edge("left", target, 0),
                edge("name", op, 0),
                edge("right", value, 0),
            ]),
            "SelfAssign",
            0,
        ),
    );

    let target = g.rule_ref("LeftHand");
    let assign = g.rule_ref("ASSIGN");
    let value = g.rule_ref("Expression");
    let self_assign = g.rule_ref("SelfAssign");
    g.define(
        "VarDecl",
        choice(vec![
            node(
                seq(vec![
                    edge("left", target, 0),
                    assign,
                    edge("right", value, 0),
                ]),
                "VarDecl",
                0,
            ),
            self_assign,
        ]),
    );

    // ── Blocks ────────────────────────────────────────────────────────

    let indent = g.rule_ref("INDENT");
    let capture = g.capture("indent", indent);
    let first_line = statement_line(g);
    let first_blank = blank_line(g);
    let again = g.recall("indent");
    let next_line = statement_line(g);
    let next_blank = blank_line(g);
    g.define(
        "Block",
        node(
            scoped(seq(vec![
                capture,
                choice(vec![first_line, first_blank]),
                many(seq(vec![again, choice(vec![next_line, next_blank])])),
            ])),
            "Block",
            0,
        ),
    );

    let single = g.rule_ref("Statement");
    g.define("BlockStmt", node(single, "Block", 0));

    // ── Control flow ──────────────────────────────────────────────────

    let same_indent = g.recall("indent");
    let lf = g.rule_ref("LF");
    let boundary = no_id(g);
    let ws = g.rule_ref("_");
    let cond = g.rule_ref("Expression");
    let colon = g.rule_ref("COLON");
    let block = g.rule_ref("Block");
    let block_stmt = g.rule_ref("BlockStmt");
    g.define(
        "ElifStmt",
        node(
            seq(vec![
                choice(vec![same_indent, lf]),
                lit("elif"),
                boundary,
                ws,
                edge("cond", cond, 0),
                colon,
                edge("then", choice(vec![block, block_stmt]), 0),
            ]),
            "ElifStmt",
            0,
        ),
    );

    let elif = g.rule_ref("ElifStmt");
    g.define("ElifBlock", node(one_many(elif), "", 0));

    let boundary = no_id(g);
    let ws = g.rule_ref("_");
    let cond = g.rule_ref("Expression");
    let colon = g.rule_ref("COLON");
    let then_block = g.rule_ref("Block");
    let then_stmt = g.rule_ref("BlockStmt");
    let elif_block = g.rule_ref("ElifBlock");
    let same_indent = g.recall("indent");
    let lf = g.rule_ref("LF");
    let boundary_else = no_id(g);
    let ws_else = g.rule_ref("_");
    let colon_else = g.rule_ref("COLON");
    let else_block = g.rule_ref("Block");
    let else_stmt = g.rule_ref("BlockStmt");
    g.define(
        "IfStmt",
        seq(vec![
            lit("if"),
            boundary,
            node(
                seq(vec![
                    ws,
                    edge("cond", cond, 0),
                    colon,
                    edge("then", choice(vec![then_block, then_stmt]), 0),
                    opt(edge("elif", elif_block, 0)),
                    opt(seq(vec![
                        choice(vec![same_indent, lf]),
                        lit("else"),
                        boundary_else,
                        ws_else,
                        colon_else,
                        edge("else", choice(vec![else_block, else_stmt]), 0),
                    ])),
                ]),
                "IfStmt",
                -2,
            ),
        ]),
    );

    let boundary = no_id(g);
    let ws = g.rule_ref("_");
    let each = g.rule_ref("Name");
    let boundary_in = no_id(g);
    let ws_in = g.rule_ref("_");
    let list = g.rule_ref("Expression");
    let colon = g.rule_ref("COLON");
    let body_block = g.rule_ref("Block");
    let body_stmt = g.rule_ref("BlockStmt");
    g.define(
        "ForStmt",
        seq(vec![
            lit("for"),
            boundary,
            node(
                seq(vec![
                    ws,
                    edge("each", each, 0),
                    lit("in"),
                    boundary_in,
                    ws_in,
                    edge("list", list, 0),
                    colon,
                    edge("body", choice(vec![body_block, body_stmt]), 0),
                ]),
                "ForStmt",
                -3,
            ),
        ]),
    );

    let boundary = no_id(g);
    let ws = g.rule_ref("_");
    let cond = g.rule_ref("Expression");
    let colon = g.rule_ref("COLON");
    let body_block = g.rule_ref("Block");
    let body_stmt = g.rule_ref("BlockStmt");
    g.define(
        "WhileStmt",
        seq(vec![
            lit("while"),
            boundary,
            node(
                seq(vec![
                    ws,
                    edge("cond", cond, 0),
                    colon,
                    edge("body", choice(vec![body_block, body_stmt]), 0),
                ]),
                "WhileStmt",
                -5,
            ),
        ]),
    );

    // ── Declarations ──────────────────────────────────────────────────

    let name = g.rule_ref("Name");
    let colon = g.rule_ref("COLON");
    let ty = g.rule_ref("Name");
    g.define(
        "FuncParam",
        node(
            seq(vec![
                edge("name", name, 0),
                opt(seq(vec![colon, edge("type", ty, 0)])),
            ]),
            "Param",
            0,
        ),
    );

    let lp = g.rule_ref("LP");
    let first = g.rule_ref("FuncParam");
    let comma = g.rule_ref("COMMA");
    let skip = g.rule_ref("__");
    let rest = g.rule_ref("FuncParam");
    let skip_close = g.rule_ref("__");
    let rp = g.rule_ref("RP");
    let recover = g.rule_ref("CloseP");
    g.define(
        "FuncParams",
        node(
            seq(vec![
                lp,
                opt(first),
                many(seq(vec![comma, skip, rest])),
                choice(vec![seq(vec![skip_close, rp]), recover]),
            ]),
            "FuncParam",
            0,
        ),
    );

    let space = g.class(SPACE, "");
    let ws = g.rule_ref("_");
    let name = g.rule_ref("Name");
    let params = g.rule_ref("FuncParams");
    let colon = g.rule_ref("COLON");
    let body_block = g.rule_ref("Block");
    let body_stmt = g.rule_ref("BlockStmt");
    g.define(
        "FuncDecl",
        seq(vec![
            lit("def"),
            space,
            node(
                seq(vec![
                    ws,
                    edge("name", name, 0),
                    edge("params", params, 0),
                    colon,
                    edge("body", choice(vec![body_block, body_stmt]), 0),
                ]),
                "FuncDecl",
                -4,
            ),
        ]),
    );

    let space = g.class(SPACE, "");
    let ws_a = g.rule_ref("_");
    let name = g.rule_ref("Name");
    let ws_b = g.rule_ref("_");
    let extends = g.rule_ref("Name");
    let ws_c = g.rule_ref("_");
    let ws_d = g.rule_ref("_");
    let body_block = g.rule_ref("Block");
    let body_stmt = g.rule_ref("BlockStmt");
    g.define(
        "ClassDecl",
        seq(vec![
            lit("class"),
            space,
            node(
                seq(vec![
                    ws_a,
                    edge("name", name, 0),
                    opt(seq(vec![
                        lit("("),
                        ws_b,
                        edge("extends", extends, 0),
                        lit(")"),
                        ws_c,
                    ])),
                    lit(":"),
                    ws_d,
                    choice(vec![body_block, body_stmt]),
                ]),
                "ClassDecl",
                -6,
            ),
        ]),
    );

    let space_a = g.class(SPACE, "");
    let name_a = g.rule_ref("Name");
    let space_b = g.class(SPACE, "");
    let alias = g.rule_ref("Name");
    let space_c = g.class(SPACE, "");
    let name_b = g.rule_ref("Name");
    let space_d = g.class(SPACE, "");
    let import_one = g.rule_ref("Name");
    let ws_a = g.rule_ref("_");
    let import_more = g.rule_ref("Name");
    let ws_b = g.rule_ref("_");
    g.define(
        "ImportDecl",
        choice(vec![
            seq(vec![
                lit("import"),
                space_a,
                node(
                    seq(vec![
                        edge("name", name_a, 0),
                        opt(seq(vec![lit("as"), space_b, edge("alias", alias, 0)])),
                    ]),
                    "ImportDecl",
                    -7,
                ),
            ]),
            seq(vec![
                lit("from"),
                space_c,
                node(
                    seq(vec![
                        edge("name", name_b, 0),
                        lit("import"),
                        space_d,
                        edge(
                            "names",
                            choice(vec![
                                node(
                                    seq(vec![
                                        import_one,
                                        many(seq(vec![lit(","), ws_a, import_more])),
                                    ]),
                                    "",
                                    0,
                                ),
                                seq(vec![lit("*"), node(ws_b, "", -1)]),
                            ]),
                            0,
                        ),
                    ]),
                    "FromDecl",
                    -5,
                ),
            ]),
        ]),
    );

    // ── Statement dispatch and the start rule ─────────────────────────

    let class_decl = g.rule_ref("ClassDecl");
    let import_decl = g.rule_ref("ImportDecl");
    let func_decl = g.rule_ref("FuncDecl");
    let if_stmt = g.rule_ref("IfStmt");
    let for_stmt = g.rule_ref("ForStmt");
    let while_stmt = g.rule_ref("WhileStmt");
    let ret = g.rule_ref("Return");
    let pass = g.rule_ref("Pass");
    let brk = g.rule_ref("Break");
    let cont = g.rule_ref("Continue");
    let var_decl = g.rule_ref("VarDecl");
    let expression = g.rule_ref("Expression");
    g.define(
        "Statement",
        choice(vec![
            class_decl,
            import_decl,
            func_decl,
            if_stmt,
            for_stmt,
            while_stmt,
            ret,
            pass,
            brk,
            cont,
            var_decl,
            expression,
        ]),
    );

    let leading = g.rule_ref("EOL");
    let line = statement_line(g);
    let eol = g.rule_ref("EOL");
    let eof = g.rule_ref("EOF");
    g.define(
        "Source",
        seq(vec![
            opt(leading),
            node(many(seq(vec![line, eol])), "Source", 0),
            eof,
        ]),
    );
}
