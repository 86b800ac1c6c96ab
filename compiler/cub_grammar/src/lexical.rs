//! Lexical tier: spacing, comments, names, numbers, strings, punctuation.
//!
//! Character classes routinely pair the ASCII form with its full-width
//! twin (`(` and `（`, `0-9` and `０-９`); the class compiler's bitmap makes
//! the wide codepoints free.

use cub_peg::{any, choice, lit, many, node, not, one_many, opt, seq, GrammarBuilder};

/// Horizontal spacing, including the zero-width space (U+200B) and the
/// ideographic space (U+3000).
pub(crate) const SPACE: &str = " \t\u{200B}\u{0B}\r\u{3000}";

/// Identifier continuation: `_`, ASCII letters and digits.
pub(crate) const ID_CHARS: &str = "_";
pub(crate) const ID_RANGES: &str = "AZaz09";

pub(crate) fn install(g: &mut GrammarBuilder) {
    // ── Spacing and comments ──────────────────────────────────────────

    g.define("EOF", not(any()));
    let eof = g.rule_ref("EOF");
    g.define("LF", choice(vec![lit("\n"), eof]));

    let hash = g.class("#＃", "");
    let lf = g.rule_ref("LF");
    g.define(
        "LINECOMMENT",
        seq(vec![hash, many(seq(vec![not(lf), any()]))]),
    );

    g.define(
        "BLOCKCOMMENT",
        choice(vec![
            seq(vec![lit("/*"), many(seq(vec![not(lit("*/")), any()])), lit("*/")]),
            seq(vec![lit("(*"), many(seq(vec![not(lit("*)")), any()])), lit("*)")]),
        ]),
    );

    let space = g.class(SPACE, "");
    let block_comment = g.rule_ref("BLOCKCOMMENT");
    let line_comment = g.rule_ref("LINECOMMENT");
    g.define("_", many(choice(vec![space, block_comment, line_comment])));

    // Multi-line spacing: also swallows newlines (the `\t-\v` range covers
    // `\n`). Used inside brackets where line breaks do not end a statement.
    let wide_space = g.class("\r \u{200B}\u{3000}", "\t\u{0B}");
    let block_comment = g.rule_ref("BLOCKCOMMENT");
    let line_comment = g.rule_ref("LINECOMMENT");
    g.define("__", many(choice(vec![wide_space, block_comment, line_comment])));

    let ws_a = g.rule_ref("_");
    let lf_a = g.rule_ref("LF");
    let ws_b = g.rule_ref("_");
    let lf_b = g.rule_ref("LF");
    g.define("EOL", seq(vec![ws_a, lf_a, many(seq(vec![ws_b, lf_b]))]));

    let indent_space = g.class(" \t\u{3000}", "");
    g.define("INDENT", seq(vec![lit("\n"), one_many(indent_space)]));

    // ── Names ─────────────────────────────────────────────────────────

    let head = g.class("_", "AZaz");
    let tail = g.class(ID_CHARS, ID_RANGES);
    g.define("NAME", seq(vec![head, many(tail)]));

    let name = g.rule_ref("NAME");
    let ws = g.rule_ref("_");
    g.define("Identifier", seq(vec![node(name, "Name", 0), ws]));

    // Identifiers in the learner's own script: hiragana, katakana, kanji.
    let lfp_head = g.class("_々〇〻ー", "ぁんァヶ㐀䶵一龠");
    let lfp_tail = g.class(ID_CHARS, ID_RANGES);
    let ws = g.rule_ref("_");
    g.define(
        "IdentifierLFP",
        seq(vec![
            node(seq(vec![one_many(lfp_head), many(lfp_tail)]), "NameOrLFP", 0),
            ws,
        ]),
    );

    let ident = g.rule_ref("Identifier");
    let lfp = g.rule_ref("IdentifierLFP");
    let name_body = g.memo(choice(vec![ident, lfp]));
    g.define("Name", name_body);

    // ── Punctuation ───────────────────────────────────────────────────

    let semi = g.class(";；", "");
    let ws = g.rule_ref("_");
    g.define("SEMI", one_many(seq(vec![semi, ws])));

    let open = g.class("(（", "");
    let skip = g.rule_ref("__");
    g.define("LP", seq(vec![open, skip]));

    let close = g.class(")）", "");
    let ws = g.rule_ref("_");
    g.define("RP", seq(vec![close, ws]));

    let open = g.class("[［", "");
    let skip = g.rule_ref("__");
    g.define("LS", seq(vec![open, skip]));

    let close = g.class("]］", "");
    let ws = g.rule_ref("_");
    g.define("RS", seq(vec![close, ws]));

    let open = g.class("{｛", "");
    let skip = g.rule_ref("__");
    g.define("LB", seq(vec![open, skip]));

    let close = g.class("}｝", "");
    let ws = g.rule_ref("_");
    g.define("RB", seq(vec![close, ws]));

    let colon = g.class(":：", "");
    let ws = g.rule_ref("_");
    g.define("COLON", seq(vec![colon, ws]));

    let comma = g.class(",，、", "");
    let ws = g.rule_ref("_");
    g.define("COMMA", seq(vec![comma, ws]));

    let dot = g.class(".．。", "");
    let ws = g.rule_ref("_");
    g.define("DOT", seq(vec![dot, ws]));

    // A single `=` that is not the first half of `==`.
    let eq = g.class("=＝", "");
    let eq_again = g.class("=＝", "");
    let ws = g.rule_ref("_");
    g.define("ASSIGN", seq(vec![eq, not(eq_again), ws]));

    // ── Numbers ───────────────────────────────────────────────────────

    let digit = g.class("_", "09０９");
    let digit_tail = g.class("_", "09０９");
    g.define("DECIMAL", seq(vec![not(lit("_")), digit, many(digit_tail)]));

    let hex_mark = g.class("xX", "");
    let hex_digit = g.class("", "afAF09");
    let hex_more = g.class("", "afAF09");
    g.define(
        "HEXADECIMAL",
        seq(vec![
            lit("0"),
            hex_mark,
            hex_digit,
            many(seq(vec![many(lit("_")), hex_more])),
        ]),
    );

    let bin_mark = g.class("bB", "");
    let bit = g.class("01", "");
    let bit_more = g.class("01", "");
    g.define(
        "BINARY",
        seq(vec![
            lit("0"),
            bin_mark,
            bit,
            many(seq(vec![many(lit("_")), bit_more])),
        ]),
    );

    let digits_a = g.class("_", "09０９");
    let digits_b = g.class("_", "09０９");
    let digit_c = g.class("_", "09０９");
    let digits_d = g.class("_", "09０９");
    let dot_a = g.rule_ref("DOT");
    let dot_b = g.rule_ref("DOT");
    g.define(
        "FRACTION",
        choice(vec![
            seq(vec![many(digits_a), dot_a, not(lit("_")), one_many(digits_b)]),
            seq(vec![digit_c, many(digits_d), dot_b, not(lit("."))]),
        ]),
    );

    let e_mark = g.class("eE", "");
    let sign = g.class("+-", "");
    let exp_digits = g.class("_", "09０９");
    g.define(
        "EXPONENT",
        seq(vec![e_mark, opt(sign), not(lit("_")), one_many(exp_digits)]),
    );

    let fraction = g.rule_ref("FRACTION");
    let exponent_a = g.rule_ref("EXPONENT");
    let mantissa = g.class("_", "09０９");
    let exponent_b = g.rule_ref("EXPONENT");
    g.define(
        "FLOAT",
        seq(vec![
            not(lit("_")),
            choice(vec![
                seq(vec![fraction, opt(exponent_a)]),
                seq(vec![one_many(mantissa), exponent_b]),
            ]),
        ]),
    );

    let float = g.rule_ref("FLOAT");
    let ws = g.rule_ref("_");
    g.define("FloatExpr", seq(vec![node(float, "Double", 0), ws]));

    let hex = g.rule_ref("HEXADECIMAL");
    let bin = g.rule_ref("BINARY");
    let dec = g.rule_ref("DECIMAL");
    let ws = g.rule_ref("_");
    g.define(
        "IntExpr",
        seq(vec![node(choice(vec![hex, bin, dec]), "Int", 0), ws]),
    );

    let float_expr = g.rule_ref("FloatExpr");
    let int_expr = g.rule_ref("IntExpr");
    g.define("Number", choice(vec![float_expr, int_expr]));

    // ── Strings ───────────────────────────────────────────────────────

    let simple = g.class("'\"\\bfnrt", "");
    let oct_hi = g.class("", "03");
    let oct_a = g.class("", "07");
    let oct_b = g.class("", "07");
    let oct_c = g.class("", "07");
    let oct_d = g.class("", "07");
    let oct_e = g.class("", "07");
    let u_mark = g.class("uU", "");
    let hex_a = g.class("", "afAF09");
    let hex_b = g.class("", "afAF09");
    let hex_c = g.class("", "afAF09");
    let hex_d = g.class("", "afAF09");
    g.define(
        "ESCAPE",
        seq(vec![
            lit("\\"),
            choice(vec![
                simple,
                seq(vec![oct_hi, oct_a, oct_b]),
                seq(vec![oct_c, oct_d]),
                oct_e,
                seq(vec![u_mark, hex_a, hex_b, hex_c, hex_d]),
            ]),
        ]),
    );

    let escape = g.rule_ref("ESCAPE");
    let plain = g.class("\"\n\\", "");
    g.define(
        "STRING",
        choice(vec![escape, seq(vec![not(plain), any()])]),
    );

    let escape = g.rule_ref("ESCAPE");
    let plain = g.class("'\n\\", "");
    g.define("CHAR", choice(vec![escape, seq(vec![not(plain), any()])]));

    let content = g.rule_ref("STRING");
    let ws = g.rule_ref("_");
    g.define(
        "StringExpr",
        seq(vec![
            lit("\""),
            node(seq(vec![many(content), lit("\"")]), "String", -1),
            ws,
        ]),
    );

    let content = g.rule_ref("CHAR");
    let ws = g.rule_ref("_");
    g.define(
        "CharExpr",
        seq(vec![
            lit("'"),
            node(seq(vec![many(content), lit("'")]), "Char", -1),
            ws,
        ]),
    );
}
