//! Statement and block oracles.

use cub_peg::ParseOptions;
use pretty_assertions::assert_eq;

use super::parse;

#[test]
fn repeated_statements_are_structurally_identical() {
    let tree = parse("\nprint(a)\nprint(a)\n");
    assert!(tree.is("Source"));
    assert_eq!(tree.size(), 2);
    assert_eq!(tree.get(0).to_string(), tree.get(1).to_string());
}

#[test]
fn a_block_collects_equally_indented_lines() {
    let tree = parse("if a:\n    x = 1\n    y = 2\n");
    let stmt = tree.get(0);
    assert!(stmt.is("IfStmt"));
    let body = stmt.get("then");
    assert!(body.is("Block"));
    assert_eq!(body.size(), 2);
}

#[test]
fn a_dedent_returns_to_the_enclosing_level() {
    let tree = parse("if a:\n    x = 1\ny = 2\n");
    assert_eq!(tree.size(), 2);
    assert!(tree.get(0).is("IfStmt"));
    assert!(tree.get(1).is("VarDecl"));
    assert_eq!(tree.get(0).get("then").size(), 1);
}

#[test]
fn a_partial_dedent_cannot_attach_anywhere() {
    // The block captured four spaces; a two-space line is neither part of
    // the block nor a top-level statement.
    let tree = parse("if a:\n    x = 1\n  y = 2\n");
    assert!(tree.is_syntax_error());
}

#[test]
fn nested_blocks_capture_their_own_indentation() {
    let tree = parse("if a:\n    if b:\n        x = 1\n    y = 2\n");
    let outer = tree.get(0).get("then");
    assert!(outer.is("Block"));
    assert_eq!(outer.size(), 2);
    assert!(outer.get(0).is("IfStmt"));
    assert_eq!(outer.get(0).get("then").size(), 1);
    assert!(outer.get(1).is("VarDecl"));
}

#[test]
fn elif_and_else_chain() {
    let tree = parse("if a:\n    x = 1\nelif b:\n    y = 2\nelse:\n    z = 3\n");
    let stmt = tree.get(0);
    assert!(stmt.is("IfStmt"));
    assert!(stmt.has("elif"));
    assert_eq!(stmt.get("elif").size(), 1);
    assert!(stmt.get("elif").get(0).is("ElifStmt"));
    assert!(stmt.get("else").is("Block"));
}

#[test]
fn inline_body_becomes_a_single_statement_block() {
    let tree = parse("if a: pass\n");
    let body = tree.get(0).get("then");
    assert!(body.is("Block"));
    assert_eq!(body.size(), 1);
    assert!(body.get(0).is("Pass"));
}

#[test]
fn while_loop() {
    assert_eq!(
        parse("while a < 10:\n    pass\n").get(0).to_string(),
        "[#WhileStmt body = [#Block [#Pass 'pass']] \
         cond = [#Infix right = [#Int '10'] name = [#Name '<'] left = [#Name 'a']]]"
    );
}

#[test]
fn for_loop() {
    let tree = parse("for x in xs:\n    print(x)\n");
    let stmt = tree.get(0);
    assert!(stmt.is("ForStmt"));
    assert_eq!(stmt.get("each").token(), "x");
    assert_eq!(stmt.get("list").token(), "xs");
    assert!(stmt.get("body").is("Block"));
}

#[test]
fn function_declaration() {
    let tree = parse("def add(a, b):\n    return a + b\n");
    let stmt = tree.get(0);
    assert!(stmt.is("FuncDecl"));
    assert_eq!(stmt.get("name").token(), "add");
    assert_eq!(stmt.get("params").size(), 2);
    let body = stmt.get("body");
    assert_eq!(body.size(), 1);
    assert!(body.get(0).is("Return"));
    assert!(body.get(0).get("expr").is("Infix"));
}

#[test]
fn typed_parameter() {
    let tree = parse("def f(x: int):\n    pass\n");
    let param = tree.get(0).get("params").get(0);
    assert!(param.is("Param"));
    assert_eq!(param.get("name").token(), "x");
    assert_eq!(param.get("type").token(), "int");
}

#[test]
fn class_declaration() {
    let tree = parse("class Dog(Animal):\n    pass\n");
    let stmt = tree.get(0);
    assert!(stmt.is("ClassDecl"));
    assert_eq!(stmt.get("name").token(), "Dog");
    assert_eq!(stmt.get("extends").token(), "Animal");
    assert!(stmt.get(0).is("Block"));
}

#[test]
fn imports() {
    assert_eq!(
        parse("import math\n").to_string(),
        "[#Source [#ImportDecl name = [#Name 'math']]]"
    );
    let tree = parse("from math import sin, cos\n");
    let stmt = tree.get(0);
    assert!(stmt.is("FromDecl"));
    assert_eq!(stmt.get("name").token(), "math");
    assert_eq!(stmt.get("names").size(), 2);
}

#[test]
fn augmented_assignment() {
    assert_eq!(
        parse("a += 1").to_string(),
        "[#Source [#SelfAssign right = [#Int '1'] name = [# '+='] left = [#Name 'a']]]"
    );
}

#[test]
fn simple_statements() {
    assert_eq!(parse("pass").to_string(), "[#Source [#Pass 'pass']]");
    assert_eq!(parse("break").to_string(), "[#Source [#Break 'break']]");
    assert_eq!(
        parse("continue").to_string(),
        "[#Source [#Continue 'continue']]"
    );
    assert_eq!(parse("return").to_string(), "[#Source [#Return 'return']]");
}

#[test]
fn semicolons_separate_statements_on_one_line() {
    let tree = parse("a = 1; b = 2\n");
    assert_eq!(tree.size(), 2);
    assert!(tree.get(0).is("VarDecl"));
    assert!(tree.get(1).is("VarDecl"));
}

#[test]
fn comments_are_spacing() {
    let tree = parse("x = 1 # trailing note\n/* floating block */\n");
    assert_eq!(tree.size(), 1);
    assert!(tree.get(0).is("VarDecl"));
}

#[test]
fn blank_lines_between_statements() {
    let tree = parse("a = 1\n\n\nb = 2\n");
    assert_eq!(tree.size(), 2);
}

#[test]
fn error_message_points_at_the_failure() {
    let parser = crate::parser().unwrap();
    let options = ParseOptions {
        urn: Some("demo.cub"),
        ..ParseOptions::default()
    };
    let tree = parser.parse_with("x = \n", &options);
    assert!(tree.is_syntax_error());
    assert_eq!(tree.message("Syntax Error"), "(demo.cub:1+4) Syntax Error");
}

#[test]
fn whole_source_round_trips_through_the_root_span() {
    let input = "a = 1\nb = a + 2\n";
    let tree = parse(input);
    assert_eq!(tree.token(), input);
}
