//! Grammar tests.
//!
//! The dump strings asserted here are regression oracles: the bracketed
//! form is part of the tree contract, so they are compared verbatim.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod stmts;

use cub_peg::ParseTree;

fn parse(input: &str) -> ParseTree {
    crate::parser().unwrap().parse(input)
}

fn parse_type(input: &str) -> ParseTree {
    crate::type_parser().unwrap().parse(input)
}
