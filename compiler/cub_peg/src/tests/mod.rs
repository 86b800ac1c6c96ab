//! Engine tests.
//!
//! Organized by concern:
//! - `protocol`: the cursor/matcher contract — restoration, ordered-choice
//!   determinism, progress guarantees
//! - `algebra`: node/edge/fold construction and tree conversion
//! - `memoization`: packrat transparency and adaptive self-disable
//! - `recall`: capture/match state and indentation-sensitive blocks

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod algebra;
mod memoization;

use std::rc::Rc;

use crate::grammar::{Grammar, GrammarBuilder};
use crate::parser::Parser;

/// Grammar with no rules, for running self-contained matchers directly.
fn scratch() -> Grammar {
    GrammarBuilder::new().finish().unwrap()
}

/// Finish a builder and bind it to its start rule.
fn parser_for(builder: GrammarBuilder, start: &str) -> Parser {
    Parser::new(Rc::new(builder.finish().unwrap()), start).unwrap()
}
