//! Grammar rule tables for the Cub teaching language.
//!
//! Cub is a Python-like teaching language: indentation-sensitive blocks,
//! `def`/`if`/`while`/`for` statements, and a forgiving lexical layer that
//! also accepts full-width (zenkaku) punctuation and digits. The rules here
//! compose the `cub_peg` combinators into the language's rule table; the
//! engine does the rest.
//!
//! Two parsers are exposed: [`parser`] for whole sources (start rule
//! `Source`) and [`type_parser`] for the type-annotation mini-language
//! (start rule `Type`).

mod expr;
mod lexical;
mod stmt;
mod types;

#[cfg(test)]
mod tests;

use std::rc::Rc;

pub use cub_peg::{Grammar, GrammarError, ParseOptions, ParseTree, Parser, Position, Span};

use cub_peg::GrammarBuilder;

/// Build the rule table for Cub sources.
pub fn grammar() -> Result<Grammar, GrammarError> {
    let mut g = GrammarBuilder::new();
    lexical::install(&mut g);
    expr::install(&mut g);
    stmt::install(&mut g);
    g.finish()
}

/// A parser for Cub sources.
pub fn parser() -> Result<Parser, GrammarError> {
    Parser::new(Rc::new(grammar()?), "Source")
}

/// A parser for Cub type annotations (`int`, `(int,int)->bool`,
/// `list[int]`, `int|str`).
pub fn type_parser() -> Result<Parser, GrammarError> {
    Parser::new(Rc::new(types::grammar()?), "Type")
}
