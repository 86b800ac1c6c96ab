//! Scannerless packrat parsing engine for the Cub teaching language.
//!
//! Grammar rules are composed from combinator constructors into [`Matcher`]
//! values, collected into an immutable [`Grammar`], and interpreted over a
//! mutable cursor with ordered-choice PEG semantics. The engine provides:
//!
//! - character-class bitmaps and keyword tries compiled with builder-owned
//!   caches,
//! - adaptive per-site packrat memoization that disables itself where it
//!   does not pay,
//! - a capture/match state stack for context-sensitive (indentation) rules,
//! - a fragment algebra (`node`/`edge`/`fold`) that builds left-associative
//!   trees without left recursion.
//!
//! Parsing is total: [`Parser::parse`] always returns a [`ParseTree`]. A
//! failed parse yields a tree tagged `"err"` positioned at the furthest
//! offset any attempt reached, never a panic.

mod classes;
mod cursor;
mod exec;
mod frag;
mod grammar;
mod matcher;
mod memo;
mod parser;
mod span;
mod state;
mod tree;
mod trie;

#[cfg(test)]
mod tests;

pub use classes::CharClass;
pub use grammar::{Grammar, GrammarBuilder, GrammarError, RuleId};
pub use matcher::{
    any, choice, dict, edge, empty, fail, fold, hide, lit, many, node, not, one_many, opt, peek,
    scoped, seq, skip, Matcher,
};
pub use parser::{ParseOptions, Parser};
pub use span::Span;
pub use tree::{convert, quote, ParseTree, Position, RawTree, TreeConverter, TreeKey};
