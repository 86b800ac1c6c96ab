//! The parse driver.

use std::rc::Rc;

use tracing::trace;

use crate::cursor::Cursor;
use crate::frag::Frag;
use crate::grammar::{Grammar, GrammarError, RuleId};
use crate::tree::{convert, ParseTree, RawTree, TreeConverter};

/// Default source identifier when the caller provides none.
const UNKNOWN_SOURCE: &str = "(unknown source)";

/// Options recognized by [`Parser::parse_with`].
#[derive(Default)]
pub struct ParseOptions<'o> {
    /// Start offset in bytes. Defaults to 0.
    pub pos: usize,
    /// End boundary in bytes. Defaults to the end of the input.
    pub epos: Option<usize>,
    /// Source identifier used in diagnostics.
    pub urn: Option<&'o str>,
    /// Conversion override; defaults to [`convert`].
    pub conv: Option<TreeConverter>,
}

/// A ready-to-run parser: an immutable grammar plus its start rule.
///
/// Parsing is total — the result is always a tree. When the start rule
/// fails, the driver does not raise; it synthesizes a tree tagged `"err"`
/// whose span sits at the furthest offset the attempt reached, the best
/// available location for a diagnostic.
pub struct Parser {
    grammar: Rc<Grammar>,
    start: RuleId,
}

impl Parser {
    /// Bind a grammar to its start rule.
    pub fn new(grammar: Rc<Grammar>, start: &str) -> Result<Parser, GrammarError> {
        match grammar.rule_id(start) {
            Some(id) => Ok(Parser { grammar, start: id }),
            None => Err(GrammarError::UnknownStartRule(start.to_string())),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parse the whole input with default options.
    pub fn parse(&self, input: &str) -> ParseTree {
        self.parse_with(input, &ParseOptions::default())
    }

    /// Parse with explicit options.
    pub fn parse_with(&self, input: &str, options: &ParseOptions<'_>) -> ParseTree {
        let mut pos = options.pos.min(input.len());
        while !input.is_char_boundary(pos) {
            pos -= 1;
        }
        let epos = options.epos.unwrap_or(input.len()).min(input.len());
        let mut px = Cursor::new(input, pos, epos);
        let matched = self.grammar.rule(self.start).run(&self.grammar, &mut px);
        px.sync_head();
        trace!(
            rule = self.grammar.rule_name(self.start),
            matched,
            end = px.pos,
            headpos = px.headpos,
            "parse finished"
        );
        let root = if matched {
            match px.ptree {
                Some(id) => id,
                // The whole input matched without producing any tagged
                // fragment: synthesize an anonymous span.
                None => {
                    let anon = px.frags.anon_tag();
                    px.frags.alloc(Frag {
                        tag: anon,
                        spos: pos,
                        epos: px.pos,
                        prev: None,
                        child: None,
                    })
                }
            }
        } else {
            px.frags.alloc(Frag {
                tag: Rc::from("err"),
                spos: px.headpos,
                epos: px.headpos,
                prev: None,
                child: None,
            })
        };
        let urn = options.urn.unwrap_or(UNKNOWN_SOURCE);
        let conv = options.conv.unwrap_or(convert);
        conv(RawTree::new(&px.frags, root, input, urn))
    }
}
