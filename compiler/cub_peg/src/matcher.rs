//! Matcher construction.
//!
//! A [`Matcher`] is the compiled form of one grammar expression: a tagged
//! variant interpreted against the cursor by the `exec` module. Matchers are
//! built with the free constructors below plus the constructors on
//! [`GrammarBuilder`](crate::GrammarBuilder) that need builder-owned state
//! (`class`, `rule_ref`, `memo`, `capture`, `exists`, `recall`).
//!
//! The repetition and lookahead constructors peephole-specialize literal and
//! character-class operands into dedicated variants. The specialized forms
//! are semantically identical to the generic ones; they exist to skip the
//! per-iteration save/restore bookkeeping on the hottest leaf shapes.

use std::rc::Rc;

use crate::classes::CharClass;
use crate::grammar::RuleId;
use crate::memo::SiteStats;
use crate::trie::Trie;

/// A compiled grammar expression.
///
/// Running a matcher returns `true` on success (the cursor's position, tree
/// pointer, and state pointer may have advanced) or `false` on failure, with
/// restoration owed by the enclosing choice point rather than the failing
/// matcher itself.
pub struct Matcher {
    pub(crate) kind: Kind,
}

impl Matcher {
    #[inline]
    pub(crate) fn of(kind: Kind) -> Matcher {
        Matcher { kind }
    }
}

pub(crate) enum Kind {
    /// Match the empty string; never fails.
    Empty,
    /// Never matches.
    Fail,
    /// Any single character.
    Any,
    /// Jump forward to the furthest position reached so far (error
    /// recovery).
    Skip,
    /// Literal text.
    Lit(Rc<str>),
    /// One character drawn from a compiled class.
    Class(Rc<CharClass>),
    /// First literal alternative out of a keyword trie.
    Dict(Rc<Trie>),
    /// All parts in order, short-circuiting on the first failure.
    Seq(Vec<Matcher>),
    /// Ordered choice: first success wins.
    Choice(Vec<Matcher>),
    Many(Box<Matcher>),
    OneMany(Box<Matcher>),
    Opt(Box<Matcher>),
    /// And-lookahead: match without consuming.
    Peek(Box<Matcher>),
    /// Not-lookahead.
    Not(Box<Matcher>),
    // Specialized repetition/lookahead over literal and class operands.
    PeekLit(Rc<str>),
    NotLit(Rc<str>),
    OptLit(Rc<str>),
    ManyLit(Rc<str>),
    OneManyLit(Rc<str>),
    PeekClass(Rc<CharClass>),
    NotClass(Rc<CharClass>),
    OptClass(Rc<CharClass>),
    ManyClass(Rc<CharClass>),
    OneManyClass(Rc<CharClass>),
    /// Wrap the fragments produced by `inner` into one tagged fragment.
    Node {
        inner: Box<Matcher>,
        tag: Rc<str>,
        shift: i32,
    },
    /// Like `Node`, but the produced fragment becomes a named field of the
    /// enclosing node instead of a positional child.
    Edge {
        label: Rc<str>,
        inner: Box<Matcher>,
        shift: i32,
    },
    /// Left-fold: rewrap the already-built left context as the first edge
    /// of a new tagged node, then let `inner` supply the remaining edges.
    Fold {
        label: Rc<str>,
        inner: Box<Matcher>,
        tag: Rc<str>,
        shift: i32,
    },
    /// Run `inner` but discard any fragments it produces.
    Hide(Box<Matcher>),
    /// Run `inner`; on success bind the consumed text under `sid`.
    Capture { sid: u16, inner: Box<Matcher> },
    /// Run `inner` against the current state chain and restore the chain on
    /// success.
    Scoped(Box<Matcher>),
    /// Succeeds iff a binding for `sid` is reachable.
    Exists(u16),
    /// Succeeds iff the text bound to `sid` prefixes the remaining input,
    /// consuming it.
    Recall(u16),
    /// Call a rule by table index, resolved at finish time.
    Ref(RuleId),
    /// Adaptive memo wrapper.
    Memo {
        site: u32,
        stats: SiteStats,
        inner: Box<Matcher>,
    },
}

/// Matches the empty string; never fails, never consumes.
pub fn empty() -> Matcher {
    Matcher::of(Kind::Empty)
}

/// Never matches.
pub fn fail() -> Matcher {
    Matcher::of(Kind::Fail)
}

/// Any single character; fails only at the input boundary.
pub fn any() -> Matcher {
    Matcher::of(Kind::Any)
}

/// Jump forward to the furthest position reached so far, clamped to the
/// boundary. Used inside error-recovery rules.
pub fn skip() -> Matcher {
    Matcher::of(Kind::Skip)
}

/// Literal text. The empty literal is [`empty`].
pub fn lit(text: &str) -> Matcher {
    if text.is_empty() {
        empty()
    } else {
        Matcher::of(Kind::Lit(Rc::from(text)))
    }
}

/// Ordered keyword alternatives, space-separated; the first candidate that
/// prefixes the input wins. Equivalent to an ordered choice over the
/// individual literals, compiled to a trie.
pub fn dict(words: &str) -> Matcher {
    let words: Vec<&str> = words.split(' ').collect();
    Matcher::of(Kind::Dict(Rc::new(Trie::build(&words))))
}

/// All parts in order; fails at the first failing part.
pub fn seq(parts: Vec<Matcher>) -> Matcher {
    Matcher::of(Kind::Seq(parts))
}

/// Ordered choice: alternatives are tried in order against the pre-choice
/// cursor state; the first success wins.
pub fn choice(alternatives: Vec<Matcher>) -> Matcher {
    Matcher::of(Kind::Choice(alternatives))
}

/// Zero or more repetitions. Never fails; stops on the first stalled
/// (zero-progress) attempt, so zero-width matches cannot loop.
pub fn many(m: Matcher) -> Matcher {
    match m.kind {
        Kind::Lit(text) => Matcher::of(Kind::ManyLit(text)),
        Kind::Class(class) => Matcher::of(Kind::ManyClass(class)),
        kind => Matcher::of(Kind::Many(Box::new(Matcher::of(kind)))),
    }
}

/// One or more repetitions; fails iff the first attempt fails.
pub fn one_many(m: Matcher) -> Matcher {
    match m.kind {
        Kind::Lit(text) => Matcher::of(Kind::OneManyLit(text)),
        Kind::Class(class) => Matcher::of(Kind::OneManyClass(class)),
        kind => Matcher::of(Kind::OneMany(Box::new(Matcher::of(kind)))),
    }
}

/// Optional match; never fails.
pub fn opt(m: Matcher) -> Matcher {
    match m.kind {
        Kind::Lit(text) => Matcher::of(Kind::OptLit(text)),
        Kind::Class(class) => Matcher::of(Kind::OptClass(class)),
        kind => Matcher::of(Kind::Opt(Box::new(Matcher::of(kind)))),
    }
}

/// And-lookahead: succeeds iff `m` matches, consuming nothing either way.
pub fn peek(m: Matcher) -> Matcher {
    match m.kind {
        Kind::Lit(text) => Matcher::of(Kind::PeekLit(text)),
        Kind::Class(class) => Matcher::of(Kind::PeekClass(class)),
        kind => Matcher::of(Kind::Peek(Box::new(Matcher::of(kind)))),
    }
}

/// Not-lookahead: succeeds iff `m` fails, consuming nothing either way.
pub fn not(m: Matcher) -> Matcher {
    match m.kind {
        Kind::Lit(text) => Matcher::of(Kind::NotLit(text)),
        Kind::Class(class) => Matcher::of(Kind::NotClass(class)),
        kind => Matcher::of(Kind::Not(Box::new(Matcher::of(kind)))),
    }
}

/// Run `m` with a cleared tree pointer; on success wrap whatever fragments
/// it produced into a single fragment tagged `tag`, spanning from the start
/// of the call (adjusted by `shift`, e.g. to pull a delimiter back into the
/// reported span) to the current position.
pub fn node(m: Matcher, tag: &str, shift: i32) -> Matcher {
    Matcher::of(Kind::Node {
        inner: Box::new(m),
        tag: Rc::from(tag),
        shift,
    })
}

/// Like [`node`], but the result becomes the named field `label` of the
/// enclosing node. The empty label is transparent: `m` runs unwrapped.
pub fn edge(label: &str, m: Matcher, shift: i32) -> Matcher {
    if label.is_empty() {
        return m;
    }
    Matcher::of(Kind::Edge {
        label: Rc::from(label),
        inner: Box::new(m),
        shift,
    })
}

/// Left-fold: detach the most recent fragment the left context produced,
/// re-attach it under `label` as the first edge of a new node tagged `tag`,
/// then run `m` for the remaining edges. The finished node spans from the
/// fold's start position to the end position adjusted by `shift`.
///
/// This is how `Primary (op Primary)*` builds a left-associative tree
/// without the rule recursing leftward.
pub fn fold(label: &str, m: Matcher, tag: &str, shift: i32) -> Matcher {
    Matcher::of(Kind::Fold {
        label: Rc::from(label),
        inner: Box::new(m),
        tag: Rc::from(tag),
        shift,
    })
}

/// Run `m` but discard any fragments it produces.
pub fn hide(m: Matcher) -> Matcher {
    Matcher::of(Kind::Hide(Box::new(m)))
}

/// Run `m` against the current state chain; on success restore the chain,
/// discarding any bindings made inside. No restore happens on failure — a
/// failing scoped attempt is always unwound by an enclosing choice point.
pub fn scoped(m: Matcher) -> Matcher {
    Matcher::of(Kind::Scoped(Box::new(m)))
}
