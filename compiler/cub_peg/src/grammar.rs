//! Rule tables and their builder.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::classes::{class_key, CharClass};
use crate::matcher::{Kind, Matcher};
use crate::memo::SiteStats;

/// Index of a rule in its grammar's table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RuleId(pub(crate) u32);

/// Errors detected while finishing a rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A rule was referenced (via [`GrammarBuilder::rule_ref`]) but never
    /// defined.
    UndefinedRule(String),
    /// The requested start rule does not exist in the table.
    UnknownStartRule(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UndefinedRule(name) => {
                write!(f, "rule `{name}` is referenced but never defined")
            }
            GrammarError::UnknownStartRule(name) => {
                write!(f, "start rule `{name}` does not exist in the grammar")
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// An immutable rule table: matchers composed from the combinator library,
/// reusable read-only across any number of sequential parses.
pub struct Grammar {
    rules: Vec<Matcher>,
    names: Vec<Box<str>>,
    index: FxHashMap<Box<str>, RuleId>,
    memo_sites: u32,
}

impl Grammar {
    /// Look up a rule by name.
    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.index.get(name).copied()
    }

    /// Name of a rule in the table.
    pub fn rule_name(&self, id: RuleId) -> &str {
        &self.names[id.0 as usize]
    }

    /// Number of rules in the table.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub(crate) fn rule(&self, id: RuleId) -> &Matcher {
        &self.rules[id.0 as usize]
    }

    #[inline]
    pub(crate) fn memo_site_count(&self) -> u32 {
        self.memo_sites
    }
}

/// Composes matchers into a [`Grammar`].
///
/// The builder owns the compilation caches (character-class bitmaps keyed by
/// their canonical form) and the rule- and state-name interners, so
/// independently built grammars never share cache or tuning state. Rules may
/// reference each other freely, including rules defined later;
/// [`GrammarBuilder::finish`] is the second composition pass that checks
/// every reference against a definition.
#[derive(Default)]
pub struct GrammarBuilder {
    rules: Vec<Option<Matcher>>,
    names: Vec<Box<str>>,
    index: FxHashMap<Box<str>, u32>,
    classes: FxHashMap<String, Rc<CharClass>>,
    state_names: FxHashMap<Box<str>, u16>,
    memo_sites: u32,
}

impl GrammarBuilder {
    pub fn new() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "grammars are written by hand; u32::MAX rules is unreachable"
    )]
    fn slot(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.rules.len() as u32;
        self.rules.push(None);
        self.names.push(Box::from(name));
        self.index.insert(Box::from(name), id);
        id
    }

    /// Define (or redefine) a named rule.
    pub fn define(&mut self, name: &str, matcher: Matcher) {
        let id = self.slot(name);
        self.rules[id as usize] = Some(matcher);
    }

    /// A call to a named rule. The rule may be defined before or after this
    /// reference; resolution happens against the finished table.
    pub fn rule_ref(&mut self, name: &str) -> Matcher {
        Matcher::of(Kind::Ref(RuleId(self.slot(name))))
    }

    /// One character drawn from `chars` plus the inclusive ranges encoded
    /// in `ranges` (each adjacent character pair is one range).
    /// Structurally identical classes share one bitmap.
    pub fn class(&mut self, chars: &str, ranges: &str) -> Matcher {
        let key = class_key(chars, ranges);
        let class = self
            .classes
            .entry(key)
            .or_insert_with(|| Rc::new(CharClass::compile(chars, ranges)))
            .clone();
        Matcher::of(Kind::Class(class))
    }

    /// Wrap a matcher with an adaptive memo site.
    pub fn memo(&mut self, matcher: Matcher) -> Matcher {
        let site = self.memo_sites;
        self.memo_sites += 1;
        Matcher::of(Kind::Memo {
            site,
            stats: SiteStats::new(),
            inner: Box::new(matcher),
        })
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "grammars are written by hand; u16::MAX capture names is unreachable"
    )]
    fn state_id(&mut self, name: &str) -> u16 {
        if let Some(&sid) = self.state_names.get(name) {
            return sid;
        }
        let sid = self.state_names.len() as u16;
        self.state_names.insert(Box::from(name), sid);
        sid
    }

    /// Run `matcher`; on success bind the exact text it consumed under
    /// `name`, in front of the current state chain.
    pub fn capture(&mut self, name: &str, matcher: Matcher) -> Matcher {
        Matcher::of(Kind::Capture {
            sid: self.state_id(name),
            inner: Box::new(matcher),
        })
    }

    /// Succeeds iff a binding for `name` is reachable on the state chain.
    pub fn exists(&mut self, name: &str) -> Matcher {
        Matcher::of(Kind::Exists(self.state_id(name)))
    }

    /// Succeeds iff the text last captured under `name` is a literal prefix
    /// of the remaining input, consuming it.
    pub fn recall(&mut self, name: &str) -> Matcher {
        Matcher::of(Kind::Recall(self.state_id(name)))
    }

    /// Second composition pass: verify every referenced rule has a
    /// definition and freeze the table.
    pub fn finish(self) -> Result<Grammar, GrammarError> {
        let GrammarBuilder {
            rules,
            names,
            index,
            memo_sites,
            ..
        } = self;
        let mut table = Vec::with_capacity(rules.len());
        for (slot, name) in rules.into_iter().zip(&names) {
            match slot {
                Some(matcher) => table.push(matcher),
                None => return Err(GrammarError::UndefinedRule(name.to_string())),
            }
        }
        let index = index.into_iter().map(|(k, v)| (k, RuleId(v))).collect();
        Ok(Grammar {
            rules: table,
            names,
            index,
            memo_sites,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::lit;

    #[test]
    fn undefined_reference_is_reported() {
        let mut g = GrammarBuilder::new();
        let body = g.rule_ref("Missing");
        g.define("Start", body);
        match g.finish() {
            Err(GrammarError::UndefinedRule(name)) => assert_eq!(name, "Missing"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an undefined-rule error"),
        }
    }

    #[test]
    fn forward_references_resolve() {
        let mut g = GrammarBuilder::new();
        let body = g.rule_ref("Later");
        g.define("Start", body);
        g.define("Later", lit("x"));
        let grammar = match g.finish() {
            Ok(grammar) => grammar,
            Err(e) => panic!("finish failed: {e}"),
        };
        assert_eq!(grammar.rule_count(), 2);
        assert!(grammar.rule_id("Start").is_some());
        assert_eq!(
            grammar.rule_name(grammar.rule_id("Later").unwrap_or(RuleId(0))),
            "Later"
        );
    }

    #[test]
    fn identical_classes_share_a_bitmap() {
        let mut g = GrammarBuilder::new();
        let _a = g.class("_", "AZaz");
        let _b = g.class("_", "AZaz");
        let _c = g.class("", "09");
        assert_eq!(g.classes.len(), 2);
    }

    #[test]
    fn capture_names_intern_to_stable_ids() {
        let mut g = GrammarBuilder::new();
        let _m = g.capture("indent", lit("  "));
        let first = g.state_id("indent");
        let second = g.state_id("indent");
        assert_eq!(first, second);
        assert_ne!(g.state_id("other"), first);
    }
}
