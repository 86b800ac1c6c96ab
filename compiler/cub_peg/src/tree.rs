//! The public syntax tree and fragment conversion.
//!
//! Conversion walks the most-recent-first fragment chain, reversing
//! positional children into source order and unwrapping edge fragments into
//! named fields of their parent. Named fields keep chain order (newest
//! first) — the canonical dump below depends on exactly that ordering, and
//! downstream tests assert the dump verbatim.

use std::fmt;
use std::rc::Rc;

use crate::frag::{FragArena, FragId, EDGE_MARK};
use crate::span::Span;

/// Row/column location derived from the original input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    /// Absolute byte offset.
    pub offset: usize,
    /// 1-based line number.
    pub row: usize,
    /// 0-based column, in characters from the line start.
    pub column: usize,
}

pub(crate) fn position_at(input: &str, offset: usize) -> Position {
    let offset = offset.min(input.len());
    let mut row = 1;
    let mut column = 0;
    for &b in &input.as_bytes()[..offset] {
        if b == b'\n' {
            row += 1;
            column = 0;
        } else if b & 0xC0 != 0x80 {
            // Count characters, not UTF-8 continuation bytes.
            column += 1;
        }
    }
    Position {
        offset,
        row,
        column,
    }
}

/// Key for [`ParseTree::has`] and [`ParseTree::get`]: a positional index or
/// a field name. A name may be a comma-joined fallback list, tried in order.
#[derive(Clone, Copy, Debug)]
pub enum TreeKey<'a> {
    Index(usize),
    Name(&'a str),
}

impl<'a> From<usize> for TreeKey<'a> {
    fn from(index: usize) -> TreeKey<'a> {
        TreeKey::Index(index)
    }
}

impl<'a> From<&'a str> for TreeKey<'a> {
    fn from(name: &'a str) -> TreeKey<'a> {
        TreeKey::Name(name)
    }
}

/// An immutable node of the public syntax tree.
///
/// Cloning is cheap (the node is reference-counted). Lookup misses return
/// the documented empty sentinel — a node tagged `"empty"` positioned at
/// this node's end — and never panic.
#[derive(Clone)]
pub struct ParseTree {
    node: Rc<TreeNode>,
}

struct TreeNode {
    tag: Rc<str>,
    input: Rc<str>,
    urn: Rc<str>,
    span: Span,
    subs: Vec<ParseTree>,
    fields: Vec<(Rc<str>, ParseTree)>,
}

impl ParseTree {
    pub(crate) fn from_parts(
        tag: Rc<str>,
        input: Rc<str>,
        urn: Rc<str>,
        span: Span,
        subs: Vec<ParseTree>,
        fields: Vec<(Rc<str>, ParseTree)>,
    ) -> ParseTree {
        ParseTree {
            node: Rc::new(TreeNode {
                tag,
                input,
                urn,
                span,
                subs,
                fields,
            }),
        }
    }

    /// Construct a node directly. Primarily for custom conversion
    /// functions; the engine builds trees through the default conversion.
    pub fn new(
        tag: &str,
        input: &str,
        urn: &str,
        span: Span,
        subs: Vec<ParseTree>,
        fields: Vec<(String, ParseTree)>,
    ) -> ParseTree {
        ParseTree::from_parts(
            Rc::from(tag),
            Rc::from(input),
            Rc::from(urn),
            span,
            subs,
            fields
                .into_iter()
                .map(|(k, v)| (Rc::from(k.as_str()), v))
                .collect(),
        )
    }

    /// Syntax tag of this node.
    pub fn tag(&self) -> &str {
        &self.node.tag
    }

    /// Tag test.
    pub fn is(&self, tag: &str) -> bool {
        &*self.node.tag == tag
    }

    /// True for the empty sentinel returned by a failed lookup.
    pub fn is_empty(&self) -> bool {
        self.is("empty")
    }

    /// True for the error tree produced by a failed parse.
    pub fn is_syntax_error(&self) -> bool {
        self.is("err")
    }

    /// Source span of this node.
    pub fn span(&self) -> Span {
        self.node.span
    }

    /// Source identifier this tree was parsed from.
    pub fn urn(&self) -> &str {
        &self.node.urn
    }

    /// The complete original input.
    pub fn input(&self) -> &str {
        &self.node.input
    }

    fn field(&self, name: &str) -> Option<&ParseTree> {
        self.node
            .fields
            .iter()
            .find(|(key, _)| &**key == name)
            .map(|(_, value)| value)
    }

    /// The empty sentinel, positioned at this node's end.
    fn new_empty(&self) -> ParseTree {
        ParseTree::from_parts(
            Rc::from("empty"),
            self.node.input.clone(),
            self.node.urn.clone(),
            Span::new(self.node.span.end, self.node.span.end),
            Vec::new(),
            Vec::new(),
        )
    }

    /// Whether `key` resolves to a child.
    pub fn has<'k>(&self, key: impl Into<TreeKey<'k>>) -> bool {
        match key.into() {
            TreeKey::Index(index) => index < self.node.subs.len(),
            TreeKey::Name(name) => self.field(name).is_some(),
        }
    }

    /// Child lookup; a miss returns the empty sentinel, never panics.
    pub fn get<'k>(&self, key: impl Into<TreeKey<'k>>) -> ParseTree {
        match key.into() {
            TreeKey::Index(index) => self
                .node
                .subs
                .get(index)
                .cloned()
                .unwrap_or_else(|| self.new_empty()),
            TreeKey::Name(name) => {
                if name.contains(',') {
                    for candidate in name.split(',') {
                        if let Some(value) = self.field(candidate) {
                            return value.clone();
                        }
                    }
                    return self.new_empty();
                }
                self.field(name)
                    .cloned()
                    .unwrap_or_else(|| self.new_empty())
            }
        }
    }

    /// Positional children in source order.
    pub fn subs(&self) -> &[ParseTree] {
        &self.node.subs
    }

    /// Number of positional children.
    pub fn size(&self) -> usize {
        self.node.subs.len()
    }

    /// Field names, in definition order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.node.fields.iter().map(|(key, _)| &**key)
    }

    /// The exact input substring covered by this node.
    ///
    /// Span shifts are applied in bytes, so a shift can land inside a
    /// multi-byte character (e.g. a span trimmed back one byte over a
    /// full-width operator); both endpoints are clamped down to character
    /// boundaries, which rounds such a span out to the whole character.
    pub fn token(&self) -> &str {
        let input: &str = &self.node.input;
        let mut start = (self.node.span.start as usize).min(input.len());
        while !input.is_char_boundary(start) {
            start -= 1;
        }
        let mut end = (self.node.span.end as usize).min(input.len());
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        &input[start..end.max(start)]
    }

    /// Token text of a child, by the same keys as [`ParseTree::get`]; the
    /// empty string on a miss.
    pub fn token_of<'k>(&self, key: impl Into<TreeKey<'k>>) -> String {
        self.get(key).token().to_string()
    }

    /// Start location of this node.
    pub fn position(&self) -> Position {
        position_at(&self.node.input, self.node.span.start as usize)
    }

    /// End location of this node.
    pub fn end_position(&self) -> Position {
        position_at(&self.node.input, self.node.span.end as usize)
    }

    /// Diagnostic line in the `(urn:row+col) message` form.
    pub fn message(&self, msg: &str) -> String {
        let p = self.position();
        format!("({}:{}+{}) {}", self.urn(), p.row, p.column, msg)
    }

    fn dump_into(&self, out: &mut String) {
        out.push_str("[#");
        out.push_str(self.tag());
        let mut leaf = true;
        for sub in self.subs() {
            leaf = false;
            out.push(' ');
            sub.dump_into(out);
        }
        for (key, value) in &self.node.fields {
            leaf = false;
            out.push(' ');
            out.push_str(key);
            out.push_str(" = ");
            value.dump_into(out);
        }
        if leaf {
            out.push(' ');
            out.push_str(&quote(self.token()));
        }
        out.push(']');
    }
}

/// The canonical bracketed dump; bit-exact, used as a structural oracle by
/// downstream tests.
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.dump_into(&mut out);
        f.write_str(&out)
    }
}

impl fmt::Debug for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Single-quoted token text with control characters escaped; the exact
/// form used inside the canonical dump.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{0B}' => out.push_str("\\v"),
            '\u{0C}' => out.push_str("\\f"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Borrowed view of a raw parse fragment, handed to conversion functions.
#[derive(Clone, Copy)]
pub struct RawTree<'a> {
    arena: &'a FragArena,
    id: FragId,
    input: &'a str,
    urn: &'a str,
}

impl<'a> RawTree<'a> {
    pub(crate) fn new(
        arena: &'a FragArena,
        id: FragId,
        input: &'a str,
        urn: &'a str,
    ) -> RawTree<'a> {
        RawTree {
            arena,
            id,
            input,
            urn,
        }
    }

    /// Tag of this fragment (the field name for an edge fragment).
    pub fn tag(&self) -> &'a str {
        &self.arena.get(self.id).tag
    }

    /// Whether this fragment carries a field name rather than a span.
    pub fn is_edge(&self) -> bool {
        self.arena.get(self.id).is_edge()
    }

    /// Span of a positional fragment; `None` for an edge fragment.
    pub fn span(&self) -> Option<Span> {
        let frag = self.arena.get(self.id);
        if frag.is_edge() {
            None
        } else {
            Some(Span::at(frag.spos, frag.epos))
        }
    }

    /// Nested content.
    pub fn child(&self) -> Option<RawTree<'a>> {
        self.arena
            .get(self.id)
            .child
            .map(|id| RawTree { id, ..*self })
    }

    /// Previous sibling (the chain is most-recent-first).
    pub fn prev(&self) -> Option<RawTree<'a>> {
        self.arena
            .get(self.id)
            .prev
            .map(|id| RawTree { id, ..*self })
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn urn(&self) -> &'a str {
        self.urn
    }
}

/// Conversion override signature for [`ParseOptions`](crate::ParseOptions).
pub type TreeConverter = fn(RawTree<'_>) -> ParseTree;

/// Default fragment-to-tree conversion.
pub fn convert(raw: RawTree<'_>) -> ParseTree {
    let input: Rc<str> = Rc::from(raw.input);
    let urn: Rc<str> = Rc::from(raw.urn);
    conv_frag(raw.arena, raw.id, &input, &urn)
}

/// Clamp a fragment offset into the input (the edge sentinel collapses to
/// the input end; conversion never trusts it as a span).
fn clamp(offset: usize, input: &str) -> usize {
    offset.min(input.len())
}

fn conv_frag(arena: &FragArena, id: FragId, input: &Rc<str>, urn: &Rc<str>) -> ParseTree {
    let frag = arena.get(id);
    if frag.prev.is_some() {
        // A parentless sibling chain: wrap it in an anonymous node spanning
        // the oldest start to the newest end.
        let mut head = id;
        while let Some(prev) = arena.get(head).prev {
            head = prev;
        }
        let spos = clamp(arena.get(head).spos, input);
        let epos = clamp(frag.epos, input);
        return node_from(arena, arena.anon_tag(), spos, epos, Some(id), input, urn);
    }
    if frag.is_edge() {
        let value = match frag.child {
            Some(child) => conv_frag(arena, child, input, urn),
            None => empty_leaf(input, urn),
        };
        let span = value.span();
        return ParseTree::from_parts(
            arena.anon_tag(),
            input.clone(),
            urn.clone(),
            span,
            Vec::new(),
            vec![(frag.tag.clone(), value)],
        );
    }
    node_from(
        arena,
        frag.tag.clone(),
        frag.spos,
        frag.epos,
        frag.child,
        input,
        urn,
    )
}

fn node_from(
    arena: &FragArena,
    tag: Rc<str>,
    spos: usize,
    epos: usize,
    mut sub: Option<FragId>,
    input: &Rc<str>,
    urn: &Rc<str>,
) -> ParseTree {
    let mut subs = Vec::new();
    let mut fields: Vec<(Rc<str>, ParseTree)> = Vec::new();
    while let Some(id) = sub {
        let frag = arena.get(id);
        if frag.is_edge() {
            let value = match frag.child {
                Some(child) => conv_frag(arena, child, input, urn),
                None => empty_leaf(input, urn),
            };
            // A repeated label keeps its first-seen slot; the value written
            // last (the oldest sibling) wins.
            match fields.iter_mut().find(|(key, _)| *key == frag.tag) {
                Some(slot) => slot.1 = value,
                None => fields.push((frag.tag.clone(), value)),
            }
        } else {
            subs.push(node_from(
                arena,
                frag.tag.clone(),
                frag.spos,
                frag.epos,
                frag.child,
                input,
                urn,
            ));
        }
        sub = frag.prev;
    }
    // The chain is most-recent-first; positional children come out reversed.
    subs.reverse();
    ParseTree::from_parts(
        tag,
        input.clone(),
        urn.clone(),
        Span::at(clamp(spos, input), clamp(epos, input)),
        subs,
        fields,
    )
}

fn empty_leaf(input: &Rc<str>, urn: &Rc<str>) -> ParseTree {
    ParseTree::from_parts(
        Rc::from("empty"),
        input.clone(),
        urn.clone(),
        Span::new(0, 0),
        Vec::new(),
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn position_counts_rows_and_columns() {
        let input = "ab\ncde\nf";
        assert_eq!(
            position_at(input, 0),
            Position {
                offset: 0,
                row: 1,
                column: 0
            }
        );
        assert_eq!(
            position_at(input, 1),
            Position {
                offset: 1,
                row: 1,
                column: 1
            }
        );
        assert_eq!(
            position_at(input, 3),
            Position {
                offset: 3,
                row: 2,
                column: 0
            }
        );
        assert_eq!(
            position_at(input, 6),
            Position {
                offset: 6,
                row: 2,
                column: 3
            }
        );
        assert_eq!(
            position_at(input, 7),
            Position {
                offset: 7,
                row: 3,
                column: 0
            }
        );
    }

    #[test]
    fn position_counts_characters_not_bytes() {
        let input = "あい\nう";
        // Offset 6 is just past the two three-byte characters.
        assert_eq!(
            position_at(input, 6),
            Position {
                offset: 6,
                row: 1,
                column: 2
            }
        );
    }

    #[test]
    fn position_clamps_past_the_end() {
        assert_eq!(position_at("ab", 99).offset, 2);
    }

    #[test]
    fn quote_escapes_control_characters() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("a\nb"), "'a\\nb'");
        assert_eq!(quote("tab\there"), "'tab\\there'");
        assert_eq!(quote("q'q"), "'q\\'q'");
        assert_eq!(quote("b\\s"), "'b\\\\s'");
        assert_eq!(quote("\r\u{0B}\u{0C}"), "'\\r\\v\\f'");
    }

    #[test]
    fn token_clamps_to_character_boundaries() {
        // A one-byte trim applied over a three-byte character rounds back
        // out to the whole character.
        let tree = ParseTree::new("Name", "1＋2", "t", Span::new(3, 4), Vec::new(), Vec::new());
        assert_eq!(tree.token(), "＋");
    }

    #[test]
    fn empty_sentinel_sits_at_node_end() {
        let tree = ParseTree::new("Int", "42", "t", Span::new(0, 2), Vec::new(), Vec::new());
        let missing = tree.get("nope");
        assert!(missing.is_empty());
        assert_eq!(missing.span(), Span::new(2, 2));
        assert_eq!(missing.token(), "");
    }

    #[test]
    fn comma_key_falls_back_in_order() {
        let name = ParseTree::new("Name", "x", "t", Span::new(0, 1), Vec::new(), Vec::new());
        let tree = ParseTree::new(
            "VarDecl",
            "x",
            "t",
            Span::new(0, 1),
            Vec::new(),
            vec![("left".to_string(), name)],
        );
        assert!(tree.get("lhs,left").is("Name"));
        assert!(tree.get("lhs,rhs").is_empty());
        assert!(tree.has("left"));
        assert!(!tree.has("lhs"));
        assert_eq!(tree.token_of("left"), "x");
        assert_eq!(tree.token_of("rhs"), "");
    }

    #[test]
    fn dump_renders_leaf_and_fields() {
        let one = ParseTree::new("Int", "1+1", "t", Span::new(0, 1), Vec::new(), Vec::new());
        let plus = ParseTree::new("Name", "1+1", "t", Span::new(1, 2), Vec::new(), Vec::new());
        let two = ParseTree::new("Int", "1+1", "t", Span::new(2, 3), Vec::new(), Vec::new());
        let infix = ParseTree::new(
            "Infix",
            "1+1",
            "t",
            Span::new(0, 3),
            Vec::new(),
            vec![
                ("right".to_string(), two),
                ("name".to_string(), plus),
                ("left".to_string(), one),
            ],
        );
        assert_eq!(
            infix.to_string(),
            "[#Infix right = [#Int '1'] name = [#Name '+'] left = [#Int '1']]"
        );
    }

    #[test]
    fn dump_renders_positional_children_before_fields() {
        let a = ParseTree::new("A", "ab", "t", Span::new(0, 1), Vec::new(), Vec::new());
        let b = ParseTree::new("B", "ab", "t", Span::new(1, 2), Vec::new(), Vec::new());
        let parent = ParseTree::new(
            "List",
            "ab",
            "t",
            Span::new(0, 2),
            vec![a],
            vec![("rest".to_string(), b)],
        );
        assert_eq!(parent.to_string(), "[#List [#A 'a'] rest = [#B 'b']]");
    }

    #[test]
    fn message_uses_row_plus_column_form() {
        let tree = ParseTree::new(
            "err",
            "a\nbc",
            "demo.cub",
            Span::new(3, 3),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(tree.message("Syntax Error"), "(demo.cub:2+1) Syntax Error");
    }
}
