//! The matcher interpreter.
//!
//! Each arm implements one combinator's contract over the cursor. The
//! protocol: a `true` return may have moved `pos` and rewritten the tree and
//! state pointers; a `false` return owes nothing — restoration is performed
//! by the nearest enclosing choice point, which saved `(pos, ptree, state)`
//! before the attempt. Lookahead is the exception and always restores.
//! `headpos` is raised at every rollback point so the furthest reach
//! survives backtracking.

use cub_stack::ensure_sufficient_stack;
use tracing::debug;

use crate::cursor::Cursor;
use crate::frag::{shift_pos, Frag, EDGE_MARK};
use crate::grammar::Grammar;
use crate::matcher::{Kind, Matcher};
use crate::memo::{MemoSlot, MEMO_SLOTS};
use crate::state::StateEntry;

impl Matcher {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "memo slot index is reduced modulo MEMO_SLOTS, which fits usize"
    )]
    pub(crate) fn run(&self, g: &Grammar, px: &mut Cursor<'_>) -> bool {
        match &self.kind {
            Kind::Empty => true,
            Kind::Fail => false,
            Kind::Any => {
                if let Some(c) = px.peek_char() {
                    px.pos += c.len_utf8();
                    true
                } else {
                    false
                }
            }
            Kind::Skip => {
                px.pos = px.headpos.min(px.epos);
                true
            }
            Kind::Lit(text) => {
                if px.starts_with(text) {
                    px.pos += text.len();
                    true
                } else {
                    false
                }
            }
            Kind::Class(class) => match px.peek_char() {
                Some(c) if class.contains(c) => {
                    px.pos += c.len_utf8();
                    true
                }
                _ => false,
            },
            Kind::Dict(trie) => {
                if let Some(end) = trie.match_at(px.input, px.pos, px.epos) {
                    px.pos = end;
                    true
                } else {
                    false
                }
            }
            Kind::Seq(parts) => parts.iter().all(|part| part.run(g, px)),
            Kind::Choice(alternatives) => {
                let pos = px.pos;
                let ptree = px.ptree;
                let state = px.state;
                for alt in alternatives {
                    if alt.run(g, px) {
                        return true;
                    }
                    px.sync_head();
                    px.pos = pos;
                    px.ptree = ptree;
                    px.state = state;
                }
                false
            }
            Kind::Many(inner) => {
                let mut pos = px.pos;
                let mut ptree = px.ptree;
                let mut state = px.state;
                while inner.run(g, px) && px.pos > pos {
                    pos = px.pos;
                    ptree = px.ptree;
                    state = px.state;
                }
                px.sync_head();
                px.pos = pos;
                px.ptree = ptree;
                px.state = state;
                true
            }
            Kind::OneMany(inner) => {
                if !inner.run(g, px) {
                    return false;
                }
                let mut pos = px.pos;
                let mut ptree = px.ptree;
                let mut state = px.state;
                while inner.run(g, px) && px.pos > pos {
                    pos = px.pos;
                    ptree = px.ptree;
                    state = px.state;
                }
                px.sync_head();
                px.pos = pos;
                px.ptree = ptree;
                px.state = state;
                true
            }
            Kind::Opt(inner) => {
                let pos = px.pos;
                let ptree = px.ptree;
                let state = px.state;
                if !inner.run(g, px) {
                    px.sync_head();
                    px.pos = pos;
                    px.ptree = ptree;
                    px.state = state;
                }
                true
            }
            Kind::Peek(inner) => {
                let pos = px.pos;
                let matched = inner.run(g, px);
                px.sync_head();
                px.pos = pos;
                matched
            }
            Kind::Not(inner) => {
                let pos = px.pos;
                let ptree = px.ptree;
                let matched = inner.run(g, px);
                px.sync_head();
                px.pos = pos;
                px.ptree = ptree;
                !matched
            }
            Kind::PeekLit(text) => px.starts_with(text),
            Kind::NotLit(text) => !px.starts_with(text),
            Kind::OptLit(text) => {
                if px.starts_with(text) {
                    px.pos += text.len();
                }
                true
            }
            Kind::ManyLit(text) => {
                while px.starts_with(text) {
                    px.pos += text.len();
                }
                true
            }
            Kind::OneManyLit(text) => {
                if !px.starts_with(text) {
                    return false;
                }
                px.pos += text.len();
                while px.starts_with(text) {
                    px.pos += text.len();
                }
                true
            }
            Kind::PeekClass(class) => {
                matches!(px.peek_char(), Some(c) if class.contains(c))
            }
            Kind::NotClass(class) => {
                !matches!(px.peek_char(), Some(c) if class.contains(c))
            }
            Kind::OptClass(class) => {
                if let Some(c) = px.peek_char() {
                    if class.contains(c) {
                        px.pos += c.len_utf8();
                    }
                }
                true
            }
            Kind::ManyClass(class) => {
                while let Some(c) = px.peek_char() {
                    if !class.contains(c) {
                        break;
                    }
                    px.pos += c.len_utf8();
                }
                true
            }
            Kind::OneManyClass(class) => match px.peek_char() {
                Some(c) if class.contains(c) => {
                    px.pos += c.len_utf8();
                    while let Some(c) = px.peek_char() {
                        if !class.contains(c) {
                            break;
                        }
                        px.pos += c.len_utf8();
                    }
                    true
                }
                _ => false,
            },
            Kind::Node { inner, tag, shift } => {
                let pos = px.pos;
                let prev = px.ptree;
                px.ptree = None;
                if inner.run(g, px) {
                    let child = px.ptree;
                    let id = px.frags.alloc(Frag {
                        tag: tag.clone(),
                        spos: shift_pos(pos, *shift),
                        epos: px.pos,
                        prev,
                        child,
                    });
                    px.ptree = Some(id);
                    true
                } else {
                    false
                }
            }
            Kind::Edge {
                label,
                inner,
                shift,
            } => {
                let pos = px.pos;
                let prev = px.ptree;
                px.ptree = None;
                if inner.run(g, px) {
                    let child = match px.ptree {
                        Some(id) => id,
                        // A token-only edge: wrap the consumed span in an
                        // anonymous fragment so the field has content.
                        None => {
                            let anon = px.frags.anon_tag();
                            px.frags.alloc(Frag {
                                tag: anon,
                                spos: shift_pos(pos, *shift),
                                epos: px.pos,
                                prev: None,
                                child: None,
                            })
                        }
                    };
                    let id = px.frags.alloc(Frag {
                        tag: label.clone(),
                        spos: EDGE_MARK,
                        epos: EDGE_MARK,
                        prev,
                        child: Some(child),
                    });
                    px.ptree = Some(id);
                    true
                } else {
                    false
                }
            }
            Kind::Fold {
                label,
                inner,
                tag,
                shift,
            } => {
                let pos = px.pos;
                // Detach the most recent fragment from its sibling chain so
                // it becomes self-contained under the new node; its old
                // previous sibling becomes the new node's previous sibling.
                let (left, prev) = match px.ptree {
                    Some(id) => {
                        let (frag_prev, detached) = {
                            let f = px.frags.get(id);
                            (
                                f.prev,
                                Frag {
                                    tag: f.tag.clone(),
                                    spos: f.spos,
                                    epos: f.epos,
                                    prev: None,
                                    child: f.child,
                                },
                            )
                        };
                        if frag_prev.is_some() {
                            (Some(px.frags.alloc(detached)), frag_prev)
                        } else {
                            (Some(id), None)
                        }
                    }
                    None => (None, None),
                };
                px.ptree = if label.is_empty() {
                    left
                } else {
                    Some(px.frags.alloc(Frag {
                        tag: label.clone(),
                        spos: EDGE_MARK,
                        epos: EDGE_MARK,
                        prev: None,
                        child: left,
                    }))
                };
                if inner.run(g, px) {
                    let child = px.ptree;
                    let id = px.frags.alloc(Frag {
                        tag: tag.clone(),
                        spos: pos,
                        epos: shift_pos(px.pos, *shift),
                        prev,
                        child,
                    });
                    px.ptree = Some(id);
                    true
                } else {
                    false
                }
            }
            Kind::Hide(inner) => {
                let ptree = px.ptree;
                if inner.run(g, px) {
                    px.ptree = ptree;
                    true
                } else {
                    false
                }
            }
            Kind::Capture { sid, inner } => {
                let pos = px.pos;
                if inner.run(g, px) {
                    let id = px.states.alloc(StateEntry {
                        sid: *sid,
                        start: pos,
                        end: px.pos,
                        prev: px.state,
                    });
                    px.state = Some(id);
                    true
                } else {
                    false
                }
            }
            Kind::Scoped(inner) => {
                // Success-only restore; a failed attempt's leaked bindings
                // are discarded by the enclosing choice point.
                let state = px.state;
                if inner.run(g, px) {
                    px.state = state;
                    true
                } else {
                    false
                }
            }
            Kind::Exists(sid) => px.states.find(px.state, *sid).is_some(),
            Kind::Recall(sid) => {
                let (start, end) = match px.states.find(px.state, *sid) {
                    Some(entry) => (entry.start, entry.end),
                    None => return false,
                };
                let input = px.input;
                let captured = &input[start..end];
                if px.starts_with(captured) {
                    px.pos += captured.len();
                    true
                } else {
                    false
                }
            }
            Kind::Ref(rule) => ensure_sufficient_stack(|| g.rule(*rule).run(g, px)),
            Kind::Memo { site, stats, inner } => {
                if stats.is_disabled() {
                    return inner.run(g, px);
                }
                let key = px.pos as u64 * u64::from(g.memo_site_count()) + u64::from(*site);
                let index = (key % MEMO_SLOTS as u64) as usize;
                let slot = px.memo[index];
                if slot.key == key {
                    if slot.tree_mutated {
                        // Replay a tree-mutating call only in the same tree
                        // context it was recorded in.
                        if slot.prev == px.ptree {
                            px.pos = slot.pos;
                            px.ptree = slot.ptree;
                            stats.record_hit();
                            return slot.result;
                        }
                    } else {
                        px.pos = slot.pos;
                        stats.record_hit();
                        return slot.result;
                    }
                }
                let prev = px.ptree;
                let result = inner.run(g, px);
                let tree_mutated = result && prev != px.ptree;
                px.memo[index] = MemoSlot {
                    key,
                    pos: px.pos,
                    result,
                    tree_mutated,
                    prev: if tree_mutated { prev } else { None },
                    ptree: if tree_mutated { px.ptree } else { None },
                };
                if stats.record_miss() {
                    debug!(site = *site, "memo cache disabled for low-yield site");
                }
                result
            }
        }
    }
}
