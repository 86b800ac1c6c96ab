//! Capture/match state for context-sensitive rules.
//!
//! A state entry remembers the exact byte range a `capture` consumed, linked
//! in front of the previous chain head. The chain is the indentation
//! mechanism: a block's first line captures its leading whitespace, later
//! lines must `recall` exactly that text to stay in the block.

/// Index of a state entry in its cursor's arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct StateId(u32);

pub(crate) struct StateEntry {
    pub(crate) sid: u16,
    /// Captured byte range into the input.
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) prev: Option<StateId>,
}

pub(crate) struct StateArena {
    entries: Vec<StateEntry>,
}

impl StateArena {
    pub(crate) fn new() -> StateArena {
        StateArena {
            entries: Vec::new(),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "a parse cannot allocate more than u32::MAX state entries before exhausting memory"
    )]
    pub(crate) fn alloc(&mut self, entry: StateEntry) -> StateId {
        let id = self.entries.len() as u32;
        self.entries.push(entry);
        StateId(id)
    }

    #[inline]
    pub(crate) fn get(&self, id: StateId) -> &StateEntry {
        &self.entries[id.0 as usize]
    }

    /// Walk the chain from `head` for the nearest binding of `sid`.
    pub(crate) fn find(&self, head: Option<StateId>, sid: u16) -> Option<&StateEntry> {
        let mut cur = head;
        while let Some(id) = cur {
            let entry = self.get(id);
            if entry.sid == sid {
                return Some(entry);
            }
            cur = entry.prev;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_binding_wins() {
        let mut arena = StateArena::new();
        let outer = arena.alloc(StateEntry {
            sid: 0,
            start: 0,
            end: 2,
            prev: None,
        });
        let inner = arena.alloc(StateEntry {
            sid: 0,
            start: 2,
            end: 6,
            prev: Some(outer),
        });
        let found = arena.find(Some(inner), 0).map(|e| (e.start, e.end));
        assert_eq!(found, Some((2, 6)));
    }

    #[test]
    fn missing_sid_is_none() {
        let mut arena = StateArena::new();
        let head = arena.alloc(StateEntry {
            sid: 1,
            start: 0,
            end: 1,
            prev: None,
        });
        assert!(arena.find(Some(head), 2).is_none());
        assert!(arena.find(None, 1).is_none());
    }
}
