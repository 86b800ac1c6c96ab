//! Keyword tries for literal-alternative matching.
//!
//! An ordered list of literal alternatives compiles either to a flat
//! candidate list (small sets, linear first-prefix-wins scan) or to a trie
//! branching on one character per level, with single-candidate branches
//! collapsed to their suffix. The result is equivalent to an ordered choice
//! over the individual literals; the trie is purely a shortcut over large
//! keyword and operator sets.

use rustc_hash::FxHashMap;

/// Below this many candidates a linear prefix scan beats a trie descent.
const FLAT_LIMIT: usize = 10;

pub(crate) enum Trie {
    /// Ordered candidate list; the first prefix match wins.
    Flat(Vec<Box<str>>),
    /// Branch on the next character.
    Branch(FxHashMap<char, Entry>),
}

pub(crate) enum Entry {
    /// Single remaining candidate, stored as its suffix.
    Suffix(Box<str>),
    Node(Box<Trie>),
}

impl Trie {
    pub(crate) fn build(words: &[&str]) -> Trie {
        // An empty alternative matches everything after it; candidate sets
        // containing one can only be scanned in order.
        if words.len() < FLAT_LIMIT || words.iter().any(|w| w.is_empty()) {
            return Trie::Flat(words.iter().map(|w| Box::from(*w)).collect());
        }
        let mut buckets: Vec<(char, Vec<&str>)> = Vec::new();
        for word in words {
            let mut cs = word.chars();
            let Some(head) = cs.next() else { continue };
            let suffix = cs.as_str();
            match buckets.iter_mut().find(|(c, _)| *c == head) {
                Some((_, bucket)) => bucket.push(suffix),
                None => buckets.push((head, vec![suffix])),
            }
        }
        let mut map = FxHashMap::default();
        for (head, suffixes) in buckets {
            let entry = if suffixes.len() == 1 {
                Entry::Suffix(Box::from(suffixes[0]))
            } else {
                Entry::Node(Box::new(Trie::build(&suffixes)))
            };
            map.insert(head, entry);
        }
        Trie::Branch(map)
    }

    /// Match one candidate at `pos`, returning the end offset on success.
    ///
    /// The probe position is local; a failed match never moves the cursor.
    pub(crate) fn match_at(&self, input: &str, pos: usize, epos: usize) -> Option<usize> {
        match self {
            Trie::Flat(words) => {
                let rest = &input[pos..];
                for word in words {
                    if rest.starts_with(&**word) {
                        return Some(pos + word.len());
                    }
                }
                None
            }
            Trie::Branch(map) => {
                if pos >= epos {
                    return None;
                }
                let c = input[pos..].chars().next()?;
                let next = pos + c.len_utf8();
                match map.get(&c)? {
                    Entry::Suffix(suffix) => {
                        if input[next..].starts_with(&**suffix) {
                            Some(next + suffix.len())
                        } else {
                            None
                        }
                    }
                    Entry::Node(trie) => trie.match_at(input, next, epos),
                }
            }
        }
    }
}
