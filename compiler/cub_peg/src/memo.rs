//! Adaptive packrat memoization.
//!
//! The memo table is a fixed-size approximate cache: slots are selected by
//! `key % MEMO_SLOTS` and collisions silently evict. A slot records the
//! match outcome plus enough tree-pointer identity to know whether replaying
//! it is valid at the current call site — the same rule at the same offset
//! can be invoked while folding different partial left operands, so position
//! alone is not a sufficient key for tree-mutating rules.
//!
//! Each memoized site owns lifetime hit/miss counters. A site whose hit
//! ratio stays under [`MIN_HIT_RATIO`] across successive sampling windows
//! disables itself permanently and forwards calls straight to the wrapped
//! matcher, shedding the cache overhead for rules that never benefit.

use std::cell::Cell;

use crate::frag::FragId;

/// Number of slots in the per-cursor memo table. Prime, so the modulo
/// reduction scatters adjacent (position, site) keys.
pub(crate) const MEMO_SLOTS: usize = 1789;

/// Misses per self-disable check.
const SAMPLE_WINDOW: u32 = 100;

/// Hit ratio below which a site stops paying for its cache.
const MIN_HIT_RATIO: f64 = 0.05;

/// One memo table entry.
#[derive(Clone, Copy)]
pub(crate) struct MemoSlot {
    pub(crate) key: u64,
    pub(crate) pos: usize,
    pub(crate) result: bool,
    /// The recorded call re-linked the tree pointer; replay is only valid
    /// when the pointer identity at the call site matches `prev`.
    pub(crate) tree_mutated: bool,
    pub(crate) prev: Option<FragId>,
    pub(crate) ptree: Option<FragId>,
}

impl MemoSlot {
    /// Unoccupied slot; the key is unreachable by any real
    /// `pos * site_count + site` computation.
    pub(crate) const VACANT: MemoSlot = MemoSlot {
        key: u64::MAX,
        pos: 0,
        result: false,
        tree_mutated: false,
        prev: None,
        ptree: None,
    };
}

/// Lifetime counters for one memoized rule site.
///
/// Owned by the site's matcher and never shared across grammars, so two
/// independently built rule tables cannot contaminate each other's tuning.
pub(crate) struct SiteStats {
    hit: Cell<u32>,
    miss: Cell<u32>,
    disabled: Cell<bool>,
}

impl SiteStats {
    pub(crate) fn new() -> SiteStats {
        SiteStats {
            hit: Cell::new(0),
            miss: Cell::new(0),
            disabled: Cell::new(false),
        }
    }

    #[inline]
    pub(crate) fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hit.set(self.hit.get().saturating_add(1));
    }

    /// Record a miss; returns true when this miss tripped the permanent
    /// disable.
    pub(crate) fn record_miss(&self) -> bool {
        let miss = self.miss.get().saturating_add(1);
        self.miss.set(miss);
        if miss % SAMPLE_WINDOW == 0 && f64::from(self.hit.get()) / f64::from(miss) < MIN_HIT_RATIO {
            self.disabled.set(true);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_site_disables_after_window() {
        let stats = SiteStats::new();
        for i in 1..SAMPLE_WINDOW {
            assert!(!stats.record_miss(), "disabled too early at miss {i}");
        }
        assert!(stats.record_miss());
        assert!(stats.is_disabled());
    }

    #[test]
    fn hot_site_stays_enabled() {
        let stats = SiteStats::new();
        for _ in 0..SAMPLE_WINDOW {
            stats.record_hit();
        }
        for _ in 0..SAMPLE_WINDOW {
            stats.record_miss();
        }
        assert!(!stats.is_disabled());
    }

    #[test]
    fn ratio_checked_only_at_window_boundary() {
        let stats = SiteStats::new();
        for _ in 0..SAMPLE_WINDOW - 1 {
            stats.record_miss();
        }
        assert!(!stats.is_disabled());
    }
}
