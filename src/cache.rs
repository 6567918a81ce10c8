//! Result caches for the search engine.
//!
//! Two caches, both keyed by board fingerprint plus side to move:
//! - the move cache holds chosen root moves and generated legal-move lists
//! - the score cache holds static evaluations and bounded search scores
//!
//! Each cache is capped at a fixed entry count. On overflow the oldest fifth of
//! entries, by insertion order, is dropped in one pass. There is no recency
//! tracking; updating an existing key keeps its original position.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use log::debug;

use crate::board::{Fingerprint, Move, Side};
use crate::constants::{CACHE_TRIM_FRACTION, MAX_CACHE_SIZE};

/// A map with a hard entry ceiling and FIFO eviction.
pub struct BoundedCache<K, V> {
    map: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Insert or update an entry. Returns how many entries were evicted.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        if self.map.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        if self.map.len() > self.capacity {
            self.trim()
        } else {
            0
        }
    }

    fn trim(&mut self) -> usize {
        let target = ((self.capacity as f64 * CACHE_TRIM_FRACTION) as usize).max(1);
        let mut evicted = 0;
        while evicted < target {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
            evicted += 1;
        }
        debug!("cache trim: evicted {evicted} entries, {} remain", self.map.len());
        evicted
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// Key into the move cache.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum MoveKey {
    Best(Fingerprint, Side),
    Legal(Fingerprint, Side),
}

/// A finished root search: the move played and the evidence behind it.
#[derive(Clone, Debug, PartialEq)]
pub struct RootEntry {
    pub mv: Move,
    pub score: f64,
    pub best_score: f64,
    pub best_moves: Vec<Move>,
    pub candidates: usize,
    pub randomized: bool,
}

/// Value stored in the move cache.
#[derive(Clone, Debug)]
pub enum MoveEntry {
    Best(RootEntry),
    Legal(Vec<Move>),
}

/// Key into the score cache.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ScoreKey {
    Static(Fingerprint, Side),
    Search(Fingerprint, Side, u8),
}

/// How a cached search score relates to the true value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    /// The score is the exact minimax value.
    Exact,
    /// The true value is at least the score (the search failed high).
    Lower,
    /// The true value is at most the score (the search failed low).
    Upper,
}

/// A cached search score with its bound kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoreEntry {
    pub score: f64,
    pub bound: Bound,
}

impl ScoreEntry {
    /// The score to return for window `(alpha, beta)`, if this entry settles it.
    pub fn cutoff(&self, alpha: f64, beta: f64) -> Option<f64> {
        match self.bound {
            Bound::Exact => Some(self.score),
            Bound::Lower if self.score >= beta => Some(self.score),
            Bound::Upper if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

/// Hit/miss counters and current sizes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub move_entries: usize,
    pub score_entries: usize,
}

/// The engine's move cache and score cache.
pub struct ResultCache {
    moves: BoundedCache<MoveKey, MoveEntry>,
    scores: BoundedCache<ScoreKey, ScoreEntry>,
    hits: u64,
    misses: u64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(MAX_CACHE_SIZE)
    }
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            moves: BoundedCache::new(capacity),
            scores: BoundedCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    fn record<T>(&mut self, found: Option<T>) -> Option<T> {
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// The root result stored last time for this board and side.
    pub fn best_move(&mut self, fingerprint: &Fingerprint, side: Side) -> Option<RootEntry> {
        let found = match self.moves.get(&MoveKey::Best(fingerprint.clone(), side)) {
            Some(MoveEntry::Best(entry)) => Some(entry.clone()),
            _ => None,
        };
        self.record(found)
    }

    pub fn store_best_move(&mut self, fingerprint: Fingerprint, side: Side, entry: RootEntry) {
        self.moves
            .insert(MoveKey::Best(fingerprint, side), MoveEntry::Best(entry));
    }

    pub fn legal_moves(&mut self, fingerprint: &Fingerprint, side: Side) -> Option<Vec<Move>> {
        let found = match self.moves.get(&MoveKey::Legal(fingerprint.clone(), side)) {
            Some(MoveEntry::Legal(moves)) => Some(moves.clone()),
            _ => None,
        };
        self.record(found)
    }

    pub fn store_legal_moves(&mut self, fingerprint: Fingerprint, side: Side, moves: Vec<Move>) {
        self.moves
            .insert(MoveKey::Legal(fingerprint, side), MoveEntry::Legal(moves));
    }

    pub fn static_score(&mut self, fingerprint: &Fingerprint, side: Side) -> Option<f64> {
        let found = self
            .scores
            .get(&ScoreKey::Static(fingerprint.clone(), side))
            .map(|e| e.score);
        self.record(found)
    }

    pub fn store_static_score(&mut self, fingerprint: Fingerprint, side: Side, score: f64) {
        let entry = ScoreEntry {
            score,
            bound: Bound::Exact,
        };
        self.scores.insert(ScoreKey::Static(fingerprint, side), entry);
    }

    pub fn search_score(
        &mut self,
        fingerprint: &Fingerprint,
        side: Side,
        depth: u8,
    ) -> Option<ScoreEntry> {
        let found = self
            .scores
            .get(&ScoreKey::Search(fingerprint.clone(), side, depth))
            .copied();
        self.record(found)
    }

    pub fn store_search_score(
        &mut self,
        fingerprint: Fingerprint,
        side: Side,
        depth: u8,
        entry: ScoreEntry,
    ) {
        self.scores
            .insert(ScoreKey::Search(fingerprint, side, depth), entry);
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.moves.clear();
        self.scores.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            move_entries: self.moves.len(),
            score_entries: self.scores.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn test_fifo_trim_drops_oldest_fifth() {
        let mut cache = BoundedCache::new(10);
        for i in 0..10 {
            assert_eq!(cache.insert(i, i * 10), 0);
        }
        assert_eq!(cache.insert(10, 100), 2);
        assert_eq!(cache.len(), 9);
        assert!(cache.get(&0).is_none());
        assert!(cache.get(&1).is_none());
        assert_eq!(cache.get(&2), Some(&20));
        assert_eq!(cache.get(&10), Some(&100));
    }

    #[test]
    fn test_update_keeps_insertion_position() {
        let mut cache = BoundedCache::new(5);
        for i in 0..5 {
            cache.insert(i, 0);
        }
        cache.insert(0, 1);
        assert_eq!(cache.len(), 5);
        cache.insert(5, 0);
        // Key 0 was still the oldest even though it was just updated.
        assert!(cache.get(&0).is_none());
        assert!(cache.get(&1).is_some());
    }

    #[test]
    fn test_never_exceeds_ceiling() {
        let mut cache = BoundedCache::new(1000);
        for i in 0..5000 {
            cache.insert(i, ());
            assert!(cache.len() <= cache.capacity());
        }
    }

    #[test]
    fn test_score_entry_cutoff() {
        let lower = ScoreEntry {
            score: 5.0,
            bound: Bound::Lower,
        };
        assert_eq!(lower.cutoff(0.0, 4.0), Some(5.0));
        assert_eq!(lower.cutoff(0.0, 6.0), None);

        let upper = ScoreEntry {
            score: -5.0,
            bound: Bound::Upper,
        };
        assert_eq!(upper.cutoff(-4.0, 10.0), Some(-5.0));
        assert_eq!(upper.cutoff(-6.0, 10.0), None);
    }

    #[test]
    fn test_result_cache_counts_and_clear() {
        let board = Board::initial();
        let fp = board.fingerprint();
        let mut cache = ResultCache::default();

        assert_eq!(cache.static_score(&fp, Side::Red), None);
        cache.store_static_score(fp.clone(), Side::Red, 1.5);
        assert_eq!(cache.static_score(&fp, Side::Red), Some(1.5));
        assert_eq!(cache.static_score(&fp, Side::Black), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.score_entries, 1);

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
