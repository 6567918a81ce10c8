//! Negamax search with alpha-beta pruning.
//!
//! This module implements the engine's move choice:
//! - negamax over simulated boards, pruning once `alpha >= beta`
//! - static evaluation at depth 0, at terminal boards and when no move exists
//! - memoised legal-move lists, static scores and bounded search scores
//! - seeded move shuffling and a per-difficulty chance of a random move
//!
//! Every root move is searched with a full window, so the root scores are
//! exact and ties between root moves can be collected reliably.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{debug, info};
use thiserror::Error;

use crate::board::{Board, Move, Side};
use crate::cache::{Bound, CacheStats, ResultCache, RootEntry, ScoreEntry};
use crate::constants::{EASY_PRESET, HARD_PRESET, MAX_CACHE_SIZE, MEDIUM_PRESET};
use crate::eval::evaluate;
use crate::rules::{apply, is_legal, legal_moves};

/// Error returned when a difficulty name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}` (expected easy, medium or hard)")]
pub struct ParseDifficultyError(String);

/// Difficulty presets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// (depth, random factor) for this preset.
    pub fn preset(self) -> (u8, f64) {
        match self {
            Difficulty::Easy => EASY_PRESET,
            Difficulty::Medium => MEDIUM_PRESET,
            Difficulty::Hard => HARD_PRESET,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// Search parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Plies to search. Values below 1 are treated as 1.
    pub depth: u8,
    /// Probability of ignoring the search and playing any legal move.
    pub random_factor: f64,
    /// Shuffle move order near the root to vary play between equal moves.
    pub shuffle_moves: bool,
    /// Memoise moves and scores by board fingerprint.
    pub use_cache: bool,
}

impl SearchConfig {
    /// A fixed-order, never-random configuration.
    pub fn deterministic(depth: u8) -> Self {
        Self {
            depth,
            random_factor: 0.0,
            shuffle_moves: false,
            use_cache: true,
        }
    }
}

impl From<Difficulty> for SearchConfig {
    fn from(level: Difficulty) -> Self {
        let (depth, random_factor) = level.preset();
        Self {
            depth,
            random_factor,
            shuffle_moves: true,
            use_cache: true,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Difficulty::default().into()
    }
}

/// Outcome of a root search.
#[derive(Clone, Debug)]
pub struct SearchReport {
    /// The move chosen.
    pub mv: Move,
    /// Search score of the chosen move, from the searching side's view.
    pub score: f64,
    /// Highest root score found.
    pub best_score: f64,
    /// All root moves that reached `best_score`, in search order.
    pub best_moves: Vec<Move>,
    /// Number of legal root moves.
    pub candidates: usize,
    /// Nodes visited.
    pub nodes: u64,
    /// The move was taken from the root cache without searching.
    pub from_cache: bool,
    /// The move was picked at random instead of from `best_moves`.
    pub randomized: bool,
}

/// The search engine. Owns its caches and random source.
///
/// One engine serves one caller at a time; it is not meant to be shared
/// between concurrent searches.
pub struct Engine {
    config: SearchConfig,
    cache: ResultCache,
    rng: fastrand::Rng,
    nodes: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Engine {
    /// Create an engine seeded from system entropy.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Create an engine with a fixed seed, for reproducible play.
    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: SearchConfig, rng: fastrand::Rng) -> Self {
        Self {
            config: SearchConfig {
                depth: config.depth.max(1),
                ..config
            },
            cache: ResultCache::new(MAX_CACHE_SIZE),
            rng,
            nodes: 0,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Switch to a difficulty preset. Clears all caches.
    pub fn set_difficulty(&mut self, level: Difficulty) {
        self.set_config(level.into());
        info!(
            "difficulty set to {level}: depth {}, random factor {}",
            self.config.depth, self.config.random_factor
        );
    }

    /// Replace the search parameters. Clears all caches.
    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = SearchConfig {
            depth: config.depth.max(1),
            ..config
        };
        self.clear_cache();
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        debug!("search caches cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Choose a move for `side`, or `None` if it has no legal move.
    pub fn get_best_move(&mut self, board: &Board, side: Side) -> Option<Move> {
        self.search(board, side).map(|report| report.mv)
    }

    /// Search `board` for `side` and report the result.
    pub fn search(&mut self, board: &Board, side: Side) -> Option<SearchReport> {
        let start = Instant::now();
        self.nodes = 0;
        let fingerprint = board.fingerprint();

        if self.config.use_cache {
            if let Some(entry) = self.cached_root_move(board, side) {
                debug!("root cache hit for {side}: {}", entry.mv);
                return Some(SearchReport {
                    mv: entry.mv,
                    score: entry.score,
                    best_score: entry.best_score,
                    best_moves: entry.best_moves,
                    candidates: entry.candidates,
                    nodes: 0,
                    from_cache: true,
                    randomized: entry.randomized,
                });
            }
        }

        let moves = self.legal_moves(board, side);
        if moves.is_empty() {
            debug!("{side} has no legal move");
            return None;
        }

        let mut order = moves.clone();
        if self.config.shuffle_moves {
            self.rng.shuffle(&mut order);
        }

        let depth = self.config.depth - 1;
        let mut best_score = f64::NEG_INFINITY;
        let mut best_moves: Vec<Move> = Vec::new();
        let mut scores = Vec::with_capacity(order.len());
        for mv in &order {
            let child = apply(board, mv);
            let score = -self.negamax(
                &child,
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                side.opponent(),
            );
            scores.push(score);
            if score > best_score {
                best_score = score;
                best_moves.clear();
                best_moves.push(*mv);
            } else if score == best_score {
                best_moves.push(*mv);
            }
        }

        let randomized =
            self.config.random_factor > 0.0 && self.rng.f64() < self.config.random_factor;
        // With shuffled order the first tied move is already a uniform pick.
        let mv = if randomized {
            order[self.rng.usize(..order.len())]
        } else {
            best_moves.first().copied().unwrap_or(order[0])
        };
        let score = order
            .iter()
            .zip(&scores)
            .find(|(m, _)| **m == mv)
            .map_or(best_score, |(_, s)| *s);

        if self.config.use_cache {
            let entry = RootEntry {
                mv,
                score,
                best_score,
                best_moves: best_moves.clone(),
                candidates: moves.len(),
                randomized,
            };
            self.cache.store_best_move(fingerprint, side, entry);
        }

        debug!(
            "{side} chose {mv} (score {score:.1}, best {best_score:.1}, {} tied of {}) \
             after {} nodes in {:?}{}",
            best_moves.len(),
            moves.len(),
            self.nodes,
            start.elapsed(),
            if randomized { ", random pick" } else { "" }
        );

        Some(SearchReport {
            mv,
            score,
            best_score,
            best_moves,
            candidates: moves.len(),
            nodes: self.nodes,
            from_cache: false,
            randomized,
        })
    }

    /// A cached root move, if one exists and is still legal on `board`.
    fn cached_root_move(&mut self, board: &Board, side: Side) -> Option<RootEntry> {
        let entry = self.cache.best_move(&board.fingerprint(), side)?;
        if is_legal(board, &entry.mv) {
            Some(entry)
        } else {
            debug!("discarding stale cached move {}", entry.mv);
            None
        }
    }

    fn legal_moves(&mut self, board: &Board, side: Side) -> Vec<Move> {
        if !self.config.use_cache {
            return legal_moves(board, side);
        }
        let fingerprint = board.fingerprint();
        if let Some(moves) = self.cache.legal_moves(&fingerprint, side) {
            return moves;
        }
        let moves = legal_moves(board, side);
        self.cache
            .store_legal_moves(fingerprint, side, moves.clone());
        moves
    }

    fn evaluate(&mut self, board: &Board, side: Side) -> f64 {
        if !self.config.use_cache {
            return evaluate(board, side);
        }
        let fingerprint = board.fingerprint();
        if let Some(score) = self.cache.static_score(&fingerprint, side) {
            return score;
        }
        let score = evaluate(board, side);
        self.cache.store_static_score(fingerprint, side, score);
        score
    }

    /// Score of `board` for `side` to move, searched `depth` plies deep.
    fn negamax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: f64,
        beta: f64,
        side: Side,
    ) -> f64 {
        self.nodes += 1;
        if depth == 0 || board.is_terminal() {
            return self.evaluate(board, side);
        }

        let fingerprint = self.config.use_cache.then(|| board.fingerprint());
        if let Some(fp) = &fingerprint {
            if let Some(entry) = self.cache.search_score(fp, side, depth) {
                if let Some(score) = entry.cutoff(alpha, beta) {
                    return score;
                }
            }
        }

        let mut moves = self.legal_moves(board, side);
        if moves.is_empty() {
            return self.evaluate(board, side);
        }
        if self.config.shuffle_moves && depth >= self.config.depth.saturating_sub(1) {
            self.rng.shuffle(&mut moves);
        }

        let alpha_orig = alpha;
        let mut best = f64::NEG_INFINITY;
        for mv in &moves {
            let child = apply(board, mv);
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, side.opponent());
            if score > best {
                best = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        if let Some(fp) = fingerprint {
            let bound = if best <= alpha_orig {
                Bound::Upper
            } else if best >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.cache
                .store_search_score(fp, side, depth, ScoreEntry { score: best, bound });
        }
        best
    }
}

/// Plain minimax value of `board` for `side` to move: no pruning, no caching,
/// moves in generation order.
pub fn minimax(board: &Board, side: Side, depth: u8) -> f64 {
    if depth == 0 || board.is_terminal() {
        return evaluate(board, side);
    }
    let moves = legal_moves(board, side);
    if moves.is_empty() {
        return evaluate(board, side);
    }
    moves
        .iter()
        .map(|mv| -minimax(&apply(board, mv), side.opponent(), depth - 1))
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Best root score for `side` by [`minimax`], searching `depth` plies.
pub fn minimax_root(board: &Board, side: Side, depth: u8) -> Option<f64> {
    let depth = depth.max(1);
    legal_moves(board, side)
        .iter()
        .map(|mv| -minimax(&apply(board, mv), side.opponent(), depth - 1))
        .reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_difficulty() {
        assert_eq!("easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("expert".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn test_presets() {
        let easy = SearchConfig::from(Difficulty::Easy);
        let hard = SearchConfig::from(Difficulty::Hard);
        assert!(easy.depth < hard.depth);
        assert!(easy.random_factor > hard.random_factor);
    }

    #[test]
    fn test_depth_is_clamped() {
        let engine = Engine::new(SearchConfig::deterministic(0));
        assert_eq!(engine.config().depth, 1);
    }

    #[test]
    fn test_set_difficulty_clears_cache() {
        let mut engine = Engine::with_seed(SearchConfig::deterministic(1), 7);
        engine.get_best_move(&Board::initial(), Side::Red);
        assert!(engine.cache_stats().move_entries > 0);

        engine.set_difficulty(Difficulty::Hard);
        assert_eq!(engine.cache_stats(), CacheStats::default());
        assert_eq!(engine.config().depth, 3);
    }

    #[test]
    fn test_second_search_hits_root_cache() {
        let board = Board::initial();
        let mut engine = Engine::with_seed(SearchConfig::deterministic(1), 1);
        let first = engine.search(&board, Side::Red).unwrap();
        assert!(!first.from_cache);
        let second = engine.search(&board, Side::Red).unwrap();
        assert!(second.from_cache);
        assert_eq!(first.mv, second.mv);
    }

    #[test]
    fn test_no_move_returns_none() {
        // Black general alone, boxed in by two red chariots.
        let board = Board::from_text("3k5/R8/4R4/9/9/9/9/9/9/5K3").unwrap();
        let mut engine = Engine::with_seed(SearchConfig::deterministic(2), 3);
        assert!(engine.get_best_move(&board, Side::Black).is_none());
    }
}
