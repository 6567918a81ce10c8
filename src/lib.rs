//! Xiangqi-Engine: a Chinese chess rules engine with an alpha-beta AI.
//!
//! The rules layer answers "what can this piece do" and "is this side in
//! check" on immutable boards. The search layer runs a depth-limited negamax
//! with alpha-beta pruning over those boards, with bounded result caches and a
//! seeded random source for move variety.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, piece values and engine parameters
//! - [`board`] - Squares, pieces, moves and the `Copy` board value
//! - [`movegen`] - Pseudo-legal movement rules per piece kind
//! - [`rules`] - Check detection, move simulation and legal-move filtering
//! - [`eval`] - Static evaluation
//! - [`cache`] - Bounded FIFO result caches
//! - [`search`] - Negamax search, difficulty presets and the `Engine`
//! - [`game`] - Turn order, history and game-over status
//! - [`protocol`] - Text command loop for driving a game
//!
//! ## Example
//!
//! ```
//! use xiangqi_engine::board::{Board, Side};
//! use xiangqi_engine::rules::is_checked;
//! use xiangqi_engine::search::{Engine, SearchConfig};
//!
//! let board = Board::initial();
//! assert!(!is_checked(Side::Red, &board));
//!
//! let mut engine = Engine::with_seed(SearchConfig::deterministic(1), 7);
//! let best = engine.get_best_move(&board, Side::Red).unwrap();
//! println!("Best move: {best}");
//! ```

pub mod board;
pub mod cache;
pub mod constants;
pub mod eval;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod rules;
pub mod search;
