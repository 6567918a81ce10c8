//! Constants for board geometry, evaluation weights and search presets.
//!
//! Coordinates follow the usual screen layout: file 0 is the left edge, rank 0
//! is black's back rank and rank 9 is red's back rank. Red advances toward
//! rank 0, black toward rank 9.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of files (columns).
pub const FILES: usize = 9;

/// Number of ranks (rows).
pub const RANKS: usize = 10;

/// Total number of squares.
pub const SQUARES: usize = FILES * RANKS;

/// Palace files, shared by both sides.
pub const PALACE_FILES: std::ops::RangeInclusive<i8> = 3..=5;

/// Black's palace ranks.
pub const BLACK_PALACE_RANKS: std::ops::RangeInclusive<i8> = 0..=2;

/// Red's palace ranks.
pub const RED_PALACE_RANKS: std::ops::RangeInclusive<i8> = 7..=9;

/// Last rank on black's side of the river.
pub const BLACK_RIVER_BANK: i8 = 4;

/// First rank on red's side of the river.
pub const RED_RIVER_BANK: i8 = 5;

/// Letters used for files in square notation.
pub const FILE_CHARS: [char; FILES] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i'];

/// Standard opening array in board-text form.
pub const INITIAL_BOARD: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR";

// =============================================================================
// Move Offsets
// =============================================================================

/// Orthogonal unit steps as (file, rank) deltas: up, right, down, left.
pub const ORTHOGONAL: [(i8, i8); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Diagonal unit steps.
pub const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Horse jumps paired with the leg square that blocks each one.
pub const HORSE_JUMPS: [((i8, i8), (i8, i8)); 8] = [
    ((-1, -2), (0, -1)),
    ((1, -2), (0, -1)),
    ((-2, -1), (-1, 0)),
    ((2, -1), (1, 0)),
    ((-2, 1), (-1, 0)),
    ((2, 1), (1, 0)),
    ((-1, 2), (0, 1)),
    ((1, 2), (0, 1)),
];

// =============================================================================
// Evaluation
// =============================================================================

/// Material values: general, advisor, elephant, horse, chariot, cannon, soldier.
pub const PIECE_VALUES: [i32; 7] = [10000, 200, 200, 400, 900, 450, 100];

/// Fixed mobility weights, same order as `PIECE_VALUES`.
pub const MOBILITY_WEIGHTS: [i32; 7] = [4, 2, 4, 8, 10, 10, 3];

/// Scale applied to the mobility-weight difference.
pub const MOBILITY_SCALE: f64 = 0.1;

/// Flat bonus for a soldier that has crossed the river.
pub const SOLDIER_CROSSED_BONUS: i32 = 15;

/// Bonus per rank a soldier has advanced.
pub const SOLDIER_ADVANCE_BONUS: i32 = 2;

/// Bonus for a chariot on an edge file or rank.
pub const CHARIOT_EDGE_BONUS: i32 = 10;

/// Bonus for giving check; the same amount is subtracted when in check.
pub const CHECK_BONUS: f64 = 50.0;

/// Score reported when a general has been captured.
pub const TERMINAL_SCORE: f64 = 10000.0;

// =============================================================================
// Search
// =============================================================================

/// (depth, random factor) for the easy preset.
pub const EASY_PRESET: (u8, f64) = (1, 0.3);

/// (depth, random factor) for the medium preset.
pub const MEDIUM_PRESET: (u8, f64) = (2, 0.15);

/// (depth, random factor) for the hard preset.
pub const HARD_PRESET: (u8, f64) = (3, 0.05);

/// Entry ceiling for each result cache.
pub const MAX_CACHE_SIZE: usize = 1000;

/// Fraction of the ceiling evicted when a cache overflows.
pub const CACHE_TRIM_FRACTION: f64 = 0.2;
