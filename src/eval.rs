//! Static position evaluation.
//!
//! The score is the sum of four terms, each taken as "own minus opponent":
//! material, a per-piece positional bonus, a fixed mobility weight per piece,
//! and a flat bonus for giving (or penalty for being in) check. Every term is
//! mirrored between the two sides, so `evaluate(b, Red) == -evaluate(b, Black)`
//! for any board on which both generals are present.

use crate::board::{Board, Piece, PieceKind, Side};
use crate::constants::{
    CHARIOT_EDGE_BONUS, CHECK_BONUS, FILES, MOBILITY_SCALE, RANKS, SOLDIER_ADVANCE_BONUS,
    SOLDIER_CROSSED_BONUS, TERMINAL_SCORE,
};
use crate::rules::is_checked;

/// Score `board` from `side`'s point of view; higher is better for `side`.
///
/// If a general has been captured the incremental terms are skipped: losing
/// one's own general scores `-TERMINAL_SCORE`, capturing the enemy's scores
/// `TERMINAL_SCORE`.
pub fn evaluate(board: &Board, side: Side) -> f64 {
    let opponent = side.opponent();
    if board.general(side).is_none() {
        return -TERMINAL_SCORE;
    }
    if board.general(opponent).is_none() {
        return TERMINAL_SCORE;
    }

    let mut material = 0i32;
    let mut mobility = 0i32;
    for piece in board.pieces() {
        let value = piece.kind.value() + position_bonus(&piece);
        if piece.side == side {
            material += value;
            mobility += piece.kind.mobility_weight();
        } else {
            material -= value;
            mobility -= piece.kind.mobility_weight();
        }
    }

    // Integer terms are summed before the one fractional term, so the two
    // sides' scores are exact negations of each other.
    let checks = is_checked(opponent, board) as i32 - is_checked(side, board) as i32;
    (material as f64 + checks as f64 * CHECK_BONUS) + mobility as f64 * MOBILITY_SCALE
}

/// Positional bonus for a single piece, independent of whose turn it is.
pub fn position_bonus(piece: &Piece) -> i32 {
    let file = piece.square.file() as i32;
    // Rank measured from the piece's own back rank, so both sides share one table.
    let depth = match piece.side {
        Side::Red => (RANKS as i32 - 1) - piece.square.rank() as i32,
        Side::Black => piece.square.rank() as i32,
    };
    let center_file = (FILES as i32 - 1) / 2;

    match piece.kind {
        PieceKind::Soldier => {
            let crossed = if piece.square.on_home_side(piece.side) {
                0
            } else {
                SOLDIER_CROSSED_BONUS
            };
            crossed + depth * SOLDIER_ADVANCE_BONUS
        }
        PieceKind::Horse | PieceKind::Cannon => {
            // Twice the distance to the board's center rank (4.5) is always odd;
            // keeping it doubled leaves the bonus an integer.
            let file_off = (file - center_file).abs();
            let twice_rank_off = (2 * piece.square.rank() as i32 - (RANKS as i32 - 1)).abs();
            (center_file - file_off) * 2 + ((RANKS as i32 - 1) - twice_rank_off)
        }
        PieceKind::Chariot => {
            let rank = piece.square.rank() as i32;
            let on_edge =
                file == 0 || file == FILES as i32 - 1 || rank == 0 || rank == RANKS as i32 - 1;
            if on_edge { CHARIOT_EDGE_BONUS } else { 0 }
        }
        PieceKind::General => {
            // Palace center sits one rank in from the back rank.
            let file_off = (file - center_file).abs();
            let rank_off = (depth - 1).abs();
            (center_file - file_off) * 2 + (2 - rank_off) * 2
        }
        PieceKind::Advisor | PieceKind::Elephant => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn piece(kind: PieceKind, side: Side, at: &str) -> Piece {
        Piece::new(kind, side, at.parse::<Square>().unwrap())
    }

    #[test]
    fn test_initial_position_is_balanced() {
        let board = Board::initial();
        assert_eq!(evaluate(&board, Side::Red), 0.0);
        assert_eq!(evaluate(&board, Side::Black), 0.0);
    }

    #[test]
    fn test_material_advantage() {
        let board = Board::from_text("3k5/9/9/9/9/9/9/9/9/R3K4").unwrap();
        let score = evaluate(&board, Side::Red);
        assert!(score > 900.0, "chariot up should be worth more than 900, got {score}");
        assert_eq!(score, -evaluate(&board, Side::Black));
    }

    #[test]
    fn test_terminal_scores() {
        let board = Board::from_text("9/9/9/9/9/9/9/9/9/4K4").unwrap();
        assert_eq!(evaluate(&board, Side::Red), TERMINAL_SCORE);
        assert_eq!(evaluate(&board, Side::Black), -TERMINAL_SCORE);
    }

    #[test]
    fn test_check_bonus_applies() {
        let quiet = Board::from_text("3k5/9/9/9/9/9/9/9/9/4KR3").unwrap();
        let check = Board::from_text("3k5/9/9/9/9/9/9/9/9/3R1K3").unwrap();
        // Same material; the checking chariot sits on the edge rank in both.
        let delta = evaluate(&check, Side::Red) - evaluate(&quiet, Side::Red);
        let general_shift = (position_bonus(&piece(PieceKind::General, Side::Red, "f9"))
            - position_bonus(&piece(PieceKind::General, Side::Red, "e9")))
            as f64;
        assert!((delta - (CHECK_BONUS + general_shift)).abs() < 1e-9);
    }

    #[test]
    fn test_soldier_bonus_grows_across_river() {
        let home = position_bonus(&piece(PieceKind::Soldier, Side::Red, "e6"));
        let crossed = position_bonus(&piece(PieceKind::Soldier, Side::Red, "e4"));
        assert_eq!(home, 3 * SOLDIER_ADVANCE_BONUS);
        assert_eq!(crossed, SOLDIER_CROSSED_BONUS + 5 * SOLDIER_ADVANCE_BONUS);
        let black = position_bonus(&piece(PieceKind::Soldier, Side::Black, "e5"));
        assert_eq!(black, crossed);
    }

    #[test]
    fn test_horse_prefers_center() {
        let center = position_bonus(&piece(PieceKind::Horse, Side::Red, "e5"));
        let corner = position_bonus(&piece(PieceKind::Horse, Side::Red, "a9"));
        assert!(center > corner);
        assert_eq!(center, 8 + 8);
        assert_eq!(corner, 0);
    }

    #[test]
    fn test_general_bonus_is_mirrored() {
        let red = position_bonus(&piece(PieceKind::General, Side::Red, "e8"));
        let black = position_bonus(&piece(PieceKind::General, Side::Black, "e1"));
        assert_eq!(red, black);
        assert!(red > position_bonus(&piece(PieceKind::General, Side::Red, "d9")));
    }
}
