//! Rule scenarios played out on small hand-built boards.
//!
//! Boards are written in board text: rank 0 (black's back rank) first,
//! uppercase letters for red pieces.

use xiangqi_engine::board::{Board, Piece, PieceKind, Side, Square};
use xiangqi_engine::eval::evaluate;
use xiangqi_engine::movegen::pseudo_legal_moves;
use xiangqi_engine::rules::{is_checked, legal_moves, simulate_move, valid_moves, winner};

// =============================================================================
// Helper functions
// =============================================================================

fn board(text: &str) -> Board {
    Board::from_text(text).unwrap()
}

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn piece_at(board: &Board, at: &str) -> Piece {
    board.piece_at(sq(at)).unwrap()
}

fn sorted(mut squares: Vec<Square>) -> Vec<Square> {
    squares.sort();
    squares
}

fn squares(list: &[&str]) -> Vec<Square> {
    sorted(list.iter().map(|s| sq(s)).collect())
}

// =============================================================================
// Movement
// =============================================================================

#[test]
fn test_horse_leg_blocks_jumps() {
    // Red horse on b9 with a red soldier on b8 in front of it.
    let b = board("3k5/9/9/9/9/9/9/9/1P7/1N2K4");
    let horse = piece_at(&b, "b9");
    assert_eq!(sorted(valid_moves(&horse, &b)), squares(&["d8"]));
}

#[test]
fn test_cannon_needs_exactly_one_screen() {
    // Black cannon on b2, a screen on b5, a red chariot on b8.
    let b = board("3k5/9/1c7/9/9/1P7/9/9/1R7/4K4");
    let cannon = piece_at(&b, "b2");
    let moves = valid_moves(&cannon, &b);
    assert!(moves.contains(&sq("b8")), "capture over one screen");
    assert!(moves.contains(&sq("b4")));
    assert!(!moves.contains(&sq("b5")), "cannot capture without a screen");
    assert!(!moves.contains(&sq("b6")), "cannot move past the screen");
    assert!(!moves.contains(&sq("b9")), "cannot jump two pieces");
}

#[test]
fn test_elephant_stays_home() {
    let b = board("3k5/9/9/9/9/2B6/9/9/9/4K4");
    let elephant = piece_at(&b, "c5");
    assert_eq!(sorted(valid_moves(&elephant, &b)), squares(&["a7", "e7"]));
}

#[test]
fn test_soldier_gains_sideways_moves_after_river() {
    let b = board("3k5/9/9/9/4P4/9/P8/9/9/4K4");
    assert_eq!(sorted(valid_moves(&piece_at(&b, "a6"), &b)), squares(&["a5"]));
    assert_eq!(
        sorted(valid_moves(&piece_at(&b, "e4"), &b)),
        squares(&["d4", "e3", "f4"])
    );
}

#[test]
fn test_general_and_advisor_confined_to_palace() {
    let b = board("3k5/9/9/9/9/9/9/3A5/9/5K3");
    assert_eq!(
        sorted(valid_moves(&piece_at(&b, "d7"), &b)),
        squares(&["e8"])
    );
    let general = piece_at(&b, "f9");
    assert!(
        valid_moves(&general, &b)
            .iter()
            .all(|to| to.in_palace(Side::Red))
    );
}

// =============================================================================
// Check and legality
// =============================================================================

#[test]
fn test_flying_generals() {
    let facing = board("4k4/9/9/9/9/9/9/9/9/4K4");
    assert!(is_checked(Side::Red, &facing));
    assert!(is_checked(Side::Black, &facing));

    let blocked = board("4k4/9/9/9/4p4/9/9/9/9/4K4");
    assert!(!is_checked(Side::Red, &blocked));
    assert!(!is_checked(Side::Black, &blocked));
}

#[test]
fn test_blocking_piece_cannot_leave_file() {
    // The black soldier is the only thing between the generals.
    let b = board("4k4/9/9/9/9/4p4/9/9/9/4K4");
    let soldier = piece_at(&b, "e5");
    assert_eq!(valid_moves(&soldier, &b), vec![sq("e6")]);
}

#[test]
fn test_checkmate_by_two_chariots() {
    let b = board("R2k5/R8/9/9/9/9/9/9/9/5K3");
    assert!(is_checked(Side::Black, &b));
    assert!(legal_moves(&b, Side::Black).is_empty());
    assert_eq!(winner(&b, Side::Black), Some(Side::Red));
    assert_eq!(winner(&b, Side::Red), None);
}

#[test]
fn test_captured_general_decides_game() {
    let b = board("9/9/9/9/9/9/9/9/9/4K4");
    assert_eq!(winner(&b, Side::Red), Some(Side::Red));
    assert_eq!(winner(&b, Side::Black), Some(Side::Red));
    assert!(!is_checked(Side::Black, &b));
}

#[test]
fn test_legal_moves_are_safe_pseudo_legal_moves() {
    let positions = [
        Board::initial(),
        board("r2akab2/4n4/2n1c2c1/p3p1p1p/2p6/6P2/P1P1P3P/1C2C1N2/9/RNBAKAB1R"),
        board("3k5/4a4/4b4/9/2R1c4/9/9/4C4/4A4/3K5"),
    ];
    for b in &positions {
        for side in [Side::Red, Side::Black] {
            for piece in b.pieces_of(side) {
                let pseudo = pseudo_legal_moves(b, &piece);
                for to in valid_moves(&piece, b) {
                    assert!(pseudo.contains(&to), "{piece:?} -> {to} not pseudo-legal");
                    let next = simulate_move(&piece, to, b);
                    assert!(!is_checked(side, &next), "{piece:?} -> {to} leaves check");
                }
            }
        }
    }
}

#[test]
fn test_simulate_move_does_not_mutate() {
    let b = Board::initial();
    let before = b.fingerprint();
    let cannon = piece_at(&b, "h7");
    let next = simulate_move(&cannon, sq("h0"), &b);
    assert_eq!(b.fingerprint(), before);
    assert_eq!(b.len(), 32);
    assert_eq!(next.len(), 31);
    assert_eq!(
        next.piece_at(sq("h0")).map(|p| p.kind),
        Some(PieceKind::Cannon)
    );
}

// =============================================================================
// Evaluation
// =============================================================================

#[test]
fn test_evaluation_is_antisymmetric() {
    let positions = [
        Board::initial(),
        board("4k4/9/9/9/9/9/9/9/9/4K4"),
        board("r2akab2/4n4/2n1c2c1/p3p1p1p/2p6/6P2/P1P1P3P/1C2C1N2/9/RNBAKAB1R"),
        board("3k5/4a4/4b4/9/2R1c4/9/9/4C4/4A4/3K5"),
    ];
    for b in &positions {
        assert_eq!(evaluate(b, Side::Red), -evaluate(b, Side::Black));
    }
}
