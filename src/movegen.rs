//! Pseudo-legal move generation.
//!
//! Each piece kind has its own rule function. The results ignore whether the
//! mover's own general is left exposed; that is handled by
//! [`crate::rules::valid_moves`]. Every returned square is on the board and is
//! not occupied by a friendly piece.

use crate::board::{Board, Piece, PieceKind, Side, Square};
use crate::constants::{DIAGONAL, HORSE_JUMPS, ORTHOGONAL};

/// Squares `piece` could move to on `board`, ignoring self-check.
pub fn pseudo_legal_moves(board: &Board, piece: &Piece) -> Vec<Square> {
    let mut targets = Vec::with_capacity(17);
    match piece.kind {
        PieceKind::General => general_moves(board, piece, &mut targets),
        PieceKind::Advisor => advisor_moves(piece, &mut targets),
        PieceKind::Elephant => elephant_moves(board, piece, &mut targets),
        PieceKind::Horse => horse_moves(board, piece, &mut targets),
        PieceKind::Chariot => chariot_moves(board, piece, &mut targets),
        PieceKind::Cannon => cannon_moves(board, piece, &mut targets),
        PieceKind::Soldier => soldier_moves(piece, &mut targets),
    }
    targets.retain(|&to| !is_friendly(board, to, piece.side));
    targets
}

/// Whether `piece` attacks `target` (pseudo-legally).
pub fn attacks(board: &Board, piece: &Piece, target: Square) -> bool {
    pseudo_legal_moves(board, piece).contains(&target)
}

#[inline]
fn is_friendly(board: &Board, square: Square, side: Side) -> bool {
    board.piece_at(square).is_some_and(|p| p.side == side)
}

/// One orthogonal step inside the palace, plus the flying-general capture.
fn general_moves(board: &Board, piece: &Piece, out: &mut Vec<Square>) {
    let from = piece.square;
    for (df, dr) in ORTHOGONAL {
        if let Some(to) = from.offset(df, dr) {
            if to.in_palace(piece.side) {
                out.push(to);
            }
        }
    }

    if let Some(enemy) = board.general(piece.side.opponent()) {
        if enemy.file() == from.file() && file_is_clear(board, from, enemy) {
            out.push(enemy);
        }
    }
}

/// True when no piece stands strictly between two squares on the same file.
fn file_is_clear(board: &Board, a: Square, b: Square) -> bool {
    let (lo, hi) = if a.rank() < b.rank() {
        (a.rank(), b.rank())
    } else {
        (b.rank(), a.rank())
    };
    ((lo + 1)..hi)
        .filter_map(|rank| Square::new(a.file(), rank))
        .all(|sq| !board.is_occupied(sq))
}

fn advisor_moves(piece: &Piece, out: &mut Vec<Square>) {
    for (df, dr) in DIAGONAL {
        if let Some(to) = piece.square.offset(df, dr) {
            if to.in_palace(piece.side) {
                out.push(to);
            }
        }
    }
}

/// Two diagonal steps, blocked by a piece on the eye, never across the river.
fn elephant_moves(board: &Board, piece: &Piece, out: &mut Vec<Square>) {
    for (df, dr) in DIAGONAL {
        let Some(to) = piece.square.offset(2 * df, 2 * dr) else {
            continue;
        };
        if !to.on_home_side(piece.side) {
            continue;
        }
        let eye = piece.square.offset(df, dr);
        if eye.is_some_and(|eye| !board.is_occupied(eye)) {
            out.push(to);
        }
    }
}

fn horse_moves(board: &Board, piece: &Piece, out: &mut Vec<Square>) {
    for ((df, dr), (lf, lr)) in HORSE_JUMPS {
        let Some(to) = piece.square.offset(df, dr) else {
            continue;
        };
        let leg = piece.square.offset(lf, lr);
        if leg.is_some_and(|leg| !board.is_occupied(leg)) {
            out.push(to);
        }
    }
}

/// Slide until the first piece; the chariot may land on it when it is an enemy.
fn chariot_moves(board: &Board, piece: &Piece, out: &mut Vec<Square>) {
    for (df, dr) in ORTHOGONAL {
        let mut cur = piece.square;
        while let Some(next) = cur.offset(df, dr) {
            match board.piece_at(next) {
                None => out.push(next),
                Some(other) => {
                    if other.side != piece.side {
                        out.push(next);
                    }
                    break;
                }
            }
            cur = next;
        }
    }
}

/// Slide over empty squares; capture only the first piece beyond exactly one screen.
fn cannon_moves(board: &Board, piece: &Piece, out: &mut Vec<Square>) {
    for (df, dr) in ORTHOGONAL {
        let mut cur = piece.square;
        let mut screened = false;
        while let Some(next) = cur.offset(df, dr) {
            match (board.piece_at(next), screened) {
                (None, false) => out.push(next),
                (None, true) => {}
                (Some(_), false) => screened = true,
                (Some(other), true) => {
                    if other.side != piece.side {
                        out.push(next);
                    }
                    break;
                }
            }
            cur = next;
        }
    }
}

/// Forward only until the river is crossed, then sideways too.
fn soldier_moves(piece: &Piece, out: &mut Vec<Square>) {
    let from = piece.square;
    if let Some(to) = from.offset(0, piece.side.forward()) {
        out.push(to);
    }
    if !from.on_home_side(piece.side) {
        out.extend(from.offset(-1, 0));
        out.extend(from.offset(1, 0));
    }
}
