//! Check detection, move simulation and the legal-move filter.

use log::warn;

use crate::board::{Board, Move, Piece, Side, Square};
use crate::movegen::{attacks, pseudo_legal_moves};

/// Whether `side`'s general is attacked by any opposing piece.
///
/// A board without a general for `side` reports `false`. Callers that need to
/// tell "safe" from "malformed" must check [`Board::general`] themselves.
pub fn is_checked(side: Side, board: &Board) -> bool {
    let Some(general) = board.general(side) else {
        warn!("no {side} general on board, treating as not in check");
        return false;
    };
    board
        .pieces_of(side.opponent())
        .any(|attacker| attacks(board, &attacker, general))
}

/// A copy of `board` with `piece` moved to `to`, capturing whatever stood there.
///
/// The input board is left untouched. If `piece` is not actually on the board
/// the copy is returned unchanged.
pub fn simulate_move(piece: &Piece, to: Square, board: &Board) -> Board {
    let mut next = *board;
    if board.piece_at(piece.square) == Some(*piece) {
        next.relocate(piece.square, to);
    }
    next
}

/// Apply a move to a copy of the board.
#[inline]
pub fn apply(board: &Board, mv: &Move) -> Board {
    simulate_move(&mv.piece, mv.to, board)
}

/// Destinations for `piece` that do not leave its own general in check.
///
/// Order is unspecified.
pub fn valid_moves(piece: &Piece, board: &Board) -> Vec<Square> {
    let mut moves = pseudo_legal_moves(board, piece);
    moves.retain(|&to| !is_checked(piece.side, &simulate_move(piece, to, board)));
    moves
}

/// Every legal move for `side`, grouped by piece in square order.
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    board
        .pieces_of(side)
        .flat_map(|piece| {
            valid_moves(&piece, board)
                .into_iter()
                .map(move |to| Move::new(piece, to))
        })
        .collect()
}

/// Whether `side` has at least one legal move. Stops at the first one found.
pub fn has_legal_move(board: &Board, side: Side) -> bool {
    board
        .pieces_of(side)
        .any(|piece| !valid_moves(&piece, board).is_empty())
}

/// Whether `mv` is legal for the piece it names on `board`.
pub fn is_legal(board: &Board, mv: &Move) -> bool {
    board.piece_at(mv.piece.square) == Some(mv.piece)
        && valid_moves(&mv.piece, board).contains(&mv.to)
}

/// The winner, if the game is over with `to_move` to play.
///
/// A side loses when its general has been captured or when it has no legal
/// move left.
pub fn winner(board: &Board, to_move: Side) -> Option<Side> {
    if board.general(Side::Red).is_none() {
        return Some(Side::Black);
    }
    if board.general(Side::Black).is_none() {
        return Some(Side::Red);
    }
    if !has_legal_move(board, to_move) {
        return Some(to_move.opponent());
    }
    None
}
