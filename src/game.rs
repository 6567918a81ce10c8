//! Game controller: turn order, move validation, history and game-over status.
//!
//! This is the thin layer a user interface sits on. It owns the real board and
//! hands immutable snapshots to the engine.

use std::fmt;

use log::info;
use thiserror::Error;

use crate::board::{Board, Move, Piece, Side, Square};
use crate::rules::{apply, valid_moves, winner};
use crate::search::{Difficulty, Engine};

/// Reasons a requested move is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,
    #[error("no piece on {0}")]
    NoPiece(Square),
    #[error("the piece on {square} is {side}, but it is {to_move}'s turn")]
    WrongSide {
        square: Square,
        side: Side,
        to_move: Side,
    },
    #[error("illegal move {from}{to}")]
    Illegal { from: Square, to: Square },
    #[error("no move to undo")]
    NothingToUndo,
}

/// State of the game for the side to move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    RedWin,
    BlackWin,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Playing => write!(f, "playing"),
            GameStatus::RedWin => write!(f, "red wins"),
            GameStatus::BlackWin => write!(f, "black wins"),
        }
    }
}

/// One played move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub captured: Option<Piece>,
    before: Board,
}

/// A game in progress: board, side to move, history and the engine.
pub struct Game {
    board: Board,
    to_move: Side,
    history: Vec<MoveRecord>,
    engine: Engine,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Engine::default())
    }
}

impl Game {
    /// A new game from the opening array with red to move.
    pub fn new(engine: Engine) -> Self {
        Self {
            board: Board::initial(),
            to_move: Side::Red,
            history: Vec::new(),
            engine,
        }
    }

    /// Restart from the opening array, keeping the engine and its settings.
    pub fn reset(&mut self) {
        self.set_position(Board::initial(), Side::Red);
    }

    /// Replace the board and side to move. History is discarded.
    pub fn set_position(&mut self, board: Board, to_move: Side) {
        self.board = board;
        self.to_move = to_move;
        self.history.clear();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn set_difficulty(&mut self, level: Difficulty) {
        self.engine.set_difficulty(level);
    }

    pub fn status(&self) -> GameStatus {
        match winner(&self.board, self.to_move) {
            None => GameStatus::Playing,
            Some(Side::Red) => GameStatus::RedWin,
            Some(Side::Black) => GameStatus::BlackWin,
        }
    }

    /// Legal destinations for the piece on `square`; empty if there is none.
    pub fn valid_moves(&self, square: Square) -> Vec<Square> {
        match self.board.piece_at(square) {
            Some(piece) => valid_moves(&piece, &self.board),
            None => Vec::new(),
        }
    }

    /// Play `from` -> `to` for the side to move.
    ///
    /// # Errors
    /// The game is left unchanged if the game is over, `from` is empty or holds
    /// an opposing piece, or `to` is not a legal destination.
    pub fn play(&mut self, from: Square, to: Square) -> Result<MoveRecord, MoveError> {
        if self.status() != GameStatus::Playing {
            return Err(MoveError::GameOver);
        }
        let piece = self.board.piece_at(from).ok_or(MoveError::NoPiece(from))?;
        if piece.side != self.to_move {
            return Err(MoveError::WrongSide {
                square: from,
                side: piece.side,
                to_move: self.to_move,
            });
        }
        if !valid_moves(&piece, &self.board).contains(&to) {
            return Err(MoveError::Illegal { from, to });
        }
        Ok(self.commit(Move::new(piece, to)))
    }

    /// Let the engine move for the side to move.
    ///
    /// Returns `Ok(None)` if the side to move has no legal move.
    pub fn engine_move(&mut self) -> Result<Option<MoveRecord>, MoveError> {
        if self.status() != GameStatus::Playing {
            return Err(MoveError::GameOver);
        }
        let Some(mv) = self.engine.get_best_move(&self.board, self.to_move) else {
            return Ok(None);
        };
        Ok(Some(self.commit(mv)))
    }

    /// Take back the last move.
    pub fn undo(&mut self) -> Result<MoveRecord, MoveError> {
        let record = self.history.pop().ok_or(MoveError::NothingToUndo)?;
        self.board = record.before;
        self.to_move = record.mv.piece.side;
        Ok(record)
    }

    fn commit(&mut self, mv: Move) -> MoveRecord {
        let record = MoveRecord {
            mv,
            captured: self.board.piece_at(mv.to),
            before: self.board,
        };
        self.board = apply(&self.board, &mv);
        self.to_move = self.to_move.opponent();
        self.history.push(record);
        if let Some(captured) = record.captured {
            info!("{mv}: {} captured {:?}", mv.piece.side, captured.kind);
        }
        record
    }
}
