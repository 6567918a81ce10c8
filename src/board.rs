//! Board state: squares, pieces, moves and the board itself.
//!
//! The board is a fixed-size array of 90 cells, so a `Board` is a plain `Copy`
//! value. Simulating a move copies the array and never touches the original,
//! which keeps sibling branches of a search independent of each other.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{
    BLACK_PALACE_RANKS, BLACK_RIVER_BANK, FILE_CHARS, FILES, INITIAL_BOARD, MOBILITY_WEIGHTS,
    PALACE_FILES, PIECE_VALUES, RANKS, RED_PALACE_RANKS, RED_RIVER_BANK, SQUARES,
};

/// Errors raised while building a board or parsing notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid square `{0}`")]
    InvalidSquare(String),
    #[error("square {0} is already occupied")]
    Occupied(Square),
    #[error("board text must have 10 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} of board text spans {files} files instead of 9")]
    RankWidth { rank: usize, files: usize },
    #[error("unknown piece letter `{0}`")]
    UnknownPiece(char),
}

/// Error returned when a side name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown side `{0}` (expected red or black)")]
pub struct ParseSideError(String);

/// One of the two players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Red,
    Black,
}

impl Side {
    /// The other side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Rank step that moves this side's soldiers forward.
    #[inline]
    pub fn forward(self) -> i8 {
        match self {
            Side::Red => -1,
            Side::Black => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => f.pad("red"),
            Side::Black => f.pad("black"),
        }
    }
}

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "r" | "w" => Ok(Side::Red),
            "black" | "b" => Ok(Side::Black),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

/// The seven piece kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    General,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Soldier,
}

impl PieceKind {
    /// Base material value.
    #[inline]
    pub fn value(self) -> i32 {
        PIECE_VALUES[self as usize]
    }

    /// Fixed mobility weight used by the evaluator instead of counting moves.
    #[inline]
    pub fn mobility_weight(self) -> i32 {
        MOBILITY_WEIGHTS[self as usize]
    }

    /// Board-text letter: uppercase for red, lowercase for black.
    pub fn to_char(self, side: Side) -> char {
        let c = match self {
            PieceKind::General => 'k',
            PieceKind::Advisor => 'a',
            PieceKind::Elephant => 'b',
            PieceKind::Horse => 'n',
            PieceKind::Chariot => 'r',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
        };
        match side {
            Side::Red => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    /// Parse a board-text letter. `E` and `H` are accepted for elephant and horse.
    pub fn from_char(c: char) -> Option<(PieceKind, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::Red
        } else {
            Side::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'k' => PieceKind::General,
            'a' => PieceKind::Advisor,
            'b' | 'e' => PieceKind::Elephant,
            'n' | 'h' => PieceKind::Horse,
            'r' => PieceKind::Chariot,
            'c' => PieceKind::Cannon,
            'p' => PieceKind::Soldier,
            _ => return None,
        };
        Some((kind, side))
    }
}

/// A square on the 9x10 board. Always within bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: i8,
    rank: i8,
}

impl Square {
    /// Create a square, or `None` if the coordinates are off the board.
    pub fn new(file: i8, rank: i8) -> Option<Square> {
        if (0..FILES as i8).contains(&file) && (0..RANKS as i8).contains(&rank) {
            Some(Square { file, rank })
        } else {
            None
        }
    }

    #[inline]
    pub fn file(self) -> i8 {
        self.file
    }

    #[inline]
    pub fn rank(self) -> i8 {
        self.rank
    }

    /// The square `(df, dr)` away, if it is on the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        Square::new(self.file + df, self.rank + dr)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.rank as usize * FILES + self.file as usize
    }

    #[inline]
    pub(crate) fn from_index(idx: usize) -> Square {
        Square {
            file: (idx % FILES) as i8,
            rank: (idx / FILES) as i8,
        }
    }

    /// Whether the square lies inside `side`'s palace.
    pub fn in_palace(self, side: Side) -> bool {
        let ranks = match side {
            Side::Red => RED_PALACE_RANKS,
            Side::Black => BLACK_PALACE_RANKS,
        };
        PALACE_FILES.contains(&self.file) && ranks.contains(&self.rank)
    }

    /// Whether the square is on `side`'s half of the river.
    pub fn on_home_side(self, side: Side) -> bool {
        match side {
            Side::Red => self.rank >= RED_RIVER_BANK,
            Side::Black => self.rank <= BLACK_RIVER_BANK,
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", FILE_CHARS[self.file as usize], self.rank)
    }
}

impl FromStr for Square {
    type Err = BoardError;

    /// Parse a square such as `e9` (file letter, then rank digit).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BoardError::InvalidSquare(s.to_string());
        let mut chars = s.chars();
        let (Some(f), Some(r), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        let file = FILE_CHARS
            .iter()
            .position(|&c| c == f.to_ascii_lowercase())
            .ok_or_else(invalid)?;
        let rank = r.to_digit(10).ok_or_else(invalid)?;
        Square::new(file as i8, rank as i8).ok_or_else(invalid)
    }
}

/// Parse move text such as `h7e7` into its two squares.
pub fn parse_move_text(s: &str) -> Result<(Square, Square), BoardError> {
    let s = s.trim();
    if s.len() != 4 || !s.is_ascii() {
        return Err(BoardError::InvalidSquare(s.to_string()));
    }
    Ok((s[..2].parse()?, s[2..].parse()?))
}

/// A piece: kind and side, plus the square it currently stands on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    pub square: Square,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side, square: Square) -> Self {
        Self { kind, side, square }
    }
}

/// A move: the piece being moved and its destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub piece: Piece,
    pub to: Square,
}

impl Move {
    pub fn new(piece: Piece, to: Square) -> Self {
        Self { piece, to }
    }

    #[inline]
    pub fn from(&self) -> Square {
        self.piece.square
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to)
    }
}

/// Canonical encoding of a board's contents, used as a cache key.
///
/// One byte per square in square order, so two boards holding the same pieces
/// on the same squares always produce the same fingerprint.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; SQUARES]);

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = self
            .0
            .iter()
            .map(|&b| if b == 0 { '.' } else { (b'@' + b) as char })
            .collect();
        write!(f, "Fingerprint({text})")
    }
}

/// The set of pieces on the board.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<(PieceKind, Side)>; SQUARES],
    generals: [Option<Square>; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Self {
            cells: [None; SQUARES],
            generals: [None; 2],
        }
    }

    /// The standard opening array.
    pub fn initial() -> Self {
        Self::from_text(INITIAL_BOARD).expect("initial board text is well formed")
    }

    /// Build a board from a list of pieces.
    ///
    /// # Errors
    /// Returns `BoardError::Occupied` if two pieces share a square.
    pub fn from_pieces<I>(pieces: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = Piece>,
    {
        let mut board = Board::empty();
        for piece in pieces {
            board.place(piece)?;
        }
        Ok(board)
    }

    /// Parse board text: ten `/`-separated ranks starting at rank 0, digits
    /// for runs of empty squares, uppercase letters for red pieces.
    pub fn from_text(text: &str) -> Result<Self, BoardError> {
        let rows: Vec<&str> = text.trim().split('/').collect();
        if rows.len() != RANKS {
            return Err(BoardError::RankCount(rows.len()));
        }

        let mut board = Board::empty();
        for (rank, row) in rows.iter().enumerate() {
            let mut file = 0usize;
            for c in row.chars() {
                if let Some(run) = c.to_digit(10) {
                    file += run as usize;
                    continue;
                }
                let (kind, side) = PieceKind::from_char(c).ok_or(BoardError::UnknownPiece(c))?;
                if file < FILES {
                    let square = Square::from_index(rank * FILES + file);
                    board.place(Piece::new(kind, side, square))?;
                }
                file += 1;
            }
            if file != FILES {
                return Err(BoardError::RankWidth { rank, files: file });
            }
        }
        Ok(board)
    }

    /// Inverse of [`Board::from_text`].
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(SQUARES + RANKS);
        for rank in 0..RANKS {
            if rank > 0 {
                out.push('/');
            }
            let mut run = 0;
            for file in 0..FILES {
                match self.cells[rank * FILES + file] {
                    None => run += 1,
                    Some((kind, side)) => {
                        if run > 0 {
                            out.push_str(&run.to_string());
                            run = 0;
                        }
                        out.push(kind.to_char(side));
                    }
                }
            }
            if run > 0 {
                out.push_str(&run.to_string());
            }
        }
        out
    }

    /// The piece on `square`, if any.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[square.index()].map(|(kind, side)| Piece::new(kind, side, square))
    }

    #[inline]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.cells[square.index()].is_some()
    }

    /// Put a piece on its square.
    ///
    /// # Errors
    /// Returns `BoardError::Occupied` if the square already holds a piece.
    pub fn place(&mut self, piece: Piece) -> Result<(), BoardError> {
        let cell = &mut self.cells[piece.square.index()];
        if cell.is_some() {
            return Err(BoardError::Occupied(piece.square));
        }
        *cell = Some((piece.kind, piece.side));
        if piece.kind == PieceKind::General {
            self.generals[piece.side.index()] = Some(piece.square);
        }
        Ok(())
    }

    /// Take the piece off `square` and return it.
    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        let piece = self.piece_at(square)?;
        self.cells[square.index()] = None;
        if piece.kind == PieceKind::General && self.generals[piece.side.index()] == Some(square) {
            // A malformed board may hold a second general for the same side.
            let next = self
                .pieces_of(piece.side)
                .find(|p| p.kind == PieceKind::General)
                .map(|p| p.square);
            self.generals[piece.side.index()] = next;
        }
        Some(piece)
    }

    /// Move whatever stands on `from` to `to`, capturing anything on `to`.
    /// Returns the captured piece. Moving onto its own square is a no-op.
    pub(crate) fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        if from == to {
            return None;
        }
        let captured = self.remove(to);
        if let Some(mut piece) = self.remove(from) {
            piece.square = to;
            self.cells[to.index()] = Some((piece.kind, piece.side));
            if piece.kind == PieceKind::General {
                self.generals[piece.side.index()] = Some(to);
            }
        }
        captured
    }

    /// All pieces in square order.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.cells.iter().enumerate().filter_map(|(idx, cell)| {
            cell.map(|(kind, side)| Piece::new(kind, side, Square::from_index(idx)))
        })
    }

    /// All pieces belonging to `side`.
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |p| p.side == side)
    }

    /// Number of pieces on the board.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Square of `side`'s general, or `None` if it has been captured.
    #[inline]
    pub fn general(&self, side: Side) -> Option<Square> {
        self.generals[side.index()]
    }

    /// True when either general is missing.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.generals.iter().any(Option::is_none)
    }

    /// Canonical cache key for the board contents.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut bytes = [0u8; SQUARES];
        for (b, cell) in bytes.iter_mut().zip(self.cells.iter()) {
            if let Some((kind, side)) = cell {
                *b = 1 + (*kind as u8) * 2 + *side as u8;
            }
        }
        Fingerprint(bytes)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_text())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for c in FILE_CHARS {
            write!(f, " {c}")?;
        }
        writeln!(f)?;
        for rank in 0..RANKS {
            write!(f, "{rank:>2}")?;
            for file in 0..FILES {
                let ch = match self.cells[rank * FILES + file] {
                    Some((kind, side)) => kind.to_char(side),
                    None => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(0, 0).is_some());
        assert!(Square::new(8, 9).is_some());
        assert!(Square::new(9, 0).is_none());
        assert!(Square::new(0, 10).is_none());
        assert!(Square::new(-1, 3).is_none());
    }

    #[test]
    fn test_parse_square() {
        assert_eq!(sq("e9"), Square::new(4, 9).unwrap());
        assert_eq!(sq("A0"), Square::new(0, 0).unwrap());
        assert!("j0".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!("e10".parse::<Square>().is_err());
        assert_eq!(sq("h7").to_string(), "h7");
    }

    #[test]
    fn test_parse_move_text() {
        assert_eq!(parse_move_text("h7e7"), Ok((sq("h7"), sq("e7"))));
        assert!(parse_move_text("h7e").is_err());
        assert!(parse_move_text("z7e7").is_err());
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();
        assert_eq!(board.len(), 32);
        assert_eq!(board.pieces_of(Side::Red).count(), 16);
        assert_eq!(board.general(Side::Red), Some(sq("e9")));
        assert_eq!(board.general(Side::Black), Some(sq("e0")));
        let cannon = board.piece_at(sq("b7")).unwrap();
        assert_eq!(cannon.kind, PieceKind::Cannon);
        assert_eq!(cannon.side, Side::Red);
        assert_eq!(board.to_text(), INITIAL_BOARD);
    }

    #[test]
    fn test_from_text_errors() {
        assert_eq!(Board::from_text("9/9"), Err(BoardError::RankCount(2)));
        assert!(matches!(
            Board::from_text("rnbakabn/9/9/9/9/9/9/9/9/9"),
            Err(BoardError::RankWidth { rank: 0, files: 8 })
        ));
        assert_eq!(
            Board::from_text("x8/9/9/9/9/9/9/9/9/9"),
            Err(BoardError::UnknownPiece('x'))
        );
    }

    #[test]
    fn test_place_rejects_overlap() {
        let a = Piece::new(PieceKind::Chariot, Side::Red, sq("a9"));
        let b = Piece::new(PieceKind::Horse, Side::Black, sq("a9"));
        assert_eq!(Board::from_pieces([a, b]), Err(BoardError::Occupied(sq("a9"))));
    }

    #[test]
    fn test_relocate_tracks_general_and_capture() {
        let mut board = Board::from_text("4k4/9/9/9/9/9/9/9/4R4/4K4").unwrap();
        let captured = board.relocate(sq("e8"), sq("e0"));
        assert_eq!(captured.map(|p| p.kind), Some(PieceKind::General));
        assert_eq!(board.general(Side::Black), None);
        assert!(board.is_terminal());
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_relocate_onto_own_square_keeps_piece() {
        let mut board = Board::initial();
        assert_eq!(board.relocate(sq("e9"), sq("e9")), None);
        assert_eq!(board, Board::initial());
        assert_eq!(board.general(Side::Red), Some(sq("e9")));
    }

    #[test]
    fn test_remove_general_clears_its_square() {
        let mut board = Board::initial();
        let general = board.remove(sq("e0")).unwrap();
        assert_eq!(general.kind, PieceKind::General);
        assert_eq!(board.general(Side::Black), None);
        assert_eq!(board.general(Side::Red), Some(sq("e9")));
        assert_eq!(board.len(), 31);
    }

    #[test]
    fn test_fingerprint_ignores_construction_order() {
        let pieces = [
            Piece::new(PieceKind::General, Side::Red, sq("e9")),
            Piece::new(PieceKind::General, Side::Black, sq("d0")),
            Piece::new(PieceKind::Cannon, Side::Red, sq("b7")),
        ];
        let forward = Board::from_pieces(pieces).unwrap();
        let backward = Board::from_pieces(pieces.into_iter().rev()).unwrap();
        assert_eq!(forward.fingerprint(), backward.fingerprint());

        let mut moved = forward;
        moved.relocate(sq("b7"), sq("b6"));
        assert_ne!(forward.fingerprint(), moved.fingerprint());
    }

    #[test]
    fn test_display_has_labels() {
        let text = Board::initial().to_string();
        assert!(text.starts_with("   a b c d e f g h i"));
        assert!(text.contains(" 9 R N B A K A B N R"));
    }
}
