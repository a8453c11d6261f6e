use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};
use crate::movegen::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single forward step.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row from which pawns of this color may advance two squares.
    pub fn pawn_home_row(&self) -> i8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

impl FromStr for Color {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(EngineError::Notation { input: s.to_string() }),
        }
    }
}

const WHITE_GLYPHS: [(PieceKind, char); 6] = [
    (PieceKind::Pawn, '♙'),
    (PieceKind::Rook, '♖'),
    (PieceKind::Knight, '♘'),
    (PieceKind::Bishop, '♗'),
    (PieceKind::Queen, '♕'),
    (PieceKind::King, '♔'),
];

const BLACK_GLYPHS: [(PieceKind, char); 6] = [
    (PieceKind::Pawn, '♟'),
    (PieceKind::Rook, '♜'),
    (PieceKind::Knight, '♞'),
    (PieceKind::Bishop, '♝'),
    (PieceKind::Queen, '♛'),
    (PieceKind::King, '♚'),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn glyph(&self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::King) => '♔',
            (Color::Black, PieceKind::Pawn) => '♟',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::King) => '♚',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Piece> {
        if let Some(&(kind, _)) = WHITE_GLYPHS.iter().find(|&&(_, g)| g == glyph) {
            return Some(Piece::new(kind, Color::White));
        }
        if let Some(&(kind, _)) = BLACK_GLYPHS.iter().find(|&&(_, g)| g == glyph) {
            return Some(Piece::new(kind, Color::Black));
        }
        None
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Classifies a raw glyph as it arrives from the presentation layer.
pub fn piece_color(glyph: char) -> Option<Color> {
    Piece::from_glyph(glyph).map(|piece| piece.color)
}

/// A square coordinate. Values outside `0..8` are representable so that
/// callers can probe off-board destinations; the engine rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(&self) -> bool {
        (0..8).contains(&self.row) && (0..8).contains(&self.col)
    }

    /// All 64 squares, row-major.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..8).flat_map(|row| (0..8).map(move |col| Position::new(row, col)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_on_board() {
            return write!(f, "({},{})", self.row, self.col);
        }
        let file = (b'a' + self.col as u8) as char;
        let rank = (b'8' - self.row as u8) as char;
        write!(f, "{}{}", file, rank)
    }
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(EngineError::Notation { input: s.to_string() });
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(EngineError::Notation { input: s.to_string() });
        }
        Ok(Position::new((b'8' - rank) as i8, (file - b'a') as i8))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Self::empty();
        for (col, &kind) in back_rank.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(kind, Color::Black));
            board.squares[1][col] = Some(Piece::new(PieceKind::Pawn, Color::Black));
            board.squares[6][col] = Some(Piece::new(PieceKind::Pawn, Color::White));
            board.squares[7][col] = Some(Piece::new(kind, Color::White));
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// Builds a board from eight rows of glyphs, `.` or space marking an
    /// empty square. Row 0 comes first.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> EngineResult<Self> {
        if rows.len() != 8 {
            return Err(EngineError::Notation {
                input: format!("expected 8 rows, got {}", rows.len()),
            });
        }

        let mut board = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let cells: Vec<char> = line.chars().filter(|c| *c != '|').collect();
            if cells.len() != 8 {
                return Err(EngineError::Notation { input: line.to_string() });
            }
            for (col, &cell) in cells.iter().enumerate() {
                board.squares[row][col] = match cell {
                    '.' | ' ' => None,
                    glyph => Some(
                        Piece::from_glyph(glyph)
                            .ok_or_else(|| EngineError::Notation { input: glyph.to_string() })?,
                    ),
                };
            }
        }
        Ok(board)
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        if !pos.is_on_board() {
            return None;
        }
        self.squares[pos.row as usize][pos.col as usize]
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// Off-board writes are ignored.
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if pos.is_on_board() {
            self.squares[pos.row as usize][pos.col as usize] = piece;
        }
    }

    /// Moves whatever stands on `mv.from` to `mv.to` and returns the piece
    /// that was captured, if any. No legality check happens here.
    pub fn apply(&mut self, mv: &Move) -> Option<Piece> {
        let moving = self.get(mv.from);
        let captured = self.get(mv.to);
        self.set(mv.to, moving);
        self.set(mv.from, None);
        captured
    }

    /// Occupied squares holding a piece of `color`, row-major.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| match self.get(pos) {
            Some(piece) if piece.color == color => Some((pos, piece)),
            _ => None,
        })
    }

    /// Glyph rows, the inverse of [`Board::from_rows`].
    pub fn to_rows(&self) -> Vec<String> {
        self.squares
            .iter()
            .map(|row| {
                row.iter()
                    .map(|square| square.map(|piece| piece.glyph()).unwrap_or('.'))
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for (row, squares) in self.squares.iter().enumerate() {
            result.push((b'8' - row as u8) as char);
            result.push(' ');
            for (col, square) in squares.iter().enumerate() {
                result.push(square.map(|piece| piece.glyph()).unwrap_or('.'));
                if col < 7 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  a b c d e f g h\n");
        write!(f, "{}", result)
    }
}
