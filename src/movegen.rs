use std::fmt;

use crate::board::{Board, Color, Piece, PieceKind, Position};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub piece: Piece,
}

impl Move {
    pub fn new(from: Position, to: Position, piece: Piece) -> Self {
        Self { from, to, piece }
    }

    /// Whether the destination is currently occupied. Pseudo-legal moves
    /// never land on a friendly piece, so this means an enemy capture.
    pub fn is_capture(&self, board: &Board) -> bool {
        !board.is_empty(self.to)
    }

    /// Parses `e2e4`, reading the piece from `board`, or `♙e2e4`, taking
    /// the piece from the glyph.
    pub fn parse(board: &Board, input: &str) -> EngineResult<Move> {
        let input = input.trim();
        let mut chars = input.chars();
        let first = chars.next().ok_or_else(|| EngineError::Notation {
            input: input.to_string(),
        })?;

        let (glyph_piece, squares) = match Piece::from_glyph(first) {
            Some(piece) => (Some(piece), chars.as_str()),
            None => (None, input),
        };

        if squares.len() != 4 || !squares.is_ascii() {
            return Err(EngineError::Notation { input: input.to_string() });
        }
        let from: Position = squares[0..2].parse()?;
        let to: Position = squares[2..4].parse()?;

        let piece = match glyph_piece {
            Some(piece) => piece,
            None => board.get(from).ok_or(EngineError::EmptySquare { pos: from })?,
        };
        Ok(Move::new(from, to, piece))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}", self.piece.glyph(), self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing { in_check: bool },
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::Ongoing { .. })
    }
}

/// Pseudo-legal move test. `piece` is trusted to be what stands on
/// `from`; only the destination and the squares in between are read from
/// the board. Moves that leave the mover's own king in check pass.
pub fn is_valid_move(board: &Board, from: Position, to: Position, piece: Piece) -> bool {
    if !from.is_on_board() || !to.is_on_board() || from == to {
        return false;
    }

    // No capturing your own pieces
    let target = board.get(to);
    if let Some(target) = target {
        if target.color == piece.color {
            return false;
        }
    }

    let row_diff = to.row - from.row;
    let col_diff = to.col - from.col;
    let abs_row = row_diff.abs();
    let abs_col = col_diff.abs();

    match piece.kind {
        PieceKind::Pawn => {
            let direction = piece.color.forward();

            // Single push
            if col_diff == 0 && row_diff == direction {
                target.is_none()
            }
            // Double push from the home row
            else if col_diff == 0
                && row_diff == 2 * direction
                && from.row == piece.color.pawn_home_row()
            {
                let intermediate = Position::new(from.row + direction, from.col);
                target.is_none() && board.is_empty(intermediate)
            }
            // Diagonal capture
            else if abs_col == 1 && row_diff == direction {
                target.map_or(false, |t| t.color != piece.color)
            } else {
                false
            }
        }
        PieceKind::Rook => {
            if row_diff != 0 && col_diff != 0 {
                return false;
            }
            is_path_clear(board, from, to)
        }
        PieceKind::Bishop => {
            if abs_row != abs_col {
                return false;
            }
            is_path_clear(board, from, to)
        }
        PieceKind::Knight => (abs_row == 2 && abs_col == 1) || (abs_row == 1 && abs_col == 2),
        PieceKind::Queen => {
            if row_diff != 0 && col_diff != 0 && abs_row != abs_col {
                return false;
            }
            is_path_clear(board, from, to)
        }
        PieceKind::King => abs_row <= 1 && abs_col <= 1,
    }
}

/// Same as [`is_valid_move`] but reads the moving piece from the board.
pub fn is_valid_board_move(board: &Board, from: Position, to: Position) -> bool {
    match board.get(from) {
        Some(piece) => is_valid_move(board, from, to, piece),
        None => false,
    }
}

/// Walks the line between `from` and `to`, both excluded. Returns false
/// for anything that is not a straight or diagonal line.
pub fn is_path_clear(board: &Board, from: Position, to: Position) -> bool {
    let row_diff = to.row - from.row;
    let col_diff = to.col - from.col;
    if row_diff != 0 && col_diff != 0 && row_diff.abs() != col_diff.abs() {
        return false;
    }

    let row_step = row_diff.signum();
    let col_step = col_diff.signum();
    let mut row = from.row + row_step;
    let mut col = from.col + col_step;
    while row != to.row || col != to.col {
        if !board.is_empty(Position::new(row, col)) {
            return false;
        }
        row += row_step;
        col += col_step;
    }
    true
}

/// Every destination `piece` standing on `pos` could reach, row-major.
pub fn possible_moves_for_piece(board: &Board, pos: Position, piece: Piece) -> Vec<Position> {
    Position::all()
        .filter(|&to| is_valid_move(board, pos, to, piece))
        .collect()
}

pub fn all_possible_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, piece) in board.pieces(color) {
        for to in possible_moves_for_piece(board, from, piece) {
            moves.push(Move::new(from, to, piece));
        }
    }
    moves
}

pub fn find_king(board: &Board, color: Color) -> Option<Position> {
    board
        .pieces(color)
        .find(|(_, piece)| piece.kind == PieceKind::King)
        .map(|(pos, _)| pos)
}

/// True when some enemy piece has a pseudo-legal move onto `king_pos`.
pub fn is_king_in_check(board: &Board, king_pos: Position, king_color: Color) -> bool {
    board
        .pieces(king_color.opposite())
        .any(|(from, piece)| is_valid_move(board, from, king_pos, piece))
}

// Does any pseudo-legal move of `color` leave its king out of check?
fn has_safe_move(board: &Board, color: Color, king_pos: Position) -> bool {
    for mv in all_possible_moves(board, color) {
        let mut board_copy = board.clone();
        board_copy.apply(&mv);

        let king_after = if mv.piece.kind == PieceKind::King {
            mv.to
        } else {
            king_pos
        };
        if !is_king_in_check(&board_copy, king_after, color) {
            return true;
        }
    }
    false
}

/// A missing king counts as mate. A side that is not in check is never
/// mated here, even with no moves left; see [`game_status`].
pub fn is_checkmate(board: &Board, color: Color) -> bool {
    let king_pos = match find_king(board, color) {
        Some(pos) => pos,
        None => return true,
    };

    if !is_king_in_check(board, king_pos, color) {
        return false;
    }

    !has_safe_move(board, color, king_pos)
}

/// Three-way verdict for the side to move.
pub fn game_status(board: &Board, color: Color) -> GameStatus {
    let king_pos = match find_king(board, color) {
        Some(pos) => pos,
        None => return GameStatus::Checkmate,
    };

    let in_check = is_king_in_check(board, king_pos, color);
    match (in_check, has_safe_move(board, color, king_pos)) {
        (true, false) => GameStatus::Checkmate,
        (false, false) => GameStatus::Stalemate,
        (in_check, true) => GameStatus::Ongoing { in_check },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(kind: PieceKind) -> Piece {
        Piece::new(kind, Color::White)
    }

    fn black(kind: PieceKind) -> Piece {
        Piece::new(kind, Color::Black)
    }

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    const ALL_KINDS: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
    ];

    #[test]
    fn test_never_captures_own_color() {
        let from = Position::new(3, 3);
        for color in [Color::White, Color::Black] {
            for kind in ALL_KINDS {
                let piece = Piece::new(kind, color);
                for to in Position::all() {
                    if to == from {
                        continue;
                    }
                    let mut board = Board::empty();
                    board.set(from, Some(piece));
                    board.set(to, Some(Piece::new(PieceKind::Pawn, color)));
                    assert!(
                        !is_valid_move(&board, from, to, piece),
                        "{:?} captured its own piece on {}",
                        piece,
                        to
                    );
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_and_null_moves() {
        let board = Board::new();
        let queen = white(PieceKind::Queen);
        let from = Position::new(4, 4);
        assert!(!is_valid_move(&board, from, Position::new(8, 4), queen));
        assert!(!is_valid_move(&board, from, Position::new(4, -1), queen));
        assert!(!is_valid_move(&board, from, from, white(PieceKind::King)));

        // Off-board origins are rejected before any coordinate arithmetic
        let far = Position::new(i8::MIN, i8::MIN);
        assert!(!is_valid_move(&board, far, from, queen));
        assert!(!is_valid_move(&board, far, Position::new(7, 7), white(PieceKind::Knight)));
        assert!(!is_valid_move(&board, Position::new(-1, 4), Position::new(0, 4), queen));
    }

    #[test]
    fn test_pawn_moves() {
        let mut board = Board::new();
        let pawn = white(PieceKind::Pawn);

        assert!(is_valid_move(&board, pos("e2"), pos("e3"), pawn));
        assert!(is_valid_move(&board, pos("e2"), pos("e4"), pawn));
        assert!(!is_valid_move(&board, pos("e2"), pos("e5"), pawn));
        assert!(!is_valid_move(&board, pos("e2"), pos("e1"), pawn));
        // Diagonal onto an empty square
        assert!(!is_valid_move(&board, pos("e2"), pos("d3"), pawn));

        // Blocked on the intermediate square
        board.set(pos("e3"), Some(black(PieceKind::Knight)));
        assert!(!is_valid_move(&board, pos("e2"), pos("e4"), pawn));
        assert!(!is_valid_move(&board, pos("e2"), pos("e3"), pawn));

        // Blocked on the destination square
        board.set(pos("e3"), None);
        board.set(pos("e4"), Some(black(PieceKind::Knight)));
        assert!(!is_valid_move(&board, pos("e2"), pos("e4"), pawn));
        assert!(is_valid_move(&board, pos("e2"), pos("e3"), pawn));

        // Captures go diagonally forward only
        board.set(pos("d3"), Some(black(PieceKind::Bishop)));
        assert!(is_valid_move(&board, pos("e2"), pos("d3"), pawn));
        board.set(pos("d3"), Some(white(PieceKind::Bishop)));
        assert!(!is_valid_move(&board, pos("e2"), pos("d3"), pawn));
    }

    #[test]
    fn test_pawn_double_push_only_from_home_row() {
        let mut board = Board::empty();
        let pawn = white(PieceKind::Pawn);
        board.set(pos("e3"), Some(pawn));
        assert!(!is_valid_move(&board, pos("e3"), pos("e5"), pawn));
        assert!(is_valid_move(&board, pos("e3"), pos("e4"), pawn));

        let pawn = black(PieceKind::Pawn);
        board.set(pos("d7"), Some(pawn));
        assert!(is_valid_move(&board, pos("d7"), pos("d5"), pawn));
        assert!(is_valid_move(&board, pos("d7"), pos("d6"), pawn));
        assert!(!is_valid_move(&board, pos("d7"), pos("d8"), pawn));
    }

    #[test]
    fn test_rook_path_obstruction() {
        let mut board = Board::empty();
        let rook = white(PieceKind::Rook);
        let from = Position::new(7, 0);
        let to = Position::new(7, 7);
        board.set(from, Some(rook));
        assert!(is_valid_move(&board, from, to, rook));

        for col in 1..7 {
            let blocker = Position::new(7, col);
            board.set(blocker, Some(black(PieceKind::Pawn)));
            assert!(!is_valid_move(&board, from, to, rook));
            board.set(blocker, None);
        }
        assert!(is_valid_move(&board, from, to, rook));
        assert!(!is_valid_move(&board, from, Position::new(6, 1), rook));
    }

    #[test]
    fn test_bishop_and_queen_geometry() {
        let mut board = Board::empty();
        let bishop = black(PieceKind::Bishop);
        board.set(pos("c8"), Some(bishop));
        assert!(is_valid_move(&board, pos("c8"), pos("h3"), bishop));
        assert!(!is_valid_move(&board, pos("c8"), pos("c3"), bishop));

        board.set(pos("e6"), Some(white(PieceKind::Pawn)));
        assert!(is_valid_move(&board, pos("c8"), pos("e6"), bishop));
        assert!(!is_valid_move(&board, pos("c8"), pos("f5"), bishop));

        let queen = white(PieceKind::Queen);
        let mut board = Board::empty();
        board.set(pos("d4"), Some(queen));
        assert!(is_valid_move(&board, pos("d4"), pos("d8"), queen));
        assert!(is_valid_move(&board, pos("d4"), pos("a7"), queen));
        assert!(is_valid_move(&board, pos("d4"), pos("h4"), queen));
        assert!(!is_valid_move(&board, pos("d4"), pos("e6"), queen));
    }

    #[test]
    fn test_knight_jumps() {
        let board = Board::new();
        let knight = white(PieceKind::Knight);
        let from = Position::new(7, 1);
        assert!(is_valid_move(&board, from, Position::new(5, 0), knight));
        assert!(is_valid_move(&board, from, Position::new(5, 2), knight));
        assert!(!is_valid_move(&board, from, Position::new(6, 3), knight));
        assert!(!is_valid_move(&board, from, Position::new(4, 1), knight));
    }

    #[test]
    fn test_king_single_step() {
        let mut board = Board::empty();
        let king = black(PieceKind::King);
        board.set(pos("e5"), Some(king));
        assert_eq!(possible_moves_for_piece(&board, pos("e5"), king).len(), 8);
        assert!(!is_valid_move(&board, pos("e5"), pos("g5"), king));
        assert!(!is_valid_move(&board, pos("e5"), pos("e7"), king));
    }

    #[test]
    fn test_path_clear_excludes_endpoints() {
        let mut board = Board::empty();
        board.set(pos("a1"), Some(white(PieceKind::Rook)));
        board.set(pos("a8"), Some(black(PieceKind::Rook)));
        assert!(is_path_clear(&board, pos("a1"), pos("a8")));
        board.set(pos("a4"), Some(black(PieceKind::Pawn)));
        assert!(!is_path_clear(&board, pos("a1"), pos("a8")));
        assert!(!is_path_clear(&board, pos("a1"), pos("b3")));
    }

    #[test]
    fn test_trusts_caller_piece() {
        let board = Board::new();
        // A queen claimed on an empty square still moves like a queen
        let queen = white(PieceKind::Queen);
        assert!(is_valid_move(&board, pos("d4"), pos("h4"), queen));
        assert!(!is_valid_board_move(&board, pos("d4"), pos("h4")));
        assert!(is_valid_board_move(&board, pos("g1"), pos("f3")));
    }

    #[test]
    fn test_initial_move_count() {
        let board = Board::new();
        assert_eq!(all_possible_moves(&board, Color::White).len(), 20);
        assert_eq!(all_possible_moves(&board, Color::Black).len(), 20);
    }

    #[test]
    fn test_move_notation() {
        let board = Board::new();
        let mv = Move::parse(&board, "e2e4").unwrap();
        assert_eq!(mv, Move::new(pos("e2"), pos("e4"), white(PieceKind::Pawn)));
        assert_eq!(mv.to_string(), "♙e2e4");
        assert_eq!(Move::parse(&board, "♙e2e4").unwrap(), mv);
        assert_eq!(
            Move::parse(&board, "e4e5"),
            Err(EngineError::EmptySquare { pos: pos("e4") })
        );
        assert!(Move::parse(&board, "e2").is_err());
        assert!(Move::parse(&board, "").is_err());
    }

    #[test]
    fn test_stalemate_is_not_checkmate() {
        // White king in the corner, black queen covering every flight square
        let mut board = Board::empty();
        board.set(pos("a1"), Some(white(PieceKind::King)));
        board.set(pos("b3"), Some(black(PieceKind::Queen)));
        board.set(pos("c2"), Some(black(PieceKind::King)));

        assert!(!is_checkmate(&board, Color::White));
        assert_eq!(game_status(&board, Color::White), GameStatus::Stalemate);
        assert_eq!(
            game_status(&board, Color::Black),
            GameStatus::Ongoing { in_check: false }
        );
    }

    #[test]
    fn test_missing_king_is_terminal() {
        let mut board = Board::new();
        board.set(pos("e8"), None);
        assert!(is_checkmate(&board, Color::Black));
        assert_eq!(game_status(&board, Color::Black), GameStatus::Checkmate);
    }

    #[test]
    fn test_check_that_can_be_escaped() {
        let mut board = Board::empty();
        board.set(pos("e1"), Some(white(PieceKind::King)));
        board.set(pos("e8"), Some(black(PieceKind::Rook)));
        board.set(pos("a8"), Some(black(PieceKind::King)));
        assert!(is_king_in_check(&board, pos("e1"), Color::White));
        assert!(!is_checkmate(&board, Color::White));
        assert_eq!(
            game_status(&board, Color::White),
            GameStatus::Ongoing { in_check: true }
        );
    }
}
