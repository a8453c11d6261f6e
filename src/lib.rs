pub mod board;
pub mod bot;
pub mod config;
pub mod error;
pub mod movegen;
pub mod protocol;
pub mod registry;
pub mod session;

pub use board::{piece_color, Board, Color, Piece, PieceKind, Position};
pub use bot::{make_bot_move, Bot, BotScheduler, BotTurn, PendingBotMove};
pub use error::{EngineError, EngineResult};
pub use movegen::{
    all_possible_moves, find_king, game_status, is_checkmate, is_king_in_check, is_path_clear,
    is_valid_board_move, is_valid_move, possible_moves_for_piece, GameStatus, Move,
};
pub use session::{GameMode, GameSession, Outcome};
