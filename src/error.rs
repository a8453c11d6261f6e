//! Errors raised at the session and notation boundary.
//!
//! The rule predicates in [`crate::movegen`] are total and never fail;
//! these errors only appear once a move is about to change a game.

use crate::board::{Color, Position};
use crate::movegen::Move;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The move fails the legality predicate
    #[error("illegal move: {mv}")]
    IllegalMove { mv: Move },

    #[error("no piece on {pos}")]
    EmptySquare { pos: Position },

    #[error("it is {expected}'s turn")]
    NotYourTurn { expected: Color },

    #[error("game is already over")]
    GameOver,

    /// A peer's move or resulting board disagrees with the local engine
    #[error("board desynchronized: {reason}")]
    Desync { reason: String },

    /// Bot result computed against a board that has since changed
    #[error("bot move was computed for an outdated board")]
    StaleBotMove,

    #[error("unknown game {id}")]
    UnknownGame { id: u64 },

    #[error("player {player} is not seated in any game")]
    UnknownPlayer { player: u64 },

    /// Seats that cannot be played in the requested mode
    #[error("invalid seating: {reason}")]
    InvalidSeats { reason: String },

    #[error("cannot parse '{input}'")]
    Notation { input: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
