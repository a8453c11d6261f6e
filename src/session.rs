//! Authoritative game state.
//!
//! A [`GameSession`] owns the canonical board and turn for one game. Every
//! move, whether typed by the local player, produced by the bot or sent by
//! a remote peer, goes through the same legality predicate before the
//! board changes.

use tracing::{debug, info, warn};

use crate::board::{Board, Color, Position};
use crate::bot::{BotScheduler, BotTurn, PendingBotMove};
use crate::error::{EngineError, EngineResult};
use crate::movegen::{game_status, is_valid_move, GameStatus, Move};

pub type GameId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// One human against the bot, which plays the other color
    Bot { human: Color },
    /// Two humans, possibly on different machines
    Friend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Color),
    Draw,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    id: GameId,
    mode: GameMode,
    board: Board,
    turn: Color,
    status: GameStatus,
    generation: u64,
    history: Vec<Move>,
}

impl GameSession {
    pub fn new(id: GameId, mode: GameMode) -> Self {
        Self::from_snapshot(id, mode, Board::new(), Color::White)
    }

    /// Resumes a game from a board snapshot and the side to move.
    pub fn from_snapshot(id: GameId, mode: GameMode, board: Board, turn: Color) -> Self {
        let status = game_status(&board, turn);
        Self {
            id,
            mode,
            board,
            turn,
            status,
            generation: 0,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Bumped on every accepted move.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Move list in the notation handed to the persistence layer.
    pub fn notation(&self) -> Vec<String> {
        self.history.iter().map(|mv| mv.to_string()).collect()
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            GameStatus::Checkmate => Some(Outcome::Winner(self.turn.opposite())),
            GameStatus::Stalemate => Some(Outcome::Draw),
            GameStatus::Ongoing { .. } => None,
        }
    }

    pub fn bot_color(&self) -> Option<Color> {
        match self.mode {
            GameMode::Bot { human } => Some(human.opposite()),
            GameMode::Friend => None,
        }
    }

    pub fn is_bot_turn(&self) -> bool {
        !self.is_over() && self.bot_color() == Some(self.turn)
    }

    /// Plays whatever stands on `from` to `to`.
    pub fn play(&mut self, from: Position, to: Position) -> EngineResult<Move> {
        let piece = self
            .board
            .get(from)
            .ok_or(EngineError::EmptySquare { pos: from })?;
        self.play_move(Move::new(from, to, piece))
    }

    /// Plays a fully described move. The claimed piece must match the
    /// board; it is never trusted on its own. The bot's side only moves
    /// through [`GameSession::apply_bot_turn`].
    pub fn play_move(&mut self, mv: Move) -> EngineResult<Move> {
        self.check_player_move(&mv)?;
        self.commit(mv);
        Ok(mv)
    }

    /// Applies a move received from a peer together with the board the
    /// peer ended up with. Anything the local engine does not reproduce
    /// exactly is reported as a desync and leaves the board untouched.
    pub fn apply_remote(&mut self, mv: Move, claimed: &Board) -> EngineResult<Move> {
        if let Err(err) = self.check_player_move(&mv) {
            warn!(game = self.id, %mv, %err, "rejecting remote move");
            return Err(match err {
                EngineError::GameOver => EngineError::GameOver,
                other => EngineError::Desync {
                    reason: other.to_string(),
                },
            });
        }

        let mut expected = self.board.clone();
        expected.apply(&mv);
        if &expected != claimed {
            warn!(game = self.id, %mv, "remote board does not match the move");
            return Err(EngineError::Desync {
                reason: format!("board after {} differs from the peer's", mv),
            });
        }

        self.commit(mv);
        Ok(mv)
    }

    /// Starts the bot's turn on `scheduler`.
    pub fn schedule_bot(&self, scheduler: &mut BotScheduler) -> EngineResult<PendingBotMove> {
        if self.is_over() {
            return Err(EngineError::GameOver);
        }
        match self.bot_color() {
            Some(color) if color == self.turn => {
                Ok(scheduler.schedule(&self.board, color, self.generation))
            }
            _ => Err(EngineError::NotYourTurn { expected: self.turn }),
        }
    }

    /// Applies a finished bot turn. Turns computed for an older board are
    /// rejected. `Ok(None)` means the bot had nothing to play.
    pub fn apply_bot_turn(&mut self, turn: BotTurn) -> EngineResult<Option<Move>> {
        if turn.generation != self.generation {
            debug!(
                game = self.id,
                expected = self.generation,
                got = turn.generation,
                "discarding stale bot turn"
            );
            return Err(EngineError::StaleBotMove);
        }
        if !self.is_bot_turn() {
            return Err(EngineError::NotYourTurn { expected: self.turn });
        }
        match turn.mv {
            Some(mv) => {
                self.check_move(&mv)?;
                self.commit(mv);
                Ok(Some(mv))
            }
            None => Ok(None),
        }
    }

    fn check_player_move(&self, mv: &Move) -> EngineResult<()> {
        if self.is_bot_turn() {
            return Err(EngineError::NotYourTurn { expected: self.turn });
        }
        self.check_move(mv)
    }

    fn check_move(&self, mv: &Move) -> EngineResult<()> {
        if self.is_over() {
            return Err(EngineError::GameOver);
        }

        let piece = self
            .board
            .get(mv.from)
            .ok_or(EngineError::EmptySquare { pos: mv.from })?;
        if piece.color != self.turn {
            return Err(EngineError::NotYourTurn { expected: self.turn });
        }
        if piece != mv.piece || !is_valid_move(&self.board, mv.from, mv.to, piece) {
            return Err(EngineError::IllegalMove { mv: *mv });
        }
        Ok(())
    }

    fn commit(&mut self, mv: Move) {
        let captured = self.board.apply(&mv);
        self.history.push(mv);
        self.generation += 1;
        self.turn = self.turn.opposite();
        self.status = game_status(&self.board, self.turn);

        debug!(game = self.id, %mv, captured = ?captured.map(|p| p.glyph()), "move applied");
        match self.status {
            GameStatus::Checkmate => {
                info!(game = self.id, winner = %self.turn.opposite(), "checkmate")
            }
            GameStatus::Stalemate => info!(game = self.id, "stalemate"),
            GameStatus::Ongoing { in_check: true } => debug!(game = self.id, side = %self.turn, "check"),
            GameStatus::Ongoing { in_check: false } => {}
        }
    }
}
