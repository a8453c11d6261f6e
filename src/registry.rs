//! Live games keyed by id.
//!
//! Sessions are created explicitly, looked up by game or by player, and
//! evicted either when a finished game is collected or when one of its
//! players leaves.

use std::collections::HashMap;

use tracing::info;

use crate::board::{Color, Position};
use crate::error::{EngineError, EngineResult};
use crate::movegen::Move;
use crate::session::{GameId, GameMode, GameSession};

pub type PlayerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Seats {
    pub white: Option<PlayerId>,
    pub black: Option<PlayerId>,
}

impl Seats {
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        if self.white == Some(player) {
            Some(Color::White)
        } else if self.black == Some(player) {
            Some(Color::Black)
        } else {
            None
        }
    }
}

#[derive(Debug)]
struct Entry {
    session: GameSession,
    seats: Seats,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    games: HashMap<GameId, Entry>,
    by_player: HashMap<PlayerId, GameId>,
    next_id: GameId,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new game. The seats must match `mode`: a bot game seats
    /// exactly the human's color, a friend game seats two different
    /// players. A player already seated elsewhere abandons that game.
    pub fn create(&mut self, mode: GameMode, seats: Seats) -> EngineResult<GameId> {
        check_seats(mode, seats)?;

        let players: Vec<PlayerId> = [seats.white, seats.black].into_iter().flatten().collect();
        for &player in &players {
            if let Some(old) = self.game_of(player) {
                info!(player, game = old, "player reseated, abandoning game");
                self.remove(old);
            }
        }

        self.next_id += 1;
        let id = self.next_id;
        for player in players {
            self.by_player.insert(player, id);
        }
        self.games.insert(
            id,
            Entry {
                session: GameSession::new(id, mode),
                seats,
            },
        );

        info!(game = id, ?mode, ?seats, "game created");
        Ok(id)
    }

    pub fn get(&self, id: GameId) -> EngineResult<&GameSession> {
        self.games
            .get(&id)
            .map(|entry| &entry.session)
            .ok_or(EngineError::UnknownGame { id })
    }

    pub fn get_mut(&mut self, id: GameId) -> EngineResult<&mut GameSession> {
        self.games
            .get_mut(&id)
            .map(|entry| &mut entry.session)
            .ok_or(EngineError::UnknownGame { id })
    }

    pub fn seats(&self, id: GameId) -> EngineResult<Seats> {
        self.games
            .get(&id)
            .map(|entry| entry.seats)
            .ok_or(EngineError::UnknownGame { id })
    }

    pub fn game_of(&self, player: PlayerId) -> Option<GameId> {
        self.by_player.get(&player).copied()
    }

    /// Validates that `player` holds the side to move, then plays.
    pub fn play_as(&mut self, player: PlayerId, from: Position, to: Position) -> EngineResult<Move> {
        let id = self
            .game_of(player)
            .ok_or(EngineError::UnknownPlayer { player })?;
        let entry = self
            .games
            .get_mut(&id)
            .ok_or(EngineError::UnknownGame { id })?;

        let turn = entry.session.turn();
        if entry.seats.color_of(player) != Some(turn) {
            return Err(EngineError::NotYourTurn { expected: turn });
        }
        entry.session.play(from, to)
    }

    pub fn remove(&mut self, id: GameId) -> Option<GameSession> {
        let entry = self.games.remove(&id)?;
        for player in [entry.seats.white, entry.seats.black].into_iter().flatten() {
            if self.by_player.get(&player) == Some(&id) {
                self.by_player.remove(&player);
            }
        }
        info!(game = id, "game removed");
        Some(entry.session)
    }

    /// Drops every finished game and returns them for persistence.
    pub fn evict_finished(&mut self) -> Vec<GameSession> {
        let finished: Vec<GameId> = self
            .games
            .iter()
            .filter(|(_, entry)| entry.session.is_over())
            .map(|(&id, _)| id)
            .collect();

        finished.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// A player disconnected: their current game is abandoned.
    pub fn leave(&mut self, player: PlayerId) -> Option<GameSession> {
        let id = self.game_of(player)?;
        info!(player, game = id, "player left, abandoning game");
        self.remove(id)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

fn check_seats(mode: GameMode, seats: Seats) -> EngineResult<()> {
    let reason = match (mode, seats.white, seats.black) {
        (GameMode::Bot { human: Color::White }, Some(_), None) => return Ok(()),
        (GameMode::Bot { human: Color::Black }, None, Some(_)) => return Ok(()),
        (GameMode::Bot { human }, ..) => format!("a bot game seats only the {} player", human),
        (GameMode::Friend, Some(white), Some(black)) if white != black => return Ok(()),
        (GameMode::Friend, Some(_), Some(_)) => "a player cannot take both seats".to_string(),
        (GameMode::Friend, ..) => "a friend game needs both seats filled".to_string(),
    };
    Err(EngineError::InvalidSeats { reason })
}
