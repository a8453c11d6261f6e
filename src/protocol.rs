use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::Result;
use crossbeam_channel::{never, select};
use tracing::{debug, info};

use crate::board::{Color, Position};
use crate::bot::{Bot, BotScheduler, BotTurn, PendingBotMove};
use crate::config::PlayConfig;
use crate::error::EngineError;
use crate::movegen::{possible_moves_for_piece, GameStatus, Move};
use crate::session::{GameMode, GameSession, Outcome};

const HELP: &str = "\
commands:
  new [white|black]   start a game against the bot
  move <e2e4>         play a move
  moves <e2>          list destinations for the piece on a square
  board               show the board
  status              side to move and game state
  history             moves played so far
  quit
";

/// Line-based front end for a human playing the bot.
pub struct PlayHandler {
    config: PlayConfig,
    session: GameSession,
    scheduler: BotScheduler,
    pending: Option<PendingBotMove>,
    games_started: u64,
}

impl PlayHandler {
    pub fn new(config: PlayConfig) -> Self {
        let bot = match config.seed {
            Some(seed) => Bot::with_seed(seed),
            None => Bot::new(),
        };
        let scheduler = BotScheduler::new(bot, config.bot_delay);
        let session = GameSession::new(1, GameMode::Bot { human: config.human_color });

        let mut handler = PlayHandler {
            config,
            session,
            scheduler,
            pending: None,
            games_started: 1,
        };
        handler.maybe_schedule_bot();
        handler
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn has_pending_bot_move(&self) -> bool {
        self.pending.is_some()
    }

    /// Reads commands from stdin until `quit` or end of input. Bot turns
    /// are delivered as soon as they are ready, between commands.
    pub fn run(&mut self) -> Result<()> {
        let (line_tx, line_rx) = crossbeam_channel::unbounded();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut stdout = io::stdout();
        write!(stdout, "{}", self.handle_command("board")?)?;
        stdout.flush()?;

        loop {
            let bot_rx = match &self.pending {
                Some(pending) => pending.receiver().clone(),
                None => never(),
            };

            select! {
                recv(line_rx) -> line => {
                    let line = match line {
                        Ok(line) => line?,
                        Err(_) => break,
                    };
                    if line.trim() == "quit" {
                        break;
                    }
                    write!(stdout, "{}", self.handle_command(&line)?)?;
                }
                recv(bot_rx) -> turn => {
                    self.pending = None;
                    if let Ok(turn) = turn {
                        write!(stdout, "{}", self.finish_bot_turn(turn))?;
                    }
                }
            }
            stdout.flush()?;
        }

        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        info!("leaving play loop");
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        debug!(command, "handling command");
        match parts[0] {
            "new" => Ok(self.handle_new(&parts[1..])),
            "move" => Ok(self.handle_move(&parts[1..])),
            "moves" => Ok(self.handle_moves(&parts[1..])),
            "board" => Ok(self.session.board().to_string()),
            "status" => Ok(self.handle_status()),
            "history" => Ok(self.handle_history()),
            "help" => Ok(HELP.to_string()),
            "quit" => Ok("".to_string()),
            other => Ok(format!("error: unknown command '{}'\n", other)),
        }
    }

    /// Blocks until the pending bot turn (if any) is played.
    pub fn wait_for_bot(&mut self) -> String {
        match self.pending.take().and_then(|pending| pending.wait()) {
            Some(turn) => self.finish_bot_turn(turn),
            None => "".to_string(),
        }
    }

    fn handle_new(&mut self, parts: &[&str]) -> String {
        if let Some(color) = parts.first() {
            match color.parse::<Color>() {
                Ok(color) => self.config.set_human_color(color),
                Err(err) => return format!("error: {}\n", err),
            }
        }

        // Whatever the bot was thinking about belongs to the old game
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }

        self.games_started += 1;
        self.session = GameSession::new(
            self.games_started,
            GameMode::Bot {
                human: self.config.human_color,
            },
        );
        info!(game = self.games_started, human = %self.config.human_color, "new game");
        self.maybe_schedule_bot();

        format!("new game, you play {}\n{}", self.config.human_color, self.session.board())
    }

    fn handle_move(&mut self, parts: &[&str]) -> String {
        let notation = match parts.first() {
            Some(notation) => *notation,
            None => return "error: usage: move <e2e4>\n".to_string(),
        };
        if self.session.is_bot_turn() {
            return format!("error: {}\n", EngineError::NotYourTurn { expected: self.session.turn() });
        }

        let result = Move::parse(self.session.board(), notation).and_then(|mv| self.session.play_move(mv));
        match result {
            Ok(mv) => {
                let mut response = format!("ok {}\n", mv);
                response.push_str(&self.describe_status());
                self.maybe_schedule_bot();
                response
            }
            Err(err) => format!("error: {}\n", err),
        }
    }

    fn handle_moves(&self, parts: &[&str]) -> String {
        let square = match parts.first().map(|s| s.parse::<Position>()) {
            Some(Ok(square)) => square,
            Some(Err(err)) => return format!("error: {}\n", err),
            None => return "error: usage: moves <e2>\n".to_string(),
        };
        let piece = match self.session.board().get(square) {
            Some(piece) => piece,
            None => return format!("error: {}\n", EngineError::EmptySquare { pos: square }),
        };

        let destinations: Vec<String> = possible_moves_for_piece(self.session.board(), square, piece)
            .iter()
            .map(|to| to.to_string())
            .collect();
        format!("{} {}: {}\n", piece, square, destinations.join(" "))
    }

    fn handle_status(&self) -> String {
        let mut response = format!("{} to move\n", self.session.turn());
        response.push_str(&self.describe_status());
        response
    }

    fn handle_history(&self) -> String {
        let notation = self.session.notation();
        if notation.is_empty() {
            return "no moves yet\n".to_string();
        }
        format!("{}\n", notation.join(" "))
    }

    fn finish_bot_turn(&mut self, turn: BotTurn) -> String {
        match self.session.apply_bot_turn(turn) {
            Ok(Some(mv)) => {
                let mut response = format!("bot {}\n", mv);
                response.push_str(&self.session.board().to_string());
                response.push_str(&self.describe_status());
                response
            }
            Ok(None) => "bot has no move\n".to_string(),
            // The game moved on while the bot was thinking
            Err(EngineError::StaleBotMove) => "".to_string(),
            Err(err) => format!("error: {}\n", err),
        }
    }

    fn maybe_schedule_bot(&mut self) {
        if !self.session.is_bot_turn() {
            return;
        }
        match self.session.schedule_bot(&mut self.scheduler) {
            Ok(pending) => self.pending = Some(pending),
            Err(err) => debug!(%err, "bot turn not scheduled"),
        }
    }

    fn describe_status(&self) -> String {
        match (self.session.status(), self.session.outcome()) {
            (GameStatus::Ongoing { in_check: true }, _) => format!("check, {} king attacked\n", self.session.turn()),
            (_, Some(Outcome::Winner(color))) => format!("checkmate, {} wins\n", color),
            (_, Some(Outcome::Draw)) => "stalemate, draw\n".to_string(),
            _ => "".to_string(),
        }
    }
}
