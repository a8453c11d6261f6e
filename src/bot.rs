use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::board::{Board, Color};
use crate::movegen::{all_possible_moves, Move};

/// Greedy capture-biased random choice. If any move lands on an enemy
/// piece only those moves are considered; no look-ahead beyond that.
pub fn make_bot_move<R: Rng + ?Sized>(board: &Board, color: Color, rng: &mut R) -> Option<Move> {
    let moves = all_possible_moves(board, color);
    let captures: Vec<Move> = moves
        .iter()
        .copied()
        .filter(|mv| mv.is_capture(board))
        .collect();

    let pool = if captures.is_empty() { &moves } else { &captures };
    pool.choose(rng).copied()
}

#[derive(Debug)]
pub struct Bot {
    rng: StdRng,
}

impl Bot {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn choose_move(&mut self, board: &Board, color: Color) -> Option<Move> {
        make_bot_move(board, color, &mut self.rng)
    }
}

impl Default for Bot {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a scheduled bot turn, tagged with the board generation it
/// was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotTurn {
    pub generation: u64,
    pub mv: Option<Move>,
}

/// Runs bot turns on a worker thread after a cosmetic "thinking" delay.
#[derive(Debug)]
pub struct BotScheduler {
    bot: Bot,
    delay: Duration,
}

impl BotScheduler {
    pub fn new(bot: Bot, delay: Duration) -> Self {
        Self { bot, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Starts a bot turn against a snapshot of `board`. The snapshot is
    /// owned by the worker, so later changes to the caller's board are
    /// invisible to it; the generation tag lets the caller detect that.
    pub fn schedule(&mut self, board: &Board, color: Color, generation: u64) -> PendingBotMove {
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);

        let board = board.clone();
        let delay = self.delay;
        // Each turn gets its own stream so seeded games stay reproducible
        let seed: u64 = self.bot.rng.gen();

        debug!(%color, generation, ?delay, "scheduling bot turn");
        thread::spawn(move || {
            select! {
                recv(cancel_rx) -> _ => {
                    debug!(generation, "bot turn cancelled before it fired");
                    return;
                }
                default(delay) => {}
            }

            let mut rng = StdRng::seed_from_u64(seed);
            let mv = make_bot_move(&board, color, &mut rng);
            let _ = result_tx.send(BotTurn { generation, mv });
        });

        PendingBotMove {
            generation,
            cancel_tx,
            result_rx,
        }
    }
}

/// Handle to an in-flight bot turn. Dropping it cancels the turn if the
/// delay has not elapsed yet.
#[derive(Debug)]
pub struct PendingBotMove {
    generation: u64,
    cancel_tx: Sender<()>,
    result_rx: Receiver<BotTurn>,
}

impl PendingBotMove {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Receiver that yields the turn once; usable in a `select!`.
    pub fn receiver(&self) -> &Receiver<BotTurn> {
        &self.result_rx
    }

    /// Blocks until the bot has moved. `None` if the worker went away.
    pub fn wait(self) -> Option<BotTurn> {
        self.result_rx.recv().ok()
    }

    pub fn try_take(&self) -> Option<BotTurn> {
        self.result_rx.try_recv().ok()
    }

    pub fn cancel(self) {
        let _ = self.cancel_tx.try_send(());
    }
}
