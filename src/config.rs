use std::time::Duration;

use crate::board::Color;

/// Settings for a human-versus-bot game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayConfig {
    pub human_color: Color,
    pub bot_delay: Duration,
    /// Fixed seed for the bot; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            human_color: Color::White,
            bot_delay: Duration::from_millis(1000), // Default 1 second of "thinking"
            seed: None,
        }
    }
}

impl PlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_human_color(&mut self, color: Color) {
        self.human_color = color;
    }

    pub fn set_bot_delay(&mut self, millis: u64) {
        self.bot_delay = Duration::from_millis(millis);
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }
}
