use anyhow::Result;
use catur::board::Color;
use catur::config::PlayConfig;
use catur::protocol::PlayHandler;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "catur", version, about = "Play chess against a capture-happy bot")]
struct Args {
    /// Color you play
    #[arg(long, default_value = "white")]
    color: Color,

    /// Seed for the bot, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// How long the bot "thinks" before moving
    #[arg(long, default_value_t = 1000)]
    bot_delay_ms: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the game, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = PlayConfig::new();
    config.set_human_color(args.color);
    config.set_seed(args.seed);
    config.set_bot_delay(args.bot_delay_ms);

    let mut handler = PlayHandler::new(config);
    handler.run()
}
