//! Quarto-Rust: match server, network client and local self-play.
//!
//! ## Usage
//!
//! - `quarto server` - Host matches between two remote players
//! - `quarto client <name>` - Join a server with the automated player
//! - `quarto selfplay` - Watch two automated players (default)

use std::net::TcpListener;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quarto_rust::client::connect_and_play;
use quarto_rust::constants::{DEFAULT_DEPTH, DEFAULT_HOST, DEFAULT_PORT, MAX_INVALID_MOVES};
use quarto_rust::game::Game;
use quarto_rust::player::AiPlayer;
use quarto_rust::search::SearchConfig;
use quarto_rust::server::serve_matches;
use quarto_rust::session::{Session, Side};

/// Quarto-Rust: Quarto rules engine with a negamax player
#[derive(Parser)]
#[command(name = "quarto")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Host matches between two remote players
    Server {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Number of matches to host before exiting
        #[arg(long, default_value_t = 1)]
        matches: usize,
        /// Consecutive invalid moves before a player forfeits
        #[arg(long, default_value_t = MAX_INVALID_MOVES)]
        max_invalid: usize,
    },
    /// Join a server and play with the automated player
    Client {
        /// Name announced to the server
        name: String,
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[command(flatten)]
        ai: AiArgs,
    },
    /// Let two automated players play each other locally
    Selfplay {
        #[command(flatten)]
        ai: AiArgs,
    },
}

#[derive(Args)]
struct AiArgs {
    /// Negamax depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u8,
    /// Seed for the random opening moves
    #[arg(long)]
    seed: Option<u64>,
    /// Search every move instead of opening randomly
    #[arg(long)]
    always_search: bool,
}

impl AiArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            depth: self.depth,
            always_search: self.always_search,
        }
    }

    fn player(&self, name: &str, offset: u64) -> AiPlayer {
        match self.seed {
            Some(seed) => AiPlayer::with_seed(name, self.config(), seed.wrapping_add(offset)),
            None => AiPlayer::new(name, self.config()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Server {
            host,
            port,
            matches,
            max_invalid,
        }) => {
            let addr = format!("{host}:{port}");
            let listener = TcpListener::bind(&addr).with_context(|| format!("binding {addr}"))?;
            info!(%addr, "server listening");
            let finished = serve_matches(&listener, matches, max_invalid, Game::new);
            info!(finished = finished.len(), matches, "server done");
        }
        Some(Commands::Client {
            name,
            host,
            port,
            ai,
        }) => {
            let mut player = ai.player(&name, 0);
            let result = connect_and_play(&format!("{host}:{port}"), &name, &mut player)?;
            println!("{result:?}");
        }
        Some(Commands::Selfplay { ai }) => run_selfplay(&ai)?,
        None => run_selfplay(&AiArgs {
            depth: DEFAULT_DEPTH,
            seed: None,
            always_search: false,
        })?,
    }
    Ok(())
}

fn run_selfplay(ai: &AiArgs) -> Result<()> {
    println!("Quarto-Rust: self-play\n");

    let game = match ai.seed {
        Some(seed) => Game::with_rng(&mut fastrand::Rng::with_seed(seed)),
        None => Game::new(),
    };
    let sides: [Box<dyn Side>; 2] = [
        Box::new(ai.player("north", 0)),
        Box::new(ai.player("south", 1)),
    ];
    let mut session = Session::new(game, sides);
    let result = session.run()?;

    println!("{}", session.game().state());
    println!("Result: {result:?}");
    Ok(())
}
