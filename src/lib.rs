//! Quarto-Rust: a Quarto rules engine and negamax player.
//!
//! Two players take turns placing pieces on a 4x4 board, and each turn the
//! mover also chooses the piece the opponent must place next. A line of four
//! pieces sharing an attribute wins, but only if the mover announces it in the
//! same move.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, search and network defaults
//! - [`piece`] - The 16 pieces and their attributes
//! - [`board`] - Board occupancy and quarto-line detection
//! - [`state`] - Game state aggregate and the `Move` record
//! - [`rules`] - Move validation, atomic application, winner query
//! - [`game`] - Turn-owning state machine
//! - [`search`] - Move enumeration and negamax with a transposition table
//! - [`player`] - Automated player (random opening, search once threatened)
//! - [`session`] - Turn driver between two sides
//! - [`protocol`], [`server`], [`client`] - Line-delimited JSON over TCP
//!
//! ## Example
//!
//! ```
//! use quarto_rust::game::Game;
//! use quarto_rust::rules::Outcome;
//! use quarto_rust::search::Searcher;
//! use quarto_rust::state::{GameState, Move};
//!
//! // Player 0 opens by handing over the first piece
//! let mut game = Game::from_state(GameState::new(0));
//! game.apply_move(&Move::new(None, Some(0))).unwrap();
//!
//! // Let the search answer for player 1
//! let best = Searcher::new(1).best_move(game.state()).unwrap();
//! assert_eq!(game.apply_move(&best.mv), Ok(Outcome::Ongoing));
//! println!("{}", game.state());
//! ```

pub mod board;
pub mod client;
pub mod constants;
pub mod game;
pub mod piece;
pub mod player;
pub mod protocol;
pub mod rules;
pub mod search;
pub mod server;
pub mod session;
pub mod state;
