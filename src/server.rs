//! TCP match host.
//!
//! Accepts two players, greets them, then lets a `Session` drive the match
//! with each connection wrapped as a `RemoteSide`.

use std::io::{BufRead, Write};
use std::net::{TcpListener, TcpStream};

use anyhow::{Context, Result, bail};
use tracing::{info, instrument, warn};

use crate::constants::PLAYERS;
use crate::game::Game;
use crate::protocol::{ClientMessage, Connection, ServerMessage, parse_play};
use crate::rules::InvalidMove;
use crate::session::{MatchResult, Proposal, Session, Side};
use crate::state::{GameState, Player};

/// A player on the other end of a connection.
pub struct RemoteSide<R, W> {
    name: String,
    conn: Connection<R, W>,
}

impl<R: BufRead, W: Write> RemoteSide<R, W> {
    /// Read the client's `hello` and answer with its player number.
    pub fn handshake(mut conn: Connection<R, W>, player: Player) -> Result<Self> {
        let name = match conn.recv::<ClientMessage>()? {
            Some(ClientMessage::Hello { name }) => name,
            Some(other) => bail!("expected hello, got {other:?}"),
            None => bail!("connection closed before hello"),
        };
        conn.send(&ServerMessage::Welcome { player })?;
        info!(player, %name, "player joined");
        Ok(Self { name, conn })
    }

    pub fn connection(&self) -> &Connection<R, W> {
        &self.conn
    }
}

impl<R: BufRead, W: Write> Side for RemoteSide<R, W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_move(&mut self, state: &GameState) -> Result<Proposal> {
        self.conn.send(&ServerMessage::YourTurn {
            state: state.clone(),
        })?;
        match self.conn.recv_line()? {
            Some(line) => Ok(parse_play(&line)),
            None => bail!("{} disconnected", self.name),
        }
    }

    fn move_rejected(&mut self, error: &InvalidMove) -> Result<()> {
        self.conn.send(&ServerMessage::Rejected {
            reason: error.to_string(),
        })
    }

    fn game_over(&mut self, result: MatchResult) -> Result<()> {
        self.conn.send(&ServerMessage::GameOver { result })
    }
}

/// Host one match on `listener`. Players are numbered in connection order;
/// the starting player is random.
#[instrument(skip(listener, game))]
pub fn serve_match(listener: &TcpListener, game: Game, max_invalid: usize) -> Result<MatchResult> {
    let mut sides: Vec<Box<dyn Side>> = Vec::with_capacity(PLAYERS);
    for player in 0..PLAYERS {
        let (stream, peer) = listener.accept().context("accepting player")?;
        info!(player, %peer, "connection accepted");
        let conn = Connection::tcp(stream)?;
        sides.push(Box::new(RemoteSide::<_, TcpStream>::handshake(conn, player)?));
    }

    let sides: [Box<dyn Side>; PLAYERS] = match sides.try_into() {
        Ok(sides) => sides,
        Err(_) => bail!("expected {PLAYERS} players"),
    };
    Session::new(game, sides).with_max_invalid(max_invalid).run()
}

/// Host `matches` matches back to back, starting each from `new_game()`.
///
/// A match that breaks off (a player disconnecting, a failed handshake) is
/// logged and the next one is accepted. Returns the results of the matches
/// that finished.
pub fn serve_matches(
    listener: &TcpListener,
    matches: usize,
    max_invalid: usize,
    mut new_game: impl FnMut() -> Game,
) -> Vec<MatchResult> {
    let mut results = Vec::with_capacity(matches);
    for round in 1..=matches {
        match serve_match(listener, new_game(), max_invalid) {
            Ok(result) => {
                info!(round, ?result, "match complete");
                results.push(result);
            }
            Err(error) => warn!(round, error = %format!("{error:#}"), "match abandoned"),
        }
    }
    results
}
