//! TCP client that plays a match with an automated player.

use std::io::{BufRead, Write};
use std::net::TcpStream;

use anyhow::{Context, Result, bail};
use tracing::{info, instrument, warn};

use crate::player::AiPlayer;
use crate::protocol::{ClientMessage, Connection, ServerMessage};
use crate::session::MatchResult;

/// Answer server messages until the match ends.
pub fn play<R: BufRead, W: Write>(
    conn: &mut Connection<R, W>,
    ai: &mut AiPlayer,
    name: &str,
) -> Result<MatchResult> {
    conn.send(&ClientMessage::Hello {
        name: name.to_string(),
    })?;

    loop {
        let Some(message) = conn.recv::<ServerMessage>()? else {
            bail!("server closed the connection");
        };
        match message {
            ServerMessage::Welcome { player } => info!(player, "joined match"),
            ServerMessage::YourTurn { state } => {
                let mv = ai
                    .choose_move(&state)
                    .context("asked to move in a finished game")?;
                info!(%mv, "playing");
                conn.send(&ClientMessage::Play { mv })?;
            }
            ServerMessage::Rejected { reason } => {
                warn!(%reason, "move rejected");
                ai.last_move_rejected();
            }
            ServerMessage::GameOver { result } => {
                info!(?result, "game over");
                return Ok(result);
            }
        }
    }
}

/// Connect to `addr` and play one match.
#[instrument(skip(ai))]
pub fn connect_and_play(addr: &str, name: &str, ai: &mut AiPlayer) -> Result<MatchResult> {
    let stream = TcpStream::connect(addr).with_context(|| format!("connecting to {addr}"))?;
    let mut conn = Connection::tcp(stream)?;
    play(&mut conn, ai, name)
}
