//! Wire protocol between the match server and remote players.
//!
//! Messages are JSON objects, one per line, tagged by a `type` field.
//!
//! ## Client to server
//!
//! - `{"type":"hello","name":"alice"}` - first line after connecting
//! - `{"type":"play","move":{"pos":8,"quarto":true,"nextPiece":2}}`
//!
//! ## Server to client
//!
//! - `{"type":"welcome","player":0}`
//! - `{"type":"your_turn","state":{...}}` - the full visible state
//! - `{"type":"rejected","reason":"no quarto"}` - a new `your_turn` follows
//! - `{"type":"game_over","result":{"won":1}}`

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::rules::InvalidMove;
use crate::session::MatchResult;
use crate::state::{GameState, Move, Player};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello {
        name: String,
    },
    Play {
        #[serde(rename = "move")]
        mv: Move,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome { player: Player },
    YourTurn { state: GameState },
    Rejected { reason: String },
    GameOver { result: MatchResult },
}

/// Decode a line expected to carry a `play` message.
///
/// Anything else (bad JSON, wrong message type, negative indices) becomes
/// `InvalidMove::Malformed` so the sender can be asked again.
pub fn parse_play(line: &str) -> Result<Move, InvalidMove> {
    match serde_json::from_str::<ClientMessage>(line) {
        Ok(ClientMessage::Play { mv }) => Ok(mv),
        Ok(other) => Err(InvalidMove::Malformed(format!("expected a play message, got {other:?}"))),
        Err(e) => Err(InvalidMove::Malformed(e.to_string())),
    }
}

/// Line-oriented JSON connection over any reader/writer pair.
pub struct Connection<R, W> {
    reader: R,
    writer: W,
}

impl Connection<BufReader<TcpStream>, TcpStream> {
    pub fn tcp(stream: TcpStream) -> io::Result<Self> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self::new(reader, stream))
    }
}

impl<R: BufRead, W: Write> Connection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn send<T: Serialize>(&mut self, message: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Next non-blank line, or `None` at end of stream.
    pub fn recv_line(&mut self) -> Result<Option<String>> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    pub fn recv<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        match self.recv_line()? {
            Some(line) => serde_json::from_str(&line)
                .map(Some)
                .with_context(|| format!("malformed message: {line}")),
            None => Ok(None),
        }
    }
}
