//! Game state aggregate and the move record exchanged between players.
//!
//! `GameState` is the visible state of a match: board, remaining pool,
//! designated piece, announcement flag and whose turn it is. The piece to
//! play is an *index* into `remaining_pieces`; the piece stays in the pool
//! until it is placed, so removing it shifts every later index. That index is
//! the wire representation of piece selection and must not change meaning.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Cell};
use crate::constants::{PIECE_COUNT, PLAYERS};
use crate::piece::Piece;

/// Player identity, `0` or `1`.
pub type Player = usize;

/// Reasons a state assembled from parts (or received from the wire) is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidState {
    #[error("player {0} does not exist")]
    Player(Player),
    #[error("piece {0} appears more than once")]
    DuplicatePiece(Piece),
    #[error("{0} pieces accounted for, expected {}", PIECE_COUNT)]
    PieceCount(usize),
    #[error("piece to play {index} is out of range for {remaining} remaining pieces")]
    PieceToPlay { index: usize, remaining: usize },
    #[error("quarto announced but no line on the board shares an attribute")]
    UnbackedQuarto,
    #[error("no piece to play while {0} pieces remain on a started board")]
    MissingPieceToPlay(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StateRepr")]
pub struct GameState {
    board: Board,
    remaining_pieces: Vec<Piece>,
    piece_to_play: Option<usize>,
    quarto_announced: bool,
    current_player: Player,
}

/// Unvalidated mirror of `GameState` used for deserialization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateRepr {
    board: Board,
    remaining_pieces: Vec<Piece>,
    piece_to_play: Option<usize>,
    quarto_announced: bool,
    current_player: Player,
}

impl TryFrom<StateRepr> for GameState {
    type Error = InvalidState;

    fn try_from(repr: StateRepr) -> Result<Self, Self::Error> {
        GameState::from_parts(
            repr.board,
            repr.remaining_pieces,
            repr.piece_to_play,
            repr.quarto_announced,
            repr.current_player,
        )
    }
}

impl GameState {
    /// Empty board, canonical 16-piece pool, nothing to play yet.
    ///
    /// `current_player` is taken modulo the number of players, so any value
    /// names a valid seat. Use `from_parts` to reject out-of-range players.
    pub fn new(current_player: Player) -> Self {
        Self {
            board: Board::new(),
            remaining_pieces: Piece::all().to_vec(),
            piece_to_play: None,
            quarto_announced: false,
            current_player: current_player % PLAYERS,
        }
    }

    /// Assemble a state, checking that every piece is accounted for exactly once.
    pub fn from_parts(
        board: Board,
        remaining_pieces: Vec<Piece>,
        piece_to_play: Option<usize>,
        quarto_announced: bool,
        current_player: Player,
    ) -> Result<Self, InvalidState> {
        if current_player >= PLAYERS {
            return Err(InvalidState::Player(current_player));
        }

        let mut seen = [false; PIECE_COUNT];
        for piece in board.pieces().chain(remaining_pieces.iter().copied()) {
            let id = piece.id() as usize;
            if seen[id] {
                return Err(InvalidState::DuplicatePiece(piece));
            }
            seen[id] = true;
        }

        let total = board.occupied() + remaining_pieces.len();
        if total != PIECE_COUNT {
            return Err(InvalidState::PieceCount(total));
        }

        match piece_to_play {
            Some(index) if index >= remaining_pieces.len() => {
                return Err(InvalidState::PieceToPlay {
                    index,
                    remaining: remaining_pieces.len(),
                });
            }
            // Only the opening move has nothing in hand
            None if board.occupied() > 0 && !remaining_pieces.is_empty() => {
                return Err(InvalidState::MissingPieceToPlay(remaining_pieces.len()));
            }
            _ => {}
        }

        if quarto_announced && !board.has_quarto() {
            return Err(InvalidState::UnbackedQuarto);
        }

        Ok(Self {
            board,
            remaining_pieces,
            piece_to_play,
            quarto_announced,
            current_player,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn remaining_pieces(&self) -> &[Piece] {
        &self.remaining_pieces
    }

    /// Index into `remaining_pieces` of the piece the mover must place.
    pub fn piece_to_play(&self) -> Option<usize> {
        self.piece_to_play
    }

    /// The piece the mover must place, resolved through the pool.
    pub fn piece_in_hand(&self) -> Option<Piece> {
        self.piece_to_play.map(|i| self.remaining_pieces[i])
    }

    pub fn quarto_announced(&self) -> bool {
        self.quarto_announced
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// A game is over once a quarto was announced or the board is full.
    pub fn is_finished(&self) -> bool {
        self.quarto_announced || self.board.is_full()
    }

    /// Exact key for the search cache.
    ///
    /// Five bits per cell (0 = empty, otherwise piece id + 1), five bits for
    /// the piece in hand and one bit for the announcement flag. The pool order
    /// is left out: it only renames moves, it never changes a score.
    pub fn fingerprint(&self) -> u128 {
        let code = |piece: Option<Piece>| piece.map_or(0, |p| p.id() as u128 + 1);
        let mut key = self
            .board
            .cells()
            .iter()
            .fold(0u128, |key, &cell| (key << 5) | code(cell));
        key = (key << 5) | code(self.piece_in_hand());
        (key << 1) | self.quarto_announced as u128
    }

    pub(crate) fn place(&mut self, cell: Cell, index: usize) {
        let piece = self.remaining_pieces.remove(index);
        self.board.set(cell, piece);
    }

    pub(crate) fn set_piece_to_play(&mut self, index: Option<usize>) {
        self.piece_to_play = index;
    }

    pub(crate) fn set_quarto_announced(&mut self, announced: bool) {
        self.quarto_announced = announced;
    }

    pub(crate) fn pass_turn(&mut self) {
        self.current_player = (self.current_player + 1) % PLAYERS;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board:")?;
        write!(f, "{}", self.board)?;

        writeln!(f, "\nRemaining Pieces:")?;
        let pool: Vec<String> = self.remaining_pieces.iter().map(Piece::to_string).collect();
        writeln!(f, "{}", pool.join(", "))?;

        if let Some(piece) = self.piece_in_hand() {
            writeln!(f, "\nPiece to Play:")?;
            writeln!(f, "{piece}")?;
        }
        Ok(())
    }
}

/// A move: where to put the piece in hand, whether a quarto is claimed, and
/// which remaining piece the opponent gets.
///
/// Field names on the wire are `pos`, `quarto` and `nextPiece`; absent fields
/// are omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Move {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Cell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarto: Option<bool>,
    #[serde(default, rename = "nextPiece", skip_serializing_if = "Option::is_none")]
    pub next_piece: Option<usize>,
}

impl Move {
    pub fn new(pos: Option<Cell>, next_piece: Option<usize>) -> Self {
        Self {
            pos,
            quarto: None,
            next_piece,
        }
    }

    /// Place at `pos` and hand over `next_piece`.
    pub fn place(pos: Cell, next_piece: usize) -> Self {
        Self::new(Some(pos), Some(next_piece))
    }

    /// Same move, announcing a quarto.
    pub fn claiming(self) -> Self {
        Self {
            quarto: Some(true),
            ..self
        }
    }

    /// Same move, with no announcement field at all.
    pub fn unclaimed(self) -> Self {
        Self {
            quarto: None,
            ..self
        }
    }

    pub fn claims_quarto(&self) -> bool {
        self.quarto == Some(true)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "place@{pos}")?,
            None => write!(f, "open")?,
        }
        if let Some(next) = self.next_piece {
            write!(f, " give#{next}")?;
        }
        if self.claims_quarto() {
            write!(f, " QUARTO")?;
        }
        Ok(())
    }
}
