//! Turn-owning state machine around the rules engine.

use crate::constants::PLAYERS;
use crate::rules::{self, InvalidMove, Outcome};
use crate::state::{GameState, Move, Player};

/// A match in progress. Owns the authoritative `GameState`; anything that
/// wants to explore ahead must clone it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    state: GameState,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// New game; the starting player comes from the thread-local generator.
    pub fn new() -> Self {
        Self::from_state(GameState::new(fastrand::usize(..PLAYERS)))
    }

    /// New game with the starting player drawn from `rng`.
    pub fn with_rng(rng: &mut fastrand::Rng) -> Self {
        Self::from_state(GameState::new(rng.usize(..PLAYERS)))
    }

    pub fn from_state(state: GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn current_player(&self) -> Player {
        self.state.current_player()
    }

    pub fn winner(&self) -> Outcome {
        rules::winner(&self.state)
    }

    /// Apply a move for the current player.
    ///
    /// On success the turn passes to the opponent unless the move decided the
    /// game, so that `winner()` names the mover. On failure nothing changes.
    pub fn apply_move(&mut self, mv: &Move) -> Result<Outcome, InvalidMove> {
        if self.winner().is_decided() {
            return Err(InvalidMove::GameOver);
        }
        rules::apply_move(&mut self.state, mv)?;

        let outcome = self.winner();
        if !outcome.is_decided() {
            self.state.pass_turn();
        }
        Ok(outcome)
    }

    /// Apply a move received as a JSON payload.
    pub fn apply_raw_move(&mut self, raw: &str) -> Result<Outcome, InvalidMove> {
        let mv: Move =
            serde_json::from_str(raw).map_err(|e| InvalidMove::Malformed(e.to_string()))?;
        self.apply_move(&mv)
    }
}
