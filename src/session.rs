//! Turn driver between two sides of a match.
//!
//! A `Side` is anything that can propose moves: a remote connection or a
//! local automated player. The session asks the side whose turn it is for a
//! move, feeds it through the state machine and reports rejections back so
//! the side can retry. A side that keeps proposing invalid moves forfeits.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{MAX_INVALID_MOVES, PLAYERS};
use crate::game::Game;
use crate::rules::{InvalidMove, Outcome};
use crate::state::{GameState, Move, Player};

/// A side's answer to a move request. Malformed payloads arrive as
/// `Err(InvalidMove::Malformed)`; transport failures are the outer `Result`.
pub type Proposal = std::result::Result<Move, InvalidMove>;

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Won(Player),
    Draw,
    /// The named player forfeited after too many invalid moves.
    Forfeit(Player),
}

impl MatchResult {
    /// The winning player, if any.
    pub fn winner(self) -> Option<Player> {
        match self {
            MatchResult::Won(player) => Some(player),
            MatchResult::Forfeit(loser) => Some((loser + 1) % PLAYERS),
            MatchResult::Draw => None,
        }
    }
}

pub trait Side {
    fn name(&self) -> &str;

    /// Propose a move for `state`, where it is this side's turn.
    fn request_move(&mut self, state: &GameState) -> Result<Proposal>;

    fn move_rejected(&mut self, _error: &InvalidMove) -> Result<()> {
        Ok(())
    }

    fn game_over(&mut self, _result: MatchResult) -> Result<()> {
        Ok(())
    }
}

pub struct Session {
    game: Game,
    sides: [Box<dyn Side>; PLAYERS],
    max_invalid: usize,
}

impl Session {
    pub fn new(game: Game, sides: [Box<dyn Side>; PLAYERS]) -> Self {
        Self {
            game,
            sides,
            max_invalid: MAX_INVALID_MOVES,
        }
    }

    /// Consecutive rejections after which a side forfeits.
    pub fn with_max_invalid(mut self, max_invalid: usize) -> Self {
        self.max_invalid = max_invalid.max(1);
        self
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Play the match to the end.
    pub fn run(&mut self) -> Result<MatchResult> {
        info!(
            first = self.sides[self.game.current_player()].name(),
            "match started"
        );
        let result = loop {
            match self.game.winner() {
                Outcome::Won(player) => break MatchResult::Won(player),
                Outcome::Draw => break MatchResult::Draw,
                Outcome::Ongoing => {}
            }
            let player = self.game.current_player();
            match self.play_turn() {
                Ok(Some(loser)) => break MatchResult::Forfeit(loser),
                Ok(None) => {}
                Err(error) => {
                    self.abandon(player);
                    return Err(error);
                }
            }
        };

        info!(?result, "match finished");
        for side in &mut self.sides {
            side.game_over(result)?;
        }
        Ok(result)
    }

    /// Tell the opponent of a side that dropped out mid-turn that the match
    /// is over. Failures here are only logged.
    fn abandon(&mut self, dropped: Player) {
        let result = MatchResult::Forfeit(dropped);
        warn!(player = dropped, side = self.sides[dropped].name(), "side dropped out");
        let other = &mut self.sides[(dropped + 1) % PLAYERS];
        if let Err(error) = other.game_over(result) {
            warn!(side = other.name(), %error, "could not report abandoned match");
        }
    }

    /// Drive one turn. Returns the current player if they forfeited.
    fn play_turn(&mut self) -> Result<Option<Player>> {
        let player = self.game.current_player();
        let mut strikes = 0;
        loop {
            let side = &mut self.sides[player];
            let proposal = side.request_move(self.game.state())?;
            match proposal.and_then(|mv| self.game.apply_move(&mv).map(|_| mv)) {
                Ok(mv) => {
                    info!(player, side = side.name(), %mv, "move accepted");
                    return Ok(None);
                }
                Err(error) => {
                    strikes += 1;
                    warn!(player, side = side.name(), %error, strikes, "move rejected");
                    side.move_rejected(&error)?;
                    if strikes >= self.max_invalid {
                        return Ok(Some(player));
                    }
                }
            }
        }
    }
}
