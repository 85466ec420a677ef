//! Automated player.
//!
//! Early in the game move quality barely matters, so the player picks a
//! uniformly random legal move (still claiming a quarto if one happens to be
//! available). Once some line is a single placement away from completion it
//! switches to full negamax search and stays there for the rest of the game.

use anyhow::anyhow;
use tracing::{debug, info};

use crate::rules::InvalidMove;
use crate::search::{self, SearchConfig, Searcher};
use crate::session::{MatchResult, Proposal, Side};
use crate::state::{GameState, Move};

pub struct AiPlayer {
    name: String,
    config: SearchConfig,
    searcher: Searcher,
    rng: fastrand::Rng,
    engaged: bool,
    /// Last move proposed, with the fingerprint of the state it was for.
    last: Option<(u128, Move)>,
    /// Moves refused for the state with that fingerprint.
    refused: Option<(u128, Vec<Move>)>,
}

impl AiPlayer {
    pub fn new(name: impl Into<String>, config: SearchConfig) -> Self {
        Self::with_rng(name, config, fastrand::Rng::new())
    }

    pub fn with_seed(name: impl Into<String>, config: SearchConfig, seed: u64) -> Self {
        Self::with_rng(name, config, fastrand::Rng::with_seed(seed))
    }

    pub fn with_rng(name: impl Into<String>, config: SearchConfig, rng: fastrand::Rng) -> Self {
        Self {
            name: name.into(),
            config,
            searcher: Searcher::new(config.depth),
            rng,
            engaged: config.always_search,
            last: None,
            refused: None,
        }
    }

    /// True once the player has switched to full search.
    pub fn is_searching(&self) -> bool {
        self.engaged
    }

    /// Pick a move for the side to move, or `None` if the game is over.
    pub fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        if state.is_finished() {
            return None;
        }
        if !self.engaged && state.board().in_danger() {
            info!(player = %self.name, "line under threat, switching to search");
            self.engaged = true;
        }

        let key = state.fingerprint();
        let mv = match self.refused.take() {
            Some((at, refused)) if at == key => {
                let mv = self.retry_move(state, &refused);
                self.refused = Some((at, refused));
                mv
            }
            _ if self.engaged => self.searcher.best_move(state)?.mv,
            _ => {
                let mv = self.random_move(state);
                debug!(player = %self.name, %mv, "random move");
                mv
            }
        };
        self.last = Some((key, mv));
        Some(mv)
    }

    /// Record that the last proposed move was refused. The next request for
    /// the same state picks a random legal move other than the refused ones.
    pub fn last_move_rejected(&mut self) {
        let Some((key, mv)) = self.last.take() else {
            return;
        };
        match &mut self.refused {
            Some((at, refused)) if *at == key => refused.push(mv),
            _ => self.refused = Some((key, vec![mv])),
        }
    }

    fn retry_move(&mut self, state: &GameState, refused: &[Move]) -> Move {
        let fresh: Vec<Move> = search::legal_moves(state)
            .into_iter()
            .filter(|mv| !refused.contains(mv))
            .collect();
        match self.rng.choice(fresh) {
            Some(mv) => {
                debug!(player = %self.name, %mv, "retrying with another move");
                mv
            }
            None => self.random_move(state),
        }
    }

    /// Random empty cell and random next piece over the post-placement pool,
    /// with the quarto claim kept only if it holds.
    fn random_move(&mut self, state: &GameState) -> Move {
        let mut after = state.remaining_pieces().len();
        let pos = match state.piece_to_play() {
            Some(_) => {
                let cells: Vec<usize> = state.board().empty_cells().collect();
                after -= 1;
                self.rng.choice(cells)
            }
            None => None,
        };
        let next_piece = (after > 0).then(|| self.rng.usize(..after));
        search::resolve_claim(state, Move::new(pos, next_piece))
    }
}

impl Side for AiPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_move(&mut self, state: &GameState) -> anyhow::Result<Proposal> {
        self.choose_move(state)
            .map(Ok)
            .ok_or_else(|| anyhow!("{} has no legal move", self.name))
    }

    fn move_rejected(&mut self, error: &InvalidMove) -> anyhow::Result<()> {
        debug!(player = %self.name, %error, "move rejected");
        self.last_move_rejected();
        Ok(())
    }

    fn game_over(&mut self, result: MatchResult) -> anyhow::Result<()> {
        debug!(player = %self.name, ?result, "game over");
        self.engaged = self.config.always_search;
        self.last = None;
        self.refused = None;
        Ok(())
    }
}
