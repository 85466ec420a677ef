//! Move legality, win detection and the announcement gate.
//!
//! A move is validated as a pure function over the current state and a
//! candidate post-placement board. The state is only written once every check
//! has passed, so a rejected move is never partially visible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Cell};
use crate::state::{GameState, Move, Player};

/// The only error kind of the core. Always recoverable: the state is
/// unchanged and the mover may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMove {
    #[error("occupied or out of range")]
    Occupied { pos: Option<Cell> },
    #[error("missing or invalid next piece")]
    NextPiece { next_piece: Option<usize> },
    #[error("no quarto")]
    NoQuarto,
    #[error("game is over")]
    GameOver,
    #[error("malformed move: {0}")]
    Malformed(String),
}

/// Result of the `winner` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Game continues (including when an unclaimed quarto line exists).
    Ongoing,
    Draw,
    Won(Player),
}

impl Outcome {
    pub fn is_decided(self) -> bool {
        self != Outcome::Ongoing
    }
}

/// What an accepted move does, computed before anything is written.
#[derive(Debug, Clone, Copy)]
struct Plan {
    placement: Option<(Cell, usize)>,
    next_piece: Option<usize>,
    announce: bool,
}

fn plan(state: &GameState, mv: &Move) -> Result<Plan, InvalidMove> {
    let mut board_after: Board = *state.board();
    let mut remaining = state.remaining_pieces().len();

    // Step 1: place the piece in hand
    let placement = match state.piece_to_play() {
        Some(index) => {
            let cell = mv
                .pos
                .filter(|&p| state.board().is_free(p))
                .ok_or(InvalidMove::Occupied { pos: mv.pos })?;
            board_after.set(cell, state.remaining_pieces()[index]);
            remaining -= 1;
            Some((cell, index))
        }
        None => None,
    };

    // Step 2: designate the opponent's piece from the updated pool
    let next_piece = if remaining > 0 {
        match mv.next_piece {
            Some(n) if n < remaining => Some(n),
            other => return Err(InvalidMove::NextPiece { next_piece: other }),
        }
    } else {
        None
    };

    // Step 3: a claim must be backed by a line on the post-placement board
    let announce = mv.claims_quarto();
    if announce && !board_after.has_quarto() {
        return Err(InvalidMove::NoQuarto);
    }

    Ok(Plan {
        placement,
        next_piece,
        announce,
    })
}

/// Check a move against the state without touching it.
pub fn validate(state: &GameState, mv: &Move) -> Result<(), InvalidMove> {
    plan(state, mv).map(|_| ())
}

/// Apply a move atomically. Turn ownership is left to the caller.
pub fn apply_move(state: &mut GameState, mv: &Move) -> Result<(), InvalidMove> {
    let plan = plan(state, mv)?;
    if let Some((cell, index)) = plan.placement {
        state.place(cell, index);
    }
    state.set_piece_to_play(plan.next_piece);
    state.set_quarto_announced(plan.announce);
    Ok(())
}

/// Announced quarto wins for the current player; a full board without one is
/// a draw; anything else is still in play.
pub fn winner(state: &GameState) -> Outcome {
    if state.quarto_announced() {
        Outcome::Won(state.current_player())
    } else if state.board().is_full() {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PIECE_COUNT;
    use crate::piece::Piece;

    /// Round pieces (ids 0, 1, 2) on cells 0..3, the fourth round piece (id 3)
    /// in hand at pool index 0.
    fn three_in_a_row() -> GameState {
        let mut board = Board::new();
        for (cell, id) in [(0, 0), (1, 1), (2, 2)] {
            board.set(cell, Piece::from_id(id));
        }
        let pool: Vec<Piece> = (3..PIECE_COUNT as u8).map(Piece::from_id).collect();
        GameState::from_parts(board, pool, Some(0), false, 1).unwrap()
    }

    fn conserved(state: &GameState) -> bool {
        state.board().occupied() + state.remaining_pieces().len() == PIECE_COUNT
    }

    #[test]
    fn test_first_move_only_designates() {
        let mut state = GameState::new(0);
        apply_move(&mut state, &Move::new(None, Some(5))).unwrap();
        assert_eq!(state.board().occupied(), 0);
        assert_eq!(state.remaining_pieces().len(), PIECE_COUNT);
        assert_eq!(state.piece_to_play(), Some(5));
        assert_eq!(state.current_player(), 0);
    }

    #[test]
    fn test_place_and_designate_shifts_indices() {
        let mut state = GameState::new(0);
        apply_move(&mut state, &Move::new(None, Some(0))).unwrap();
        apply_move(&mut state, &Move::place(0, 0)).unwrap();

        assert_eq!(state.board().get(0), Some(Piece::from_id(0)));
        assert_eq!(state.remaining_pieces().len(), 15);
        assert_eq!(state.piece_to_play(), Some(0));
        assert_eq!(state.piece_in_hand(), Some(Piece::from_id(1)));
        assert!(!state.quarto_announced());
        assert!(conserved(&state));
    }

    #[test]
    fn test_occupied_and_out_of_range() {
        let state = three_in_a_row();
        for pos in [Some(0), Some(16), None] {
            assert_eq!(
                validate(&state, &Move::new(pos, Some(0))),
                Err(InvalidMove::Occupied { pos })
            );
        }
    }

    #[test]
    fn test_next_piece_bounds() {
        let state = three_in_a_row();
        // 13 in the pool, 12 after placing
        assert!(validate(&state, &Move::place(3, 11)).is_ok());
        assert_eq!(
            validate(&state, &Move::place(3, 12)),
            Err(InvalidMove::NextPiece { next_piece: Some(12) })
        );
        assert_eq!(
            validate(&state, &Move::new(Some(3), None)),
            Err(InvalidMove::NextPiece { next_piece: None })
        );
    }

    #[test]
    fn test_claimed_row_wins() {
        let mut state = three_in_a_row();
        apply_move(&mut state, &Move::place(3, 0).claiming()).unwrap();
        assert!(state.quarto_announced());
        assert_eq!(winner(&state), Outcome::Won(1));
    }

    #[test]
    fn test_unclaimed_row_does_not_win() {
        let mut state = three_in_a_row();
        apply_move(&mut state, &Move::place(3, 0)).unwrap();
        assert!(state.board().has_quarto());
        assert!(!state.quarto_announced());
        assert_eq!(winner(&state), Outcome::Ongoing);
    }

    #[test]
    fn test_explicit_false_claim_resets_flag() {
        let mut state = three_in_a_row();
        let mv = Move {
            quarto: Some(false),
            ..Move::place(3, 0)
        };
        apply_move(&mut state, &mv).unwrap();
        assert!(!state.quarto_announced());
    }

    #[test]
    fn test_false_claim_rolls_back() {
        let mut state = three_in_a_row();
        let before = state.clone();
        assert_eq!(
            apply_move(&mut state, &Move::place(7, 0).claiming()),
            Err(InvalidMove::NoQuarto)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_claim_on_first_move_fails() {
        let mut state = GameState::new(0);
        assert_eq!(
            apply_move(&mut state, &Move::new(None, Some(0)).claiming()),
            Err(InvalidMove::NoQuarto)
        );
        assert_eq!(state, GameState::new(0));
    }

    #[test]
    fn test_last_piece_needs_no_designation() {
        // Fill cells in order, always handing over pool index 0
        let mut state = GameState::new(0);
        apply_move(&mut state, &Move::new(None, Some(0))).unwrap();
        let mut cell = 0;
        while state.remaining_pieces().len() > 1 {
            apply_move(&mut state, &Move::place(cell, 0)).unwrap();
            cell += 1;
        }
        assert_eq!(state.piece_to_play(), Some(0));

        apply_move(&mut state, &Move::new(Some(15), Some(3))).unwrap();
        assert!(state.board().is_full());
        assert_eq!(state.piece_to_play(), None);
        assert!(conserved(&state));
    }

    #[test]
    fn test_full_board_without_claim_is_draw() {
        let mut board = Board::new();
        for (cell, piece) in Piece::all().into_iter().enumerate() {
            board.set(cell, piece);
        }
        let state = GameState::from_parts(board, Vec::new(), None, false, 0).unwrap();
        assert_eq!(winner(&state), Outcome::Draw);
    }
}
