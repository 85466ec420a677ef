//! Property tests over random games.

use proptest::prelude::*;

use quarto_rust::constants::PIECE_COUNT;
use quarto_rust::game::Game;
use quarto_rust::rules::{InvalidMove, Outcome};
use quarto_rust::search::legal_moves;
use quarto_rust::state::GameState;

fn conserved(state: &GameState) -> bool {
    state.board().occupied() + state.remaining_pieces().len() == PIECE_COUNT
}

proptest! {
    #[test]
    fn random_games_keep_their_invariants(seed in any::<u64>()) {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut game = Game::with_rng(&mut rng);
        let mut plies = 0;

        while !game.winner().is_decided() {
            let moves = legal_moves(game.state());
            prop_assert!(!moves.is_empty());
            let mv = moves[rng.usize(..moves.len())];

            // A false announcement is refused without a trace
            if !mv.claims_quarto() {
                let before = game.clone();
                prop_assert_eq!(game.apply_move(&mv.claiming()), Err(InvalidMove::NoQuarto));
                prop_assert_eq!(&game, &before);
            }

            let mover = game.current_player();
            let outcome = game.apply_move(&mv);
            prop_assert!(outcome.is_ok());
            plies += 1;

            let state = game.state();
            prop_assert!(conserved(state));
            prop_assert_eq!(
                state.piece_to_play().is_some(),
                !state.remaining_pieces().is_empty()
            );
            if let Ok(Outcome::Won(winner)) = outcome {
                prop_assert_eq!(winner, mover);
                prop_assert!(state.board().has_quarto());
            }
        }

        prop_assert!(plies <= PIECE_COUNT + 1);
        prop_assert_eq!(game.apply_move(&Default::default()), Err(InvalidMove::GameOver));
    }

    #[test]
    fn reached_states_pass_wire_validation(seed in any::<u64>(), plies in 0usize..12) {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut game = Game::with_rng(&mut rng);
        for _ in 0..plies {
            let moves = legal_moves(game.state());
            if moves.is_empty() {
                break;
            }
            game.apply_move(&moves[rng.usize(..moves.len())]).unwrap();
        }

        let json = serde_json::to_string(game.state()).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&back, game.state());
    }
}
