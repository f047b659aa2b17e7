//! End-to-end search behaviour on the reference games.
//!
//! - Forced wins are ranked first
//! - Self-play always runs to a terminal state
//! - A domain that starts terminal offers nothing to commit to
//! - MCTS does not lose to a random opponent at tic-tac-toe

use arbor_mcts::{
    games::{ConnectFour, Player, TicTacToe, TicTacToeAction, TicTacToeState, TwoInARow},
    Domain, Mcts, MctsConfig, RolloutPolicy, SearchError, State,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Commit cells on `mcts` in order.
fn commit(mcts: &mut Mcts<TicTacToe>, cells: &[u8]) {
    for &cell in cells {
        mcts.take_action(&TicTacToeAction(cell)).unwrap();
    }
}

/// Search, commit the best ranked action, repeat until nothing is offered.
fn play_out<D: Domain>(mcts: &mut Mcts<D>, iterations: usize) {
    loop {
        mcts.search_for_iterations(iterations);
        let actions = mcts.get_actions();
        let Some(best) = actions.first() else {
            break;
        };
        mcts.take_action(best).unwrap();
    }
}

// =============================================================================
// Tactics
// =============================================================================

/// ```text
///  X | X | .
/// -----------
///  X | X | O
/// -----------
///  O | O | .
/// ```
/// O to move: 8 completes the bottom row, 2 lets X finish the diagonal.
#[test]
fn test_winning_move_ranked_first() {
    for iterations in [3, 10, 100] {
        let mut mcts = Mcts::new(TicTacToe::new(Player::O), RolloutPolicy::Default);
        commit(&mut mcts, &[0, 5, 1, 6, 3, 7, 4]);
        assert_eq!(mcts.current_state().agent(), Player::O);

        mcts.search_for_iterations(iterations);
        assert_eq!(
            mcts.get_actions(),
            vec![TicTacToeAction(8), TicTacToeAction(2)],
            "wrong ranking after {iterations} iterations"
        );
    }
}

#[test]
fn test_single_iteration_keeps_enumeration_order() {
    // One iteration only rolls out the committed node; both children are
    // still unvisited and tie at 0.
    let mut mcts = Mcts::new(TicTacToe::new(Player::O), RolloutPolicy::Default);
    commit(&mut mcts, &[0, 5, 1, 6, 3, 7, 4]);

    mcts.search_for_iterations(1);
    assert_eq!(
        mcts.get_actions(),
        vec![TicTacToeAction(2), TicTacToeAction(8)]
    );
}

#[test]
fn test_winning_move_stats() {
    let mut mcts = Mcts::new(TicTacToe::new(Player::O), RolloutPolicy::seeded(5));
    commit(&mut mcts, &[0, 5, 1, 6, 3, 7, 4]);
    mcts.search_for_iterations(50);

    let stats = mcts.action_stats();
    assert_eq!(stats[0].action, TicTacToeAction(8));
    assert_eq!(stats[0].average_value, 1.0);
    assert_eq!(stats[1].average_value, -1.0);
}

// =============================================================================
// Self-play reaches a terminal state
// =============================================================================

#[test]
fn test_connect_four_self_play_terminates() {
    for iterations in [1, 10, 100, 1000] {
        let game = ConnectFour::new(Player::X);
        let mut mcts = Mcts::new(game, RolloutPolicy::Default);

        play_out(&mut mcts, iterations);
        assert!(
            game.is_terminal(mcts.current_state()),
            "not terminal after {iterations} iterations per move:\n{}",
            mcts.current_state()
        );
    }
}

#[test]
fn test_two_in_a_row_self_play_terminates() {
    for iterations in [1, 10, 100] {
        let game = TwoInARow::new(Player::X);
        let mut mcts = Mcts::new(game, RolloutPolicy::seeded(iterations as u64));

        play_out(&mut mcts, iterations);
        assert!(game.is_terminal(mcts.current_state()));
        assert_eq!(mcts.contract_violations(), 0);
    }
}

#[test]
fn test_tictactoe_self_play_terminates() {
    let game = TicTacToe::new(Player::X);
    let mut mcts = Mcts::new(game, RolloutPolicy::seeded(11));

    play_out(&mut mcts, 200);
    assert!(game.is_terminal(mcts.current_state()));
    assert!(mcts.history().len() >= 5);
}

#[test]
fn test_duration_search_runs_iterations() {
    let mut mcts = Mcts::new(ConnectFour::new(Player::X), RolloutPolicy::seeded(3));

    let iterations = mcts.search_for_duration(Duration::from_millis(20));
    assert!(iterations > 0);
    assert_eq!(mcts.current_visits(), 1 + iterations as u32);
}

// =============================================================================
// A domain whose initial state is terminal
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Empty;

#[derive(Default)]
struct EmptyDomain;

impl State for Empty {
    type Agent = ();

    fn is_terminal(&self) -> bool {
        true
    }

    fn agent(&self) {}
}

impl Domain for EmptyDomain {
    type State = Empty;
    type Action = ();

    fn initial_state(&self) -> Empty {
        Empty
    }

    fn legal_actions(&self, _state: &Empty) -> Vec<()> {
        Vec::new()
    }

    fn apply(&self, state: &Empty, _action: &()) -> Empty {
        *state
    }

    fn is_terminal(&self, _state: &Empty) -> bool {
        true
    }

    fn terminal_value(&self, _state: &Empty) -> f64 {
        0.0
    }
}

#[test]
fn test_empty_domain_offers_no_actions() {
    let mut mcts = Mcts::<EmptyDomain>::default();
    mcts.search_for_iterations(10);

    assert!(mcts.get_actions().is_empty());
    assert!(mcts.action_stats().is_empty());
    assert_eq!(mcts.node_count(), 1);
    assert_eq!(mcts.current_visits(), 11);
}

#[test]
fn test_empty_domain_take_action_fails() {
    let mut mcts = Mcts::new(EmptyDomain, RolloutPolicy::Default);

    let err = mcts.take_action(&()).unwrap_err();
    assert!(matches!(err, SearchError::MissingTransition { .. }));
    assert_eq!(mcts.current_state(), &Empty);
    assert!(mcts.history().is_empty());
}

// =============================================================================
// Play against a random opponent
// =============================================================================

/// MCTS plays `me`, a seeded random player plays the other side.
fn play_against_random(me: Player, seed: u64, iterations: usize) -> TicTacToeState {
    let game = TicTacToe::new(me);
    let config = MctsConfig::seeded(seed);
    let mut mcts = Mcts::from_config(game, config).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed + 1000);

    while !game.is_terminal(mcts.current_state()) {
        let action = if mcts.current_state().agent() == me {
            mcts.search_for_iterations(iterations);
            mcts.get_actions()[0]
        } else {
            let actions = game.legal_actions(mcts.current_state());
            actions[rng.gen_range(0..actions.len())]
        };
        mcts.take_action(&action).unwrap();
    }
    mcts.current_state().clone()
}

#[test]
fn test_mcts_rarely_loses_to_random_player() {
    let mut losses = 0;
    for seed in 0..20 {
        for me in [Player::X, Player::O] {
            let state = play_against_random(me, seed, 2000);
            if state.winner() == Some(me.opposite()) {
                losses += 1;
            }
        }
    }

    assert!(
        losses <= 3,
        "MCTS lost {losses} of 40 games to a random player"
    );
}
