//! Reference domains for MCTS validation.
//!
//! Small solved games used to check search behaviour end to end.
//! Each one scores terminal states from a configurable perspective:
//! +1 if the perspective player won, -1 if it lost, 0 for a draw.

pub mod connect_four;
pub mod tictactoe;
pub mod two_in_a_row;

pub use connect_four::{ConnectFour, ConnectFourAction, ConnectFourState};
pub use tictactoe::{TicTacToe, TicTacToeAction, TicTacToeState};
pub use two_in_a_row::{TwoInARow, TwoInARowAction, TwoInARowState};

use std::fmt;

/// Player in a two-player reference game. `X` always moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum Player {
    #[default]
    X,
    O,
}

impl Player {
    /// Get the opposing player.
    pub fn opposite(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// Terminal value of a finished game for `perspective`.
pub(crate) fn outcome_for(winner: Option<Player>, perspective: Player) -> f64 {
    match winner {
        Some(player) if player == perspective => 1.0,
        Some(_) => -1.0,
        None => 0.0,
    }
}
