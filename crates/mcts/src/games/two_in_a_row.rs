//! Two-in-a-row: four cells in a line, two adjacent marks of the same
//! player win. Small enough to enumerate by hand.

use super::{outcome_for, Player};
use arbor_core::{Domain, State};
use std::fmt;

pub const CELLS: usize = 4;

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct TwoInARowState {
    cells: [Option<Player>; CELLS],
    current: Player,
    winner: Option<Player>,
}

impl TwoInARowState {
    pub fn new() -> Self {
        Self {
            cells: [None; CELLS],
            current: Player::X,
            winner: None,
        }
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn get(&self, cell: usize) -> Option<Player> {
        self.cells.get(cell).copied().flatten()
    }

    fn check_winner(&self) -> Option<Player> {
        self.cells.windows(2).find_map(|pair| match pair {
            [Some(a), Some(b)] if a == b => Some(*a),
            _ => None,
        })
    }
}

impl Default for TwoInARowState {
    fn default() -> Self {
        Self::new()
    }
}

impl State for TwoInARowState {
    type Agent = Player;

    fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.cells.iter().all(Option::is_some)
    }

    fn agent(&self) -> Player {
        self.current
    }
}

impl fmt::Display for TwoInARowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            match cell {
                Some(player) => write!(f, "[{player}]")?,
                None => write!(f, "[ ]")?,
            }
        }
        Ok(())
    }
}

/// Mark a cell (0-3).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TwoInARowAction(pub u8);

#[derive(Clone, Copy, Debug, Default)]
pub struct TwoInARow {
    perspective: Player,
}

impl TwoInARow {
    pub fn new(perspective: Player) -> Self {
        Self { perspective }
    }
}

impl Domain for TwoInARow {
    type State = TwoInARowState;
    type Action = TwoInARowAction;

    fn initial_state(&self) -> Self::State {
        TwoInARowState::new()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if state.winner.is_some() {
            return Vec::new();
        }
        state
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| TwoInARowAction(i as u8))
            .collect()
    }

    fn apply(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut new_state = state.clone();
        new_state.cells[action.0 as usize] = Some(state.current);
        new_state.current = state.current.opposite();
        new_state.winner = new_state.check_winner();
        new_state
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.is_terminal()
    }

    fn terminal_value(&self, state: &Self::State) -> f64 {
        outcome_for(state.winner, self.perspective)
    }
}
