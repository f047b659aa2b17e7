//! Connect four on a 6x7 grid.
//!
//! Pieces drop to the lowest free row of a column; four in a row
//! horizontally, vertically or diagonally wins. Large enough that searches
//! never see the whole tree, which makes it the stress domain for
//! play-to-completion checks.

use super::{outcome_for, Player};
use arbor_core::{Domain, State};
use std::fmt;

pub const ROWS: usize = 6;
pub const COLUMNS: usize = 7;

/// Connect four grid. Row 0 is the top row.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct ConnectFourState {
    grid: [[Option<Player>; COLUMNS]; ROWS],
    current: Player,
    winner: Option<Player>,
    moves: u8,
}

impl ConnectFourState {
    /// Empty grid with X to move.
    pub fn new() -> Self {
        Self {
            grid: [[None; COLUMNS]; ROWS],
            current: Player::X,
            winner: None,
            moves: 0,
        }
    }

    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Piece at (`row`, `column`), if any.
    pub fn get(&self, row: usize, column: usize) -> Option<Player> {
        self.grid.get(row)?.get(column).copied().flatten()
    }

    fn is_full(&self) -> bool {
        self.moves as usize == ROWS * COLUMNS
    }

    /// Lowest free row in `column`.
    fn landing_row(&self, column: usize) -> Option<usize> {
        (0..ROWS)
            .rev()
            .find(|&row| self.grid[row][column].is_none())
    }

    /// True if the piece at (`row`, `column`) completes four in a row.
    fn completes_line(&self, row: usize, column: usize) -> bool {
        let Some(player) = self.grid[row][column] else {
            return false;
        };

        const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
        DIRECTIONS.iter().any(|&(dr, dc)| {
            let run = |sign: isize| {
                (1..4)
                    .take_while(|&step| {
                        let r = row as isize + sign * dr * step;
                        let c = column as isize + sign * dc * step;
                        (0..ROWS as isize).contains(&r)
                            && (0..COLUMNS as isize).contains(&c)
                            && self.grid[r as usize][c as usize] == Some(player)
                    })
                    .count()
            };
            1 + run(1) + run(-1) >= 4
        })
    }
}

impl Default for ConnectFourState {
    fn default() -> Self {
        Self::new()
    }
}

impl State for ConnectFourState {
    type Agent = Player;

    fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.is_full()
    }

    fn agent(&self) -> Player {
        self.current
    }
}

impl fmt::Display for ConnectFourState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            write!(f, "|")?;
            for cell in row {
                match cell {
                    Some(player) => write!(f, "{player}")?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "+{}+", "-".repeat(COLUMNS))
    }
}

/// Drop a piece into a column (0-6).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ConnectFourAction(pub u8);

impl fmt::Display for ConnectFourAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}", self.0)
    }
}

/// Connect four scored for `perspective`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConnectFour {
    perspective: Player,
}

impl ConnectFour {
    pub fn new(perspective: Player) -> Self {
        Self { perspective }
    }

    pub fn perspective(&self) -> Player {
        self.perspective
    }
}

impl Domain for ConnectFour {
    type State = ConnectFourState;
    type Action = ConnectFourAction;

    fn initial_state(&self) -> Self::State {
        ConnectFourState::new()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if state.winner.is_some() {
            return Vec::new();
        }
        (0..COLUMNS)
            .filter(|&column| state.grid[0][column].is_none())
            .map(|column| ConnectFourAction(column as u8))
            .collect()
    }

    /// Applying a move to a full column leaves the grid unchanged apart
    /// from passing the turn; `legal_actions` never offers one.
    fn apply(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let column = action.0 as usize;
        let mut new_state = state.clone();
        new_state.current = state.current.opposite();

        if let Some(row) = state.landing_row(column) {
            new_state.grid[row][column] = Some(state.current);
            new_state.moves += 1;
            if new_state.completes_line(row, column) {
                new_state.winner = Some(state.current);
            }
        }
        new_state
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.is_terminal()
    }

    fn terminal_value(&self, state: &Self::State) -> f64 {
        outcome_for(state.winner, self.perspective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &ConnectFour, columns: &[u8]) -> ConnectFourState {
        columns.iter().fold(game.initial_state(), |state, &column| {
            game.apply(&state, &ConnectFourAction(column))
        })
    }

    #[test]
    fn test_initial_state() {
        let game = ConnectFour::default();
        let state = game.initial_state();

        assert_eq!(state.agent(), Player::X);
        assert_eq!(game.legal_actions(&state).len(), COLUMNS);
        assert!(!game.is_terminal(&state));
    }

    #[test]
    fn test_pieces_fall_to_bottom() {
        let game = ConnectFour::default();
        let state = play(&game, &[3, 3]);

        assert_eq!(state.get(ROWS - 1, 3), Some(Player::X));
        assert_eq!(state.get(ROWS - 2, 3), Some(Player::O));
        assert_eq!(state.get(ROWS - 3, 3), None);
        assert_eq!(state.current_player(), Player::X);
    }

    #[test]
    fn test_full_column_is_not_legal() {
        let game = ConnectFour::default();
        let state = play(&game, &[0, 0, 0, 0, 0, 0]);

        let actions = game.legal_actions(&state);
        assert_eq!(actions.len(), COLUMNS - 1);
        assert!(!actions.contains(&ConnectFourAction(0)));
    }

    #[test]
    fn test_horizontal_win() {
        let game = ConnectFour::new(Player::X);
        // X: 0 1 2 3 on the bottom row, O stacks on top.
        let state = play(&game, &[0, 0, 1, 1, 2, 2, 3]);

        assert_eq!(state.winner(), Some(Player::X));
        assert!(game.is_terminal(&state));
        assert!(game.legal_actions(&state).is_empty());
        assert_eq!(game.terminal_value(&state), 1.0);
    }

    #[test]
    fn test_vertical_win_for_second_player() {
        let game = ConnectFour::new(Player::X);
        let state = play(&game, &[0, 6, 1, 6, 0, 6, 1, 6]);

        assert_eq!(state.winner(), Some(Player::O));
        assert_eq!(game.terminal_value(&state), -1.0);
        assert_eq!(ConnectFour::new(Player::O).terminal_value(&state), 1.0);
    }

    #[test]
    fn test_diagonal_win() {
        let game = ConnectFour::default();
        // X climbs the diagonal (5,0) (4,1) (3,2) (2,3).
        let state = play(&game, &[0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3]);

        assert_eq!(state.winner(), Some(Player::X));
    }

    #[test]
    fn test_display() {
        let game = ConnectFour::default();
        let state = play(&game, &[3]);
        let display = state.to_string();

        assert!(display.contains("|...X...|"));
        assert_eq!(display.lines().count(), ROWS + 1);
    }
}
