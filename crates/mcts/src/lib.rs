//! Monte Carlo Tree Search over any `arbor_core::Domain`.
//!
//! # Features
//!
//! - **Generic**: Works with any `Domain` implementation
//! - **UCB1 Selection**: Unvisited children first, then the highest UCB1 score
//! - **Lazy Expansion**: A leaf gets children on its second visit
//! - **Rollout Policies**: First action, seeded random, or a custom function
//! - **Committed Play**: `take_action` moves the search root and keeps statistics
//!
//! # Example
//!
//! ```
//! use arbor_mcts::{games::{Player, TicTacToe}, Mcts, RolloutPolicy, State};
//!
//! let game = TicTacToe::new(Player::X);
//! let mut mcts = Mcts::new(game, RolloutPolicy::seeded(42));
//!
//! mcts.search_for_iterations(200);
//! let ranked = mcts.get_actions();
//! println!("Best action: {}", ranked[0]);
//!
//! mcts.take_action(&ranked[0]).expect("ranked actions are legal");
//! assert_eq!(mcts.current_state().agent(), Player::O);
//! ```

pub mod config;
pub mod games;
mod node;
pub mod rollout;
pub mod search;
mod tree;
pub mod ucb;

pub use arbor_core::{Domain, Result, SearchError, State};
pub use config::{MctsConfig, RolloutPolicyKind, DEFAULT_EXPLORATION_CONSTANT};
pub use rollout::{CustomPolicyFn, Rollout, RolloutPolicy};
pub use search::{ActionStats, Mcts};
pub use ucb::ucb1;
