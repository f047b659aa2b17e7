//! MCTS configuration parameters.
//!
//! These parameters control the behavior of the Monte Carlo Tree Search algorithm.

use serde::{Deserialize, Serialize};

/// Exploration constant `C` of the UCB1 formula.
pub const DEFAULT_EXPLORATION_CONSTANT: f64 = 2.0;

/// Selector for the policy used to pick actions during rollouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloutPolicyKind {
    /// Always pick the first legal action (deterministic, for testing).
    Default,

    /// Pick a legal action uniformly at random.
    #[default]
    Random,

    /// Caller-supplied policy function.
    Custom,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// UCB1 exploration constant.
    /// Higher values favour rarely visited children, lower values favour
    /// children with a high average value.
    pub exploration_constant: f64,

    /// Rollout policy to build when constructing from configuration.
    pub rollout_policy: RolloutPolicyKind,

    /// Seed for the random rollout policy.
    /// `None` seeds the generator from system entropy.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration_constant: DEFAULT_EXPLORATION_CONSTANT,
            rollout_policy: RolloutPolicyKind::Random,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Create a config with the given rollout policy.
    pub fn with_policy(rollout_policy: RolloutPolicyKind) -> Self {
        Self {
            rollout_policy,
            ..Default::default()
        }
    }

    /// Create a config with a seeded random rollout policy.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rollout_policy: RolloutPolicyKind::Random,
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Create a fully deterministic config (first-action rollouts).
    pub fn deterministic() -> Self {
        Self::with_policy(RolloutPolicyKind::Default)
    }
}
