//! Rollout policies for MCTS simulation.
//!
//! A rollout plays a state forward to a terminal state by repeatedly asking
//! the active policy which legal action to take:
//! - `Default` always takes the first action (reproducible tests)
//! - `Random` samples uniformly with an injectable generator
//! - `Custom` defers to a caller-supplied function

use crate::config::{MctsConfig, RolloutPolicyKind};
use arbor_core::{Domain, Result, SearchError, State};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use tracing::warn;

/// Caller-supplied rollout function.
///
/// Receives the state and its legal actions and returns the index of the
/// action to play. Indices are reduced modulo the number of actions.
pub type CustomPolicyFn<D> =
    Box<dyn FnMut(&<D as Domain>::State, &[<D as Domain>::Action]) -> usize>;

/// Strategy selecting an action at each rollout step.
pub enum RolloutPolicy<D: Domain> {
    /// Always the first legal action.
    Default,

    /// A uniformly sampled legal action.
    Random(Box<dyn RngCore>),

    /// Caller-supplied policy.
    Custom(CustomPolicyFn<D>),
}

/// Outcome of a single rollout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rollout {
    /// Terminal value of the final state.
    pub value: f64,

    /// Number of actions played.
    pub depth: usize,

    /// True if the rollout stopped on an empty action list for a state
    /// the domain did not report as terminal.
    pub contract_violation: bool,
}

impl<D: Domain> RolloutPolicy<D> {
    /// Random policy driven by the given generator.
    pub fn random<R: RngCore + 'static>(rng: R) -> Self {
        Self::Random(Box::new(rng))
    }

    /// Random policy with a ChaCha8 generator seeded from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::random(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Random policy with a ChaCha8 generator seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self::random(ChaCha8Rng::from_entropy())
    }

    /// Custom policy from a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: FnMut(&D::State, &[D::Action]) -> usize + 'static,
    {
        Self::Custom(Box::new(f))
    }

    /// Build the policy selected by `config`.
    ///
    /// # Errors
    /// Returns `SearchError::MissingCustomPolicy` for `RolloutPolicyKind::Custom`,
    /// which needs a function that a configuration cannot carry.
    pub fn from_config(config: &MctsConfig) -> Result<Self> {
        match config.rollout_policy {
            RolloutPolicyKind::Default => Ok(Self::Default),
            RolloutPolicyKind::Random => Ok(match config.seed {
                Some(seed) => Self::seeded(seed),
                None => Self::from_entropy(),
            }),
            RolloutPolicyKind::Custom => Err(SearchError::MissingCustomPolicy),
        }
    }

    /// The selector this policy corresponds to.
    pub fn kind(&self) -> RolloutPolicyKind {
        match self {
            Self::Default => RolloutPolicyKind::Default,
            Self::Random(_) => RolloutPolicyKind::Random,
            Self::Custom(_) => RolloutPolicyKind::Custom,
        }
    }

    /// Index of the action to play among `actions` (non-empty).
    fn choose(&mut self, state: &D::State, actions: &[D::Action]) -> usize {
        match self {
            Self::Default => 0,
            Self::Random(rng) => rng.gen_range(0..actions.len()),
            Self::Custom(f) => f(state, actions) % actions.len(),
        }
    }

    /// Play `state` forward until a terminal state and score it.
    ///
    /// A state for which the domain returns no actions is scored as an
    /// implicit terminal even if neither terminal test reports it.
    pub fn rollout(&mut self, domain: &D, state: &D::State) -> Rollout {
        let mut state = state.clone();
        let mut depth = 0;
        let mut contract_violation = false;

        while !(state.is_terminal() || domain.is_terminal(&state)) {
            let actions = domain.legal_actions(&state);
            if actions.is_empty() {
                warn!(
                    ?state,
                    depth,
                    "domain returned no actions for a non-terminal state; scoring it as terminal"
                );
                contract_violation = true;
                break;
            }

            let idx = self.choose(&state, &actions);
            state = domain.apply(&state, &actions[idx]);
            depth += 1;
        }

        Rollout {
            value: domain.terminal_value(&state),
            depth,
            contract_violation,
        }
    }
}

impl<D: Domain> fmt::Debug for RolloutPolicy<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "RolloutPolicy::Default"),
            Self::Random(_) => write!(f, "RolloutPolicy::Random"),
            Self::Custom(_) => write!(f, "RolloutPolicy::Custom"),
        }
    }
}
