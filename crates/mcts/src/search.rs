//! Monte Carlo Tree Search implementation.
//!
//! Each iteration walks down from the committed node with UCB1, expands a
//! node that has already been rolled out once, plays a rollout to a terminal
//! state and folds the terminal value back up to the committed node.

use crate::{
    config::MctsConfig,
    node::{NodeId, NodePhase},
    rollout::RolloutPolicy,
    tree::Tree,
    ucb::ucb1,
};
use arbor_core::{Domain, Result, SearchError, State};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Search statistics for one action available at the committed state.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionStats<A> {
    /// The action leading to the child.
    pub action: A,

    /// Visits of the child.
    pub visits: u32,

    /// Average value of the child (0.0 if never visited).
    pub average_value: f64,
}

/// Monte Carlo Tree Search over a persistent tree with UCB1 selection.
///
/// Generic over the domain `D` being searched. The tree is rooted at the
/// domain's initial state; `take_action` commits to a child and later
/// searches start from there.
pub struct Mcts<D: Domain> {
    domain: D,
    config: MctsConfig,
    policy: RolloutPolicy<D>,
    tree: Tree<D::State, D::Action>,
    contract_violations: usize,
}

impl<D: Domain> Mcts<D> {
    /// Create a new MCTS instance with the default configuration.
    pub fn new(domain: D, policy: RolloutPolicy<D>) -> Self {
        let config = MctsConfig {
            rollout_policy: policy.kind(),
            ..Default::default()
        };
        Self::with_config(domain, config, policy)
    }

    /// Create a new MCTS instance with an explicit configuration and policy.
    ///
    /// The policy given here takes precedence over `config.rollout_policy`.
    pub fn with_config(domain: D, config: MctsConfig, policy: RolloutPolicy<D>) -> Self {
        let tree = Tree::new(domain.initial_state());
        Self {
            domain,
            config,
            policy,
            tree,
            contract_violations: 0,
        }
    }

    /// Create a new MCTS instance, building the rollout policy from `config`.
    ///
    /// # Errors
    /// Returns `SearchError::MissingCustomPolicy` if the configuration selects
    /// the custom policy; use [`Mcts::with_config`] with
    /// [`RolloutPolicy::custom`] instead.
    pub fn from_config(domain: D, config: MctsConfig) -> Result<Self> {
        let policy = RolloutPolicy::from_config(&config)?;
        Ok(Self::with_config(domain, config, policy))
    }

    /// Run `iterations` search iterations sequentially.
    pub fn search_for_iterations(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.search();
        }
        debug!(iterations, nodes = self.tree.len(), "search finished");
    }

    /// Run search iterations until `duration` has elapsed.
    ///
    /// The deadline is only checked between iterations, so an iteration in
    /// flight always completes. Returns the number of iterations run.
    pub fn search_for_duration(&mut self, duration: Duration) -> usize {
        let deadline = Instant::now() + duration;
        let mut iterations = 0;

        while Instant::now() < deadline {
            self.search();
            iterations += 1;
        }

        debug!(
            iterations,
            millis = duration.as_millis() as u64,
            nodes = self.tree.len(),
            "timed search finished"
        );
        iterations
    }

    /// Run a single iteration: select -> expand -> rollout -> backpropagate.
    pub fn search(&mut self) {
        let current = self.tree.current();
        let start_agent = self.tree.get(current).state.agent();

        let leaf = self.select();
        let scout = self.expand(leaf);
        let value = self.simulate(scout);
        self.backpropagate(scout, value, &start_agent);

        trace!(leaf = ?leaf, scout = ?scout, value, "iteration complete");
    }

    /// Actions available at the committed state, best average value first.
    ///
    /// Materialises the children of the committed node first if needed.
    /// Actions with equal averages keep their enumeration order. Empty if
    /// the committed state is terminal.
    pub fn get_actions(&mut self) -> Vec<D::Action> {
        self.ensure_children();
        self.ranked_children()
            .into_iter()
            .filter_map(|id| self.tree.get(id).entry_action.clone())
            .collect()
    }

    /// Per-action statistics, in the same order as [`Mcts::get_actions`].
    pub fn action_stats(&mut self) -> Vec<ActionStats<D::Action>> {
        self.ensure_children();
        self.ranked_children()
            .into_iter()
            .filter_map(|id| {
                let node = self.tree.get(id);
                node.entry_action.clone().map(|action| ActionStats {
                    action,
                    visits: node.stats.visits,
                    average_value: node.average_value(),
                })
            })
            .collect()
    }

    /// Commit to `action`, making its child the new committed node.
    ///
    /// # Errors
    /// Returns `SearchError::MissingTransition` if no child of the committed
    /// node was reached through an action equal to `action`. The committed
    /// node is left unchanged in that case.
    pub fn take_action(&mut self, action: &D::Action) -> Result<()> {
        self.ensure_children();

        let current = self.tree.current();
        let child = self
            .tree
            .get(current)
            .children
            .iter()
            .copied()
            .find(|&id| self.tree.get(id).entry_action.as_ref() == Some(action))
            .ok_or_else(|| SearchError::missing_transition(action))?;

        self.tree.set_current(child);
        debug!(?action, nodes = self.tree.len(), "advanced committed node");
        Ok(())
    }

    /// The committed state.
    pub fn current_state(&self) -> &D::State {
        &self.tree.get(self.tree.current()).state
    }

    /// The state the tree was created from.
    pub fn root_state(&self) -> &D::State {
        &self.tree.root().state
    }

    /// Actions committed so far, from the root to the committed node.
    pub fn history(&self) -> Vec<D::Action> {
        self.tree.path_actions(self.tree.current())
    }

    /// Total nodes allocated. Nodes are never freed while the engine lives.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// Visits recorded at the committed node.
    pub fn current_visits(&self) -> u32 {
        self.tree.get(self.tree.current()).stats.visits
    }

    /// Times the domain returned no actions for a state it did not report
    /// as terminal.
    pub fn contract_violations(&self) -> usize {
        self.contract_violations
    }

    /// The domain being searched.
    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    fn is_terminal(&self, state: &D::State) -> bool {
        state.is_terminal() || self.domain.is_terminal(state)
    }

    /// Walk down from the committed node.
    ///
    /// Stops at the first unvisited child found, otherwise moves to the child
    /// with the strictly greatest UCB1 score, until a node without children.
    fn select(&self) -> NodeId {
        let c = self.config.exploration_constant;
        let mut scout = self.tree.current();

        loop {
            let node = self.tree.get(scout);
            let parent_visits = node.stats.visits;
            let mut best: Option<(NodeId, f64)> = None;

            for &child_id in &node.children {
                let child = self.tree.get(child_id);
                if child.stats.visits == 0 {
                    return child_id;
                }

                let score = ucb1(child.average_value(), c, parent_visits, child.stats.visits);
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((child_id, score));
                }
            }

            match best {
                Some((child_id, _)) => scout = child_id,
                None => return scout,
            }
        }
    }

    /// Materialise the children of a visited, non-terminal leaf.
    ///
    /// Returns the first new child, or `id` itself if nothing was created.
    fn expand(&mut self, id: NodeId) -> NodeId {
        let node = self.tree.get(id);
        if node.phase() != NodePhase::LeafVisited || self.is_terminal(&node.state) {
            return id;
        }

        let actions = self.domain.legal_actions(&node.state);
        if actions.is_empty() {
            warn!(
                state = ?node.state,
                "domain returned no actions for a non-terminal state; leaving it unexpanded"
            );
            self.contract_violations += 1;
            return id;
        }

        let children: Vec<(D::State, D::Action)> = actions
            .into_iter()
            .map(|action| (self.domain.apply(&node.state, &action), action))
            .collect();

        let mut first = None;
        for (state, action) in children {
            let child_id = self.tree.add_child(id, state, action);
            first.get_or_insert(child_id);
        }
        self.tree.get_mut(id).mark_expanded();

        trace!(
            node = ?id,
            children = self.tree.get(id).children.len(),
            "expanded node"
        );
        first.unwrap_or(id)
    }

    /// Roll out from `id` and return the terminal value.
    fn simulate(&mut self, id: NodeId) -> f64 {
        let rollout = self.policy.rollout(&self.domain, &self.tree.get(id).state);
        if rollout.contract_violation {
            self.contract_violations += 1;
        }
        rollout.value
    }

    /// Fold `value` into every node from `id` up to the committed node.
    ///
    /// A node whose parent is acted on by `start_agent` receives the value
    /// unchanged, any other node receives its negation. The tree root has no
    /// parent and is credited like the starting agent.
    fn backpropagate(&mut self, id: NodeId, value: f64, start_agent: &<D::State as State>::Agent) {
        let current = self.tree.current();
        let mut cursor = id;

        loop {
            let parent = self.tree.get(cursor).parent;
            let signed = match parent {
                Some(parent) if self.tree.get(parent).state.agent() != *start_agent => -value,
                _ => value,
            };
            self.tree.get_mut(cursor).record(signed);

            if cursor == current {
                break;
            }
            match parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
    }

    /// Make sure the committed node has children, unless it is terminal.
    ///
    /// A committed node that was never visited is rolled out once first so
    /// that it can be expanded.
    fn ensure_children(&mut self) {
        let current = self.tree.current();
        let node = self.tree.get(current);
        if !node.children.is_empty() || self.is_terminal(&node.state) {
            return;
        }

        if node.stats.visits == 0 {
            let start_agent = node.state.agent();
            let value = self.simulate(current);
            self.backpropagate(current, value, &start_agent);
        }
        self.expand(current);
    }

    /// Children of the committed node by descending average value (stable).
    fn ranked_children(&self) -> Vec<NodeId> {
        let mut children = self.tree.get(self.tree.current()).children.clone();
        children.sort_by(|a, b| {
            let a = self.tree.get(*a).average_value();
            let b = self.tree.get(*b).average_value();
            b.partial_cmp(&a).unwrap_or(Ordering::Equal)
        });
        children
    }
}

impl<D: Domain + Default> Default for Mcts<D> {
    /// Default domain with an entropy-seeded random rollout policy.
    fn default() -> Self {
        Self::new(D::default(), RolloutPolicy::from_entropy())
    }
}
