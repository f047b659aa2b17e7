//! MCTS node types for tree storage.
//!
//! Uses arena allocation with indices so that children and the parent
//! back-reference never form an ownership cycle.

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
/// Using indices instead of pointers avoids Rc/RefCell overhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The tree root is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// Lifecycle of a node. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodePhase {
    /// Created by expansion, never rolled out.
    Unvisited,

    /// Visited at least once, children not materialised.
    LeafVisited,

    /// Children materialised. Never reached by terminal nodes.
    Expanded,
}

/// Statistics for a single MCTS node.
#[derive(Clone, Debug, Default)]
pub struct NodeStats {
    /// Number of simulations that passed through or started at this node.
    pub visits: u32,

    /// Sum of (sign-adjusted) rollout values.
    pub value_sum: f64,
}

impl NodeStats {
    /// Mean value for this node.
    ///
    /// Returns 0.0 if the node has never been visited.
    pub fn average_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }
}

/// A node in the MCTS tree.
///
/// Each node exclusively owns the state it represents.
#[derive(Clone, Debug)]
pub struct Node<S, A> {
    /// State reached at this node.
    pub state: S,

    /// Visit and value statistics.
    pub stats: NodeStats,

    /// Children in the enumeration order of the legal actions.
    pub children: Vec<NodeId>,

    /// Parent node (None for the tree root).
    pub parent: Option<NodeId>,

    /// Action that led to this node (None for the tree root).
    pub entry_action: Option<A>,

    phase: NodePhase,
}

impl<S, A> Node<S, A> {
    /// Create the tree root. Its visit count is preset to 1.
    pub fn root(state: S) -> Self {
        Self {
            state,
            stats: NodeStats {
                visits: 1,
                value_sum: 0.0,
            },
            children: Vec::new(),
            parent: None,
            entry_action: None,
            phase: NodePhase::LeafVisited,
        }
    }

    /// Create an unvisited child reached from `parent` through `action`.
    pub fn child(state: S, parent: NodeId, action: A) -> Self {
        Self {
            state,
            stats: NodeStats::default(),
            children: Vec::new(),
            parent: Some(parent),
            entry_action: Some(action),
            phase: NodePhase::Unvisited,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> NodePhase {
        self.phase
    }

    /// Record one simulation result.
    pub fn record(&mut self, value: f64) {
        self.stats.visits += 1;
        self.stats.value_sum += value;
        if self.phase == NodePhase::Unvisited {
            self.phase = NodePhase::LeafVisited;
        }
    }

    /// Mark the node expanded once children exist.
    pub(crate) fn mark_expanded(&mut self) {
        debug_assert!(self.phase == NodePhase::LeafVisited);
        debug_assert!(!self.children.is_empty());
        self.phase = NodePhase::Expanded;
    }

    pub fn average_value(&self) -> f64 {
        self.stats.average_value()
    }
}
