//! Arena-allocated MCTS tree.
//!
//! Using a Vec<Node> with indices provides better cache locality
//! and simpler ownership compared to Rc<RefCell<Node>>.

use crate::node::{Node, NodeId};

/// Arena-allocated search tree with a committed `current` node.
///
/// Nodes are stored in a contiguous vector and referenced by index.
/// They are never removed: committing an action moves `current` to a
/// child and leaves siblings and ancestors allocated.
#[derive(Debug)]
pub struct Tree<S, A> {
    nodes: Vec<Node<S, A>>,
    current: NodeId,
}

impl<S, A> Tree<S, A> {
    /// Create a new tree holding only a root for `state`.
    pub fn new(state: S) -> Self {
        Self {
            nodes: vec![Node::root(state)],
            current: NodeId::ROOT,
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node<S, A> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<S, A> {
        &mut self.nodes[id.0]
    }

    /// Add a child under `parent`, returning its ID.
    pub fn add_child(&mut self, parent: NodeId, state: S, action: A) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::child(state, parent, action));
        self.get_mut(parent).children.push(id);
        id
    }

    /// The committed node searches start from.
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Move the committed node.
    pub fn set_current(&mut self, id: NodeId) {
        debug_assert!(id.0 < self.nodes.len());
        self.current = id;
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Get the root node.
    pub fn root(&self) -> &Node<S, A> {
        self.get(NodeId::ROOT)
    }

    /// True if `id` can be reached from `ancestor` by following child links.
    #[cfg(test)]
    pub fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = self.get(node).parent;
        }
        false
    }
}

impl<S, A: Clone> Tree<S, A> {
    /// Entry actions on the path from the root down to `id`.
    pub fn path_actions(&self, id: NodeId) -> Vec<A> {
        let mut actions = Vec::new();
        let mut cursor = id;
        while let Some(parent) = self.get(cursor).parent {
            if let Some(action) = &self.get(cursor).entry_action {
                actions.push(action.clone());
            }
            cursor = parent;
        }
        actions.reverse();
        actions
    }
}
