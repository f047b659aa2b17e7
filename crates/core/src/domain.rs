use std::fmt::Debug;

/// A state of a sequential decision process.
///
/// The engine treats states as opaque values except for two observable
/// properties: whether the state is terminal and which agent acts in it.
pub trait State: Clone + PartialEq + Debug {
    /// Identifier of an acting party (player, side, colour).
    type Agent: Clone + PartialEq + Debug;

    /// Returns true if the state itself knows it is terminal.
    ///
    /// The engine also consults [`Domain::is_terminal`]; either test
    /// returning true ends expansion and rollout at this state.
    fn is_terminal(&self) -> bool;

    /// The agent whose turn it is at this state.
    fn agent(&self) -> Self::Agent;
}

/// A pluggable model of a finite, perfect-information decision process.
///
/// All methods must be referentially transparent: equal inputs always
/// produce equal outputs. The engine relies on this and does not verify it.
/// Concrete games are independent implementations of this trait.
pub trait Domain {
    /// The domain state (e.g. a board position)
    type State: State;

    /// A transition between two states (e.g. placing a mark)
    type Action: Clone + PartialEq + Debug;

    /// Returns the state the process starts from
    fn initial_state(&self) -> Self::State;

    /// Returns every action allowed from `state`, in a stable order.
    ///
    /// Must be empty if and only if `state` is terminal.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies an action, returning a new state (immutable operation)
    fn apply(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Returns true if no further actions can be taken from `state`
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Scores a terminal state.
    ///
    /// Only meaningful for terminal states. The engine adds this value to
    /// nodes whose parent is acted on by the agent a search started from and
    /// subtracts it elsewhere, so domains should score from the perspective
    /// of the agent the engine is deciding for.
    fn terminal_value(&self, state: &Self::State) -> f64;
}
