use thiserror::Error;

/// Errors reported by the search engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// No child of the current node was reached through the given action.
    #[error("No transition from the current state for action {action}")]
    MissingTransition { action: String },

    /// The custom rollout policy was selected but no policy function was given.
    #[error("Custom rollout policy selected without a policy function")]
    MissingCustomPolicy,
}

impl SearchError {
    /// Build a `MissingTransition` error from any debuggable action.
    pub fn missing_transition<A: std::fmt::Debug>(action: &A) -> Self {
        Self::MissingTransition {
            action: format!("{:?}", action),
        }
    }
}

/// Convenience Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
