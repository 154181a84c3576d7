/// Error types for the preference graph, candidate selection and sessions.
use thiserror::Error;

/// Rejected graph mutations. Every variant leaves the graph unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The loser already reaches the winner, so the edge would close a cycle.
    #[error("preference {winner} over {loser} contradicts an earlier decision")]
    Cycle { winner: usize, loser: usize },

    #[error("item {0} cannot be preferred over itself")]
    SelfPreference(usize),

    #[error("unknown item index {index} (graph has {item_count} items)")]
    UnknownItem { index: usize, item_count: usize },
}

/// Failures of a single `select_next` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Every pair is decided. Normal end of the comparison phase.
    #[error("no candidate pairs left, the tournament is complete")]
    NoCandidates,

    /// The candidate stream ended before the drawn position.
    #[error("candidate set changed during selection: expected at least {expected} candidates, stream ended after {reached}")]
    ConcurrentModification { expected: usize, reached: usize },

    /// The chooser returned a pair that is not an undecided pair of this graph.
    #[error("chooser returned ({first}, {second}), which is not an undecided pair")]
    InvalidPair { first: usize, second: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate item at position {index}")]
    DuplicateItem { index: usize },
}

/// Errors surfaced to the presentation layer by a `Session`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("item is not registered in this session")]
    UnknownItem,
}

impl SessionError {
    /// True when the error only means the tournament is finished.
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionError::Select(SelectError::NoCandidates))
    }

    /// True when the error is a rejected contradictory decision.
    pub fn is_cycle(&self) -> bool {
        matches!(self, SessionError::Graph(GraphError::Cycle { .. }))
    }
}
