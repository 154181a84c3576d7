/// A candidate pairing: two item indices, lower index first.
pub type Pair = (usize, usize);

/// Outcome of a successful `add_preference` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Insertion {
    /// The edge was new. `new_relations` closure entries were created,
    /// which is also how much the candidate count dropped.
    Added { new_relations: usize },
    /// Winner already reached loser; nothing changed.
    AlreadyOrdered,
}

impl Insertion {
    pub fn new_relations(&self) -> usize {
        match self {
            Insertion::Added { new_relations } => *new_relations,
            Insertion::AlreadyOrdered => 0,
        }
    }
}

/// Per-item decision counts, as read from the closure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standing<T> {
    pub item: T,
    /// Items this one is known to beat (directly or transitively).
    pub wins: usize,
    /// Items known to beat this one.
    pub losses: usize,
    /// Every other item is ordered against this one; its position is fixed.
    pub settled: bool,
}

impl<T> Standing<T> {
    /// Wins minus losses.
    pub fn balance(&self) -> i64 {
        self.wins as i64 - self.losses as i64
    }
}
