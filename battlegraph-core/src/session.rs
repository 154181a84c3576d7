/// Tournament session: the interface the presentation layer talks to.
///
/// A session owns the item registry, the preference graph and one chooser.
/// Callers work with their own item values; indices stay internal.
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::chooser::CandidateChooser;
use crate::constants::SELECT_RETRY_LIMIT;
use crate::error::{SelectError, SessionError};
use crate::graph::PreferenceGraph;
use crate::registry::ItemRegistry;
use crate::types::{Insertion, Pair, Standing};

#[derive(Debug, Clone)]
pub struct Session<T, C> {
    registry: ItemRegistry<T>,
    graph: PreferenceGraph,
    chooser: C,
    decisions: usize,
}

impl<T, C> Session<T, C>
where
    T: Eq + Hash + Clone,
    C: CandidateChooser,
{
    /// Start a session over `items` with no decisions.
    pub fn new(items: impl IntoIterator<Item = T>, chooser: C) -> Result<Self, SessionError> {
        let registry = ItemRegistry::from_items(items)?;
        let graph = PreferenceGraph::new(registry.count());
        tracing::debug!(
            items = registry.count(),
            candidates = graph.candidate_count(),
            chooser = chooser.name(),
            "session started"
        );
        Ok(Session { registry, graph, chooser, decisions: 0 })
    }

    /// Add an item discovered mid-session. Known items keep their index.
    pub fn add_item(&mut self, item: T) -> usize {
        let idx = self.registry.register(item);
        while self.graph.item_count() < self.registry.count() {
            self.graph.add_item();
        }
        idx
    }

    /// Next pair to present.
    ///
    /// Fails with `NoCandidates` once the tournament is complete. A
    /// `ConcurrentModification` from the chooser is retried once with a
    /// fresh count and stream before it is returned.
    pub fn select_next(&mut self) -> Result<(T, T), SessionError> {
        let (a, b) = self.select_pair()?;
        Ok((self.item(a)?.clone(), self.item(b)?.clone()))
    }

    /// Like `select_next`, but returns registry indices.
    ///
    /// A pair the chooser returns is checked against the graph before it is
    /// handed out; anything but an undecided pair of known items fails with
    /// `InvalidPair`.
    pub fn select_pair(&mut self) -> Result<Pair, SessionError> {
        let mut retries = 0;
        let (first, second) = loop {
            match self.chooser.select_next(&self.graph) {
                Err(SelectError::ConcurrentModification { expected, reached }) if retries < SELECT_RETRY_LIMIT => {
                    retries += 1;
                    tracing::warn!(expected, reached, "candidate set changed during selection, retrying");
                }
                result => break result?,
            }
        };

        if !self.is_candidate(first, second) {
            tracing::warn!(first, second, chooser = self.chooser.name(), "chooser returned a decided or unknown pair");
            return Err(SelectError::InvalidPair { first, second }.into());
        }
        Ok((first, second))
    }

    /// Record that `winner` was preferred over `loser`.
    ///
    /// A decision contradicting earlier ones fails with a cycle error and
    /// changes nothing; the session can continue.
    pub fn record_decision(&mut self, winner: &T, loser: &T) -> Result<Insertion, SessionError> {
        let winner_idx = self.registry.index_of(winner).ok_or(SessionError::UnknownItem)?;
        let loser_idx = self.registry.index_of(loser).ok_or(SessionError::UnknownItem)?;
        self.record_indices(winner_idx, loser_idx)
    }

    /// Like `record_decision`, with registry indices.
    pub fn record_indices(&mut self, winner: usize, loser: usize) -> Result<Insertion, SessionError> {
        let outcome = self.graph.add_preference(winner, loser)?;
        self.decisions += 1;
        Ok(outcome)
    }

    /// Undecided pairs left, for progress display.
    pub fn remaining_count(&self) -> usize {
        self.graph.candidate_count()
    }

    pub fn is_complete(&self) -> bool {
        self.graph.is_complete()
    }

    /// Successful `record_decision` calls so far.
    pub fn decisions(&self) -> usize {
        self.decisions
    }

    /// Wins, losses and settled flag for every item, in registry order.
    pub fn standings(&self) -> Vec<Standing<T>> {
        self.registry
            .items()
            .iter()
            .enumerate()
            .map(|(idx, item)| Standing {
                item: item.clone(),
                wins: self.graph.wins(idx),
                losses: self.graph.losses(idx),
                settled: self.graph.is_settled(idx),
            })
            .collect()
    }

    pub fn graph(&self) -> &PreferenceGraph {
        &self.graph
    }

    pub fn registry(&self) -> &ItemRegistry<T> {
        &self.registry
    }

    pub fn chooser(&self) -> &C {
        &self.chooser
    }

    fn is_candidate(&self, first: usize, second: usize) -> bool {
        self.graph.check_index(first).is_ok()
            && self.graph.check_index(second).is_ok()
            && first != second
            && !self.graph.is_ordered(first, second)
    }

    fn item(&self, idx: usize) -> Result<&T, SessionError> {
        self.registry.get(idx).ok_or(SessionError::UnknownItem)
    }
}

/// A session shared between threads.
///
/// Every call holds the lock for its whole duration, so a selection's
/// count and stream always see the same graph state.
#[derive(Debug)]
pub struct SharedSession<T, C> {
    inner: Arc<Mutex<Session<T, C>>>,
}

impl<T, C> Clone for SharedSession<T, C> {
    fn clone(&self) -> Self {
        SharedSession { inner: Arc::clone(&self.inner) }
    }
}

impl<T, C> SharedSession<T, C>
where
    T: Eq + Hash + Clone,
    C: CandidateChooser,
{
    pub fn new(session: Session<T, C>) -> Self {
        SharedSession { inner: Arc::new(Mutex::new(session)) }
    }

    pub fn select_next(&self) -> Result<(T, T), SessionError> {
        self.lock().select_next()
    }

    pub fn record_decision(&self, winner: &T, loser: &T) -> Result<Insertion, SessionError> {
        self.lock().record_decision(winner, loser)
    }

    pub fn remaining_count(&self) -> usize {
        self.lock().remaining_count()
    }

    pub fn is_complete(&self) -> bool {
        self.lock().is_complete()
    }

    pub fn standings(&self) -> Vec<Standing<T>> {
        self.lock().standings()
    }

    /// Run `f` with exclusive access, e.g. to select and record atomically.
    pub fn with<R>(&self, f: impl FnOnce(&mut Session<T, C>) -> R) -> R {
        f(&mut self.lock())
    }

    // Graph mutations validate before writing, so a panic in another holder
    // never leaves a half-applied insertion behind.
    fn lock(&self) -> MutexGuard<'_, Session<T, C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
