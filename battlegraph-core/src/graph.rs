/// Preference graph with an incrementally maintained transitive closure.
///
/// Nodes are registry indices `0..N`. An edge `a -> b` means "a preferred
/// over b". The closure of every node is updated on each insertion, so reads
/// never recompute reachability and the number of undecided pairs is a
/// counter lookup.
use std::collections::BTreeSet;
use std::iter;

use crate::error::GraphError;
use crate::types::{Insertion, Pair};

#[derive(Debug, Clone, Default)]
pub struct PreferenceGraph {
    /// successors[a] = every item a reaches (a's closure).
    successors: Vec<BTreeSet<usize>>,
    /// predecessors[b] = every item that reaches b. Mirror of `successors`.
    predecessors: Vec<BTreeSet<usize>>,
    /// Decisions recorded through `add_preference` that changed the closure.
    direct_edges: BTreeSet<Pair>,
    /// Sum of closure sizes. The graph is acyclic, so this is also the
    /// number of unordered pairs whose order is known.
    relation_count: usize,
}

impl PreferenceGraph {
    /// A graph over `item_count` items and no edges.
    pub fn new(item_count: usize) -> Self {
        PreferenceGraph {
            successors: vec![BTreeSet::new(); item_count],
            predecessors: vec![BTreeSet::new(); item_count],
            direct_edges: BTreeSet::new(),
            relation_count: 0,
        }
    }

    /// Append an isolated item and return its index.
    pub fn add_item(&mut self) -> usize {
        self.successors.push(BTreeSet::new());
        self.predecessors.push(BTreeSet::new());
        self.successors.len() - 1
    }

    pub fn item_count(&self) -> usize {
        self.successors.len()
    }

    /// Record that `winner` is preferred over `loser` and extend the closure.
    ///
    /// Every item that reaches `winner` (and `winner` itself) now reaches
    /// `loser` and everything `loser` reaches. Work is proportional to the
    /// product of those two sets, not to the whole pair space.
    ///
    /// Returns `AlreadyOrdered` without touching anything if `winner` already
    /// reaches `loser`. Fails with `Cycle` if `loser` already reaches
    /// `winner`; the graph is unchanged in that case.
    pub fn add_preference(&mut self, winner: usize, loser: usize) -> Result<Insertion, GraphError> {
        self.check_index(winner)?;
        self.check_index(loser)?;
        if winner == loser {
            return Err(GraphError::SelfPreference(winner));
        }

        if self.reaches(loser, winner) {
            tracing::debug!(winner, loser, "rejected preference, it would close a cycle");
            return Err(GraphError::Cycle { winner, loser });
        }
        if self.reaches(winner, loser) {
            tracing::trace!(winner, loser, "preference already implied");
            return Ok(Insertion::AlreadyOrdered);
        }

        let sources: Vec<usize> = iter::once(winner)
            .chain(self.predecessors[winner].iter().copied())
            .collect();
        let targets: Vec<usize> = iter::once(loser)
            .chain(self.successors[loser].iter().copied())
            .collect();

        let mut new_relations = 0;
        for &source in &sources {
            for &target in &targets {
                if self.successors[source].insert(target) {
                    self.predecessors[target].insert(source);
                    new_relations += 1;
                }
            }
        }

        self.direct_edges.insert((winner, loser));
        self.relation_count += new_relations;

        tracing::trace!(winner, loser, new_relations, "recorded preference");
        tracing::debug!(
            relations = self.relation_count,
            max_relations = self.max_relation_count(),
            decided_percent = self.decided_fraction() * 100.0,
            "closure updated"
        );

        Ok(Insertion::Added { new_relations })
    }

    /// True if there is a directed path `a -> ... -> b`.
    pub fn reaches(&self, a: usize, b: usize) -> bool {
        self.successors.get(a).is_some_and(|closure| closure.contains(&b))
    }

    /// True if the relative order of `a` and `b` is known in either direction.
    pub fn is_ordered(&self, a: usize, b: usize) -> bool {
        self.reaches(a, b) || self.reaches(b, a)
    }

    /// Number of decisions that were recorded as edges.
    pub fn direct_edge_count(&self) -> usize {
        self.direct_edges.len()
    }

    /// Recorded decisions as `(winner, loser)`, ordered by winner then loser.
    pub fn direct_edges(&self) -> impl Iterator<Item = Pair> + '_ {
        self.direct_edges.iter().copied()
    }

    /// Number of ordered pairs (closure entries).
    pub fn relation_count(&self) -> usize {
        self.relation_count
    }

    /// Number of unordered pairs of distinct items: n(n-1)/2.
    pub fn max_relation_count(&self) -> usize {
        let n = self.item_count();
        n * n.saturating_sub(1) / 2
    }

    /// Share of all pairs whose order is known. 1.0 for graphs with fewer
    /// than two items.
    pub fn decided_fraction(&self) -> f64 {
        let max = self.max_relation_count();
        if max == 0 {
            return 1.0;
        }
        self.relation_count as f64 / max as f64
    }

    /// Items `item` is known to beat.
    pub fn successors(&self, item: usize) -> impl Iterator<Item = usize> + '_ {
        self.successors.get(item).into_iter().flatten().copied()
    }

    /// Items known to beat `item`.
    pub fn predecessors(&self, item: usize) -> impl Iterator<Item = usize> + '_ {
        self.predecessors.get(item).into_iter().flatten().copied()
    }

    pub(crate) fn successor_set(&self, item: usize) -> Option<&BTreeSet<usize>> {
        self.successors.get(item)
    }

    pub(crate) fn predecessor_set(&self, item: usize) -> Option<&BTreeSet<usize>> {
        self.predecessors.get(item)
    }

    pub fn wins(&self, item: usize) -> usize {
        self.successors.get(item).map_or(0, BTreeSet::len)
    }

    pub fn losses(&self, item: usize) -> usize {
        self.predecessors.get(item).map_or(0, BTreeSet::len)
    }

    /// Wins minus losses.
    pub fn balance(&self, item: usize) -> i64 {
        self.wins(item) as i64 - self.losses(item) as i64
    }

    /// True once `item` is ordered against every other item.
    pub fn is_settled(&self, item: usize) -> bool {
        item < self.item_count() && self.wins(item) + self.losses(item) + 1 == self.item_count()
    }

    /// True when no undecided pair is left.
    pub fn is_complete(&self) -> bool {
        self.relation_count == self.max_relation_count()
    }

    /// Transitive reduction of the closure: the pairs `(a, b)` with `a`
    /// reaching `b` and no item strictly between them. These edges alone
    /// imply the whole closure.
    pub fn reduced_edges(&self) -> Vec<Pair> {
        let mut reduced = Vec::new();
        for (a, closure) in self.successors.iter().enumerate() {
            for &b in closure {
                let implied = closure.iter().any(|&v| v != b && self.successors[v].contains(&b));
                if !implied {
                    reduced.push((a, b));
                }
            }
        }
        reduced
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), GraphError> {
        if index < self.item_count() {
            Ok(())
        } else {
            Err(GraphError::UnknownItem { index, item_count: self.item_count() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: usize = 0;
    const B: usize = 1;
    const C: usize = 2;
    const D: usize = 3;

    #[test]
    fn test_single_edge() {
        let mut graph = PreferenceGraph::new(2);
        let outcome = graph.add_preference(A, B).unwrap();

        assert_eq!(outcome, Insertion::Added { new_relations: 1 });
        assert!(graph.reaches(A, B));
        assert!(!graph.reaches(B, A));
        assert!(graph.is_ordered(B, A));
        assert!(graph.is_complete());
    }

    #[test]
    fn test_chain_propagates_forward() {
        let mut graph = PreferenceGraph::new(3);
        graph.add_preference(A, B).unwrap();
        let outcome = graph.add_preference(B, C).unwrap();

        // B > C plus the implied A > C
        assert_eq!(outcome.new_relations(), 2);
        assert!(graph.reaches(A, C));
        assert_eq!(graph.direct_edge_count(), 2);
        assert_eq!(graph.relation_count(), 3);
    }

    #[test]
    fn test_propagates_backward_to_predecessors() {
        // D > A, then B > C, then A > B. D must reach C through A and B.
        let mut graph = PreferenceGraph::new(4);
        graph.add_preference(D, A).unwrap();
        graph.add_preference(B, C).unwrap();
        let outcome = graph.add_preference(A, B).unwrap();

        // {D, A} x {B, C}
        assert_eq!(outcome.new_relations(), 4);
        assert!(graph.reaches(D, C));
        assert_eq!(graph.predecessors(C).collect::<Vec<_>>(), vec![A, B, D]);
        assert!(graph.is_complete());
    }

    #[test]
    fn test_cycle_rejected_and_graph_unchanged() {
        let mut graph = PreferenceGraph::new(3);
        graph.add_preference(A, B).unwrap();
        graph.add_preference(B, C).unwrap();
        let before = graph.relation_count();

        let err = graph.add_preference(C, A).unwrap_err();

        assert_eq!(err, GraphError::Cycle { winner: C, loser: A });
        assert_eq!(graph.relation_count(), before);
        assert!(!graph.reaches(C, A));
        assert_eq!(graph.direct_edge_count(), 2);
    }

    #[test]
    fn test_repeated_and_implied_edges_are_noops() {
        let mut graph = PreferenceGraph::new(3);
        graph.add_preference(A, B).unwrap();
        graph.add_preference(B, C).unwrap();

        assert_eq!(graph.add_preference(A, B).unwrap(), Insertion::AlreadyOrdered);
        assert_eq!(graph.add_preference(A, C).unwrap(), Insertion::AlreadyOrdered);
        assert_eq!(graph.direct_edge_count(), 2);
        assert_eq!(graph.relation_count(), 3);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut graph = PreferenceGraph::new(2);
        assert_eq!(graph.add_preference(A, A).unwrap_err(), GraphError::SelfPreference(A));
        assert_eq!(
            graph.add_preference(A, 5).unwrap_err(),
            GraphError::UnknownItem { index: 5, item_count: 2 }
        );
        assert_eq!(graph.relation_count(), 0);
    }

    #[test]
    fn test_wins_losses_and_settled() {
        let mut graph = PreferenceGraph::new(4);
        graph.add_preference(A, B).unwrap();
        graph.add_preference(B, C).unwrap();

        assert_eq!((graph.wins(A), graph.losses(A)), (2, 0));
        assert_eq!((graph.wins(C), graph.losses(C)), (0, 2));
        assert_eq!(graph.balance(B), 0);
        assert!(!graph.is_settled(A));

        graph.add_preference(C, D).unwrap();
        assert!(graph.is_settled(A));
        assert!(graph.is_settled(D));
    }

    #[test]
    fn test_add_item_grows_pair_space() {
        let mut graph = PreferenceGraph::new(2);
        graph.add_preference(A, B).unwrap();
        assert!(graph.is_complete());

        let c = graph.add_item();
        assert_eq!(c, C);
        assert_eq!(graph.max_relation_count(), 3);
        assert!(!graph.is_complete());
    }

    #[test]
    fn test_reduced_edges_drop_implied_pairs() {
        let mut graph = PreferenceGraph::new(4);
        graph.add_preference(A, C).unwrap();
        graph.add_preference(A, B).unwrap();
        graph.add_preference(B, C).unwrap();
        graph.add_preference(C, D).unwrap();

        assert_eq!(graph.reduced_edges(), vec![(A, B), (B, C), (C, D)]);
    }

    #[test]
    fn test_decided_fraction() {
        let mut graph = PreferenceGraph::new(3);
        assert_eq!(graph.decided_fraction(), 0.0);
        graph.add_preference(A, B).unwrap();
        assert!((graph.decided_fraction() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(PreferenceGraph::new(1).decided_fraction(), 1.0);
    }
}
