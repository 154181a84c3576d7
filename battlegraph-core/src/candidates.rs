/// Candidate enumeration: the undecided pairs of a `PreferenceGraph`.
///
/// The count comes from the graph's relation counter. The pairs come from a
/// lazy iterator that walks item indices in ascending order and filters
/// through the closure, so a fresh stream is cheap to create and two streams
/// over the same graph state yield the same sequence.
use std::iter::FusedIterator;

use crate::error::GraphError;
use crate::graph::PreferenceGraph;
use crate::types::Pair;

impl PreferenceGraph {
    /// Number of undecided pairs. Always equals the length of `candidates()`.
    pub fn candidate_count(&self) -> usize {
        self.max_relation_count() - self.relation_count()
    }

    /// Lazy stream of undecided pairs `(a, b)` with `a < b`, ordered by `a`
    /// then `b`.
    pub fn candidates(&self) -> CandidateStream<'_> {
        CandidateStream::new(self, Members::All(self.item_count()))
    }

    /// Undecided pairs whose members both lie in `subset`.
    pub fn candidates_within(&self, subset: &[usize]) -> Result<CandidateStream<'_>, GraphError> {
        for &index in subset {
            self.check_index(index)?;
        }
        let mut members = subset.to_vec();
        members.sort_unstable();
        members.dedup();
        Ok(CandidateStream::new(self, Members::Subset(members)))
    }

    /// Items whose order against `item` is still unknown, ascending.
    pub fn candidates_of(&self, item: usize) -> impl Iterator<Item = usize> + '_ {
        let count = if item < self.item_count() { self.item_count() } else { 0 };
        (0..count).filter(move |&other| other != item && !self.is_ordered(item, other))
    }
}

#[derive(Debug, Clone)]
enum Members {
    /// Indices `0..n`.
    All(usize),
    /// Sorted, deduplicated indices.
    Subset(Vec<usize>),
}

impl Members {
    fn len(&self) -> usize {
        match self {
            Members::All(n) => *n,
            Members::Subset(members) => members.len(),
        }
    }

    fn get(&self, position: usize) -> usize {
        match self {
            Members::All(_) => position,
            Members::Subset(members) => members[position],
        }
    }
}

/// Iterator over the undecided pairs of a graph at one point in time.
///
/// Borrowing the graph keeps it immutable for as long as the stream lives.
#[derive(Debug, Clone)]
pub struct CandidateStream<'a> {
    graph: &'a PreferenceGraph,
    members: Members,
    /// Positions into `members` of the next pair to test.
    first: usize,
    second: usize,
}

impl<'a> CandidateStream<'a> {
    fn new(graph: &'a PreferenceGraph, members: Members) -> Self {
        CandidateStream { graph, members, first: 0, second: 1 }
    }
}

impl Iterator for CandidateStream<'_> {
    type Item = Pair;

    fn next(&mut self) -> Option<Pair> {
        let len = self.members.len();
        while self.first + 1 < len {
            if self.second >= len {
                self.first += 1;
                self.second = self.first + 1;
                continue;
            }

            let a = self.members.get(self.first);
            let b = self.members.get(self.second);
            self.second += 1;

            if !self.graph.is_ordered(a, b) {
                return Some((a, b));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.members {
            // Exact when nothing has been consumed yet.
            Members::All(_) if self.first == 0 && self.second == 1 => {
                let count = self.graph.candidate_count();
                (count, Some(count))
            }
            _ => {
                let len = self.members.len();
                let upper = if self.first + 1 >= len {
                    0
                } else {
                    let rest = len - self.first - 1;
                    // Pairs left in the current row plus all later rows.
                    (len - self.second) + rest * (rest - 1) / 2
                };
                (0, Some(upper))
            }
        }
    }
}

impl FusedIterator for CandidateStream<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    const A: usize = 0;
    const B: usize = 1;
    const C: usize = 2;

    #[test]
    fn test_empty_graph_yields_all_pairs() {
        let graph = PreferenceGraph::new(3);
        assert_eq!(graph.candidate_count(), 3);
        assert_eq!(graph.candidates().collect::<Vec<_>>(), vec![(A, B), (A, C), (B, C)]);
    }

    #[test]
    fn test_three_item_scenario() {
        let mut graph = PreferenceGraph::new(3);
        assert_eq!(graph.candidate_count(), 3);

        graph.add_preference(A, B).unwrap();
        assert_eq!(graph.candidate_count(), 2);
        assert_eq!(graph.candidates().collect::<Vec<_>>(), vec![(A, C), (B, C)]);

        graph.add_preference(B, C).unwrap();
        assert_eq!(graph.candidate_count(), 0);
        assert!(graph.is_ordered(A, C));
        assert_eq!(graph.candidates().next(), None);
    }

    #[test]
    fn test_cycle_does_not_change_count() {
        let mut graph = PreferenceGraph::new(3);
        graph.add_preference(A, B).unwrap();
        let before = graph.candidate_count();

        assert!(graph.add_preference(B, A).is_err());
        assert_eq!(graph.candidate_count(), before);
        assert_eq!(graph.candidates().count(), before);
    }

    #[test]
    fn test_count_matches_stream_length() {
        let mut graph = PreferenceGraph::new(8);
        let decisions = [(0, 3), (3, 5), (1, 2), (7, 0), (2, 6), (4, 1)];
        for (winner, loser) in decisions {
            graph.add_preference(winner, loser).unwrap();
            assert_eq!(graph.candidate_count(), graph.candidates().count());
        }
    }

    #[test]
    fn test_streams_are_restartable_and_stable() {
        let mut graph = PreferenceGraph::new(5);
        graph.add_preference(1, 3).unwrap();

        let first: Vec<Pair> = graph.candidates().collect();
        let second: Vec<Pair> = graph.candidates().collect();
        assert_eq!(first, second);

        // A partially consumed stream does not affect a new one.
        let mut partial = graph.candidates();
        partial.next();
        partial.next();
        assert_eq!(graph.candidates().next(), first.first().copied());
    }

    #[test]
    fn test_stream_has_no_duplicates_or_self_pairs() {
        let graph = PreferenceGraph::new(6);
        let pairs: Vec<Pair> = graph.candidates().collect();
        let unique: std::collections::HashSet<Pair> = pairs.iter().copied().collect();
        assert_eq!(pairs.len(), unique.len());
        assert!(pairs.iter().all(|&(a, b)| a < b));
    }

    #[test]
    fn test_candidates_within_subset() {
        let mut graph = PreferenceGraph::new(5);
        graph.add_preference(4, 0).unwrap();

        let pairs: Vec<Pair> = graph.candidates_within(&[4, 0, 2, 2]).unwrap().collect();
        assert_eq!(pairs, vec![(0, 2), (2, 4)]);

        assert!(graph.candidates_within(&[1, 9]).is_err());
    }

    #[test]
    fn test_candidates_of_item() {
        let mut graph = PreferenceGraph::new(4);
        graph.add_preference(0, 1).unwrap();
        graph.add_preference(1, 2).unwrap();

        assert_eq!(graph.candidates_of(0).collect::<Vec<_>>(), vec![3]);
        assert_eq!(graph.candidates_of(3).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(graph.candidates_of(10).count(), 0);
    }

    #[test]
    fn test_size_hint_exact_on_fresh_stream() {
        let mut graph = PreferenceGraph::new(4);
        graph.add_preference(0, 1).unwrap();
        let stream = graph.candidates();
        assert_eq!(stream.size_hint(), (5, Some(5)));
    }

    #[test]
    fn test_tiny_graphs() {
        assert_eq!(PreferenceGraph::new(0).candidates().count(), 0);
        assert_eq!(PreferenceGraph::new(1).candidate_count(), 0);
        assert_eq!(PreferenceGraph::new(1).candidates().count(), 0);
    }
}
