/// Chooser strategies beyond uniform random.
///
/// Each one scores or orders the undecided pairs using only what the closure
/// already knows (wins, losses and the sets behind them), so any of them can
/// be swapped in without touching the graph or the enumerator.
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::Rng;

use crate::chooser::CandidateChooser;
use crate::constants::{
    WINNER_ORIENTED_LOSE_DISTANCE_WEIGHT, WINNER_ORIENTED_LOSE_SUM_WEIGHT,
    WINNER_ORIENTED_RATE_NUMERATOR, WINNER_ORIENTED_WIN_DISTANCE_WEIGHT,
};
use crate::error::SelectError;
use crate::graph::PreferenceGraph;
use crate::types::Pair;

fn degree(graph: &PreferenceGraph, item: usize) -> usize {
    graph.wins(item) + graph.losses(item)
}

fn ordered_pair(a: usize, b: usize) -> Pair {
    if a < b { (a, b) } else { (b, a) }
}

fn stream_ended(candidate_count: usize) -> SelectError {
    SelectError::ConcurrentModification { expected: candidate_count, reached: 0 }
}

/// Pair of the two least-known items: smallest sum of wins plus losses.
/// Ties go to the earliest pair in stream order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumDegreeChooser;

impl CandidateChooser for MinimumDegreeChooser {
    fn name(&self) -> &'static str {
        "minimum-degree"
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let pair = graph
            .candidates()
            .min_by_key(|&(a, b)| degree(graph, a) + degree(graph, b))
            .ok_or_else(|| stream_ended(candidate_count))?;
        tracing::debug!(degree_sum = degree(graph, pair.0) + degree(graph, pair.1), "minimum degree pair");
        Ok(pair)
    }
}

fn symmetric_difference_len(a: Option<&BTreeSet<usize>>, b: Option<&BTreeSet<usize>>) -> usize {
    match (a, b) {
        (Some(a), Some(b)) => a.symmetric_difference(b).count(),
        (Some(set), None) | (None, Some(set)) => set.len(),
        (None, None) => 0,
    }
}

/// Pair of items whose known neighbourhoods differ the most.
///
/// With `d_in` the number of items beating exactly one of the two and
/// `d_out` the number of items beaten by exactly one of them, the score is
/// `d_in + d_out + d_in * d_out`. The product rewards pairs that differ on
/// both sides. Highest score wins; ties go to the earliest pair in stream
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxNewRelationsChooser;

impl MaxNewRelationsChooser {
    pub fn score(graph: &PreferenceGraph, (a, b): Pair) -> usize {
        let d_in = symmetric_difference_len(graph.predecessor_set(a), graph.predecessor_set(b));
        let d_out = symmetric_difference_len(graph.successor_set(a), graph.successor_set(b));
        d_in + d_out + d_in * d_out
    }
}

impl CandidateChooser for MaxNewRelationsChooser {
    fn name(&self) -> &'static str {
        "max-new-relations"
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let pair = graph
            .candidates()
            .min_by_key(|&pair| Reverse(Self::score(graph, pair)))
            .ok_or_else(|| stream_ended(candidate_count))?;
        tracing::debug!(score = Self::score(graph, pair), "max new relations pair");
        Ok(pair)
    }
}

/// Pair with the largest closure growth guaranteed by either answer.
///
/// If `x` beats `y`, everything reaching `x` now reaches everything `y`
/// reaches, bounded by `(losses(x) + 1) * (wins(y) + 1)` new relations. The
/// score of a pair is the smaller bound of its two outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuaranteedGainChooser;

impl GuaranteedGainChooser {
    pub fn gain(graph: &PreferenceGraph, winner: usize, loser: usize) -> usize {
        (graph.losses(winner) + 1) * (graph.wins(loser) + 1)
    }

    pub fn score(graph: &PreferenceGraph, (a, b): Pair) -> usize {
        Self::gain(graph, a, b).min(Self::gain(graph, b, a))
    }
}

impl CandidateChooser for GuaranteedGainChooser {
    fn name(&self) -> &'static str {
        "guaranteed-gain"
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let pair = graph
            .candidates()
            .min_by_key(|&pair| Reverse(Self::score(graph, pair)))
            .ok_or_else(|| stream_ended(candidate_count))?;
        tracing::debug!(score = Self::score(graph, pair), "guaranteed gain pair");
        Ok(pair)
    }
}

/// Focus on the top of the order.
///
/// Candidates are sorted so that pairs of items which have rarely lost and
/// have similar records come first. A position is then drawn from an
/// exponential distribution, which strongly favours the front while keeping
/// some variety.
#[derive(Debug, Clone)]
pub struct WinnerOrientedChooser<R = StdRng> {
    rng: R,
}

impl<R: Rng> WinnerOrientedChooser<R> {
    pub fn with_rng(rng: R) -> Self {
        WinnerOrientedChooser { rng }
    }

    /// Lower is better.
    pub fn score(graph: &PreferenceGraph, (a, b): Pair) -> i64 {
        let (lose_a, lose_b) = (graph.losses(a) as i64, graph.losses(b) as i64);
        let (win_a, win_b) = (graph.wins(a) as i64, graph.wins(b) as i64);

        WINNER_ORIENTED_LOSE_SUM_WEIGHT * (lose_a + lose_b)
            + WINNER_ORIENTED_LOSE_DISTANCE_WEIGHT * (lose_a - lose_b).abs()
            - (win_a + win_b)
            + WINNER_ORIENTED_WIN_DISTANCE_WEIGHT * (win_a - win_b).abs()
    }

    /// Exponentially distributed position in `[0, candidate_count)`.
    fn draw_position(&mut self, candidate_count: usize) -> usize {
        let lambda = (WINNER_ORIENTED_RATE_NUMERATOR / (candidate_count as f64).sqrt()).sqrt();
        let u: f64 = self.rng.random();
        let draw = (-(1.0 - u).ln() / lambda).round() as i64;
        // Rounding makes 1 the most likely draw; shift it onto the front.
        (draw - 1).clamp(0, candidate_count as i64 - 1) as usize
    }
}

impl<R: Rng> CandidateChooser for WinnerOrientedChooser<R> {
    fn name(&self) -> &'static str {
        "winner-oriented"
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let mut candidates: Vec<Pair> = graph.candidates().collect();
        if candidates.is_empty() {
            return Err(stream_ended(candidate_count));
        }
        candidates.sort_by_key(|&pair| Self::score(graph, pair));

        let position = self.draw_position(candidate_count).min(candidates.len() - 1);
        tracing::trace!(position, candidate_count, "winner oriented draw");
        Ok(candidates[position])
    }
}

/// Walk the provisional order from the top.
///
/// Items are sorted by wins (descending) then losses (ascending). The first
/// undecided pair of neighbours is returned; if all neighbours are decided,
/// items two apart are tried, and so on.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingTopDownChooser;

impl RankingTopDownChooser {
    pub fn provisional_order(graph: &PreferenceGraph) -> Vec<usize> {
        let mut order: Vec<usize> = (0..graph.item_count()).collect();
        order.sort_by_key(|&item| (Reverse(graph.wins(item)), graph.losses(item)));
        order
    }
}

impl CandidateChooser for RankingTopDownChooser {
    fn name(&self) -> &'static str {
        "ranking-top-down"
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let order = Self::provisional_order(graph);
        for step in 1..order.len() {
            for window in 0..order.len() - step {
                let (a, b) = (order[window], order[window + step]);
                if !graph.is_ordered(a, b) {
                    tracing::trace!(step, position = window, "top down pair");
                    return Ok(ordered_pair(a, b));
                }
            }
        }
        Err(stream_ended(candidate_count))
    }
}

/// Nested intervals: narrow down the item whose position is least known.
///
/// Items are ranked by balance. An item sits below its worst-ranked winner
/// and above its best-ranked loser. The unsettled item with the widest such
/// interval is compared with the undecided item ranked closest to the middle
/// of the interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiSectionChooser;

impl BiSectionChooser {
    /// Items by balance, best first. Ties keep index order.
    pub fn ranking(graph: &PreferenceGraph) -> Vec<usize> {
        let mut ranking: Vec<usize> = (0..graph.item_count()).collect();
        ranking.sort_by_key(|&item| Reverse(graph.balance(item)));
        ranking
    }

    /// Ranking positions of the worst known winner and the best known loser.
    /// Without winners the interval starts at the top, without losers it
    /// ends at the bottom.
    fn interval(graph: &PreferenceGraph, position: &[usize], item: usize) -> (usize, usize) {
        let worst_winner = graph.predecessors(item).map(|w| position[w]).max().unwrap_or(0);
        let best_loser = graph
            .successors(item)
            .map(|l| position[l])
            .min()
            .unwrap_or(graph.item_count().saturating_sub(1));
        (worst_winner, best_loser)
    }
}

impl CandidateChooser for BiSectionChooser {
    fn name(&self) -> &'static str {
        "bi-section"
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let ranking = Self::ranking(graph);
        let mut position = vec![0; ranking.len()];
        for (pos, &item) in ranking.iter().enumerate() {
            position[item] = pos;
        }

        let widest = (0..graph.item_count())
            .filter(|&item| !graph.is_settled(item))
            .min_by_key(|&item| {
                let (worst_winner, best_loser) = Self::interval(graph, &position, item);
                Reverse(best_loser as i64 - worst_winner as i64)
            })
            .ok_or_else(|| stream_ended(candidate_count))?;

        let (worst_winner, best_loser) = Self::interval(graph, &position, widest);
        let middle = (worst_winner + best_loser) / 2;

        let other = ranking
            .iter()
            .copied()
            .filter(|&other| other != widest && !graph.is_ordered(widest, other))
            .min_by_key(|&other| position[other].abs_diff(middle))
            .ok_or_else(|| stream_ended(candidate_count))?;

        tracing::trace!(
            item = widest,
            worst_winner,
            best_loser,
            middle,
            other_position = position[other],
            "bisection pair"
        );
        Ok(ordered_pair(widest, other))
    }
}

/// Compare items with the same record.
///
/// Items are grouped by balance and a pair is drawn at random from the
/// largest group; ties go to the higher balance. An item beating another
/// always has the strictly higher balance, so a group of two or more items
/// holds only undecided pairs. When every group is a single item, a random
/// pair among those with the closest balances is taken instead.
#[derive(Debug, Clone)]
pub struct SameBalanceChooser<R = StdRng> {
    rng: R,
}

impl<R: Rng> SameBalanceChooser<R> {
    pub fn with_rng(rng: R) -> Self {
        SameBalanceChooser { rng }
    }

    /// Items grouped by balance, ascending.
    pub fn groups(graph: &PreferenceGraph) -> BTreeMap<i64, Vec<usize>> {
        let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for item in 0..graph.item_count() {
            groups.entry(graph.balance(item)).or_default().push(item);
        }
        groups
    }

    fn random_element<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        Some(items[self.rng.random_range(0..items.len())])
    }

    fn closest_balance_pair(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let mut closest = Vec::new();
        let mut best_distance = u64::MAX;
        for (a, b) in graph.candidates() {
            let distance = graph.balance(a).abs_diff(graph.balance(b));
            if distance < best_distance {
                best_distance = distance;
                closest.clear();
            }
            if distance == best_distance {
                closest.push((a, b));
            }
        }
        tracing::trace!(distance = best_distance, pairs = closest.len(), "no shared balance, closest pairs");
        self.random_element(&closest).ok_or_else(|| stream_ended(candidate_count))
    }
}

impl<R: Rng> CandidateChooser for SameBalanceChooser<R> {
    fn name(&self) -> &'static str {
        "same-balance"
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let groups = Self::groups(graph);
        tracing::debug!(groups = groups.len(), "balance groups");

        if let Some((&balance, group)) = groups.iter().max_by_key(|(_, group)| group.len()) {
            if group.len() > 1 {
                // Guess first; listing all pairs of a big group is expensive.
                for attempt in 0..group.len() {
                    let (Some(first), Some(second)) = (self.random_element(group), self.random_element(group)) else {
                        break;
                    };
                    if first != second && !graph.is_ordered(first, second) {
                        tracing::trace!(balance, attempt, "guessed pair in largest group");
                        return Ok(ordered_pair(first, second));
                    }
                }

                let within: Vec<Pair> = graph
                    .candidates_within(group)
                    .map(|stream| stream.collect())
                    .unwrap_or_default();
                if let Some(pair) = self.random_element(&within) {
                    return Ok(pair);
                }
            }
        }

        self.closest_balance_pair(graph, candidate_count)
    }
}
