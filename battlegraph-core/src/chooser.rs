/// Candidate choosers: policies that pick the next pair to present.
///
/// Every chooser reads the graph through `candidate_count()` and
/// `candidates()` and never mutates it. `select_next` is shared: it handles
/// the finished tournament and timing, then defers to the strategy's `pick`.
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SelectError;
use crate::graph::PreferenceGraph;
use crate::strategies::{
    BiSectionChooser, GuaranteedGainChooser, MaxNewRelationsChooser, MinimumDegreeChooser,
    RankingTopDownChooser, SameBalanceChooser, WinnerOrientedChooser,
};
use crate::types::Pair;

pub trait CandidateChooser {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Pick one undecided pair. Only called with `candidate_count > 0`.
    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError>;

    /// Select the next pair to present, lower index first.
    ///
    /// Fails with `NoCandidates` once every pair is decided.
    fn select_next(&mut self, graph: &PreferenceGraph) -> Result<Pair, SelectError> {
        let start = Instant::now();
        let candidate_count = graph.candidate_count();
        if candidate_count == 0 {
            return Err(SelectError::NoCandidates);
        }

        let result = self.pick(graph, candidate_count);

        tracing::trace!(
            chooser = self.name(),
            candidate_count,
            elapsed_us = start.elapsed().as_micros() as u64,
            "selection finished"
        );
        result
    }
}

/// Uniform choice over all undecided pairs.
///
/// Draws `k` in `[0, n)` and returns the `k`-th element of a fresh candidate
/// stream. The stream order is fixed for a given graph state, so every
/// candidate has probability `1/n`.
#[derive(Debug, Clone)]
pub struct RandomChooser<R = StdRng> {
    rng: R,
}

impl RandomChooser<StdRng> {
    pub fn new() -> Self {
        RandomChooser { rng: StdRng::from_os_rng() }
    }

    /// Reproducible chooser for simulations and tests.
    pub fn from_seed(seed: u64) -> Self {
        RandomChooser { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomChooser<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomChooser<R> {
    pub fn with_rng(rng: R) -> Self {
        RandomChooser { rng }
    }
}

impl<R: Rng> CandidateChooser for RandomChooser<R> {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        let k = self.rng.random_range(0..candidate_count);
        nth_candidate(graph, k)
    }
}

/// The `k`-th pair of a fresh candidate stream, or `ConcurrentModification`
/// if the stream is shorter than the count it was drawn against.
pub(crate) fn nth_candidate(graph: &PreferenceGraph, k: usize) -> Result<Pair, SelectError> {
    let mut reached = 0;
    for pair in graph.candidates() {
        if reached == k {
            return Ok(pair);
        }
        reached += 1;
    }
    Err(SelectError::ConcurrentModification { expected: k + 1, reached })
}

/// The available chooser strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ChooserKind {
    Random,
    MinimumDegree,
    MaxNewRelations,
    GuaranteedGain,
    WinnerOriented,
    RankingTopDown,
    BiSection,
    SameBalance,
}

impl ChooserKind {
    pub const ALL: [ChooserKind; 8] = [
        ChooserKind::Random,
        ChooserKind::MinimumDegree,
        ChooserKind::MaxNewRelations,
        ChooserKind::GuaranteedGain,
        ChooserKind::WinnerOriented,
        ChooserKind::RankingTopDown,
        ChooserKind::BiSection,
        ChooserKind::SameBalance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChooserKind::Random => "random",
            ChooserKind::MinimumDegree => "minimum-degree",
            ChooserKind::MaxNewRelations => "max-new-relations",
            ChooserKind::GuaranteedGain => "guaranteed-gain",
            ChooserKind::WinnerOriented => "winner-oriented",
            ChooserKind::RankingTopDown => "ranking-top-down",
            ChooserKind::BiSection => "bi-section",
            ChooserKind::SameBalance => "same-balance",
        }
    }

    /// Instantiate the strategy. Randomized strategies use `seed` when given,
    /// OS entropy otherwise.
    pub fn build(&self, seed: Option<u64>) -> AnyChooser {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        match self {
            ChooserKind::Random => AnyChooser::Random(RandomChooser::with_rng(rng)),
            ChooserKind::MinimumDegree => AnyChooser::MinimumDegree(MinimumDegreeChooser),
            ChooserKind::MaxNewRelations => AnyChooser::MaxNewRelations(MaxNewRelationsChooser),
            ChooserKind::GuaranteedGain => AnyChooser::GuaranteedGain(GuaranteedGainChooser),
            ChooserKind::WinnerOriented => AnyChooser::WinnerOriented(WinnerOrientedChooser::with_rng(rng)),
            ChooserKind::RankingTopDown => AnyChooser::RankingTopDown(RankingTopDownChooser),
            ChooserKind::BiSection => AnyChooser::BiSection(BiSectionChooser),
            ChooserKind::SameBalance => AnyChooser::SameBalance(SameBalanceChooser::with_rng(rng)),
        }
    }
}

impl fmt::Display for ChooserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChooserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChooserKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ChooserKind::ALL.iter().map(ChooserKind::as_str).collect();
                format!("unknown chooser \"{s}\", expected one of: {}", names.join(", "))
            })
    }
}

/// A chooser picked at runtime. Dispatches with a `match`, no trait objects.
#[derive(Debug, Clone)]
pub enum AnyChooser {
    Random(RandomChooser),
    MinimumDegree(MinimumDegreeChooser),
    MaxNewRelations(MaxNewRelationsChooser),
    GuaranteedGain(GuaranteedGainChooser),
    WinnerOriented(WinnerOrientedChooser),
    RankingTopDown(RankingTopDownChooser),
    BiSection(BiSectionChooser),
    SameBalance(SameBalanceChooser),
}

impl AnyChooser {
    pub fn kind(&self) -> ChooserKind {
        match self {
            AnyChooser::Random(_) => ChooserKind::Random,
            AnyChooser::MinimumDegree(_) => ChooserKind::MinimumDegree,
            AnyChooser::MaxNewRelations(_) => ChooserKind::MaxNewRelations,
            AnyChooser::GuaranteedGain(_) => ChooserKind::GuaranteedGain,
            AnyChooser::WinnerOriented(_) => ChooserKind::WinnerOriented,
            AnyChooser::RankingTopDown(_) => ChooserKind::RankingTopDown,
            AnyChooser::BiSection(_) => ChooserKind::BiSection,
            AnyChooser::SameBalance(_) => ChooserKind::SameBalance,
        }
    }
}

impl CandidateChooser for AnyChooser {
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn pick(&mut self, graph: &PreferenceGraph, candidate_count: usize) -> Result<Pair, SelectError> {
        match self {
            AnyChooser::Random(chooser) => chooser.pick(graph, candidate_count),
            AnyChooser::MinimumDegree(chooser) => chooser.pick(graph, candidate_count),
            AnyChooser::MaxNewRelations(chooser) => chooser.pick(graph, candidate_count),
            AnyChooser::GuaranteedGain(chooser) => chooser.pick(graph, candidate_count),
            AnyChooser::WinnerOriented(chooser) => chooser.pick(graph, candidate_count),
            AnyChooser::RankingTopDown(chooser) => chooser.pick(graph, candidate_count),
            AnyChooser::BiSection(chooser) => chooser.pick(graph, candidate_count),
            AnyChooser::SameBalance(chooser) => chooser.pick(graph, candidate_count),
        }
    }
}
