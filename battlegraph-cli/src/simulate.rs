/// Simulate command: measures how many decisions each chooser needs.
///
/// Every trial shuffles a hidden true order, then plays a full tournament in
/// which each presented pair is answered from that order. All choosers see
/// the same hidden orders (trial `t` uses seed `seed + t`), so their decision
/// counts are directly comparable.
use battlegraph_core::{ChooserKind, Session, SessionError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::bail;

/// Mixed into a trial's seed to get the chooser's seed, so the hidden order
/// and the chooser draw from unrelated streams.
const CHOOSER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

fn chooser_seed(trial_seed: u64) -> u64 {
    trial_seed ^ CHOOSER_SEED_SALT
}

/// Aggregated results of all trials of one chooser.
#[derive(Debug, Serialize)]
pub struct ChooserReport {
    pub chooser: ChooserKind,
    pub trials: usize,
    pub mean_decisions: f64,
    pub min_decisions: usize,
    pub max_decisions: usize,
    pub mean_millis: f64,
}

/// Result of a single simulated tournament.
#[derive(Debug, Clone, Copy)]
pub struct TrialResult {
    pub decisions: usize,
    pub millis: f64,
}

/// Play one tournament over `items` items to completion.
pub fn run_trial(kind: ChooserKind, items: usize, seed: u64) -> Result<TrialResult, SessionError> {
    let mut hidden: Vec<usize> = (0..items).collect();
    hidden.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut session = Session::new(0..items, kind.build(Some(chooser_seed(seed))))?;
    let start = Instant::now();

    loop {
        let (a, b) = match session.select_next() {
            Ok(pair) => pair,
            Err(e) if e.is_finished() => break,
            Err(e) => return Err(e),
        };
        // Lower hidden rank is the better item.
        let (winner, loser) = if hidden[a] < hidden[b] { (a, b) } else { (b, a) };
        session.record_decision(&winner, &loser)?;
    }

    Ok(TrialResult {
        decisions: session.decisions(),
        millis: start.elapsed().as_secs_f64() * 1000.0,
    })
}

pub fn summarize(kind: ChooserKind, results: &[TrialResult]) -> ChooserReport {
    let trials = results.len();
    let total: usize = results.iter().map(|r| r.decisions).sum();
    let total_millis: f64 = results.iter().map(|r| r.millis).sum();
    let divisor = trials.max(1) as f64;

    ChooserReport {
        chooser: kind,
        trials,
        mean_decisions: total as f64 / divisor,
        min_decisions: results.iter().map(|r| r.decisions).min().unwrap_or(0),
        max_decisions: results.iter().map(|r| r.decisions).max().unwrap_or(0),
        mean_millis: total_millis / divisor,
    }
}

/// Run `trials` tournaments per chooser with bounded parallelism.
pub async fn run_simulation(
    kinds: &[ChooserKind],
    items: usize,
    trials: usize,
    seed: u64,
    concurrency: usize,
) -> Vec<ChooserReport> {
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let mut reports = Vec::with_capacity(kinds.len());

    for &kind in kinds {
        let mut handles = Vec::with_capacity(trials);

        for trial in 0..trials {
            let sem = semaphore.clone();
            let trial_seed = seed.wrapping_add(trial as u64);

            let handle = tokio::spawn(async move {
                let _permit = sem.acquire().await.unwrap();
                tokio::task::spawn_blocking(move || run_trial(kind, items, trial_seed)).await
            });
            handles.push(handle);
        }

        let mut results = Vec::with_capacity(trials);
        for handle in handles {
            match handle.await {
                Ok(Ok(Ok(result))) => results.push(result),
                Ok(Ok(Err(e))) => bail(format!("Simulation with {kind} failed: {e}")),
                Ok(Err(e)) | Err(e) => bail(format!("Simulation task panicked: {e}")),
            }
        }

        let report = summarize(kind, &results);
        tracing::info!(
            chooser = %kind,
            mean_decisions = report.mean_decisions,
            mean_millis = report.mean_millis,
            "simulation finished"
        );
        reports.push(report);
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_completes_every_chooser() {
        let n = 10;
        for kind in ChooserKind::ALL {
            let result = run_trial(kind, n, 4).unwrap();
            assert!(result.decisions >= n - 1, "{kind}: {} decisions", result.decisions);
            assert!(result.decisions <= n * (n - 1) / 2);
        }
    }

    #[test]
    fn test_trial_is_reproducible() {
        let first = run_trial(ChooserKind::Random, 15, 9).unwrap();
        let second = run_trial(ChooserKind::Random, 15, 9).unwrap();
        assert_eq!(first.decisions, second.decisions);
    }

    #[test]
    fn test_trivial_tournaments() {
        assert_eq!(run_trial(ChooserKind::Random, 1, 0).unwrap().decisions, 0);
        assert_eq!(run_trial(ChooserKind::MinimumDegree, 2, 0).unwrap().decisions, 1);
    }

    #[test]
    fn test_chooser_seed_differs_from_shuffle_seed() {
        for seed in [0, 1, 42, u64::MAX] {
            assert_ne!(chooser_seed(seed), seed);
        }
        // The chooser draws must not replay the shuffle's draws.
        let mut shuffle = StdRng::seed_from_u64(7);
        let mut chooser = StdRng::seed_from_u64(chooser_seed(7));
        let a: Vec<u64> = (0..4).map(|_| rand::Rng::random(&mut shuffle)).collect();
        let b: Vec<u64> = (0..4).map(|_| rand::Rng::random(&mut chooser)).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_summarize() {
        let results = [
            TrialResult { decisions: 10, millis: 1.0 },
            TrialResult { decisions: 14, millis: 3.0 },
        ];
        let report = summarize(ChooserKind::RankingTopDown, &results);
        assert_eq!(report.trials, 2);
        assert_eq!(report.mean_decisions, 12.0);
        assert_eq!((report.min_decisions, report.max_decisions), (10, 14));
        assert_eq!(report.mean_millis, 2.0);

        let empty = summarize(ChooserKind::Random, &[]);
        assert_eq!(empty.mean_decisions, 0.0);
    }

    #[tokio::test]
    async fn test_simulation_reports_every_kind() {
        let reports = run_simulation(&ChooserKind::ALL, 8, 3, 1, 2).await;
        assert_eq!(reports.len(), ChooserKind::ALL.len());
        for (report, kind) in reports.iter().zip(ChooserKind::ALL) {
            assert_eq!(report.chooser, kind);
            assert_eq!(report.trials, 3);
            assert!(report.min_decisions >= 7);
        }
    }
}
