/// Fresh count/fetch attempts `Session::select_next` makes after the candidate
/// stream turned out shorter than the count it was drawn against.
/// A second failure means the single-writer model was violated and is returned.
pub const SELECT_RETRY_LIMIT: usize = 1;

/// Weight of the summed losses in the winner-oriented pair score.
/// Pairs of items that have rarely lost come first.
pub const WINNER_ORIENTED_LOSE_SUM_WEIGHT: i64 = 10;

/// Weight of the loss difference. Prefer 4-4 over 2-8.
pub const WINNER_ORIENTED_LOSE_DISTANCE_WEIGHT: i64 = 8;

/// Weight of the win difference.
pub const WINNER_ORIENTED_WIN_DISTANCE_WEIGHT: i64 = 5;

/// Numerator of the exponential rate used to draw a position from the sorted
/// winner-oriented candidates: `lambda = sqrt(K / sqrt(candidate_count))`.
///
/// The variance of the draw is `sqrt(candidate_count) / 3`, so the front of
/// the list is strongly favoured on large graphs while small graphs still see
/// some spread.
pub const WINNER_ORIENTED_RATE_NUMERATOR: f64 = 3.0;
