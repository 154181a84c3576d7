//! battlegraph-core: comparison graph engine for pairwise tournaments.
//!
//! Users pick the better item of a presented pair; every answer becomes a
//! "preferred over" edge. The engine keeps the transitive closure of those
//! edges current, so implied preferences are never asked again, and exposes
//! the undecided pairs as a count plus a lazy, deterministic stream that
//! chooser strategies pick from.
//!
//! No IO, no ranking. Ordering the results is up to the caller.
//!
//! # Quick start
//!
//! ```rust
//! use battlegraph_core::{RandomChooser, Session};
//!
//! let mut session = Session::new(["a.jpg", "b.jpg", "c.jpg"], RandomChooser::from_seed(1)).unwrap();
//! assert_eq!(session.remaining_count(), 3);
//!
//! session.record_decision(&"a.jpg", &"b.jpg").unwrap();
//! session.record_decision(&"b.jpg", &"c.jpg").unwrap();
//!
//! // a > c follows from a > b > c.
//! assert_eq!(session.remaining_count(), 0);
//! assert!(session.select_next().unwrap_err().is_finished());
//! ```

pub mod candidates;
pub mod chooser;
pub mod constants;
pub mod error;
pub mod graph;
pub mod registry;
pub mod session;
pub mod strategies;
pub mod types;

// Re-export primary public API at crate root.
pub use candidates::CandidateStream;
pub use chooser::{AnyChooser, CandidateChooser, ChooserKind, RandomChooser};
pub use error::{GraphError, RegistryError, SelectError, SessionError};
pub use graph::PreferenceGraph;
pub use registry::ItemRegistry;
pub use session::{Session, SharedSession};
pub use strategies::{
    BiSectionChooser, GuaranteedGainChooser, MaxNewRelationsChooser, MinimumDegreeChooser,
    RankingTopDownChooser, SameBalanceChooser, WinnerOrientedChooser,
};
pub use types::{Insertion, Pair, Standing};
