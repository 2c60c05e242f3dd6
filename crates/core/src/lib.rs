//! Quickfix result lists shared between a background producer and an
//! interactive consumer.
//!
//! # Purpose
//!
//! * Owns the ordered match/error lists produced by grep-style scans and
//!   compiler runs, and the cursor used to navigate them.
//! * Lets a scan append to a list on a worker thread while the foreground
//!   navigates the same list history.
//!
//! # Mental model
//!
//! * One [`ListSet`] holds up to `capacity` [`ResultList`]s, oldest first,
//!   one of them active. Lists are addressed by [`ListHandle`], which
//!   survives reordering but not eviction.
//! * The whole set sits behind one [`Guard`]. Every mutation and cursor move
//!   happens inside a [`GuardScope`]; there is no per-list lock.
//! * Producers read and match outside the guard and only append under it,
//!   yielding the guard between batches.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints |
//! |---|---|---|
//! | [`Entry`] | One match/error location | Immutable; shared as `Arc<Entry>` |
//! | [`ResultList`] | Entries + cursor + title | Cursor is 0 or in `[1, len]`; closed lists reject appends and clears |
//! | [`ListSet`] | Bounded list history | Active index in bounds iff non-empty |
//! | [`ScanOptions`] | `global` / `no_jump` flags | Bits `GLOBAL = 1`, `NOJUMP = 2` |
//! | [`Guard`] | Scoped mutex with owner tracking | Re-entrant acquisition panics |
//! | [`ScanJob`] | Background producer | Cancellation polled between sources |
//!
//! # Invariants
//!
//! * Appends never move an existing cursor.
//! * A failed non-wrapping move leaves the cursor unchanged.
//! * Evicting a list invalidates its handle; later lookups fail with [`Error::NotFound`].
//! * No I/O runs while the guard is held.
//! * Scan events are delivered with the guard released.
//!
//! # Lifecycle
//!
//! * Create shared state with [`shared_lists`].
//! * Start a scan with [`ScanJob::spawn`], or call [`run_scan`] on a thread of your own.
//! * Navigate with `lists.lock().active_list_mut()` and [`ResultList::advance`].
//! * Cancel with [`ScanJob::cancel`]; the list is left well-formed and closed.

pub mod config;
pub mod entry;
pub mod error;
pub mod guard;
pub mod job;
pub mod list;
pub mod options;
pub mod pattern;
pub mod scan;
pub mod set;
pub mod source;

use std::sync::Arc;

pub use config::QuickfixConfig;
pub use entry::{Entry, EntryKind, Position, SourceId};
pub use error::{Error, Result};
pub use guard::{Guard, GuardScope};
pub use job::{EventSink, ScanJob, ScanSpec};
pub use list::{Direction, ListContext, ResultList};
pub use options::{ReadFailurePolicy, ScanConfig, ScanOptions};
pub use pattern::{PatternArg, parse_pattern_arg};
pub use scan::{ScanEvent, ScanOutcome, ScanReport, ScanRequest, run_scan};
pub use set::{HistoryRow, ListHandle, ListSet};
pub use source::{FsReader, MatchHit, Matcher, MemoryReader, RegexMatcher, SourceReader, WalkOptions, collect_sources};
pub use tokio_util::sync::CancellationToken;

/// List history shared between producer and consumer threads.
pub type SharedLists = Arc<Guard<ListSet>>;

/// Creates an empty shared list history holding at most `capacity` lists.
pub fn shared_lists(capacity: usize) -> SharedLists {
	Arc::new(Guard::new(ListSet::new(capacity)))
}
