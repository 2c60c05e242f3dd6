//! Error types for quickfix list operations.

use crate::entry::SourceId;
use crate::list::Direction;
use crate::set::ListHandle;

/// Errors surfaced by list navigation, list history, and scan population.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Index-based access outside `[1, len]`.
	#[error("index {index} out of range (list has {len} entries)")]
	OutOfRange {
		/// Requested 1-based index.
		index: usize,
		/// Length of the list at the time of the request.
		len: usize,
	},

	/// Non-wrapping navigation moved past an end of the list.
	#[error("no more items")]
	NoMoreEntries,

	/// A handle no longer refers to a live list.
	#[error("no list with id {0}")]
	NotFound(ListHandle),

	/// The operation requires at least one list.
	#[error("no quickfix lists")]
	Empty,

	/// Non-wrapping history navigation hit the oldest or newest list.
	#[error("at {} of quickfix stack", history_edge(.0))]
	AtHistoryEdge(Direction),

	/// The list was closed by its producer and accepts no more entries.
	#[error("list {0} is closed")]
	ListClosed(ListHandle),

	/// Reading one scan source failed.
	#[error("failed to read {source_id}: {error}")]
	SourceRead {
		/// Source that could not be read.
		source_id: SourceId,
		/// The underlying I/O error.
		#[source]
		error: std::io::Error,
	},

	/// A search pattern argument could not be parsed or compiled.
	#[error("invalid pattern: {0}")]
	InvalidPattern(String),

	/// The background scan thread could not be started.
	#[error("failed to spawn scan worker: {0}")]
	Spawn(#[source] std::io::Error),

	/// Configuration could not be loaded.
	#[error("config error: {0}")]
	Config(String),
}

fn history_edge(direction: &Direction) -> &'static str {
	match direction {
		Direction::Forward => "top",
		Direction::Backward => "bottom",
	}
}

/// Result type for quickfix operations.
pub type Result<T> = std::result::Result<T, Error>;
