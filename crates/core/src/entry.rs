//! Quickfix entries and their source locations.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Identifier of a scanned source (a file path or buffer name).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(Arc<str>);

impl SourceId {
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for SourceId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for SourceId {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

/// A 1-based line with an optional 1-based column.
///
/// Zero is unrepresentable; a missing location is `Option::<Position>::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
	pub line: NonZeroUsize,
	pub col: Option<NonZeroUsize>,
}

impl Position {
	/// Builds a position from raw 1-based numbers, treating 0 as absent.
	///
	/// Returns `None` when `line` is 0.
	pub fn new(line: usize, col: usize) -> Option<Self> {
		Some(Self {
			line: NonZeroUsize::new(line)?,
			col: NonZeroUsize::new(col),
		})
	}

	pub fn line(line: NonZeroUsize) -> Self {
		Self { line, col: None }
	}
}

/// Kind tag attached to an entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntryKind {
	Error,
	Warning,
	Info,
	Note,
	/// Plain search match without severity.
	#[default]
	Match,
}

impl EntryKind {
	/// Parses the single-letter type codes used by compiler error formats.
	///
	/// Unknown codes map to [`EntryKind::Match`].
	pub fn from_code(code: char) -> Self {
		match code.to_ascii_uppercase() {
			'E' => Self::Error,
			'W' => Self::Warning,
			'I' => Self::Info,
			'N' => Self::Note,
			_ => Self::Match,
		}
	}

	pub const fn label(self) -> Option<&'static str> {
		match self {
			Self::Error => Some("error"),
			Self::Warning => Some("warning"),
			Self::Info => Some("info"),
			Self::Note => Some("note"),
			Self::Match => None,
		}
	}
}

/// One match or error record.
///
/// Entries never change after construction; lists hand them out as
/// `Arc<Entry>` so readers may keep them after releasing the guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
	pub source: Option<SourceId>,
	pub start: Option<Position>,
	pub end: Option<Position>,
	pub text: String,
	pub kind: EntryKind,
	/// Error number reported by the producer, if any.
	pub nr: Option<i32>,
	/// False when the location could not be resolved.
	pub valid: bool,
}

impl Entry {
	/// A resolved match at `start` in `source`.
	pub fn matched(source: SourceId, start: Position, text: impl Into<String>) -> Self {
		Self {
			source: Some(source),
			start: Some(start),
			end: None,
			text: text.into(),
			kind: EntryKind::Match,
			nr: None,
			valid: true,
		}
	}

	/// An entry whose location could not be resolved, such as a source that
	/// failed to read.
	pub fn invalid(source: Option<SourceId>, text: impl Into<String>) -> Self {
		Self {
			source,
			start: None,
			end: None,
			text: text.into(),
			kind: EntryKind::Match,
			nr: None,
			valid: false,
		}
	}

	pub fn with_kind(mut self, kind: EntryKind) -> Self {
		self.kind = kind;
		self
	}

	pub fn with_end(mut self, end: Position) -> Self {
		self.end = Some(end);
		self
	}

	pub fn with_nr(mut self, nr: i32) -> Self {
		self.nr = Some(nr);
		self
	}

	pub fn line(&self) -> Option<usize> {
		self.start.map(|pos| pos.line.get())
	}

	pub fn col(&self) -> Option<usize> {
		self.start.and_then(|pos| pos.col).map(NonZeroUsize::get)
	}
}

/// Renders the quickfix window form: `file|line col N error 12| text`, with
/// `-end` suffixes (`3-5 col 2-7`) when an end position is set.
impl fmt::Display for Entry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(source) = &self.source {
			write!(f, "{source}")?;
		}
		f.write_str("|")?;

		let mut location = String::new();
		if let Some(start) = self.start {
			location.push_str(&start.line.to_string());
			if let Some(end) = self.end
				&& end.line != start.line
			{
				location.push_str(&format!("-{}", end.line));
			}
			if let Some(col) = start.col {
				location.push_str(&format!(" col {col}"));
				if let Some(end_col) = self.end.and_then(|end| end.col) {
					location.push_str(&format!("-{end_col}"));
				}
			}
		}
		if let Some(label) = self.kind.label() {
			if !location.is_empty() {
				location.push(' ');
			}
			location.push_str(label);
		}
		if let Some(nr) = self.nr {
			if !location.is_empty() {
				location.push(' ');
			}
			location.push_str(&nr.to_string());
		}
		f.write_str(&location)?;

		write!(f, "| {}", self.text.trim_start())
	}
}
