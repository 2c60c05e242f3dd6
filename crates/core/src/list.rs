//! A single result list: ordered entries plus a navigation cursor.

use std::sync::Arc;

use crate::entry::{Entry, SourceId};
use crate::options::ScanOptions;
use crate::set::ListHandle;
use crate::{Error, Result};

/// Navigation direction shared by entry and list-history movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
	Forward,
	Backward,
}

/// How a list was produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListContext {
	pub pattern: String,
	pub options: ScanOptions,
}

/// Ordered entries with a 1-based cursor where 0 means "before the first entry".
#[derive(Debug)]
pub struct ResultList {
	handle: ListHandle,
	title: String,
	context: Option<ListContext>,
	entries: Vec<Arc<Entry>>,
	cursor: usize,
	changedtick: u64,
	closed: bool,
}

impl ResultList {
	pub(crate) fn new(handle: ListHandle, title: impl Into<String>) -> Self {
		Self {
			handle,
			title: title.into(),
			context: None,
			entries: Vec::new(),
			cursor: 0,
			changedtick: 0,
			closed: false,
		}
	}

	pub fn handle(&self) -> ListHandle {
		self.handle
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn context(&self) -> Option<&ListContext> {
		self.context.as_ref()
	}

	pub fn set_context(&mut self, context: ListContext) {
		self.context = Some(context);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Current 1-based position, or 0 while nothing is selected.
	pub fn cursor(&self) -> usize {
		self.cursor
	}

	/// Mutation counter, bumped on every append and clear.
	pub fn changedtick(&self) -> u64 {
		self.changedtick
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	/// Marks the list complete. Closed lists reject further appends.
	pub fn close(&mut self) {
		self.closed = true;
	}

	pub fn entries(&self) -> &[Arc<Entry>] {
		&self.entries
	}

	/// Clones the first `len` entries (fewer if the list is shorter) so they
	/// can be read after the guard is released.
	pub fn snapshot(&self, len: usize) -> Vec<Arc<Entry>> {
		self.entries[..len.min(self.entries.len())].to_vec()
	}

	/// Entry under the cursor, if any.
	pub fn current(&self) -> Option<Arc<Entry>> {
		self.cursor.checked_sub(1).and_then(|idx| self.entries.get(idx)).cloned()
	}

	/// Appends at the end without moving the cursor.
	pub fn append(&mut self, entry: Entry) -> Result<()> {
		if self.closed {
			return Err(Error::ListClosed(self.handle));
		}
		self.entries.push(Arc::new(entry));
		self.changedtick = self.changedtick.wrapping_add(1);
		Ok(())
	}

	/// Returns the entry at 1-based `index`.
	pub fn entry_at(&self, index: usize) -> Result<Arc<Entry>> {
		index
			.checked_sub(1)
			.and_then(|idx| self.entries.get(idx))
			.cloned()
			.ok_or(Error::OutOfRange { index, len: self.entries.len() })
	}

	/// Makes 1-based `index` current.
	pub fn jump_to(&mut self, index: usize) -> Result<Arc<Entry>> {
		let entry = self.entry_at(index)?;
		self.cursor = index;
		Ok(entry)
	}

	pub fn first(&mut self) -> Result<Arc<Entry>> {
		if self.entries.is_empty() {
			return Err(Error::NoMoreEntries);
		}
		self.jump_to(1)
	}

	pub fn last(&mut self) -> Result<Arc<Entry>> {
		if self.entries.is_empty() {
			return Err(Error::NoMoreEntries);
		}
		self.jump_to(self.entries.len())
	}

	/// Moves the cursor `count` entries (0 counts as 1).
	///
	/// From the sentinel, forward lands on `count` and backward on
	/// `len + 1 - count`. Without `wrap`, moving past either end fails with
	/// [`Error::NoMoreEntries`] and leaves the cursor where it was.
	pub fn advance(&mut self, direction: Direction, count: usize, wrap: bool) -> Result<Arc<Entry>> {
		let len = self.entries.len();
		if len == 0 {
			return Err(Error::NoMoreEntries);
		}
		let count = count.max(1);

		let target = match direction {
			Direction::Forward => {
				let origin = self.cursor;
				if count <= len - origin {
					origin + count
				} else if wrap {
					(origin % len + (count - 1) % len) % len + 1
				} else {
					return Err(Error::NoMoreEntries);
				}
			}
			Direction::Backward => {
				let origin = if self.cursor == 0 { len + 1 } else { self.cursor };
				if count < origin {
					origin - count
				} else if wrap {
					len - (count - origin) % len
				} else {
					return Err(Error::NoMoreEntries);
				}
			}
		};

		self.jump_to(target)
	}

	/// Moves to the `count`th different source in `direction`.
	///
	/// Forward lands on the first entry of that source, backward on its last
	/// entry, the way `:cnfile`/`:cpfile` do.
	pub fn advance_file(&mut self, direction: Direction, count: usize) -> Result<Arc<Entry>> {
		let len = self.entries.len();
		if len == 0 {
			return Err(Error::NoMoreEntries);
		}
		let mut remaining = count.max(1);
		let mut current: Option<&SourceId> = self.current_source();

		let target = match direction {
			Direction::Forward => {
				let mut found = None;
				for index in (self.cursor + 1)..=len {
					let source = self.entries[index - 1].source.as_ref();
					if (self.cursor == 0 && index == 1) || source != current {
						remaining -= 1;
						if remaining == 0 {
							found = Some(index);
							break;
						}
						current = source;
					}
				}
				found
			}
			Direction::Backward => {
				let mut found = None;
				if self.cursor > 1 {
					for index in (1..self.cursor).rev() {
						let source = self.entries[index - 1].source.as_ref();
						if source != current {
							remaining -= 1;
							if remaining == 0 {
								found = Some(index);
								break;
							}
							current = source;
						}
					}
				}
				found
			}
		};

		match target {
			Some(index) => self.jump_to(index),
			None => Err(Error::NoMoreEntries),
		}
	}

	/// Drops every entry and resets the cursor to the sentinel. Closed lists
	/// are immutable and fail with [`Error::ListClosed`].
	pub fn clear(&mut self) -> Result<()> {
		if self.closed {
			return Err(Error::ListClosed(self.handle));
		}
		self.entries.clear();
		self.cursor = 0;
		self.changedtick = self.changedtick.wrapping_add(1);
		Ok(())
	}

	fn current_source(&self) -> Option<&SourceId> {
		self.cursor
			.checked_sub(1)
			.and_then(|idx| self.entries.get(idx))
			.and_then(|entry| entry.source.as_ref())
	}
}
