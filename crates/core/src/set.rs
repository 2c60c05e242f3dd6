//! Bounded history of result lists with one active list.

use std::collections::VecDeque;
use std::fmt;

use crate::list::{Direction, ResultList};
use crate::{Error, Result};

/// Default number of lists kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 10;

/// Stable identity of a [`ResultList`].
///
/// Survives reordering of the history but not eviction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListHandle(u64);

impl ListHandle {
	pub const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}
}

impl fmt::Display for ListHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// One row of [`ListSet::history`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRow {
	/// 1-based position in the history, oldest first.
	pub position: usize,
	pub handle: ListHandle,
	pub title: String,
	pub len: usize,
	pub active: bool,
}

/// Ordered result lists, oldest first, at most `capacity` of them.
#[derive(Debug)]
pub struct ListSet {
	lists: VecDeque<ResultList>,
	active: Option<usize>,
	capacity: usize,
	next_handle: u64,
}

impl Default for ListSet {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

impl ListSet {
	/// Creates an empty set. A capacity of 0 is raised to 1.
	pub fn new(capacity: usize) -> Self {
		let capacity = capacity.max(1);
		Self {
			lists: VecDeque::with_capacity(capacity),
			active: None,
			capacity,
			next_handle: 0,
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn len(&self) -> usize {
		self.lists.len()
	}

	pub fn is_empty(&self) -> bool {
		self.lists.is_empty()
	}

	/// Creates an empty list, makes it active, and evicts the oldest list
	/// when the set is over capacity.
	pub fn new_list(&mut self, title: impl Into<String>) -> ListHandle {
		self.next_handle = self.next_handle.wrapping_add(1);
		let handle = ListHandle(self.next_handle);

		if self.lists.len() == self.capacity
			&& let Some(evicted) = self.lists.pop_front()
		{
			tracing::debug!(handle = %evicted.handle(), entries = evicted.len(), "qf.list.evict");
		}

		self.lists.push_back(ResultList::new(handle, title));
		self.active = Some(self.lists.len() - 1);
		tracing::trace!(%handle, lists = self.lists.len(), "qf.list.new");
		handle
	}

	/// Makes `handle` the active list.
	pub fn set_active(&mut self, handle: ListHandle) -> Result<()> {
		let index = self.position(handle).ok_or(Error::NotFound(handle))?;
		self.active = Some(index);
		Ok(())
	}

	pub fn active_handle(&self) -> Option<ListHandle> {
		self.active.map(|idx| self.lists[idx].handle())
	}

	pub fn active_list(&self) -> Option<&ResultList> {
		self.active.and_then(|idx| self.lists.get(idx))
	}

	pub fn active_list_mut(&mut self) -> Option<&mut ResultList> {
		self.active.and_then(|idx| self.lists.get_mut(idx))
	}

	pub fn get(&self, handle: ListHandle) -> Result<&ResultList> {
		self.position(handle).map(|idx| &self.lists[idx]).ok_or(Error::NotFound(handle))
	}

	pub fn get_mut(&mut self, handle: ListHandle) -> Result<&mut ResultList> {
		match self.position(handle) {
			Some(idx) => Ok(&mut self.lists[idx]),
			None => Err(Error::NotFound(handle)),
		}
	}

	/// Moves the active pointer one list in `direction`, wrapping at the ends.
	pub fn cycle(&mut self, direction: Direction) -> Result<ListHandle> {
		let len = self.lists.len();
		let current = self.active.ok_or(Error::Empty)?;
		let next = match direction {
			Direction::Forward => (current + 1) % len,
			Direction::Backward => (current + len - 1) % len,
		};
		self.active = Some(next);
		Ok(self.lists[next].handle())
	}

	/// Activates the list `count` steps older, without wrapping.
	pub fn older(&mut self, count: usize) -> Result<ListHandle> {
		self.step(Direction::Backward, count)
	}

	/// Activates the list `count` steps newer, without wrapping.
	pub fn newer(&mut self, count: usize) -> Result<ListHandle> {
		self.step(Direction::Forward, count)
	}

	/// Drops the list for `handle`, keeping the active pointer on the same
	/// list when it survives.
	pub fn remove(&mut self, handle: ListHandle) -> Result<ResultList> {
		let index = self.position(handle).ok_or(Error::NotFound(handle))?;
		let removed = self.lists.remove(index).ok_or(Error::NotFound(handle))?;
		self.active = match self.active {
			_ if self.lists.is_empty() => None,
			Some(active) if active > index => Some(active - 1),
			Some(active) if active == index => Some(active.min(self.lists.len() - 1)),
			other => other,
		};
		Ok(removed)
	}

	/// Drops every list.
	pub fn clear(&mut self) {
		self.lists.clear();
		self.active = None;
	}

	pub fn iter(&self) -> impl Iterator<Item = &ResultList> {
		self.lists.iter()
	}

	/// Summary rows for every list, oldest first.
	pub fn history(&self) -> Vec<HistoryRow> {
		self.lists
			.iter()
			.enumerate()
			.map(|(idx, list)| HistoryRow {
				position: idx + 1,
				handle: list.handle(),
				title: list.title().to_string(),
				len: list.len(),
				active: self.active == Some(idx),
			})
			.collect()
	}

	fn step(&mut self, direction: Direction, count: usize) -> Result<ListHandle> {
		let current = self.active.ok_or(Error::Empty)?;
		let count = count.max(1);
		let target = match direction {
			Direction::Forward => current.checked_add(count).filter(|idx| *idx < self.lists.len()),
			Direction::Backward => current.checked_sub(count),
		}
		.ok_or(Error::AtHistoryEdge(direction))?;
		self.active = Some(target);
		Ok(self.lists[target].handle())
	}

	fn position(&self, handle: ListHandle) -> Option<usize> {
		self.lists.iter().position(|list| list.handle() == handle)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn titles(set: &ListSet) -> Vec<String> {
		set.iter().map(|list| list.title().to_string()).collect()
	}

	#[test]
	fn empty_set_has_no_active_list() {
		let mut set = ListSet::new(3);
		assert!(set.active_list().is_none());
		assert!(set.active_handle().is_none());
		assert!(matches!(set.cycle(Direction::Forward), Err(Error::Empty)));
		assert!(matches!(set.older(1), Err(Error::Empty)));
	}

	#[test]
	fn new_list_becomes_active() {
		let mut set = ListSet::new(3);
		let first = set.new_list("one");
		let second = set.new_list("two");
		assert_ne!(first, second);
		assert_eq!(set.active_handle(), Some(second));
		assert_eq!(set.active_list().unwrap().title(), "two");
	}

	#[test]
	fn zero_capacity_still_holds_one_list() {
		let mut set = ListSet::new(0);
		assert_eq!(set.capacity(), 1);
		set.new_list("one");
		let second = set.new_list("two");
		assert_eq!(set.len(), 1);
		assert_eq!(set.active_handle(), Some(second));
		assert_eq!(ListSet::default().capacity(), DEFAULT_CAPACITY);
	}

	#[test]
	fn eviction_drops_exactly_the_oldest() {
		let mut set = ListSet::new(2);
		let oldest = set.new_list("one");
		let middle = set.new_list("two");
		let newest = set.new_list("three");

		assert_eq!(set.len(), 2);
		assert_eq!(titles(&set), ["two", "three"]);
		assert!(matches!(set.set_active(oldest), Err(Error::NotFound(h)) if h == oldest));
		set.set_active(middle).expect("middle list survives");
		assert_eq!(set.active_handle(), Some(middle));
		assert!(set.get(newest).is_ok());
	}

	#[test]
	fn cycle_wraps_both_ways() {
		let mut set = ListSet::new(5);
		let a = set.new_list("a");
		let b = set.new_list("b");
		let c = set.new_list("c");

		assert_eq!(set.cycle(Direction::Forward).unwrap(), a);
		assert_eq!(set.cycle(Direction::Backward).unwrap(), c);
		assert_eq!(set.cycle(Direction::Backward).unwrap(), b);
	}

	#[test]
	fn older_and_newer_stop_at_edges() {
		let mut set = ListSet::new(5);
		let a = set.new_list("a");
		set.new_list("b");
		let c = set.new_list("c");

		assert!(matches!(set.newer(1), Err(Error::AtHistoryEdge(Direction::Forward))));
		assert_eq!(set.older(2).unwrap(), a);
		assert!(matches!(set.older(1), Err(Error::AtHistoryEdge(Direction::Backward))));
		assert_eq!(set.active_handle(), Some(a));
		assert_eq!(set.newer(5).map_err(|e| e.to_string()).unwrap_err(), "at top of quickfix stack");
		assert_eq!(set.newer(2).unwrap(), c);
	}

	#[test]
	fn remove_keeps_active_pointer_valid() {
		let mut set = ListSet::new(5);
		let a = set.new_list("a");
		let b = set.new_list("b");
		let c = set.new_list("c");
		set.set_active(b).unwrap();

		set.remove(a).unwrap();
		assert_eq!(set.active_handle(), Some(b));

		set.remove(b).unwrap();
		assert_eq!(set.active_handle(), Some(c));

		set.remove(c).unwrap();
		assert!(set.active_list().is_none());
		assert!(matches!(set.remove(c), Err(Error::NotFound(_))));
	}

	#[test]
	fn history_marks_active_row() {
		let mut set = ListSet::new(5);
		set.new_list("grep foo");
		let second = set.new_list("grep bar");
		set.older(1).unwrap();

		let rows = set.history();
		assert_eq!(rows.len(), 2);
		assert!(rows[0].active);
		assert!(!rows[1].active);
		assert_eq!(rows[1].handle, second);
		assert_eq!(rows[1].position, 2);
	}
}
