//! Scoped mutual exclusion for shared list state.
//!
//! [`Guard`] wraps a `parking_lot` mutex and records which thread holds it.
//! Acquisition hands out a [`GuardScope`] that releases on drop, so every
//! exit path (early return, `?`, panic) unlocks. Misuse is a programmer
//! error and panics:
//!
//! * acquiring again on the thread that already holds the guard (a plain
//!   mutex would deadlock here),
//! * finding a foreign owner recorded when a scope is released.
//!
//! Scopes are `!Send`, so a scope can only be released by the thread that
//! acquired it.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

const UNOWNED: u64 = 0;
/// Holds at least this long are logged on release.
const LONG_HOLD: Duration = Duration::from_millis(50);

fn thread_token() -> u64 {
	static NEXT: AtomicU64 = AtomicU64::new(1);
	thread_local! {
		static TOKEN: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
	}
	TOKEN.with(|token| *token)
}

/// Mutex with owner tracking and fair hand-off.
#[derive(Debug)]
pub struct Guard<T> {
	inner: Mutex<T>,
	owner: AtomicU64,
}

impl<T: Default> Default for Guard<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T> Guard<T> {
	pub fn new(value: T) -> Self {
		Self {
			inner: Mutex::new(value),
			owner: AtomicU64::new(UNOWNED),
		}
	}

	/// Blocks until the guard is free and returns a scope holding it.
	///
	/// # Panics
	///
	/// Panics if the calling thread already holds this guard.
	pub fn lock(&self) -> GuardScope<'_, T> {
		let token = thread_token();
		if self.owner.load(Ordering::Acquire) == token {
			panic!("guard re-acquired by the thread that already holds it");
		}

		let inner = match self.inner.try_lock() {
			Some(inner) => inner,
			None => {
				tracing::trace!("qf.guard.contended");
				self.inner.lock()
			}
		};
		self.claim(token);

		GuardScope {
			guard: self,
			inner,
			token,
			acquired: Instant::now(),
		}
	}

	/// Returns a scope if the guard is free right now.
	pub fn try_lock(&self) -> Option<GuardScope<'_, T>> {
		let token = thread_token();
		let inner = self.inner.try_lock()?;
		self.claim(token);
		Some(GuardScope {
			guard: self,
			inner,
			token,
			acquired: Instant::now(),
		})
	}

	/// Runs `f` inside one acquire/release scope.
	pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
		let mut scope = self.lock();
		f(&mut scope)
	}

	pub fn is_locked(&self) -> bool {
		self.inner.is_locked()
	}

	pub fn is_held_by_current_thread(&self) -> bool {
		self.owner.load(Ordering::Acquire) == thread_token()
	}

	pub fn into_inner(self) -> T {
		self.inner.into_inner()
	}

	fn claim(&self, token: u64) {
		let previous = self.owner.swap(token, Ordering::AcqRel);
		assert_eq!(previous, UNOWNED, "guard acquired while owner {previous} was still recorded");
	}
}

/// Proof of holding a [`Guard`]; releases on drop.
pub struct GuardScope<'a, T> {
	guard: &'a Guard<T>,
	inner: MutexGuard<'a, T>,
	token: u64,
	acquired: Instant,
}

impl<T> GuardScope<'_, T> {
	/// Releases the guard, lets any waiting thread take it first, and
	/// reacquires it before returning.
	pub fn yield_fair(&mut self) {
		self.release_owner();
		MutexGuard::unlocked_fair(&mut self.inner, || {});
		self.guard.claim(self.token);
		self.acquired = Instant::now();
	}

	fn release_owner(&self) {
		let previous = self.guard.owner.swap(UNOWNED, Ordering::AcqRel);
		if previous != self.token && !std::thread::panicking() {
			panic!("guard released by thread {} while owned by {previous}", self.token);
		}

		let held = self.acquired.elapsed();
		if held >= LONG_HOLD {
			tracing::debug!(held_ms = held.as_millis() as u64, "qf.guard.long_hold");
		}
	}
}

impl<T> Deref for GuardScope<'_, T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.inner
	}
}

impl<T> DerefMut for GuardScope<'_, T> {
	fn deref_mut(&mut self) -> &mut T {
		&mut self.inner
	}
}

impl<T> Drop for GuardScope<'_, T> {
	fn drop(&mut self) {
		// Owner is cleared before `inner` drops and unlocks the mutex.
		self.release_owner();
	}
}

#[cfg(test)]
mod invariants;
