//! Machine-checkable invariant proofs for the guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::Guard;

/// Must panic on re-entrant acquisition by the owning thread.
///
/// - Enforced in: `Guard::lock`
/// - Failure symptom: A nested lock on the same thread deadlocks silently.
#[cfg_attr(test, test)]
pub(crate) fn test_reentrant_lock_panics() {
	let guard = Guard::new(0u32);
	let _outer = guard.lock();

	let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
		let _inner = guard.lock();
	}));
	assert!(result.is_err(), "re-entrant lock did not panic");
	assert!(guard.is_held_by_current_thread(), "outer scope must still hold the guard");
}

/// Must release the guard on every exit path of a scope.
///
/// - Enforced in: `GuardScope::drop`
/// - Failure symptom: An early return or unwind leaves the list history locked forever.
#[cfg_attr(test, test)]
pub(crate) fn test_release_on_early_exit() {
	let guard = Guard::new(Vec::<u32>::new());

	fn push_or_bail(guard: &Guard<Vec<u32>>, value: u32) -> Result<(), &'static str> {
		let mut scope = guard.lock();
		if value == 0 {
			return Err("zero");
		}
		scope.push(value);
		Ok(())
	}

	assert!(push_or_bail(&guard, 0).is_err());
	assert!(!guard.is_locked());
	push_or_bail(&guard, 7).unwrap();
	assert!(!guard.is_locked());

	let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
		let _scope = guard.lock();
		panic!("boom");
	}));
	assert!(result.is_err());
	assert!(!guard.is_locked(), "unwinding must release the guard");
	assert!(!guard.is_held_by_current_thread());
	assert_eq!(guard.into_inner(), vec![7]);
}

/// Must hand the guard to a waiting thread before reacquiring in `yield_fair`.
///
/// - Enforced in: `GuardScope::yield_fair`
/// - Failure symptom: Navigation stalls until a large scan finishes.
#[cfg_attr(test, test)]
pub(crate) fn test_yield_fair_lets_waiter_in() {
	let guard = Arc::new(Guard::new(Vec::<&'static str>::new()));
	let waiting = Arc::new(AtomicBool::new(false));

	let mut scope = guard.lock();
	let waiter = {
		let guard = Arc::clone(&guard);
		let waiting = Arc::clone(&waiting);
		thread::spawn(move || {
			waiting.store(true, Ordering::Release);
			guard.lock().push("waiter");
		})
	};

	while !waiting.load(Ordering::Acquire) {
		thread::yield_now();
	}

	scope.push("producer");
	// The waiter may not have parked yet; keep yielding until it got its turn.
	for _ in 0..200 {
		scope.yield_fair();
		if scope.contains(&"waiter") {
			break;
		}
		thread::sleep(Duration::from_millis(5));
	}
	scope.push("producer-after-yield");
	assert!(guard.is_held_by_current_thread());
	drop(scope);
	waiter.join().expect("waiter thread");

	let order = guard.lock().clone();
	assert_eq!(order, ["producer", "waiter", "producer-after-yield"]);
}

/// Must fail `try_lock` while another scope is live and succeed after release.
///
/// - Enforced in: `Guard::try_lock`
/// - Failure symptom: Two scopes mutate the list history at once.
#[cfg_attr(test, test)]
pub(crate) fn test_try_lock_respects_holder() {
	let guard = Guard::new(());
	let scope = guard.lock();
	assert!(guard.try_lock().is_none());
	drop(scope);
	assert!(guard.try_lock().is_some());
}

/// Must run `Guard::with` closures inside a scope and release it afterwards.
///
/// - Enforced in: `Guard::with`
/// - Failure symptom: A closure observes the state without the lock, or the lock leaks.
#[cfg_attr(test, test)]
pub(crate) fn test_with_scopes_the_closure() {
	let guard = Guard::new(vec![1u32]);
	let held = guard.with(|values| {
		values.push(2);
		guard.is_held_by_current_thread()
	});
	assert!(held, "closure must run while the guard is held");
	assert!(!guard.is_locked());
	assert_eq!(guard.with(|values| values.len()), 2);
}
