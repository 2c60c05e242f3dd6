//! Producer protocol: populating a result list from a pattern scan.
//!
//! For each source in order the producer reads and matches *outside* the
//! guard, then takes the guard only to append the resulting entries. While
//! appending it hands the guard to waiting threads every `batch_size`
//! entries or `batch_interval`, so navigation stays responsive during large
//! scans. Cancellation is polled between sources.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::entry::{Entry, Position, SourceId};
use crate::guard::{Guard, GuardScope};
use crate::options::{ReadFailurePolicy, ScanConfig, ScanOptions};
use crate::set::{ListHandle, ListSet};
use crate::source::{MatchHit, Matcher, SourceReader};
use crate::{Error, Result};

/// Inputs for one run of [`run_scan`].
#[derive(Clone, Debug)]
pub struct ScanRequest {
	pub handle: ListHandle,
	pub sources: Vec<SourceId>,
	pub options: ScanOptions,
	pub config: ScanConfig,
}

/// Why a scan stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
	/// Every source was scanned.
	Completed,
	/// Stopped after the first source with a match (no `global` flag).
	FirstHit,
	/// Cancellation was requested.
	Cancelled,
}

/// Summary of a finished scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanReport {
	pub handle: ListHandle,
	pub outcome: ScanOutcome,
	pub sources_scanned: usize,
	pub entries: usize,
	pub read_failures: usize,
	/// Position made current by the scan, if it jumped.
	pub jumped_to: Option<usize>,
}

/// Notifications pushed to the consumer side. Never sent while the guard is held.
#[derive(Clone, Debug)]
pub enum ScanEvent {
	/// The first valid entry became current; the consumer should navigate there.
	Jump { handle: ListHandle, position: usize, entry: Arc<Entry> },
	Finished(ScanReport),
}

struct BatchClock {
	since_yield: usize,
	last_yield: Instant,
}

impl BatchClock {
	fn new() -> Self {
		Self {
			since_yield: 0,
			last_yield: Instant::now(),
		}
	}

	fn tick(&mut self, scope: &mut GuardScope<'_, ListSet>, config: &ScanConfig) {
		self.since_yield += 1;
		if self.since_yield >= config.batch_size.max(1) || self.last_yield.elapsed() >= config.batch_interval {
			scope.yield_fair();
			self.since_yield = 0;
			self.last_yield = Instant::now();
		}
	}
}

struct ScanState {
	wants_jump: bool,
	jumped_to: Option<usize>,
	entries: usize,
	read_failures: usize,
	sources_scanned: usize,
}

/// Runs the producer protocol against the list `request.handle`.
///
/// The list is closed on every exit path that still finds it. Fails with
/// [`Error::NotFound`] if the list is evicted mid-scan.
pub fn run_scan(
	lists: &Guard<ListSet>,
	request: &ScanRequest,
	reader: &dyn SourceReader,
	matcher: &dyn Matcher,
	cancel: &CancellationToken,
	on_event: &dyn Fn(ScanEvent),
) -> Result<ScanReport> {
	let start = Instant::now();
	let handle = request.handle;
	tracing::info!(
		%handle,
		sources = request.sources.len(),
		global = request.options.global,
		no_jump = request.options.no_jump,
		"qf.scan.start"
	);

	let mut state = ScanState {
		wants_jump: !request.options.no_jump,
		jumped_to: None,
		entries: 0,
		read_failures: 0,
		sources_scanned: 0,
	};
	let result = scan_sources(lists, request, reader, matcher, cancel, on_event, &mut state);

	{
		let mut scope = lists.lock();
		if let Ok(list) = scope.get_mut(handle) {
			list.close();
		}
	}

	let outcome = match result {
		Ok(outcome) => outcome,
		Err(err) => {
			tracing::warn!(%handle, error = %err, "qf.scan.aborted");
			return Err(err);
		}
	};

	let report = ScanReport {
		handle,
		outcome,
		sources_scanned: state.sources_scanned,
		entries: state.entries,
		read_failures: state.read_failures,
		jumped_to: state.jumped_to,
	};
	tracing::debug!(
		%handle,
		outcome = ?report.outcome,
		entries = report.entries,
		read_failures = report.read_failures,
		elapsed_ms = start.elapsed().as_millis() as u64,
		"qf.scan.complete"
	);
	on_event(ScanEvent::Finished(report.clone()));
	Ok(report)
}

fn scan_sources(
	lists: &Guard<ListSet>,
	request: &ScanRequest,
	reader: &dyn SourceReader,
	matcher: &dyn Matcher,
	cancel: &CancellationToken,
	on_event: &dyn Fn(ScanEvent),
	state: &mut ScanState,
) -> Result<ScanOutcome> {
	let handle = request.handle;
	let config = &request.config;
	let mut clock = BatchClock::new();

	for (idx, source) in request.sources.iter().enumerate() {
		if cancel.is_cancelled() {
			tracing::info!(%handle, scanned = state.sources_scanned, "qf.scan.cancelled");
			return Ok(ScanOutcome::Cancelled);
		}

		// I/O and matching happen without the guard.
		let (entries, hits) = match reader.read(source) {
			Ok(text) => {
				let hits = matcher.find(source, &text);
				let count = hits.iter().filter(|hit| hit.valid).count();
				(hits.into_iter().map(|hit| hit_entry(source, hit)).collect::<Vec<_>>(), count)
			}
			Err(error) => {
				state.read_failures += 1;
				let err = Error::SourceRead {
					source_id: source.clone(),
					error,
				};
				tracing::warn!(%handle, source = %source, error = %err, "qf.scan.source_failed");
				match config.read_failure {
					ReadFailurePolicy::Record => (vec![Entry::invalid(Some(source.clone()), err.to_string())], 0),
					ReadFailurePolicy::Skip => (Vec::new(), 0),
				}
			}
		};
		state.sources_scanned += 1;

		let mut jump = None;
		{
			let mut scope = lists.lock();
			for entry in entries {
				let valid = entry.valid;
				let list = scope.get_mut(handle)?;
				list.append(entry)?;
				state.entries += 1;

				if state.wants_jump && valid {
					state.wants_jump = false;
					if list.cursor() == 0 {
						let position = list.len();
						let current = list.jump_to(position)?;
						state.jumped_to = Some(position);
						jump = Some((position, current));
					}
				}
				clock.tick(&mut scope, config);
			}
		}

		if let Some((position, entry)) = jump {
			tracing::debug!(%handle, position, "qf.scan.jump");
			on_event(ScanEvent::Jump { handle, position, entry });
		}

		if !request.options.global && hits > 0 {
			let remaining = request.sources.len() - idx - 1;
			if remaining > 0 {
				tracing::debug!(%handle, source = %source, remaining, "qf.scan.first_hit");
				return Ok(ScanOutcome::FirstHit);
			}
		}
	}

	Ok(ScanOutcome::Completed)
}

fn hit_entry(source: &SourceId, hit: MatchHit) -> Entry {
	match Position::new(hit.line, hit.col) {
		Some(pos) if hit.valid => Entry::matched(source.clone(), pos, hit.text),
		_ => Entry::invalid(Some(source.clone()), hit.text),
	}
}
