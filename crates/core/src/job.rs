//! Background scan jobs running the producer protocol on a dedicated thread.

use std::sync::Arc;
use std::thread::JoinHandle;

use tokio_util::sync::CancellationToken;

use crate::SharedLists;
use crate::entry::SourceId;
use crate::list::ListContext;
use crate::options::{ScanConfig, ScanOptions};
use crate::scan::{ScanEvent, ScanReport, ScanRequest, run_scan};
use crate::set::ListHandle;
use crate::source::{Matcher, SourceReader};
use crate::{Error, Result};

/// Consumer callback for [`ScanEvent`]s, invoked on the scan thread.
pub type EventSink = Arc<dyn Fn(ScanEvent) + Send + Sync>;

/// Everything needed to start a scan into a fresh list.
#[derive(Clone, Debug)]
pub struct ScanSpec {
	pub title: String,
	pub pattern: String,
	pub sources: Vec<SourceId>,
	pub options: ScanOptions,
	pub config: ScanConfig,
}

/// A scan running in the background.
///
/// Dropping the job detaches the thread; the scan keeps running to completion.
pub struct ScanJob {
	handle: ListHandle,
	cancel: CancellationToken,
	thread: JoinHandle<Result<ScanReport>>,
}

impl ScanJob {
	/// Creates the target list under the guard and starts scanning into it.
	pub fn spawn(
		lists: SharedLists,
		spec: ScanSpec,
		reader: Arc<dyn SourceReader>,
		matcher: Arc<dyn Matcher>,
		events: EventSink,
	) -> Result<Self> {
		let handle = {
			let mut scope = lists.lock();
			let handle = scope.new_list(spec.title);
			scope.get_mut(handle)?.set_context(ListContext {
				pattern: spec.pattern,
				options: spec.options,
			});
			handle
		};

		let request = ScanRequest {
			handle,
			sources: spec.sources,
			options: spec.options,
			config: spec.config,
		};
		let cancel = CancellationToken::new();
		let token = cancel.clone();
		let worker_lists = Arc::clone(&lists);

		let spawned = std::thread::Builder::new().name(format!("qf-scan-{handle}")).spawn(move || {
			run_scan(&worker_lists, &request, reader.as_ref(), matcher.as_ref(), &token, events.as_ref())
		});

		match spawned {
			Ok(thread) => {
				tracing::trace!(%handle, "qf.job.spawn");
				Ok(Self { handle, cancel, thread })
			}
			Err(err) => {
				if let Ok(list) = lists.lock().get_mut(handle) {
					list.close();
				}
				Err(Error::Spawn(err))
			}
		}
	}

	pub fn handle(&self) -> ListHandle {
		self.handle
	}

	/// Requests cooperative cancellation; the scan stops after its current source.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	pub fn is_finished(&self) -> bool {
		self.thread.is_finished()
	}

	/// Waits for the scan to end. A panic on the scan thread is resumed here.
	pub fn join(self) -> Result<ScanReport> {
		match self.thread.join() {
			Ok(result) => result,
			Err(panic) => std::panic::resume_unwind(panic),
		}
	}
}
