//! Common utilities for quickfix integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Installs a fmt subscriber once so `qf.*` events show up with `--nocapture`.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Writes `files` under a fresh temp dir and returns it with the created paths in order.
pub fn write_tree(files: &[(&str, &str)]) -> (tempfile::TempDir, Vec<PathBuf>) {
	let dir = tempfile::tempdir().expect("failed to create temp dir");
	let paths = files
		.iter()
		.map(|(name, text)| {
			let path = dir.path().join(name);
			if let Some(parent) = path.parent() {
				std::fs::create_dir_all(parent).expect("create parent dir");
			}
			std::fs::write(&path, text).expect("write fixture");
			path
		})
		.collect();
	(dir, paths)
}

/// File name of a source id relative to `root`.
pub fn relative(root: &Path, source: &str) -> String {
	Path::new(source)
		.strip_prefix(root)
		.unwrap_or(Path::new(source))
		.to_string_lossy()
		.replace('\\', "/")
}

/// Runs `f` on a thread and panics if it does not finish within `limit`.
pub fn with_deadline<R: Send + 'static>(name: &str, limit: Duration, f: impl FnOnce() -> R + Send + 'static) -> R {
	let (tx, rx) = mpsc::channel();
	let worker = thread::spawn(move || {
		let _ = tx.send(f());
	});
	match rx.recv_timeout(limit) {
		Ok(result) => {
			worker.join().expect("deadline worker");
			result
		}
		Err(mpsc::RecvTimeoutError::Disconnected) => match worker.join() {
			Err(panic) => std::panic::resume_unwind(panic),
			Ok(()) => panic!("{name} finished without a result"),
		},
		Err(mpsc::RecvTimeoutError::Timeout) => panic!("timed out waiting for {name} (possible deadlock)"),
	}
}
