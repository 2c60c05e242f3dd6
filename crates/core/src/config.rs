//! TOML configuration for list history, scan batching, and file walking.
//!
//! ```toml
//! history_capacity = 10
//!
//! [scan]
//! batch_size = 64
//! batch_interval_ms = 120
//! read_failure = "record"   # or "skip"
//!
//! [walk]
//! hidden = false
//! follow_symlinks = false
//! git_ignore = true
//! max_depth = 8
//! ```
//!
//! Every field is optional; missing fields take the defaults above.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::options::{ReadFailurePolicy, ScanConfig};
use crate::set::DEFAULT_CAPACITY;
use crate::source::WalkOptions;
use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuickfixConfig {
	pub history_capacity: usize,
	pub scan: ScanSection,
	pub walk: WalkOptions,
}

impl Default for QuickfixConfig {
	fn default() -> Self {
		Self {
			history_capacity: DEFAULT_CAPACITY,
			scan: ScanSection::default(),
			walk: WalkOptions::default(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSection {
	pub batch_size: usize,
	pub batch_interval_ms: u64,
	pub read_failure: ReadFailurePolicy,
}

impl Default for ScanSection {
	fn default() -> Self {
		let defaults = ScanConfig::default();
		Self {
			batch_size: defaults.batch_size,
			batch_interval_ms: defaults.batch_interval.as_millis() as u64,
			read_failure: defaults.read_failure,
		}
	}
}

impl QuickfixConfig {
	pub fn parse(input: &str) -> Result<Self> {
		toml::from_str(input).map_err(|err| Error::Config(err.to_string()))
	}

	/// Loads `path`, falling back to defaults when the file does not exist.
	pub fn load(path: &Path) -> Result<Self> {
		match std::fs::read_to_string(path) {
			Ok(text) => {
				let config = Self::parse(&text)?;
				tracing::debug!(path = %path.display(), "qf.config.loaded");
				Ok(config)
			}
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "qf.config.missing");
				Ok(Self::default())
			}
			Err(err) => Err(Error::Config(format!("{}: {err}", path.display()))),
		}
	}

	pub fn scan_config(&self) -> ScanConfig {
		ScanConfig {
			batch_size: self.scan.batch_size.max(1),
			batch_interval: Duration::from_millis(self.scan.batch_interval_ms),
			read_failure: self.scan.read_failure,
		}
	}
}
