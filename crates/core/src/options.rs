//! Scan behavior flags and producer tuning.

use std::ops::BitOr;
use std::time::Duration;

use serde::Deserialize;

/// Flags controlling how a scan populates its list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScanOptions {
	/// Keep scanning every source instead of stopping after the first
	/// source with a match.
	pub global: bool,
	/// Populate without making the first match current.
	pub no_jump: bool,
}

impl ScanOptions {
	pub const GLOBAL: u8 = 1;
	pub const NOJUMP: u8 = 2;

	pub const fn global() -> Self {
		Self { global: true, no_jump: false }
	}

	pub const fn no_jump() -> Self {
		Self { global: false, no_jump: true }
	}

	/// Decodes the `GLOBAL | NOJUMP` bit encoding. Unknown bits are ignored.
	pub const fn from_bits(bits: u8) -> Self {
		Self {
			global: bits & Self::GLOBAL != 0,
			no_jump: bits & Self::NOJUMP != 0,
		}
	}

	pub const fn bits(self) -> u8 {
		(if self.global { Self::GLOBAL } else { 0 }) | (if self.no_jump { Self::NOJUMP } else { 0 })
	}

	/// Flag letters as written after a `/pattern/`.
	pub fn flag_string(self) -> String {
		let mut flags = String::new();
		if self.global {
			flags.push('g');
		}
		if self.no_jump {
			flags.push('j');
		}
		flags
	}
}

impl BitOr for ScanOptions {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self {
			global: self.global || rhs.global,
			no_jump: self.no_jump || rhs.no_jump,
		}
	}
}

/// What to do with a source that cannot be read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadFailurePolicy {
	/// Append an invalid entry naming the source and the error.
	#[default]
	Record,
	/// Log and move on.
	Skip,
}

/// Producer tuning: how often the guard is released during a scan and how
/// read failures are handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
	pub batch_size: usize,
	pub batch_interval: Duration,
	pub read_failure: ReadFailurePolicy,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			batch_size: 64,
			batch_interval: Duration::from_millis(120),
			read_failure: ReadFailurePolicy::Record,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bits_round_trip_through_struct() {
		assert_eq!(ScanOptions::from_bits(0), ScanOptions::default());
		assert_eq!(ScanOptions::from_bits(ScanOptions::GLOBAL), ScanOptions::global());
		assert_eq!(ScanOptions::from_bits(ScanOptions::NOJUMP), ScanOptions::no_jump());

		let both = ScanOptions::from_bits(ScanOptions::GLOBAL | ScanOptions::NOJUMP);
		assert!(both.global && both.no_jump);
		assert_eq!(both.bits(), 3);
		assert_eq!(ScanOptions::global() | ScanOptions::no_jump(), both);
	}

	#[test]
	fn unknown_bits_are_ignored() {
		assert_eq!(ScanOptions::from_bits(0b1000_0001), ScanOptions::global());
	}

	#[test]
	fn flag_string_orders_letters() {
		assert_eq!(ScanOptions::default().flag_string(), "");
		assert_eq!((ScanOptions::global() | ScanOptions::no_jump()).flag_string(), "gj");
	}
}
