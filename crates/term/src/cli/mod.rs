//! CLI schema for the qfx binary.

use std::path::PathBuf;

use clap::Parser;
use qfx_core::ScanOptions;

#[derive(Parser, Debug)]
#[command(name = "qfx")]
#[command(about = "Grep into a navigable quickfix list")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Regex to search for (starts the command loop with an empty history if omitted)
	pub pattern: Option<String>,

	/// Files or directories to search (defaults to the current directory)
	pub paths: Vec<PathBuf>,

	/// Keep searching after the first file with a match
	#[arg(long, short = 'g')]
	pub global: bool,

	/// Do not jump to the first match
	#[arg(long, short = 'j')]
	pub no_jump: bool,

	/// Match case-insensitively
	#[arg(long, short = 'i')]
	pub ignore_case: bool,

	/// Let :cnext/:cprev wrap around the ends of the list
	#[arg(long)]
	pub wrap: bool,

	/// Stay in the command loop after the initial search
	#[arg(long, short = 'I')]
	pub interactive: bool,

	/// Configuration file (defaults to $XDG_CONFIG_HOME/qfx/config.toml)
	#[arg(long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v')]
	pub verbose: bool,
}

impl Cli {
	pub fn scan_options(&self) -> ScanOptions {
		ScanOptions {
			global: self.global,
			no_jump: self.no_jump,
		}
	}

	/// Search roots, falling back to `.` when none were given.
	pub fn roots(&self) -> Vec<PathBuf> {
		if self.paths.is_empty() {
			vec![PathBuf::from(".")]
		} else {
			self.paths.clone()
		}
	}

	/// Explicit `--config`, else the per-user config file if a config dir exists.
	pub fn config_path(&self) -> Option<PathBuf> {
		self.config
			.clone()
			.or_else(|| dirs::config_dir().map(|dir| dir.join("qfx").join("config.toml")))
	}

	/// Whether to enter the command loop at all.
	pub fn wants_command_loop(&self) -> bool {
		self.pattern.is_none() || self.interactive
	}
}

#[cfg(test)]
mod tests;
