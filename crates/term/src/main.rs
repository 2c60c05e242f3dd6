//! qfx: grep into a quickfix list and navigate it from a command loop while
//! the search is still running.

mod cli;
mod command;
mod session;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use cli::Cli;
use command::Command;
use qfx_core::QuickfixConfig;
use session::{Session, Settings};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	let config = match cli.config_path() {
		Some(path) => QuickfixConfig::load(&path)?,
		None => QuickfixConfig::default(),
	};
	tracing::debug!(?config, "qfx.config");

	let mut session = Session::new(
		config,
		Settings {
			roots: cli.roots(),
			case_sensitive: !cli.ignore_case,
			wrap: cli.wrap,
		},
	);
	let stdout = io::stdout();
	let mut out = stdout.lock();

	if let Some(pattern) = &cli.pattern {
		session.start_scan(pattern, cli.scan_options(), &cli.roots(), &mut out)?;
		if !cli.wants_command_loop() {
			session.wait(&mut out)?;
			if let Err(err) = session.execute(Command::List, &mut out) {
				eprintln!("{err:#}");
			}
			return Ok(());
		}
	}

	session.run(io::stdin().lock(), &mut out)?;
	session.shutdown(&mut out)?;
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_env("QFX_LOG").unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("qfx_core=debug,qfx_term=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		})
	};

	// QFX_LOG_DIR keeps logs out of the command loop's output
	if let Some(log_dir) = std::env::var("QFX_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("qfx.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "qfx.tracing.file");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(io::stderr)
		.init();
}
