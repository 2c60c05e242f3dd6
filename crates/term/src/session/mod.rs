//! Foreground state of the command loop: the shared list history, running
//! scan jobs, and the channel their events arrive on.
//!
//! Output is formatted while the guard is held and written after it is
//! released, so a slow terminal never stalls a producer.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use anyhow::{Context, bail};
use qfx_core::{
	Direction, Entry, EventSink, FsReader, ListHandle, ListSet, QuickfixConfig, RegexMatcher, ResultList, ScanEvent,
	ScanJob, ScanOptions, ScanOutcome, ScanReport, ScanSpec, SharedLists, collect_sources, shared_lists,
};

use crate::command::{Command, HELP};

/// Per-invocation choices taken from the command line.
#[derive(Clone, Debug)]
pub struct Settings {
	/// Searched when `:vimgrep` names no paths.
	pub roots: Vec<PathBuf>,
	pub case_sensitive: bool,
	pub wrap: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			roots: vec![PathBuf::from(".")],
			case_sensitive: true,
			wrap: false,
		}
	}
}

/// Whether the loop keeps reading commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Quit,
}

pub struct Session {
	lists: SharedLists,
	config: QuickfixConfig,
	settings: Settings,
	jobs: Vec<ScanJob>,
	events: mpsc::Receiver<ScanEvent>,
	sink: EventSink,
}

impl Session {
	pub fn new(config: QuickfixConfig, settings: Settings) -> Self {
		let (tx, events) = mpsc::channel();
		let sink: EventSink = Arc::new(move |event: ScanEvent| {
			let _ = tx.send(event);
		});
		Self {
			lists: shared_lists(config.history_capacity),
			config,
			settings,
			jobs: Vec::new(),
			events,
			sink,
		}
	}

	#[cfg(test)]
	pub(crate) fn lists(&self) -> &SharedLists {
		&self.lists
	}

	/// Walks `roots` and starts a background scan into a new list.
	pub fn start_scan(
		&mut self,
		pattern: &str,
		options: ScanOptions,
		roots: &[PathBuf],
		out: &mut impl Write,
	) -> anyhow::Result<ListHandle> {
		let matcher = RegexMatcher::new(pattern, self.settings.case_sensitive)?;
		let roots = if roots.is_empty() { self.settings.roots.as_slice() } else { roots };
		let sources = collect_sources(roots, &self.config.walk);
		if sources.is_empty() {
			bail!("no files to search");
		}

		let paths = roots.iter().map(|root| root.display().to_string()).collect::<Vec<_>>().join(" ");
		let spec = ScanSpec {
			title: format!(":vimgrep /{pattern}/{} {paths}", options.flag_string()),
			pattern: pattern.to_string(),
			sources,
			options,
			config: self.config.scan_config(),
		};
		let count = spec.sources.len();
		let job = ScanJob::spawn(
			Arc::clone(&self.lists),
			spec,
			Arc::new(FsReader),
			Arc::new(matcher),
			Arc::clone(&self.sink),
		)?;
		let handle = job.handle();
		self.jobs.push(job);
		tracing::debug!(%handle, sources = count, "qfx.session.scan_started");
		writeln!(out, "searching {count} files into list {handle}")?;
		Ok(handle)
	}

	/// Runs one command, writing its output to `out`.
	pub fn execute(&mut self, command: Command, out: &mut impl Write) -> anyhow::Result<Flow> {
		let wrap = self.settings.wrap;
		let text = match command {
			Command::Grep { pattern, options, paths } => {
				self.start_scan(&pattern, options, &paths, out)?;
				return Ok(Flow::Continue);
			}
			Command::Next(count) => self.navigate(|list| list.advance(Direction::Forward, count, wrap))?,
			Command::Prev(count) => self.navigate(|list| list.advance(Direction::Backward, count, wrap))?,
			Command::First => self.navigate(ResultList::first)?,
			Command::Last => self.navigate(ResultList::last)?,
			Command::Jump(Some(index)) => self.navigate(|list| list.jump_to(index))?,
			Command::Jump(None) => self.navigate(|list| match list.current() {
				Some(entry) => Ok(entry),
				None => list.first(),
			})?,
			Command::NextFile(count) => self.navigate(|list| list.advance_file(Direction::Forward, count))?,
			Command::PrevFile(count) => self.navigate(|list| list.advance_file(Direction::Backward, count))?,
			Command::Older(count) => self.switch(|set| set.older(count))?,
			Command::Newer(count) => self.switch(|set| set.newer(count))?,
			Command::History => self.history()?,
			Command::List => self.listing()?,
			Command::Stop => {
				let running = self.jobs.iter().filter(|job| !job.is_finished()).count();
				for job in &self.jobs {
					job.cancel();
				}
				format!("stopping {running} searches")
			}
			Command::Help => HELP.to_string(),
			Command::Quit => return Ok(Flow::Quit),
		};
		writeln!(out, "{text}")?;
		Ok(Flow::Continue)
	}

	/// Moves within the active list and renders the landing entry.
	fn navigate(&self, step: impl FnOnce(&mut ResultList) -> qfx_core::Result<Arc<Entry>>) -> anyhow::Result<String> {
		let mut scope = self.lists.lock();
		let list = scope.active_list_mut().context("no quickfix list")?;
		let entry = step(&mut *list)?;
		Ok(format!("({} of {}) {entry}", list.cursor(), list.len()))
	}

	fn switch(&self, step: impl FnOnce(&mut ListSet) -> qfx_core::Result<ListHandle>) -> anyhow::Result<String> {
		let mut scope = self.lists.lock();
		let handle = step(&mut *scope)?;
		let total = scope.len();
		let row = scope
			.history()
			.into_iter()
			.find(|row| row.handle == handle)
			.context("switched list vanished")?;
		Ok(format!("error list {} of {total}; {} entries  {}", row.position, row.len, row.title))
	}

	fn history(&self) -> anyhow::Result<String> {
		let rows = self.lists.with(|set| set.history());
		if rows.is_empty() {
			bail!("no quickfix lists");
		}
		let total = rows.len();
		Ok(rows
			.iter()
			.map(|row| {
				let marker = if row.active { '>' } else { ' ' };
				format!("{marker} error list {} of {total}; {} entries  {}", row.position, row.len, row.title)
			})
			.collect::<Vec<_>>()
			.join("\n"))
	}

	fn listing(&self) -> anyhow::Result<String> {
		let (entries, cursor, closed) = {
			let scope = self.lists.lock();
			let list = scope.active_list().context("no quickfix list")?;
			(list.snapshot(list.len()), list.cursor(), list.is_closed())
		};
		if entries.is_empty() {
			bail!(if closed { "no matches" } else { "no matches yet" });
		}
		Ok(entries
			.iter()
			.enumerate()
			.map(|(idx, entry)| {
				let marker = if idx + 1 == cursor { '>' } else { ' ' };
				format!("{marker}{:3} {entry}", idx + 1)
			})
			.collect::<Vec<_>>()
			.join("\n"))
	}

	/// Prints pending scan events and reaps finished jobs.
	pub fn drain_events(&mut self, out: &mut impl Write) -> io::Result<()> {
		while let Ok(event) = self.events.try_recv() {
			match event {
				ScanEvent::Jump { position, entry, .. } => writeln!(out, "({position}) {entry}")?,
				ScanEvent::Finished(report) => writeln!(out, "{}", summary(&report))?,
			}
		}

		let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.jobs).into_iter().partition(ScanJob::is_finished);
		self.jobs = running;
		for job in done {
			let handle = job.handle();
			if let Err(err) = job.join() {
				tracing::warn!(%handle, error = %err, "qfx.session.scan_failed");
				writeln!(out, "E: list {handle}: {err}")?;
			}
		}
		Ok(())
	}

	/// Blocks until every running scan has ended, then prints their events.
	pub fn wait(&mut self, out: &mut impl Write) -> io::Result<()> {
		for job in std::mem::take(&mut self.jobs) {
			let handle = job.handle();
			if let Err(err) = job.join() {
				writeln!(out, "E: list {handle}: {err}")?;
			}
		}
		self.drain_events(out)
	}

	/// Cancels outstanding scans and waits for them.
	pub fn shutdown(&mut self, out: &mut impl Write) -> io::Result<()> {
		for job in &self.jobs {
			job.cancel();
		}
		self.wait(out)
	}

	/// Reads commands from `input` until `:quit` or end of input.
	pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
		write!(out, ":")?;
		out.flush()?;
		for line in input.lines() {
			let line = line?;
			self.drain_events(out)?;
			match Command::parse(&line) {
				Ok(None) => {}
				Ok(Some(command)) => match self.execute(command, out) {
					Ok(Flow::Quit) => return Ok(()),
					Ok(Flow::Continue) => {}
					Err(err) => writeln!(out, "E: {err:#}")?,
				},
				Err(err) => writeln!(out, "E: {err}")?,
			}
			self.drain_events(out)?;
			write!(out, ":")?;
			out.flush()?;
		}
		Ok(())
	}
}

fn summary(report: &ScanReport) -> String {
	let mut text = format!(
		"list {}: {} entries from {} files",
		report.handle, report.entries, report.sources_scanned
	);
	if report.read_failures > 0 {
		text.push_str(&format!(", {} unreadable", report.read_failures));
	}
	match report.outcome {
		ScanOutcome::Completed | ScanOutcome::FirstHit => {}
		ScanOutcome::Cancelled => text.push_str(" (cancelled)"),
	}
	text
}
