//! Scan collaborators: reading sources, matching patterns, enumerating files.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::entry::SourceId;
use crate::{Error, Result};

/// One hit reported by a [`Matcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchHit {
	/// 1-based line.
	pub line: usize,
	/// 1-based column in characters, 0 when unknown.
	pub col: usize,
	pub text: String,
	pub valid: bool,
}

/// Loads the contents of a source. Runs outside the list guard.
pub trait SourceReader: Send + Sync {
	fn read(&self, source: &SourceId) -> io::Result<String>;
}

/// Pattern engine. The scan never interprets pattern syntax itself.
pub trait Matcher: Send + Sync {
	fn find(&self, source: &SourceId, text: &str) -> Vec<MatchHit>;
}

/// Reads sources as filesystem paths, replacing invalid UTF-8.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
	fn read(&self, source: &SourceId) -> io::Result<String> {
		let bytes = std::fs::read(source.as_str())?;
		Ok(String::from_utf8_lossy(&bytes).into_owned())
	}
}

/// In-memory sources, for buffers that are not on disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryReader {
	sources: HashMap<SourceId, String>,
}

impl MemoryReader {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, source: impl Into<SourceId>, text: impl Into<String>) -> &mut Self {
		self.sources.insert(source.into(), text.into());
		self
	}
}

impl SourceReader for MemoryReader {
	fn read(&self, source: &SourceId) -> io::Result<String> {
		self.sources
			.get(source)
			.cloned()
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no buffer named {source}")))
	}
}

/// Line-oriented regex matcher reporting the first match on each line.
#[derive(Clone, Debug)]
pub struct RegexMatcher {
	regex: Regex,
}

impl RegexMatcher {
	pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self> {
		let regex = RegexBuilder::new(pattern)
			.case_insensitive(!case_sensitive)
			.build()
			.map_err(|err| Error::InvalidPattern(err.to_string()))?;
		Ok(Self { regex })
	}
}

impl Matcher for RegexMatcher {
	fn find(&self, _source: &SourceId, text: &str) -> Vec<MatchHit> {
		text.lines()
			.enumerate()
			.filter_map(|(idx, line)| {
				let found = self.regex.find(line)?;
				Some(MatchHit {
					line: idx + 1,
					col: line[..found.start()].chars().count() + 1,
					text: line.to_string(),
					valid: true,
				})
			})
			.collect()
	}
}

/// Directory traversal settings for [`collect_sources`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
	pub hidden: bool,
	pub follow_symlinks: bool,
	pub git_ignore: bool,
	pub max_depth: Option<usize>,
}

impl Default for WalkOptions {
	fn default() -> Self {
		Self {
			hidden: false,
			follow_symlinks: false,
			git_ignore: true,
			max_depth: None,
		}
	}
}

/// Expands `roots` into an ordered source list.
///
/// File roots are kept in the order given. Each directory root expands to
/// the files beneath it in sorted path order, so results are reproducible.
pub fn collect_sources(roots: &[PathBuf], options: &WalkOptions) -> Vec<SourceId> {
	let mut sources = Vec::new();
	for root in roots {
		if !root.is_dir() {
			sources.push(path_source(root));
			continue;
		}

		let mut files: Vec<PathBuf> = build_walk(root, options)
			.build()
			.filter_map(|entry| match entry {
				Ok(entry) => entry.file_type().is_some_and(|ft| ft.is_file()).then(|| entry.into_path()),
				Err(err) => {
					tracing::warn!(root = %root.display(), error = %err, "qf.walk.error");
					None
				}
			})
			.collect();
		files.sort();
		tracing::debug!(root = %root.display(), files = files.len(), "qf.walk.complete");
		sources.extend(files.iter().map(|path| path_source(path)));
	}
	sources
}

fn path_source(path: &Path) -> SourceId {
	SourceId::new(path.to_string_lossy().replace('\\', "/"))
}

fn build_walk(root: &Path, options: &WalkOptions) -> WalkBuilder {
	let mut walker = WalkBuilder::new(root);

	walker
		.hidden(!options.hidden)
		.follow_links(options.follow_symlinks)
		.git_ignore(options.git_ignore)
		.git_exclude(options.git_ignore)
		.ignore(options.git_ignore)
		.parents(options.git_ignore)
		.require_git(false)
		.max_depth(options.max_depth);

	walker
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	#[test]
	fn regex_matcher_reports_first_hit_per_line() {
		let matcher = RegexMatcher::new("o+", true).unwrap();
		let hits = matcher.find(&SourceId::from("t"), "foo boo\nbar\nhéllo");
		assert_eq!(hits.len(), 2);
		assert_eq!((hits[0].line, hits[0].col), (1, 2));
		assert_eq!(hits[0].text, "foo boo");
		assert_eq!((hits[1].line, hits[1].col), (3, 5), "column counts characters, not bytes");
	}

	#[test]
	fn regex_matcher_case_folding() {
		let matcher = RegexMatcher::new("todo", false).unwrap();
		assert_eq!(matcher.find(&SourceId::from("t"), "TODO: x").len(), 1);
		assert!(matches!(RegexMatcher::new("(", true), Err(Error::InvalidPattern(_))));
	}

	#[test]
	fn memory_reader_reports_missing_buffers() {
		let mut reader = MemoryReader::new();
		reader.insert("a", "text");
		assert_eq!(reader.read(&SourceId::from("a")).unwrap(), "text");
		let err = reader.read(&SourceId::from("b")).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);
	}

	#[test]
	fn collect_sources_sorts_directories_and_keeps_file_order() {
		let temp_dir = tempfile::tempdir().expect("create tempdir");
		let root = temp_dir.path();
		fs::create_dir_all(root.join("sub")).unwrap();
		fs::write(root.join("b.txt"), "b").unwrap();
		fs::write(root.join("a.txt"), "a").unwrap();
		fs::write(root.join("sub/c.txt"), "c").unwrap();
		fs::write(root.join(".hidden"), "h").unwrap();

		let explicit = root.join("z.txt");
		fs::write(&explicit, "z").unwrap();

		let sources = collect_sources(&[explicit.clone(), root.join("sub"), root.to_path_buf()], &WalkOptions::default());
		let names: Vec<String> = sources
			.iter()
			.map(|s| Path::new(s.as_str()).strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
			.collect();
		assert_eq!(names, ["z.txt", "sub/c.txt", "a.txt", "b.txt", "sub/c.txt", "z.txt"]);
	}

	#[test]
	fn fs_reader_reads_lossy_utf8() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("bin.dat");
		fs::write(&path, b"ok\xffok").unwrap();
		let text = FsReader.read(&SourceId::new(path.to_string_lossy().to_string())).unwrap();
		assert_eq!(text, "ok\u{fffd}ok");
	}
}
