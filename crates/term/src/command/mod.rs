//! Ex-style command line parsing for the command loop.
//!
//! Names accept the usual abbreviations (`:cn`, `:cla`, `:col`), and a
//! leading `:` is optional.

use std::path::PathBuf;

use qfx_core::{ScanOptions, parse_pattern_arg};
use thiserror::Error;

/// A parsed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
	/// `:vimgrep /pattern/[g][j] [paths...]`
	Grep {
		pattern: String,
		options: ScanOptions,
		paths: Vec<PathBuf>,
	},
	Next(usize),
	Prev(usize),
	First,
	Last,
	/// `:cc [N]`; without a number shows the current entry.
	Jump(Option<usize>),
	NextFile(usize),
	PrevFile(usize),
	Older(usize),
	Newer(usize),
	History,
	List,
	Stop,
	Help,
	Quit,
}

#[derive(Debug, Error)]
pub enum ParseError {
	#[error("not an editor command: {0}")]
	Unknown(String),
	#[error("invalid count: {0}")]
	BadCount(String),
	#[error("argument required")]
	MissingArgument,
	#[error("trailing characters: {0}")]
	Trailing(String),
	#[error(transparent)]
	Pattern(#[from] qfx_core::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Name {
	Grep,
	Next,
	Prev,
	First,
	Last,
	Jump,
	NextFile,
	PrevFile,
	Older,
	Newer,
	History,
	List,
	Stop,
	Help,
	Quit,
}

/// Full name, shortest accepted abbreviation.
const NAMES: &[(&str, &str, Name)] = &[
	("vimgrep", "vim", Name::Grep),
	("cnext", "cn", Name::Next),
	("cNext", "cN", Name::Prev),
	("cprevious", "cp", Name::Prev),
	("cfirst", "cfir", Name::First),
	("crewind", "cr", Name::First),
	("clast", "cla", Name::Last),
	("cc", "cc", Name::Jump),
	("cnfile", "cnf", Name::NextFile),
	("cpfile", "cpf", Name::PrevFile),
	("cNfile", "cNf", Name::PrevFile),
	("colder", "col", Name::Older),
	("cnewer", "cnew", Name::Newer),
	("chistory", "chi", Name::History),
	("clist", "cl", Name::List),
	("cstop", "cst", Name::Stop),
	("help", "h", Name::Help),
	("quit", "q", Name::Quit),
];

fn lookup(word: &str) -> Option<Name> {
	NAMES
		.iter()
		.find(|(full, min, _)| word.len() >= min.len() && full.starts_with(word))
		.map(|(_, _, name)| *name)
}

impl Command {
	/// Parses one input line. Returns `Ok(None)` for blank lines.
	pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
		let line = line.trim();
		let line = line.strip_prefix(':').unwrap_or(line).trim_start();
		if line.is_empty() {
			return Ok(None);
		}

		let split = line.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(line.len());
		let (word, rest) = line.split_at(split);
		let rest = rest.trim();
		let name = lookup(word).ok_or_else(|| ParseError::Unknown(word.to_string()))?;

		let command = match name {
			Name::Grep => {
				if rest.is_empty() {
					return Err(ParseError::MissingArgument);
				}
				let arg = parse_pattern_arg(rest)?;
				Self::Grep {
					pattern: arg.pattern,
					options: arg.options,
					paths: arg.rest.split_whitespace().map(PathBuf::from).collect(),
				}
			}
			Name::Next => Self::Next(count(rest)?),
			Name::Prev => Self::Prev(count(rest)?),
			Name::NextFile => Self::NextFile(count(rest)?),
			Name::PrevFile => Self::PrevFile(count(rest)?),
			Name::Older => Self::Older(count(rest)?),
			Name::Newer => Self::Newer(count(rest)?),
			Name::Jump => Self::Jump(if rest.is_empty() { None } else { Some(number(rest)?) }),
			Name::First => no_args(rest, Self::First)?,
			Name::Last => no_args(rest, Self::Last)?,
			Name::History => no_args(rest, Self::History)?,
			Name::List => no_args(rest, Self::List)?,
			Name::Stop => no_args(rest, Self::Stop)?,
			Name::Help => no_args(rest, Self::Help)?,
			Name::Quit => no_args(rest, Self::Quit)?,
		};
		Ok(Some(command))
	}
}

fn number(arg: &str) -> Result<usize, ParseError> {
	arg.parse().map_err(|_| ParseError::BadCount(arg.to_string()))
}

/// Optional count, 1 when absent.
fn count(arg: &str) -> Result<usize, ParseError> {
	if arg.is_empty() { Ok(1) } else { number(arg) }
}

fn no_args(arg: &str, command: Command) -> Result<Command, ParseError> {
	if arg.is_empty() {
		Ok(command)
	} else {
		Err(ParseError::Trailing(arg.to_string()))
	}
}

/// One line per command, for `:help`.
pub const HELP: &str = "\
:vimgrep /pat/[g][j] [paths]  search into a new list
:cnext [N] / :cprev [N]       move within the list
:cfirst / :clast / :cc [N]    jump to an entry
:cnfile [N] / :cpfile [N]     move to the next/previous file
:colder [N] / :cnewer [N]     switch lists in the history
:chistory / :clist            show lists / entries
:cstop                        cancel running searches
:quit";
