//! Parsing of `:vimgrep`-style pattern arguments.
//!
//! Accepted forms:
//! * `/pattern/gj rest` - any non-identifier delimiter, optional `g`/`j` flags,
//! * `word rest` - an identifier-character word with no flags.

use crate::options::ScanOptions;
use crate::{Error, Result};

/// A pattern split off the front of a command argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternArg<'a> {
	pub pattern: String,
	pub options: ScanOptions,
	/// Remaining argument text, leading whitespace removed.
	pub rest: &'a str,
}

fn is_ident_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

/// Splits a pattern and its flags off the front of `arg`.
pub fn parse_pattern_arg(arg: &str) -> Result<PatternArg<'_>> {
	let arg = arg.trim_start();
	let mut chars = arg.char_indices();
	let Some((_, first)) = chars.next() else {
		return Err(Error::InvalidPattern("empty pattern".into()));
	};

	if is_ident_char(first) {
		let end = arg.find(char::is_whitespace).unwrap_or(arg.len());
		return Ok(PatternArg {
			pattern: arg[..end].to_string(),
			options: ScanOptions::default(),
			rest: arg[end..].trim_start(),
		});
	}

	let delimiter = first;
	let mut pattern = String::new();
	let mut close = None;
	while let Some((idx, c)) = chars.next() {
		if c == delimiter {
			close = Some(idx + c.len_utf8());
			break;
		}
		if c == '\\'
			&& let Some((_, escaped)) = chars.next()
		{
			if escaped != delimiter {
				pattern.push('\\');
			}
			pattern.push(escaped);
			continue;
		}
		pattern.push(c);
	}

	let Some(after) = close else {
		return Err(Error::InvalidPattern(format!("missing closing {delimiter}")));
	};
	if pattern.is_empty() {
		return Err(Error::InvalidPattern("empty pattern".into()));
	}

	let tail = &arg[after..];
	let mut options = ScanOptions::default();
	let mut flags_end = tail.len();
	for (idx, c) in tail.char_indices() {
		match c {
			'g' => options.global = true,
			'j' => options.no_jump = true,
			c if c.is_whitespace() => {
				flags_end = idx;
				break;
			}
			other => return Err(Error::InvalidPattern(format!("unknown flag {other:?}"))),
		}
	}

	Ok(PatternArg {
		pattern,
		options,
		rest: tail[flags_end..].trim_start(),
	})
}
