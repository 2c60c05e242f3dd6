use clap::Parser;

use super::*;

#[test]
fn bare_invocation_enters_command_loop() {
	let cli = Cli::try_parse_from(["qfx"]).unwrap();
	assert!(cli.pattern.is_none());
	assert!(cli.wants_command_loop());
	assert_eq!(cli.roots(), vec![PathBuf::from(".")]);
	assert_eq!(cli.scan_options(), ScanOptions::default());
}

#[test]
fn pattern_and_paths_run_once() {
	let cli = Cli::try_parse_from(["qfx", "-g", "-j", "TODO", "src", "README.md"]).unwrap();
	assert_eq!(cli.pattern.as_deref(), Some("TODO"));
	assert_eq!(cli.roots(), vec![PathBuf::from("src"), PathBuf::from("README.md")]);
	assert_eq!(cli.scan_options().bits(), ScanOptions::GLOBAL | ScanOptions::NOJUMP);
	assert!(!cli.wants_command_loop());
}

#[test]
fn interactive_flag_keeps_loop_after_search() {
	let cli = Cli::try_parse_from(["qfx", "-I", "fn main"]).unwrap();
	assert!(cli.wants_command_loop());
}

#[test]
fn explicit_config_path_wins() {
	let cli = Cli::try_parse_from(["qfx", "--config", "/tmp/qfx.toml"]).unwrap();
	assert_eq!(cli.config_path(), Some(PathBuf::from("/tmp/qfx.toml")));
}

#[test]
fn unknown_flag_is_rejected() {
	assert!(Cli::try_parse_from(["qfx", "--bogus"]).is_err());
}
