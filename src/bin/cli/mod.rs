//! bucketq command line
//!
//! ```text
//! bucketq [-sep <string>] [-v] [-tree] <db-path> [bucket-path] [key] [value]
//! ```
//!
//! The number of positionals after the db path selects the operation:
//! none lists buckets, one lists keys, two reads a key, three writes one.
//! `-tree` dumps the whole hierarchy instead.

pub mod commands;
pub mod utils;

use std::io::Write;

use bucketq::{QueryCli, QueryConfig, Store, StoreConfig};
use clap::{Arg, ArgAction, Command};

use commands::Operation;
use utils::{exit_codes, normalize_args, report_error};

const USAGE: &str = "bucketq [-sep <string>] [-v] [-tree] <db-path> [bucket-path] [key] [value]";

/// Build the CLI command structure
pub fn build_cli() -> Command {
    Command::new("bucketq")
        .about("Inspect and edit nested buckets in an embedded key-value store")
        .override_usage(USAGE)
        .disable_help_flag(true)
        .args_override_self(true)
        .arg(
            Arg::new("sep")
                .help("bucket separator")
                .long("sep")
                .value_name("string")
                .default_value(bucketq::config::DEFAULT_SEPARATOR),
        )
        .arg(
            Arg::new("verbose")
                .help("verbose output")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tree")
                .help("dump bucket tree")
                .long("tree")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("help")
                .help("print usage")
                .short('h')
                .long("help")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("args")
                .help("<db-path> [bucket-path] [key] [value]")
                .value_name("ARGS")
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Options parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub separator: String,
    pub verbose: bool,
    pub tree: bool,
    pub help: bool,
    pub positionals: Vec<String>,
}

impl Invocation {
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        Invocation {
            separator: matches
                .get_one::<String>("sep")
                .cloned()
                .unwrap_or_else(|| bucketq::config::DEFAULT_SEPARATOR.to_string()),
            verbose: matches.get_flag("verbose"),
            tree: matches.get_flag("tree"),
            help: matches.get_flag("help"),
            positionals: matches
                .get_many::<String>("args")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        }
    }
}

fn print_usage<E: Write>(stderr: &mut E) {
    let _ = write!(stderr, "{}", build_cli().render_help());
}

/// Runs one invocation and returns the process exit code.
pub fn run<I, O, E>(args: I, stdout: &mut O, stderr: &mut E) -> i32
where
    I: IntoIterator<Item = String>,
    O: Write,
    E: Write,
{
    let matches = match build_cli().try_get_matches_from(normalize_args(args)) {
        Ok(matches) => matches,
        Err(e) => {
            let _ = write!(stderr, "{}", e.render());
            return exit_codes::FAILURE;
        }
    };
    let invocation = Invocation::from_matches(&matches);

    if invocation.help {
        print_usage(stderr);
        return exit_codes::SUCCESS;
    }

    let Some((db_path, rest)) = invocation.positionals.split_first() else {
        print_usage(stderr);
        return exit_codes::FAILURE;
    };
    let Some(operation) = Operation::from_args(invocation.tree, rest) else {
        print_usage(stderr);
        return exit_codes::FAILURE;
    };

    let config = QueryConfig::new(invocation.separator.clone(), invocation.verbose);
    if let Err(e) = config.validate() {
        return report_error(stderr, &e);
    }

    let store = match Store::open(db_path, &StoreConfig::default()) {
        Ok(store) => store,
        Err(e) => return report_error(stderr, &e),
    };

    let result = QueryCli::new(store, config).and_then(|cli| operation.execute(&cli, stdout));
    match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => report_error(stderr, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(args: &[&str]) -> (i32, Vec<u8>, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(
            std::iter::once("bucketq")
                .chain(args.iter().copied())
                .map(String::from),
            &mut stdout,
            &mut stderr,
        );
        (code, stdout, String::from_utf8(stderr).unwrap())
    }

    #[test]
    fn test_cli_structure() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let matches = build_cli()
            .try_get_matches_from(normalize_args(
                ["bucketq", "-sep", "/", "-v", "db", "a/b"].map(String::from),
            ))
            .unwrap();
        let invocation = Invocation::from_matches(&matches);
        assert_eq!(invocation.separator, "/");
        assert!(invocation.verbose);
        assert!(!invocation.tree);
        assert_eq!(invocation.positionals, vec!["db", "a/b"]);
    }

    #[test]
    fn test_repeated_flags_last_wins() {
        let matches = build_cli()
            .try_get_matches_from(normalize_args(
                ["bucketq", "-v", "-v", "-sep", "/", "-sep", ":", "db", "a:b"].map(String::from),
            ))
            .unwrap();
        let invocation = Invocation::from_matches(&matches);
        assert_eq!(invocation.separator, ":");
        assert!(invocation.verbose);
        assert_eq!(invocation.positionals, vec!["db", "a:b"]);

        let matches = build_cli()
            .try_get_matches_from(normalize_args(
                ["bucketq", "-v", "-v=false", "db"].map(String::from),
            ))
            .unwrap();
        assert!(!Invocation::from_matches(&matches).verbose);
    }

    #[test]
    fn test_no_args_prints_usage() {
        let (code, stdout, stderr) = invoke(&[]);
        assert_eq!(code, 1);
        assert!(stdout.is_empty());
        assert!(stderr.contains("Usage:"));
    }

    #[test]
    fn test_too_many_args_prints_usage() {
        let (code, _, stderr) = invoke(&["db", "a", "b", "c", "d"]);
        assert_eq!(code, 1);
        assert!(stderr.contains("Usage:"));
    }

    #[test]
    fn test_help_exits_zero() {
        let (code, stdout, stderr) = invoke(&["-h"]);
        assert_eq!(code, 0);
        assert!(stdout.is_empty());
        assert!(stderr.contains("-tree") || stderr.contains("--tree"));
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        let (code, _, stderr) = invoke(&["-bogus", "db"]);
        assert_eq!(code, 1);
        assert!(!stderr.is_empty());
    }

    #[test]
    fn test_missing_db_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let (code, stdout, stderr) = invoke(&[path.to_str().unwrap()]);
        assert_eq!(code, 1);
        assert!(stdout.is_empty());
        assert!(stderr.starts_with("error opening db: "));
        assert!(stderr.ends_with('\n'));
    }

    #[test]
    fn test_empty_separator_rejected() {
        let (code, _, stderr) = invoke(&["-sep=", "db"]);
        assert_eq!(code, 1);
        assert!(stderr.starts_with("error: "));
    }
}
