//! `nosj_deserializer`: parse one document and print its canonical form.
//!
//! Exit status is 0 on success. Every failure, including a missing or
//! unreadable input file, prints a single `ERROR -- ` line to stderr and
//! exits with status 66. Set `NOSJ_LOG` (for example `NOSJ_LOG=debug`) to
//! trace the run on stderr.

use clap::error::ErrorKind as ClapErrorKind;
use clap::{Parser as ClapParser, ValueEnum};
use nosj::{DuplicateKeys, ParseOptions, DEFAULT_MAX_DEPTH};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const FAILURE_STATUS: u8 = 66;

#[derive(ClapParser, Debug)]
#[command(name = "nosj_deserializer", version, about = "Parse a nosj document and print its canonical form")]
struct Cli {
    /// Document to parse
    input: PathBuf,

    /// Maximum nesting depth of arrays and objects
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// How to treat an object that repeats a key
    #[arg(long, value_enum, default_value_t = DuplicateKeyArg::Preserve)]
    duplicate_keys: DuplicateKeyArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DuplicateKeyArg {
    Preserve,
    LastWins,
    Reject,
}

impl From<DuplicateKeyArg> for DuplicateKeys {
    fn from(arg: DuplicateKeyArg) -> Self {
        match arg {
            DuplicateKeyArg::Preserve => DuplicateKeys::Preserve,
            DuplicateKeyArg::LastWins => DuplicateKeys::LastWins,
            DuplicateKeyArg::Reject => DuplicateKeys::Reject,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("NOSJ_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::debug!(%message, "run failed");
            eprintln!("ERROR -- {message}");
            ExitCode::from(FAILURE_STATUS)
        }
    }
}

fn run() -> Result<(), String> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                return err.print().map_err(|e| format!("failed to write help: {e}"));
            }
            ClapErrorKind::MissingRequiredArgument => {
                return Err("no input filename provided".to_string());
            }
            _ => return Err(clap_error_summary(&err)),
        },
    };

    let options = ParseOptions::new()
        .with_max_depth(cli.max_depth)
        .with_duplicate_keys(cli.duplicate_keys.into());

    let content = std::fs::read(&cli.input)
        .map_err(|e| format!("failed to open file: {}: {e}", cli.input.display()))?;
    tracing::debug!(path = %cli.input.display(), bytes = content.len(), "read input");

    let value = nosj::parse_with_options(&content, &options).map_err(|e| e.to_string())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    nosj::ser::write_canonical(&mut out, &value).map_err(|e| e.to_string())?;
    out.flush().map_err(|e| e.to_string())
}

/// First line of a clap error without its `error: ` prefix.
fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or("invalid arguments");
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}
