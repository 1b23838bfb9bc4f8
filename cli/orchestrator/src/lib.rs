#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Argument parsing and error types for the eproto command-line compiler.

use thiserror::Error;

/// Errors surfaced by the CLI itself, distinct from compilation diagnostics
/// (which are reported through [`pipeline::CompileSession::has_errors`]).
#[derive(Debug, Error)]
pub enum CliError {
    /// A flag was passed a value it doesn't accept, or was missing a
    /// required one.
    #[error("usage error: {0}")]
    Usage(String),
    /// `-g`/`--gen` was given a value other than `native`, `evolved`,
    /// `zod`, or `skip`.
    #[error("invalid --gen value: {0}")]
    InvalidStrategy(String),
    /// Error propagated from the compilation driver.
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
    /// Error serializing a `-d`/`-a` dump to JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// I/O error writing a dump file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Where a `-d`/`-a` dump should go: stdout when the flag is bare, a file
/// when it takes an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpTarget {
    /// Write to stdout.
    Stdout,
    /// Write to the named file.
    File(std::path::PathBuf),
}

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct Args {
    /// The source directory to compile.
    pub source_dir: Option<std::path::PathBuf>,
    /// `-d | --definitions [<file>]`.
    pub definitions: Option<DumpTarget>,
    /// `-a | --ast [<file>]`.
    pub ast: Option<DumpTarget>,
    /// `-o | --output <dir>`, default `.`.
    pub output_dir: Option<std::path::PathBuf>,
    /// `-g | --gen {native|evolved|zod|skip}`.
    pub strategy: Option<config::Strategy>,
}

fn looks_like_flag(s: &str) -> bool {
    s.starts_with('-')
}

/// Parse `args` (excluding the program name) into [`Args`].
pub fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "-d" | "--definitions" => {
                let next = args.get(i + 1).filter(|a| !looks_like_flag(a));
                parsed.definitions = Some(match next {
                    Some(path) => DumpTarget::File(path.into()),
                    None => DumpTarget::Stdout,
                });
                if next.is_some() {
                    i += 1;
                }
            }
            "-a" | "--ast" => {
                let next = args.get(i + 1).filter(|a| !looks_like_flag(a));
                parsed.ast = Some(match next {
                    Some(path) => DumpTarget::File(path.into()),
                    None => DumpTarget::Stdout,
                });
                if next.is_some() {
                    i += 1;
                }
            }
            "-o" | "--output" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| CliError::Usage("--output requires a directory".into()))?;
                parsed.output_dir = Some(value.into());
                i += 1;
            }
            "-g" | "--gen" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| CliError::Usage("--gen requires a value".into()))?;
                let strategy = value
                    .parse::<config::Strategy>()
                    .map_err(|_| CliError::InvalidStrategy(value.clone()))?;
                parsed.strategy = Some(strategy);
                i += 1;
            }
            other if !looks_like_flag(other) => {
                if parsed.source_dir.is_some() {
                    return Err(CliError::Usage(format!("unexpected argument: {other}")));
                }
                parsed.source_dir = Some(other.into());
            }
            other => return Err(CliError::Usage(format!("unknown flag: {other}"))),
        }
        i += 1;
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_and_defaults() {
        let args: Vec<String> = vec!["src".into()];
        let parsed = parse_args(&args).expect("parses");
        assert_eq!(parsed.source_dir, Some("src".into()));
        assert!(parsed.output_dir.is_none());
        assert!(parsed.strategy.is_none());
    }

    #[test]
    fn bare_definitions_flag_targets_stdout() {
        let args: Vec<String> = vec!["src".into(), "-d".into()];
        let parsed = parse_args(&args).expect("parses");
        assert_eq!(parsed.definitions, Some(DumpTarget::Stdout));
    }

    #[test]
    fn definitions_flag_with_file_targets_file() {
        let args: Vec<String> = vec!["src".into(), "--definitions".into(), "out.json".into()];
        let parsed = parse_args(&args).expect("parses");
        assert_eq!(parsed.definitions, Some(DumpTarget::File("out.json".into())));
    }

    #[test]
    fn gen_flag_parses_strategy() {
        let args: Vec<String> = vec!["src".into(), "-g".into(), "zod".into()];
        let parsed = parse_args(&args).expect("parses");
        assert_eq!(parsed.strategy, Some(config::Strategy::Zod));
    }

    #[test]
    fn unknown_gen_value_is_an_error() {
        let args: Vec<String> = vec!["src".into(), "-g".into(), "bogus".into()];
        assert!(matches!(parse_args(&args), Err(CliError::InvalidStrategy(_))));
    }

    #[test]
    fn second_positional_is_an_error() {
        let args: Vec<String> = vec!["src".into(), "other".into()];
        assert!(matches!(parse_args(&args), Err(CliError::Usage(_))));
    }
}
