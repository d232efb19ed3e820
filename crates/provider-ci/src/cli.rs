//! Command-line interface.

use crate::generate::build_provider_files;
use crate::output::{check_files, write_files};
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand};
use miette::Diagnostic;
use provider_ci_core::{ConfigLoader, FsConfigLoader};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Success exit code
pub const EXIT_OK: i32 = 0;
/// Exit code for any error
pub const EXIT_ERROR: i32 = 1;
/// Exit code when `generate --check` finds stale files
pub const EXIT_DRIFT: i32 = 2;

/// Directory under a provider's directory that mirrors its repository.
pub const REPO_DIR: &str = "repo";

/// CLI-level errors.
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Loading options or producing files failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Generate(#[from] provider_ci_core::Error),

    /// Writing the command's report failed.
    #[error("Failed to write output: {0}")]
    #[diagnostic(code(provider_ci::cli::output))]
    Output(#[from] io::Error),
}

/// Map an error to the process exit code.
#[must_use]
pub const fn exit_code_for(_err: &CliError) -> i32 {
    EXIT_ERROR
}

/// Generate CI workflows and release configs for provider repositories.
#[derive(Parser, Debug)]
#[command(name = "provider-ci")]
#[command(about = "Generate CI workflows and release configs for provider repositories")]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding one `<provider>/config.yaml` per provider.
    #[arg(
        long,
        global = true,
        env = "PROVIDER_CI_PROVIDERS_DIR",
        default_value = "providers"
    )]
    pub providers_dir: PathBuf,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(long, global = true, default_value = "compact", value_enum)]
    pub log_format: TracingFormat,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate provider files.
    #[command(about = "Generate workflows and GoReleaser configs")]
    Generate {
        /// Output root; files for provider P go under `<out>/P/repo`.
        /// Defaults to the providers directory.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Compare with the files on disk instead of writing.
        #[arg(long)]
        check: bool,

        /// Providers to generate (all when omitted).
        #[arg(value_name = "PROVIDER")]
        providers: Vec<String>,
    },
    /// List configured providers.
    #[command(about = "List configured providers")]
    List,
}

/// Parse CLI arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Where `provider`'s repository files live under `out`.
#[must_use]
pub fn repo_root(out: &Path, provider: &str) -> PathBuf {
    out.join(provider).join(REPO_DIR)
}

/// Run the parsed command, writing its report to `stdout`.
///
/// Returns the process exit code on success.
pub fn execute(cli: &Cli, stdout: &mut dyn Write) -> Result<i32, CliError> {
    let loader = FsConfigLoader::new(&cli.providers_dir);
    match &cli.command {
        Commands::List => {
            for provider in loader.providers()? {
                writeln!(stdout, "{provider}")?;
            }
            Ok(EXIT_OK)
        }
        Commands::Generate {
            out,
            check,
            providers,
        } => {
            let providers = if providers.is_empty() {
                loader.providers()?
            } else {
                providers.clone()
            };
            let out = out.as_deref().unwrap_or(cli.providers_dir.as_path());
            generate(&loader, out, &providers, *check, stdout)
        }
    }
}

fn generate(
    loader: &dyn ConfigLoader,
    out: &Path,
    providers: &[String],
    check: bool,
    stdout: &mut dyn Write,
) -> Result<i32, CliError> {
    let mut drifted = false;
    for provider in providers {
        let files = build_provider_files(loader, provider)?;
        let root = repo_root(out, provider);
        if check {
            let drift = check_files(&root, &files)?;
            for entry in &drift {
                writeln!(stdout, "{entry}")?;
            }
            drifted |= !drift.is_empty();
        } else {
            for path in write_files(&root, &files)? {
                writeln!(stdout, "{}", path.display())?;
            }
        }
    }

    if drifted {
        tracing::warn!("Generated files are out of date; run `provider-ci generate` to update");
        Ok(EXIT_DRIFT)
    } else {
        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn providers_dir(names: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for name in names {
            let dir = temp.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("config.yaml"), format!("provider: {name}\n")).unwrap();
        }
        temp
    }

    fn cli(dir: &Path, args: &[&str]) -> Cli {
        let mut argv = vec!["provider-ci", "--providers-dir", dir.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn run(cli: &Cli) -> (i32, String) {
        let mut out = Vec::new();
        let code = execute(cli, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_list() {
        let temp = providers_dir(&["zeta", "alpha"]);
        let (code, out) = run(&cli(temp.path(), &["list"]));
        assert_eq!(code, EXIT_OK);
        assert_eq!(out, "alpha\nzeta\n");
    }

    #[test]
    fn test_generate_all_then_check() {
        let temp = providers_dir(&["alpha", "widget"]);

        let (code, out) = run(&cli(temp.path(), &["generate"]));
        assert_eq!(code, EXIT_OK);
        assert_eq!(out.lines().count(), 20);
        assert!(repo_root(temp.path(), "widget").join(".goreleaser.yml").is_file());

        let (code, out) = run(&cli(temp.path(), &["generate", "--check"]));
        assert_eq!(code, EXIT_OK);
        assert!(out.is_empty());
    }

    #[test]
    fn test_check_reports_drift() {
        let temp = providers_dir(&["widget"]);
        let (code, out) = run(&cli(temp.path(), &["generate", "--check", "widget"]));
        assert_eq!(code, EXIT_DRIFT);
        assert_eq!(out.lines().count(), 10);
        assert!(out.lines().all(|line| line.ends_with(": missing")));
    }

    #[test]
    fn test_generate_to_out_dir() {
        let temp = providers_dir(&["widget"]);
        let out = TempDir::new().unwrap();
        let (code, _) = run(&cli(
            temp.path(),
            &["generate", "--out", out.path().to_str().unwrap(), "widget"],
        ));
        assert_eq!(code, EXIT_OK);
        assert!(
            repo_root(out.path(), "widget")
                .join(".github/workflows/release.yml")
                .is_file()
        );
    }

    #[test]
    fn test_unknown_provider_is_error() {
        let temp = providers_dir(&["widget"]);
        let mut out = Vec::new();
        let err = execute(&cli(temp.path(), &["generate", "gadget"]), &mut out).unwrap_err();
        assert!(matches!(
            err,
            CliError::Generate(ref e) if e.is_unknown_provider()
        ));
        assert_eq!(exit_code_for(&err), EXIT_ERROR);
    }

    #[test]
    fn test_global_flags() {
        let temp = providers_dir(&[]);
        let parsed = cli(temp.path(), &["list", "--level", "debug", "--log-format", "json"]);
        assert_eq!(parsed.level, LogLevel::Debug);
        assert_eq!(parsed.log_format, TracingFormat::Json);
    }
}
