//! CLI module for rvcheck
//!
//! This module provides the command-line interface of the harness.
//!
//! ## Usage
//!
//! ```text
//! rvcheck [EMULATOR] [--elf-dir DIR] [--golden-dir DIR] [--out-dir DIR]
//!         [--generic PATH]... [--no-generic]
//!         [--compliance-timeout SECS] [--generic-timeout SECS]
//!         [-k EXPR] [-v] [--format console|json]
//! ```
//!
//! With no arguments the defaults of [`HarnessConfig`] apply.
//!
//! ## Modules
//!
//! - `discovery` - Build the ordered case list from the ELF directory and generic programs
//! - `harness` - Run cases through the process runner and verifier
//! - `report` - Console table and JSON output
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod discovery;
pub mod harness;
pub mod report;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rvcheck_core::{HarnessError, SystemProcessRunner};

use crate::config::HarnessConfig;
use crate::version::RVCHECK_VERSION;
use harness::{Harness, RunSummary};
use report::{ConsoleReporter, JsonReporter, TestReporter};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one case failed.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The harness itself is broken (missing emulator, unreadable reference, ...).
    pub const SETUP_ERROR: ExitCode = ExitCode(2);

    /// Exit code for a finished run. Setup errors take precedence over test failures.
    pub fn for_summary(summary: &RunSummary) -> Self {
        if summary.errors > 0 {
            ExitCode::SETUP_ERROR
        } else if summary.failed > 0 {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Render a harness setup error with its diagnostic code and help (exit code 2).
    pub fn setup(err: HarnessError) -> Self {
        let report = miette::Report::new(err);
        Self::new(format!("{:?}", report), ExitCode::SETUP_ERROR)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        CliError::setup(err)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Right-aligned `name [ok]` table
    #[default]
    Console,
    /// Newline-delimited JSON records
    Json,
}

/// Compliance and regression harness for the riscv_vm emulator
#[derive(Parser, Debug)]
#[command(name = "rvcheck")]
#[command(version = RVCHECK_VERSION)]
#[command(about = "Compliance and regression harness for the riscv_vm emulator", long_about = None)]
pub struct Cli {
    /// Emulator binary to test: a path, or a bare name looked up on PATH (default: ../build/Debug/riscv_vm)
    #[arg(value_name = "EMULATOR")]
    pub emulator: Option<PathBuf>,

    /// Directory of compliance ELF files
    #[arg(long, value_name = "DIR")]
    pub elf_dir: Option<PathBuf>,

    /// Directory of golden .reference_output files
    #[arg(long, value_name = "DIR")]
    pub golden_dir: Option<PathBuf>,

    /// Directory receiving captured output
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Program run as a generic test (repeatable; replaces the default list)
    #[arg(long = "generic", value_name = "PATH", conflicts_with = "no_generic")]
    pub generic: Vec<PathBuf>,

    /// Skip generic tests entirely
    #[arg(long)]
    pub no_generic: bool,

    /// Time budget for each compliance run, in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub compliance_timeout: Option<u64>,

    /// Time budget for each generic run, in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub generic_timeout: Option<u64>,

    /// Only run cases whose name contains EXPR
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,

    /// Show the diagnostic under each failing case
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,
}

impl Cli {
    /// Layer command-line overrides on top of the defaults.
    pub fn to_config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::default();
        if let Some(emulator) = &self.emulator {
            config = config.with_emulator(emulator);
        }
        if let Some(dir) = &self.elf_dir {
            config = config.with_elf_dir(dir);
        }
        if let Some(dir) = &self.golden_dir {
            config = config.with_golden_dir(dir);
        }
        if let Some(dir) = &self.out_dir {
            config = config.with_out_dir(dir);
        }
        if self.no_generic {
            config = config.with_generic_programs(Vec::new());
        } else if !self.generic.is_empty() {
            config = config.with_generic_programs(self.generic.clone());
        }
        if let Some(secs) = self.compliance_timeout {
            config = config.with_compliance_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.generic_timeout {
            config = config.with_generic_timeout(Duration::from_secs(secs));
        }
        if let Some(keyword) = &self.filter {
            config = config.with_filter(keyword);
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute a full run and return the exit code.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.to_config();
    tracing::debug!(?config, "resolved configuration");

    harness::check_emulator(&config)?;
    let cases = discovery::collect_cases(&config)?;

    if cases.is_empty() {
        eprintln!("No cases collected");
        return Ok(ExitCode::SUCCESS); // an empty selection is not a failure
    }

    let mut reporter: Box<dyn TestReporter> = match cli.format {
        OutputFormat::Console => Box::new(ConsoleReporter::new(cli.verbose)),
        OutputFormat::Json => Box::new(JsonReporter::new()),
    };

    let harness = Harness::new(&config, SystemProcessRunner::new());
    let summary = harness.run_all(&cases, reporter.as_mut());
    Ok(ExitCode::for_summary(&summary))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_cli_no_arguments_uses_defaults() {
        let cli = Cli::try_parse_from(["rvcheck"]).unwrap();
        let config = cli.to_config();
        let defaults = HarnessConfig::default();
        assert_eq!(config.emulator, defaults.emulator);
        assert_eq!(config.generic_programs, defaults.generic_programs);
        assert_eq!(cli.format, OutputFormat::Console);
    }

    #[test]
    fn test_cli_positional_emulator() {
        let cli = Cli::try_parse_from(["rvcheck", "build/riscv_vm"]).unwrap();
        assert_eq!(cli.to_config().emulator, Path::new("build/riscv_vm"));
    }

    #[test]
    fn test_cli_directory_overrides() {
        let cli = Cli::try_parse_from([
            "rvcheck",
            "--elf-dir",
            "e",
            "--golden-dir",
            "g",
            "--out-dir",
            "o",
        ])
        .unwrap();
        let config = cli.to_config();
        assert_eq!(config.elf_dir, Path::new("e"));
        assert_eq!(config.golden_dir, Path::new("g"));
        assert_eq!(config.out_dir, Path::new("o"));
    }

    #[test]
    fn test_cli_generic_programs() {
        let cli = Cli::try_parse_from(["rvcheck", "--generic", "a.elf", "--generic", "b.elf"]).unwrap();
        assert_eq!(
            cli.to_config().generic_programs,
            vec![PathBuf::from("a.elf"), PathBuf::from("b.elf")]
        );

        let cli = Cli::try_parse_from(["rvcheck", "--no-generic"]).unwrap();
        assert!(cli.to_config().generic_programs.is_empty());

        assert!(Cli::try_parse_from(["rvcheck", "--no-generic", "--generic", "a.elf"]).is_err());
    }

    #[test]
    fn test_cli_timeouts() {
        let cli = Cli::try_parse_from(["rvcheck", "--compliance-timeout", "2", "--generic-timeout", "30"]).unwrap();
        let config = cli.to_config();
        assert_eq!(config.compliance_timeout, Duration::from_secs(2));
        assert_eq!(config.generic_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_cli_rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["rvcheck", "--compliance-timeout", "0"]).is_err());
    }

    #[test]
    fn test_cli_filter_verbose_and_format() {
        let cli = Cli::try_parse_from(["rvcheck", "-v", "-k", "ADD", "--format", "json"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.to_config().filter.as_deref(), Some("ADD"));
    }

    #[test]
    fn test_exit_code_precedence() {
        let mut summary = RunSummary {
            total: 3,
            passed: 3,
            ..RunSummary::default()
        };
        assert_eq!(ExitCode::for_summary(&summary), ExitCode::SUCCESS);

        summary.failed = 1;
        assert_eq!(ExitCode::for_summary(&summary), ExitCode::FAILURE);

        summary.errors = 1;
        assert_eq!(ExitCode::for_summary(&summary), ExitCode::SETUP_ERROR);
    }

    #[test]
    fn test_missing_emulator_is_a_setup_error() {
        let cli = Cli::try_parse_from(["rvcheck", "/nonexistent/riscv_vm", "--no-generic"]).unwrap();
        let err = execute(cli).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::SETUP_ERROR);
        assert!(err.message.contains("rvcheck::spawn"));
    }
}
