//! Run orchestration
//!
//! Drives the resolved case list through the process runner and verifier, one case at a time and in order.
//!
//! ## Per-case flow
//!
//! 1. Run the emulator with the budget for the case's mode.
//! 2. Golden cases: write whatever stdout came back to the capture path, *then* read the reference and compare.
//! 3. Hand the outcome to the reporter.
//!
//! A failing test never stops the run. A setup error (unreadable reference, unwritable capture) is recorded
//! against its case as `error` and the run continues.

use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use rvcheck_core::{
    HarnessError, HarnessResult, ProcessRunner, TestCase, TestMode, Verdict, read_reference, verify_generic,
    verify_golden,
};

use super::report::TestReporter;
use crate::config::HarnessConfig;

/// Row status in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Ok,
    Fail,
    Error,
}

impl CaseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Ok => "ok",
            CaseStatus::Fail => "fail",
            CaseStatus::Error => "error",
        }
    }
}

/// What happened to one case.
#[derive(Debug)]
pub struct CaseOutcome {
    pub case: TestCase,
    /// `Err` only for setup errors; test failures are `Ok(Verdict::Fail(..))`.
    pub result: HarnessResult<Verdict>,
    pub duration: Duration,
}

impl CaseOutcome {
    pub fn status(&self) -> CaseStatus {
        match &self.result {
            Ok(Verdict::Pass) => CaseStatus::Ok,
            Ok(Verdict::Fail(_)) => CaseStatus::Fail,
            Err(_) => CaseStatus::Error,
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub duration: Duration,
}

impl RunSummary {
    fn record(&mut self, status: CaseStatus) {
        self.total += 1;
        match status {
            CaseStatus::Ok => self.passed += 1,
            CaseStatus::Fail => self.failed += 1,
            CaseStatus::Error => self.errors += 1,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

/// Fail fast when the emulator binary is not there; every case would error otherwise.
///
/// A bare name such as `riscv_vm` is looked up on `PATH`, as the process spawn would.
pub fn check_emulator(config: &HarnessConfig) -> HarnessResult<()> {
    if config.emulator.is_file() || find_on_path(&config.emulator).is_some() {
        return Ok(());
    }
    Err(HarnessError::Spawn {
        executable: config.emulator.clone(),
        source: io::Error::new(io::ErrorKind::NotFound, "emulator binary not found"),
    })
}

/// First `PATH` entry holding `name`. Only bare names are searched; anything with a directory part is not.
fn find_on_path(name: &Path) -> Option<PathBuf> {
    let mut components = name.components();
    if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
        return None;
    }
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        let suffixed = dir.join(format!("{}{}", name.display(), env::consts::EXE_SUFFIX));
        suffixed.is_file().then_some(suffixed)
    })
}

/// Runs cases against a [`ProcessRunner`].
pub struct Harness<'a, R: ProcessRunner> {
    config: &'a HarnessConfig,
    runner: R,
}

impl<'a, R: ProcessRunner> Harness<'a, R> {
    pub fn new(config: &'a HarnessConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Budget for a case: golden comparison and generic runs have separate limits.
    pub fn timeout_for(&self, case: &TestCase) -> Duration {
        match case.mode {
            TestMode::Generic => self.config.generic_timeout,
            TestMode::GoldenComparison { .. } => self.config.compliance_timeout,
        }
    }

    /// Run one case to a verdict.
    #[tracing::instrument(skip_all, fields(case = %case.name))]
    pub fn run_case(&self, case: &TestCase) -> HarnessResult<Verdict> {
        let result = self
            .runner
            .run(&case.executable_under_test, &case.args(), self.timeout_for(case))?;

        let verdict = match &case.mode {
            TestMode::Generic => verify_generic(&result),
            TestMode::GoldenComparison { reference, capture } => {
                if let Some(stdout) = result.stdout() {
                    persist_capture(capture, stdout)?;
                }
                if result.is_completed() {
                    let lines = read_reference(reference)?;
                    verify_golden(&result, &lines)
                } else {
                    verify_golden::<&str>(&result, &[])
                }
            }
        };

        if let Some(failure) = verdict.failure() {
            tracing::info!(diagnostic = %failure.diagnostic(), "{}", failure);
        }
        Ok(verdict)
    }

    /// Run every case in order, reporting as it goes.
    pub fn run_all(&self, cases: &[TestCase], reporter: &mut dyn TestReporter) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::default();
        reporter.on_run_start(cases.len());

        for case in cases {
            reporter.on_case_start(case);
            let case_start = Instant::now();
            let result = self.run_case(case);
            if let Err(err) = &result {
                tracing::error!(case = %case.name, stage = err.stage(), "{}", err);
            }

            let outcome = CaseOutcome {
                case: case.clone(),
                result,
                duration: case_start.elapsed(),
            };
            summary.record(outcome.status());
            reporter.on_case_complete(&outcome);
        }

        summary.duration = start.elapsed();
        reporter.on_run_complete(&summary);
        summary
    }
}

/// Write raw stdout verbatim, creating the output directory on first use.
fn persist_capture(path: &Path, stdout: &[u8]) -> HarnessResult<()> {
    let capture_error = |source| HarnessError::Capture {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(capture_error)?;
    }
    fs::write(path, stdout).map_err(capture_error)
}
