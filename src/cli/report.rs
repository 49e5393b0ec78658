//! Result reporting
//!
//! ## TestReporter Trait
//!
//! The harness emits events through [`TestReporter`] so the output format is independent of execution. Two
//! reporters ship:
//!
//! - [`ConsoleReporter`]: the classic table, one right-aligned row per case (`    I-ADD-01.elf [ok]`), with an
//!   optional diagnostic line under failures and a colored summary on stderr.
//! - [`JsonReporter`]: newline-delimited JSON, one object per case and a final summary object.

use std::io::{self, Write};

use rvcheck_core::{TestCase, TestMode};
use serde_json::{Value, json};

use super::harness::{CaseOutcome, RunSummary};
use crate::version::RVCHECK_VERSION;

/// Width of the name column in the console table.
pub const NAME_WIDTH: usize = 26;

/// Trait for reporting harness results.
///
/// Implement this trait to customize output format.
pub trait TestReporter {
    /// Called once with the number of cases about to run
    fn on_run_start(&mut self, _case_count: usize) {}

    /// Called before a case's process is launched
    fn on_case_start(&mut self, _case: &TestCase) {}

    /// Called when a case has a verdict (or a setup error)
    fn on_case_complete(&mut self, outcome: &CaseOutcome);

    /// Called when every case has run
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// One table row: `{name:>26} [status]`.
pub fn format_row(outcome: &CaseOutcome) -> String {
    format!("{:>width$} [{}]", outcome.case.name, outcome.status().label(), width = NAME_WIDTH)
}

/// Diagnostic shown under a failing or erroring row, if any.
pub fn format_detail(outcome: &CaseOutcome) -> Option<String> {
    match &outcome.result {
        Ok(verdict) => verdict
            .failure()
            .map(|failure| format!("{:>width$}  {}: {}", "", failure.diagnostic(), failure, width = NAME_WIDTH)),
        Err(err) => Some(format!("{:>width$}  setup error ({}): {}", "", err.stage(), err, width = NAME_WIDTH)),
    }
}

/// Default console reporter.
///
/// Rows go to `out` (stdout by default), the summary line to `err` (stderr by default).
pub struct ConsoleReporter<O = io::Stdout, E = io::Stderr> {
    out: O,
    err: E,
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self::with_writers(io::stdout(), io::stderr(), verbose)
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn with_writers(out: O, err: E, verbose: bool) -> Self {
        Self { out, err, verbose }
    }

    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> TestReporter for ConsoleReporter<O, E> {
    fn on_run_start(&mut self, case_count: usize) {
        if self.verbose {
            let _ = writeln!(self.err, "collected {} case(s)", case_count);
        }
    }

    fn on_case_complete(&mut self, outcome: &CaseOutcome) {
        let _ = writeln!(self.out, "{}", format_row(outcome));

        // Setup errors are always shown: they mean the harness is broken
        let show_detail = self.verbose || outcome.result.is_err();
        if let Some(detail) = format_detail(outcome).filter(|_| show_detail) {
            let _ = writeln!(self.out, "{}", detail);
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("\x1b[32m{} passed\x1b[0m", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("\x1b[31m{} failed\x1b[0m", summary.failed));
        }
        if summary.errors > 0 {
            parts.push(format!("\x1b[1;31m{} error(s)\x1b[0m", summary.errors));
        }
        if parts.is_empty() {
            parts.push("no cases".to_string());
        }

        let _ = writeln!(self.err);
        let _ = writeln!(
            self.err,
            "====== {} in {:.2}s ======",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
    }
}

/// Newline-delimited JSON reporter.
pub struct JsonReporter<W = io::Stdout> {
    out: W,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_writer(self) -> W {
        self.out
    }
}

/// JSON record for one case.
pub fn case_record(outcome: &CaseOutcome) -> Value {
    let mode = match outcome.case.mode {
        TestMode::Generic => "generic",
        TestMode::GoldenComparison { .. } => "golden",
    };
    let (diagnostic, detail) = match &outcome.result {
        Ok(verdict) => (
            Value::from(verdict.diagnostic().as_str()),
            verdict.failure().map_or(Value::Null, |f| Value::from(f.to_string())),
        ),
        Err(err) => (Value::Null, Value::from(format!("{} ({})", err, err.stage()))),
    };

    json!({
        "name": outcome.case.name,
        "mode": mode,
        "status": outcome.status().label(),
        "diagnostic": diagnostic,
        "detail": detail,
        "duration_ms": outcome.duration.as_millis() as u64,
    })
}

/// JSON record for the run totals.
pub fn summary_record(summary: &RunSummary) -> Value {
    json!({
        "summary": {
            "version": RVCHECK_VERSION,
            "total": summary.total,
            "passed": summary.passed,
            "failed": summary.failed,
            "errors": summary.errors,
            "duration_ms": summary.duration.as_millis() as u64,
        }
    })
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_case_complete(&mut self, outcome: &CaseOutcome) {
        let _ = writeln!(self.out, "{}", case_record(outcome));
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        let _ = writeln!(self.out, "{}", summary_record(summary));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::ErrorKind;
    use std::path::PathBuf;
    use std::time::Duration;

    use rvcheck_core::{Failure, HarnessError, Verdict};

    fn golden_outcome(name: &str, result: Result<Verdict, HarnessError>) -> CaseOutcome {
        CaseOutcome {
            case: TestCase::golden(
                name,
                "riscv_vm",
                format!("compliance/elf/{}", name),
                "compliance/goldens/x.reference_output",
                "compliance/out/x.reference_output",
            ),
            result,
            duration: Duration::from_millis(12),
        }
    }

    fn generic_outcome(name: &str, verdict: Verdict) -> CaseOutcome {
        CaseOutcome {
            case: TestCase::generic(name, "riscv_vm", name),
            result: Ok(verdict),
            duration: Duration::from_millis(340),
        }
    }

    // ========================================
    // Console table
    // ========================================

    #[test]
    fn test_row_is_right_aligned_to_26_columns() {
        let row = format_row(&golden_outcome("I-ADD-01.elf", Ok(Verdict::Pass)));
        assert_eq!(row, "              I-ADD-01.elf [ok]");
        assert_eq!(row.find('[').unwrap(), NAME_WIDTH + 1);
    }

    #[test]
    fn test_long_names_are_not_truncated() {
        let name = "I-MISALIGN_LDST-01-really-long.elf";
        let row = format_row(&generic_outcome(name, Verdict::Fail(Failure::Timeout)));
        assert_eq!(row, format!("{} [fail]", name));
    }

    #[test]
    fn test_console_quiet_mode_prints_rows_only() {
        let mut reporter = ConsoleReporter::with_writers(Vec::new(), Vec::new(), false);
        reporter.on_case_complete(&golden_outcome("I-ADD-01.elf", Ok(Verdict::Pass)));
        reporter.on_case_complete(&generic_outcome(
            "towers/towers.elf",
            Verdict::Fail(Failure::ProcessError),
        ));
        let (out, _) = reporter.into_writers();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "              I-ADD-01.elf [ok]\n         towers/towers.elf [fail]\n"
        );
    }

    #[test]
    fn test_console_verbose_mode_prints_diagnostics() {
        let mut reporter = ConsoleReporter::with_writers(Vec::new(), Vec::new(), true);
        reporter.on_case_complete(&golden_outcome(
            "I-ADD-01.elf",
            Ok(Verdict::Fail(Failure::OutputQuantityMismatch { actual: 2, expected: 3 })),
        ));
        let (out, _) = reporter.into_writers();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("OutputQuantityMismatch: output has 2 line(s), reference has 3"));
    }

    #[test]
    fn test_console_always_shows_setup_errors() {
        let err = HarnessError::Reference {
            path: PathBuf::from("compliance/goldens/I-ADD-01.reference_output"),
            source: io::Error::new(ErrorKind::NotFound, "missing"),
        };
        let mut reporter = ConsoleReporter::with_writers(Vec::new(), Vec::new(), false);
        reporter.on_case_complete(&golden_outcome("I-ADD-01.elf", Err(err)));
        let (out, _) = reporter.into_writers();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("              I-ADD-01.elf [error]\n"));
        assert!(out.contains("setup error (reference)"));
    }

    #[test]
    fn test_console_summary_goes_to_err() {
        let mut reporter = ConsoleReporter::with_writers(Vec::new(), Vec::new(), false);
        reporter.on_run_complete(&RunSummary {
            total: 3,
            passed: 2,
            failed: 1,
            errors: 0,
            duration: Duration::from_millis(1500),
        });
        let (out, err) = reporter.into_writers();
        assert!(out.is_empty());
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("2 passed"));
        assert!(err.contains("1 failed"));
        assert!(err.contains("in 1.50s"));
    }

    // ========================================
    // JSON records
    // ========================================

    #[test]
    fn test_json_record_for_content_mismatch() {
        let outcome = golden_outcome(
            "I-ADD-01.elf",
            Ok(Verdict::Fail(Failure::ContentMismatch {
                line: 1,
                expected: "6".to_string(),
                actual: "7".to_string(),
            })),
        );
        insta::assert_snapshot!(
            case_record(&outcome).to_string(),
            @r#"{"detail":"line 2: expected \"6\", got \"7\"","diagnostic":"ContentMismatch","duration_ms":12,"mode":"golden","name":"I-ADD-01.elf","status":"fail"}"#
        );
    }

    #[test]
    fn test_json_record_for_generic_pass() {
        let outcome = generic_outcome("pi/pi.elf", Verdict::Pass);
        insta::assert_snapshot!(
            case_record(&outcome).to_string(),
            @r#"{"detail":null,"diagnostic":"None","duration_ms":340,"mode":"generic","name":"pi/pi.elf","status":"ok"}"#
        );
    }

    #[test]
    fn test_json_reporter_writes_one_object_per_line() {
        let mut reporter = JsonReporter::with_writer(Vec::new());
        reporter.on_case_complete(&generic_outcome("pi/pi.elf", Verdict::Fail(Failure::Timeout)));
        reporter.on_run_complete(&RunSummary {
            total: 1,
            passed: 0,
            failed: 1,
            errors: 0,
            duration: Duration::from_millis(10_004),
        });
        let out = String::from_utf8(reporter.into_writer()).unwrap();
        let records: Vec<Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["diagnostic"], "Timeout");
        assert_eq!(records[1]["summary"]["failed"], 1);
        assert_eq!(records[1]["summary"]["duration_ms"], 10_004);
        assert_eq!(records[1]["summary"]["version"], RVCHECK_VERSION);
    }
}
