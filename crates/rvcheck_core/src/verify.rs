//! Outcome verifier: turn a [`ProcessResult`] into a [`Verdict`].
//!
//! ## Modes
//!
//! - **Generic** ([`verify_generic`]): pass iff the process completed. Output is never inspected.
//! - **Golden comparison** ([`verify_golden`]): pass iff the captured output, split into lines, equals the
//!   reference lines position by position *and* both sides have the same number of lines.
//!
//! ## Whitespace
//!
//! Reference lines are trimmed before comparison; emulator lines are not. Stray whitespace is tolerated in
//! stored goldens only, never in what the emulator prints.
//!
//! ## Short-circuit
//!
//! The first differing line decides a content mismatch. Nothing after it is examined, and a length
//! difference is only reported when the shared prefix matched.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{HarnessError, HarnessResult};
use crate::lines::{split_lines, split_text_lines};
use crate::process::ProcessResult;

/// Diagnostic tag carried by every verdict. Passing verdicts carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnostic {
    None,
    Timeout,
    ProcessError,
    OutputQuantityMismatch,
    ContentMismatch,
}

impl Diagnostic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diagnostic::None => "None",
            Diagnostic::Timeout => "Timeout",
            Diagnostic::ProcessError => "ProcessError",
            Diagnostic::OutputQuantityMismatch => "OutputQuantityMismatch",
            Diagnostic::ContentMismatch => "ContentMismatch",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a test failed, with enough detail to report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The emulator exceeded its time budget.
    Timeout,
    /// The emulator exited non-zero or was killed.
    ProcessError,
    /// The shared prefix matched but one side has more lines.
    OutputQuantityMismatch { actual: usize, expected: usize },
    /// First diverging line (0-based). `actual` is lossily decoded for display.
    ContentMismatch {
        line: usize,
        expected: String,
        actual: String,
    },
}

impl Failure {
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Failure::Timeout => Diagnostic::Timeout,
            Failure::ProcessError => Diagnostic::ProcessError,
            Failure::OutputQuantityMismatch { .. } => Diagnostic::OutputQuantityMismatch,
            Failure::ContentMismatch { .. } => Diagnostic::ContentMismatch,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Timeout => write!(f, "process exceeded its time budget"),
            Failure::ProcessError => write!(f, "process exited with a non-zero status"),
            Failure::OutputQuantityMismatch { actual, expected } => {
                write!(f, "output has {} line(s), reference has {}", actual, expected)
            }
            Failure::ContentMismatch { line, expected, actual } => {
                write!(f, "line {}: expected {:?}, got {:?}", line + 1, expected, actual)
            }
        }
    }
}

/// Pass/fail decision for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Failure),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Verdict::Pass => Diagnostic::None,
            Verdict::Fail(failure) => failure.diagnostic(),
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(failure) => Some(failure),
        }
    }
}

/// The failure implied by a result that did not complete, if any.
fn process_failure(result: &ProcessResult) -> Option<Failure> {
    match result {
        ProcessResult::Completed { .. } => None,
        ProcessResult::TimedOut => Some(Failure::Timeout),
        ProcessResult::NonZeroExit { .. } => Some(Failure::ProcessError),
    }
}

/// Pass iff the process completed within budget with status 0.
pub fn verify_generic(result: &ProcessResult) -> Verdict {
    match process_failure(result) {
        None => Verdict::Pass,
        Some(failure) => Verdict::Fail(failure),
    }
}

/// Compare completed output against reference lines.
///
/// `reference` is consulted only when the process completed.
pub fn verify_golden<S: AsRef<str>>(result: &ProcessResult, reference: &[S]) -> Verdict {
    let stdout = match result {
        ProcessResult::Completed { stdout } => stdout,
        other => return verify_generic(other),
    };
    compare_lines(&split_lines(stdout), reference)
}

/// Line-by-line comparison primitive behind [`verify_golden`].
///
/// Comparing raw bytes against the UTF-8 encoding of the trimmed reference is the same as decoding first: a line
/// that is not valid UTF-8 can never equal text, so it is a content mismatch at its index.
pub fn compare_lines<S: AsRef<str>>(actual: &[&[u8]], reference: &[S]) -> Verdict {
    for (line, (got, want)) in actual.iter().zip(reference).enumerate() {
        let expected = want.as_ref().trim();
        if *got != expected.as_bytes() {
            tracing::debug!(line, "content mismatch");
            return Verdict::Fail(Failure::ContentMismatch {
                line,
                expected: expected.to_string(),
                actual: String::from_utf8_lossy(got).into_owned(),
            });
        }
    }

    if actual.len() != reference.len() {
        tracing::debug!(actual = actual.len(), expected = reference.len(), "line count mismatch");
        return Verdict::Fail(Failure::OutputQuantityMismatch {
            actual: actual.len(),
            expected: reference.len(),
        });
    }

    Verdict::Pass
}

/// Read a golden reference file into lines. Whitespace is left in place for [`verify_golden`] to trim.
pub fn read_reference(path: &Path) -> HarnessResult<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| HarnessError::Reference {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_text_lines(&text).into_iter().map(str::to_string).collect())
}
