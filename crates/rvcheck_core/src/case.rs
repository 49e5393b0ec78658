//! Test case description.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Flag that switches the emulator into its line-oriented signature output.
pub const COMPLIANCE_FLAG: &str = "--compliance";

/// How a test case is judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestMode {
    /// Pass iff the emulator exits 0 within budget; output is ignored.
    Generic,
    /// Pass iff the emulator's `--compliance` output matches `reference` line for line.
    GoldenComparison {
        /// Expected output, read as text.
        reference: PathBuf,
        /// Where the raw stdout is written for inspection.
        capture: PathBuf,
    },
}

/// One unit of work: run one program on one emulator and judge the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Label shown in reports.
    pub name: String,
    pub executable_under_test: PathBuf,
    pub target_program: PathBuf,
    pub mode: TestMode,
}

impl TestCase {
    pub fn generic(name: impl Into<String>, executable: impl Into<PathBuf>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            executable_under_test: executable.into(),
            target_program: program.into(),
            mode: TestMode::Generic,
        }
    }

    pub fn golden(
        name: impl Into<String>,
        executable: impl Into<PathBuf>,
        program: impl Into<PathBuf>,
        reference: impl Into<PathBuf>,
        capture: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            executable_under_test: executable.into(),
            target_program: program.into(),
            mode: TestMode::GoldenComparison {
                reference: reference.into(),
                capture: capture.into(),
            },
        }
    }

    /// Arguments passed to the emulator: `target [--compliance]`.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = vec![self.target_program.clone().into_os_string()];
        if self.is_golden() {
            args.push(OsString::from(COMPLIANCE_FLAG));
        }
        args
    }

    pub fn is_golden(&self) -> bool {
        matches!(self.mode, TestMode::GoldenComparison { .. })
    }

    /// Capture path, for golden-comparison cases only.
    pub fn capture_path(&self) -> Option<&Path> {
        match &self.mode {
            TestMode::GoldenComparison { capture, .. } => Some(capture),
            TestMode::Generic => None,
        }
    }

    /// Reference path, for golden-comparison cases only.
    pub fn reference_path(&self) -> Option<&Path> {
        match &self.mode {
            TestMode::GoldenComparison { reference, .. } => Some(reference),
            TestMode::Generic => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_args() {
        let case = TestCase::generic("towers", "riscv_vm", "towers/towers.elf");
        assert_eq!(case.args(), vec![OsString::from("towers/towers.elf")]);
        assert!(!case.is_golden());
        assert!(case.capture_path().is_none());
        assert!(case.reference_path().is_none());
    }

    #[test]
    fn test_golden_args_append_compliance_flag() {
        let case = TestCase::golden(
            "I-ADD-01.elf",
            "riscv_vm",
            "compliance/elf/I-ADD-01.elf",
            "compliance/goldens/I-ADD-01.reference_output",
            "compliance/out/I-ADD-01.reference_output",
        );
        assert_eq!(
            case.args(),
            vec![
                OsString::from("compliance/elf/I-ADD-01.elf"),
                OsString::from("--compliance")
            ]
        );
        assert_eq!(
            case.reference_path(),
            Some(Path::new("compliance/goldens/I-ADD-01.reference_output"))
        );
        assert_eq!(
            case.capture_path(),
            Some(Path::new("compliance/out/I-ADD-01.reference_output"))
        );
    }
}
