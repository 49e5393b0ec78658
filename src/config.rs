//! Harness configuration
//!
//! Defaults match the layout of the emulator's `tests/` directory, with the harness started from inside it:
//! the emulator is built one level up, compliance programs and goldens sit under `compliance/`, and the generic
//! benchmark programs each live in their own folder.

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rvcheck_core::{DEFAULT_COMPLIANCE_TIMEOUT, DEFAULT_GENERIC_TIMEOUT};

/// Extension shared by golden references and capture artifacts.
pub const REFERENCE_EXTENSION: &str = "reference_output";

/// Benchmark programs run as generic tests when none are configured.
pub const DEFAULT_GENERIC_PROGRAMS: [&str; 4] = ["towers/towers.elf", "rsort/rsort.elf", "pi/pi.elf", "puzzle/puzzle.elf"];

/// Everything a run needs to know, passed down explicitly.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Emulator binary under test
    pub emulator: PathBuf,
    /// Directory of compliance ELF files
    pub elf_dir: PathBuf,
    /// Directory of `<stem>.reference_output` goldens
    pub golden_dir: PathBuf,
    /// Directory receiving capture artifacts
    pub out_dir: PathBuf,
    /// Programs judged only by exit status, run in this order
    pub generic_programs: Vec<PathBuf>,
    pub compliance_timeout: Duration,
    pub generic_timeout: Duration,
    /// Keep only cases whose name contains this keyword
    pub filter: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            emulator: default_emulator_path(),
            elf_dir: Path::new("compliance").join("elf"),
            golden_dir: Path::new("compliance").join("goldens"),
            out_dir: Path::new("compliance").join("out"),
            generic_programs: DEFAULT_GENERIC_PROGRAMS.into_iter().map(native_path).collect(),
            compliance_timeout: DEFAULT_COMPLIANCE_TIMEOUT,
            generic_timeout: DEFAULT_GENERIC_TIMEOUT,
            filter: None,
        }
    }
}

/// `../build/Debug/riscv_vm`, with the platform's executable suffix.
pub fn default_emulator_path() -> PathBuf {
    Path::new("..")
        .join("build")
        .join("Debug")
        .join(format!("riscv_vm{}", EXE_SUFFIX))
}

fn native_path(slashed: &str) -> PathBuf {
    slashed.split('/').collect()
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_emulator(mut self, emulator: impl Into<PathBuf>) -> Self {
        self.emulator = emulator.into();
        self
    }

    pub fn with_elf_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.elf_dir = dir.into();
        self
    }

    pub fn with_golden_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.golden_dir = dir.into();
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Replace the generic program list. An empty list disables generic tests.
    pub fn with_generic_programs(mut self, programs: Vec<PathBuf>) -> Self {
        self.generic_programs = programs;
        self
    }

    pub fn with_compliance_timeout(mut self, timeout: Duration) -> Self {
        self.compliance_timeout = timeout;
        self
    }

    pub fn with_generic_timeout(mut self, timeout: Duration) -> Self {
        self.generic_timeout = timeout;
        self
    }

    pub fn with_filter(mut self, keyword: impl Into<String>) -> Self {
        self.filter = Some(keyword.into());
        self
    }

    /// Golden reference for the compliance program with file stem `stem`.
    pub fn reference_path(&self, stem: &str) -> PathBuf {
        self.golden_dir.join(format!("{}.{}", stem, REFERENCE_EXTENSION))
    }

    /// Capture artifact for the compliance program with file stem `stem`.
    pub fn capture_path(&self, stem: &str) -> PathBuf {
        self.out_dir.join(format!("{}.{}", stem, REFERENCE_EXTENSION))
    }

    /// Whether a case named `name` survives the keyword filter.
    pub fn selects(&self, name: &str) -> bool {
        self.filter.as_deref().is_none_or(|keyword| name.contains(keyword))
    }
}
