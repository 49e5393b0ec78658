//! Test case discovery
//!
//! Compliance cases come from scanning the ELF directory and pairing each program with its golden reference;
//! generic cases come straight from the configured program list. The result is the fixed, ordered list of
//! [`TestCase`] values the harness runs.

use std::fs;
use std::path::{Path, PathBuf};

use rvcheck_core::{HarnessError, HarnessResult, TestCase};

use crate::config::HarnessConfig;

/// All cases for a run: compliance cases sorted by file name, then generic programs in configured order.
pub fn collect_cases(config: &HarnessConfig) -> HarnessResult<Vec<TestCase>> {
    let mut cases = discover_compliance_cases(config)?;
    cases.extend(generic_cases(config));
    cases.retain(|case| config.selects(&case.name));
    Ok(cases)
}

/// Pair every program in `config.elf_dir` with `<stem>.reference_output` in the goldens and out directories.
///
/// Subdirectories and dotfiles are ignored. References are not opened here: a missing golden is reported by the
/// case that needs it.
pub fn discover_compliance_cases(config: &HarnessConfig) -> HarnessResult<Vec<TestCase>> {
    let programs = list_programs(&config.elf_dir)?;
    tracing::debug!(count = programs.len(), dir = %config.elf_dir.display(), "discovered compliance programs");

    Ok(programs
        .into_iter()
        .map(|program| {
            let name = file_name(&program);
            let stem = program
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            TestCase::golden(
                name,
                &config.emulator,
                &program,
                config.reference_path(&stem),
                config.capture_path(&stem),
            )
        })
        .collect())
}

/// One generic case per configured program, labelled with the path as given.
pub fn generic_cases(config: &HarnessConfig) -> Vec<TestCase> {
    config
        .generic_programs
        .iter()
        .map(|program| TestCase::generic(program.display().to_string(), &config.emulator, program))
        .collect()
}

fn list_programs(dir: &Path) -> HarnessResult<Vec<PathBuf>> {
    let discovery_error = |source| HarnessError::Discovery {
        path: dir.to_path_buf(),
        source,
    };

    let mut programs = Vec::new();
    for entry in fs::read_dir(dir).map_err(discovery_error)? {
        let path = entry.map_err(discovery_error)?.path();
        if !path.is_file() || file_name(&path).starts_with('.') {
            continue;
        }
        programs.push(path);
    }

    // Directory order is filesystem-dependent; runs must be reproducible.
    programs.sort_by_key(|p| file_name(p));
    Ok(programs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
