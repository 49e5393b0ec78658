//! Setup errors raised by the harness itself.
//!
//! These are the conditions outside the test-outcome taxonomy: if one of them fires, the harness (not the
//! emulator) is broken, and reporting must say so separately from a failing test.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that indicate a broken harness rather than a broken emulator.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("failed to launch '{}'", .executable.display())]
    #[diagnostic(
        code(rvcheck::spawn),
        help("check that the emulator was built and that the path points at an executable file")
    )]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("lost track of process '{}'", .executable.display())]
    #[diagnostic(code(rvcheck::wait))]
    Wait {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read golden reference '{}'", .path.display())]
    #[diagnostic(
        code(rvcheck::reference),
        help("every compliance ELF needs a matching <name>.reference_output in the goldens directory")
    )]
    Reference {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write capture artifact '{}'", .path.display())]
    #[diagnostic(code(rvcheck::capture), help("check that the output directory is writable"))]
    Capture {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot list test programs in '{}'", .path.display())]
    #[diagnostic(code(rvcheck::discovery))]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    /// Short, stable label for the failing stage, used in report rows and JSON output.
    pub fn stage(&self) -> &'static str {
        match self {
            HarnessError::Spawn { .. } => "spawn",
            HarnessError::Wait { .. } => "wait",
            HarnessError::Reference { .. } => "reference",
            HarnessError::Capture { .. } => "capture",
            HarnessError::Discovery { .. } => "discovery",
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_path() {
        let err = HarnessError::Reference {
            path: PathBuf::from("compliance/goldens/I-ADD-01.reference_output"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "cannot read golden reference 'compliance/goldens/I-ADD-01.reference_output'"
        );
        assert_eq!(err.stage(), "reference");
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let err = HarnessError::Spawn {
            executable: PathBuf::from("riscv_vm"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("denied"));
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = HarnessError::Capture {
            path: PathBuf::from("out"),
            source: io::Error::other("disk full"),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("rvcheck::capture"));
        assert!(err.help().is_some());
    }
}
