#![forbid(unsafe_code)]
//! Core test execution and verification engine for `rvcheck`.
//!
//! This crate owns the two pieces of the harness with real semantics:
//!
//! - [`process`]: launch the emulator under a wall-clock budget and classify what happened
//!   ([`ProcessResult`]).
//! - [`verify`]: turn a [`ProcessResult`] into a [`Verdict`], either by exit status alone (generic tests) or by
//!   line-by-line comparison against a golden reference (compliance tests).
//!
//! Discovery, configuration and reporting live in the `rvcheck` crate. Nothing here knows how the list of
//! [`TestCase`] values was produced.
//!
//! ## Error Policy
//!
//! A test failing (timeout, non-zero exit, mismatched output) is *data*, never an `Err`. [`HarnessError`] is
//! reserved for a broken harness: a missing emulator, an unreadable reference, an unwritable capture.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod case;
pub mod error;
pub mod lines;
pub mod process;
pub mod verify;

pub use case::{TestCase, TestMode, COMPLIANCE_FLAG};
pub use error::{HarnessError, HarnessResult};
pub use process::{
    DEFAULT_COMPLIANCE_TIMEOUT, DEFAULT_GENERIC_TIMEOUT, ProcessResult, ProcessRunner, ProcessStatus,
    SystemProcessRunner,
};
pub use verify::{Diagnostic, Failure, Verdict, read_reference, verify_generic, verify_golden};
