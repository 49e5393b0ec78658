#![forbid(unsafe_code)]
//! rvcheck: compliance and regression harness for the `riscv_vm` emulator
//!
//! The harness runs the emulator against known programs and judges each run either by exit status (generic
//! tests) or by comparing `--compliance` output with a golden reference (compliance tests).
//!
//! The process runner and verifier live in `rvcheck_core`. This crate adds what surrounds them: configuration,
//! discovery of compliance programs, orchestration of a run, and reporting.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod version;

pub use config::HarnessConfig;
pub use rvcheck_core::{
    Diagnostic, Failure, HarnessError, ProcessResult, ProcessRunner, SystemProcessRunner, TestCase, TestMode, Verdict,
};
