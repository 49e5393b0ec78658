//! rvcheck version information.
//!
//! The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time so the CLI banner and JSON
//! summaries agree on it.

/// The rvcheck version string (for example, `0.1.0`).
pub const RVCHECK_VERSION: &str = env!("CARGO_PKG_VERSION");
