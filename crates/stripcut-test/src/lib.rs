//! stripcut-test - Regression test harness for stripcut
//!
//! Provides [`RegParams`], a checker that counts and reports failures
//! the way the `_reg` tests expect, plus the [`synth`] builders used to
//! construct deterministic long strips.
//!
//! # Usage
//!
//! ```ignore
//! use stripcut_test::RegParams;
//!
//! let mut rp = RegParams::new("gutter");
//! rp.compare_values(3.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "display" to write intermediate images

mod error;
mod params;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // stripcut-test is at crates/stripcut-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
