//! Regression checks
//!
//! A `_reg` test creates one [`RegParams`], runs numbered checks through
//! it and asserts on [`RegParams::cleanup`]. Failed checks do not stop
//! the test, so one run reports every mismatch.

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use std::fs;
use std::path::PathBuf;
use stripcut_core::{ImageFormat, Pix};

/// What a regression run does besides checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Check only
    #[default]
    Compare,
    /// Also write images passed to [`RegParams::write_pix_if_display`]
    Display,
}

impl RegTestMode {
    /// Mode selected by `REGTEST_MODE` (`display`, anything else compares).
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE") {
            Ok(v) if v.eq_ignore_ascii_case("display") => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// State of one regression test
#[derive(Debug)]
pub struct RegParams {
    /// Test name without the `_reg` suffix
    pub test_name: String,
    pub mode: RegTestMode,
    index: usize,
    failures: Vec<String>,
}

impl RegParams {
    /// Start a regression test.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();
        eprintln!("\n==== {}_reg ({:?}) ====", test_name, mode);
        Self {
            test_name: test_name.to_string(),
            mode,
            index: 0,
            failures: Vec::new(),
        }
    }

    /// Number of checks run so far.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether images should be written.
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn check(&mut self, ok: bool, detail: impl FnOnce() -> String) -> bool {
        self.index += 1;
        if !ok {
            let msg = format!("{}_reg check {}: {}", self.test_name, self.index, detail());
            eprintln!("{}", msg);
            self.failures.push(msg);
        }
        ok
    }

    /// Check that `actual` is within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        let diff = (expected - actual).abs();
        self.check(diff <= delta, || {
            format!("expected {}, got {} (off by {}, allowed {})", expected, actual, diff, delta)
        })
    }

    /// Check a condition described by `what`.
    pub fn compare_true(&mut self, cond: bool, what: &str) -> bool {
        self.check(cond, || format!("not true: {}", what))
    }

    /// Check that two images have the same geometry and pixels.
    pub fn compare_pix(&mut self, pix1: &Pix, pix2: &Pix) -> bool {
        let ok = pix1.pixels_equal(pix2);
        self.check(ok, || {
            if !pix1.sizes_equal(pix2) {
                return format!(
                    "images differ in size: {}x{} {} bpp vs {}x{} {} bpp",
                    pix1.width(),
                    pix1.height(),
                    pix1.depth().bits(),
                    pix2.width(),
                    pix2.height(),
                    pix2.depth().bits()
                );
            }
            let first = (0..pix1.height())
                .flat_map(|y| (0..pix1.width()).map(move |x| (x, y)))
                .find(|&(x, y)| pix1.get_pixel(x, y) != pix2.get_pixel(x, y));
            match first {
                Some((x, y)) => format!("first differing pixel at ({}, {})", x, y),
                None => "images differ".to_string(),
            }
        })
    }

    /// Check that two byte strings are identical.
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.check(data1 == data2, || {
            format!("byte strings differ ({} vs {} bytes)", data1.len(), data2.len())
        })
    }

    /// In display mode, write `pix` as `<test>.<index>.<ext>` under the
    /// regout directory.
    pub fn write_pix_if_display(&self, pix: &Pix, format: ImageFormat) -> TestResult<()> {
        if !self.display() {
            return Ok(());
        }
        let dir = PathBuf::from(regout_dir());
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!(
            "{}.{:02}.{}",
            self.test_name,
            self.index,
            format.extension()
        ));
        stripcut_io::write_image(pix, &path, format).map_err(|e| TestError::ImageWrite {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        eprintln!("wrote {}", path.display());
        Ok(())
    }

    /// Report the outcome; `true` if every check passed.
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            eprintln!("{}_reg: {} checks passed", self.test_name, self.index);
            return true;
        }
        eprintln!(
            "{}_reg: {} of {} checks failed",
            self.test_name,
            self.failures.len(),
            self.index
        );
        for failure in &self.failures {
            eprintln!("  {}", failure);
        }
        false
    }

    /// Whether every check so far passed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Messages of the failed checks.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stripcut_core::PixelDepth;

    #[test]
    fn test_values_within_delta_pass() {
        let mut rp = RegParams::new("params");
        assert!(rp.compare_values(100.0, 100.0, 0.0));
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert_eq!(rp.index(), 2);
    }

    #[test]
    fn test_failures_are_collected() {
        let mut rp = RegParams::new("params");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(rp.compare_true(true, "ok"));
        assert!(rp.compare_strings(b"abc", b"abc"));
        assert!(!rp.compare_strings(b"abc", b"abd"));
        assert_eq!(rp.failures().len(), 2);
        assert!(rp.failures()[1].contains("check 4"));
        assert!(!rp.cleanup());
    }

    #[test]
    fn test_compare_pix_reports_first_difference() {
        let a = Pix::new(2, 2, PixelDepth::Bit8).unwrap();
        let mut b = a.to_mut();
        b.set_pixel(1, 1, 3).unwrap();
        let b: Pix = b.into();

        let mut rp = RegParams::new("params");
        assert!(rp.compare_pix(&a, &a.deep_clone()));
        assert!(!rp.compare_pix(&a, &b));
        assert!(rp.failures()[0].contains("(1, 1)"));

        let c = Pix::new(3, 2, PixelDepth::Bit8).unwrap();
        assert!(!rp.compare_pix(&a, &c));
        assert!(rp.failures()[1].contains("size"));
    }
}
