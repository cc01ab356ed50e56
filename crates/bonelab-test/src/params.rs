//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use bonelab_core::{BinaryMask, Labelmap};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare computed values against expectations (default)
    #[default]
    Compare,
    /// Display mode - also print every checked value
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status. Failures are
/// recorded rather than panicking so one run reports every mismatch.
pub struct RegParams {
    /// Name of the test (e.g., "separator")
    pub test_name: String,
    /// Current test index (incremented before each comparison)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<TestError>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// # Arguments
    ///
    /// * `test_name` - Name of the test (e.g., "separator")
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, err: TestError) {
        eprintln!("Failure in {}_reg: {}", self.test_name, err);
        self.failures.push(err);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        if self.display() {
            eprintln!("  [{}] expected {}, actual {}", self.index, expected, actual);
        }
        let diff = (expected - actual).abs();
        if diff > delta {
            self.fail(TestError::ValueMismatch {
                index: self.index,
                expected,
                actual,
                delta,
            });
            false
        } else {
            true
        }
    }

    /// Record a boolean check
    pub fn check(&mut self, condition: bool) -> bool {
        self.compare_values(1.0, if condition { 1.0 } else { 0.0 }, 0.0)
    }

    /// Compare two labelmaps for exact equality (dimensions and labels)
    pub fn compare_labelmaps(&mut self, lm1: &Labelmap, lm2: &Labelmap) -> bool {
        self.index += 1;
        if lm1.dims() != lm2.dims() || lm1.data() != lm2.data() {
            self.fail(TestError::LabelmapMismatch { index: self.index });
            false
        } else {
            true
        }
    }

    /// Compare two masks for exact equality
    pub fn compare_masks(&mut self, m1: &BinaryMask, m2: &BinaryMask) -> bool {
        self.index += 1;
        if m1 != m2 {
            self.fail(TestError::LabelmapMismatch { index: self.index });
            false
        } else {
            true
        }
    }

    /// Finish the test and report results
    ///
    /// # Returns
    ///
    /// `true` if every comparison passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg ({} checks)", self.test_name, self.index);
        } else {
            eprintln!(
                "FAILURE: {}_reg ({} of {} checks failed)",
                self.test_name,
                self.failures.len(),
                self.index
            );
        }
        self.success
    }

    /// Finish the test, converting failures into an error
    pub fn finish(self) -> TestResult<()> {
        let test_name = self.test_name.clone();
        let count = self.failures.len();
        if self.cleanup() {
            Ok(())
        } else {
            Err(TestError::Failed { test_name, count })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_failures() {
        let mut rp = RegParams::new("params");
        assert!(rp.compare_values(1.0, 1.05, 0.1));
        assert!(!rp.compare_values(1.0, 2.0, 0.1));
        assert!(rp.check(true));
        assert_eq!(rp.index(), 3);
        assert!(!rp.cleanup());
    }
}
