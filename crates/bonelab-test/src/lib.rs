//! bonelab-test - Regression test framework for bonelab
//!
//! This crate provides a small regression test framework in the style of
//! a `regutils` harness, plus synthetic phantom builders that stand in for
//! scan data:
//!
//! - **Compare**: check computed values and labelmaps against expectations
//! - **Display**: additionally print every checked value
//!
//! # Usage
//!
//! ```
//! use bonelab_test::{Phantom, RegParams};
//!
//! let volume = Phantom::new(16, 16, 8, 0.0)
//!     .unwrap()
//!     .cylinder((8.0, 8.0), 4.0, 0..8, 5000.0)
//!     .build();
//! let bright = volume.data().iter().filter(|&&v| v > 1000.0).count();
//!
//! let mut rp = RegParams::new("phantom");
//! rp.check(bright > 0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;
mod phantom;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};
pub use phantom::Phantom;
