//! Shared test utilities for the terrain-wind workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic elevation, vegetation and wind grids
//! - ASC / config / palette writers producing map directories on disk
//! - Approximate float assertions
//! - An async "poll until ready" helper
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{MapFixture, assert_approx_eq};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

use std::time::Duration;

/// Repeatedly call `check` until it yields `Some`, sleeping `interval`
/// between attempts. Gives up after `timeout`.
///
/// Intended for tests that drive a non-blocking poll API from an async
/// context, the same way a frame loop would.
pub async fn poll_until<T>(
    timeout: Duration,
    interval: Duration,
    mut check: impl FnMut() -> Option<T>,
) -> Option<T> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(value) = check() {
            return Some(value);
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of two `[f32; 3]` vectors (colors, positions, normals).
///
/// ```ignore
/// use test_utils::assert_vec3_approx_eq;
///
/// assert_vec3_approx_eq!([0.0, 1.0, 0.0], [0.0, 0.9999, 0.0], 0.001);
/// ```
#[macro_export]
macro_rules! assert_vec3_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: [f32; 3] = $left;
        let right: [f32; 3] = $right;
        for axis in 0..3 {
            $crate::assert_approx_eq!(left[axis], right[axis], $epsilon);
        }
    }};
}
