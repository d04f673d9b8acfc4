//! Utilities for running an external Sierra compiler process.
pub mod build_utils;
pub mod compiler_utils;
pub mod paths;
pub mod resource_limits;

#[cfg(any(feature = "testing", test))]
pub mod test_utils;
