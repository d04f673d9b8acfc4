pub mod dumping;
pub mod tracing_utils;
