//! The `devnet_node` command line: compiles Sierra classes through the same resolution, invocation
//! and caching path used by class declarations.
pub mod cli;
pub mod commands;
