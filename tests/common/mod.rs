//! Common test utilities for parallel-corpus integration tests

#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;
