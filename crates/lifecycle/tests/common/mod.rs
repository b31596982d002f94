//! Test infrastructure for the lifecycle engine.
//!
//! This module provides entity fixtures, an engine harness over the memory
//! store, a failure-injecting store and outcome assertions.

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod harness;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use harness::*;
