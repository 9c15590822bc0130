//! Shared test utilities for fauxsearch integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

pub mod backend;
pub mod fixtures;

pub use backend::*;
pub use fixtures::*;
