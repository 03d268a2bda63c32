//! Built-in check implementations and shared check machinery.

pub mod expect_paths;
pub mod expectations;
