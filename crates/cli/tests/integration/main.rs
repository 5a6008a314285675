//! CLI integration tests against projects on disk.

mod build_tests;
mod common;
mod registry_tests;
