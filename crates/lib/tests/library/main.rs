//! Library integration tests: whole-project builds from disk.

mod addon_tests;
mod build_tests;
mod common;
mod registry_tests;
