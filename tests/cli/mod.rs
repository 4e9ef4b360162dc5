//! Smoke tests for the `sqlws` binary.

pub mod args_test;
