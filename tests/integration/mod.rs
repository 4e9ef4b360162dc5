//! Library-level integration tests against `MockRemoteService`.

pub mod batch_test;
pub mod schema_test;
