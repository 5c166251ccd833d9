//! Shared repository tests.
//!
//! Each module holds test functions that take a `&dyn XxxRepo`, so the same
//! assertions run against the in-memory store and SQLite. Backends wire them
//! up in their own `#[cfg(test)]` modules.

#[cfg(feature = "database-sqlite")]
pub mod harness;

pub use failing::FailingLoadRepo;
