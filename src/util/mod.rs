//! Shared helpers for tests and binaries

pub mod testing;
