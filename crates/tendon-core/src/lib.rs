//! Tendon Core - Foundational types for the Tendon animation crates
//!
//! Provides the error type and `Result` alias every other crate returns.

mod error;

pub use error::{Result, TendonError};
