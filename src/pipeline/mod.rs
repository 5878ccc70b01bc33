//! Analysis pipeline.
//!
//! [`Analyzer::analyze`] turns a [`TextInput`] into a [`VerdictResult`]. It
//! fails only when a capability is entirely unavailable; degraded signals,
//! zero entities and zero source candidates are all valid results.

pub mod analyzer;
pub mod cancel;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use analyzer::Analyzer;
pub use cancel::CancelToken;
pub use error::PipelineError;
pub use types::{TextInput, VerdictResult};
