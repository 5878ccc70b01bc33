//! Verdict aggregation: a pure function of the [`ScoreSet`](crate::scoring::ScoreSet).
//!
//! ```text
//! base = 0.5*factuality - 0.2*bias - 0.15*sensationalism
//!        [- 0.15*toxicity  if toxicity > 0.5]
//! confidence = min(|base - 0.5| * 2, 1)
//! ```
//!
//! `base` is not clamped.

pub mod aggregate;
pub mod types;


pub use aggregate::{aggregate, confidence_for, verdict_for};
pub use types::{Verdict, VerdictOutcome};
