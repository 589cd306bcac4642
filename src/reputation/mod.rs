//! Deviation & Reputation System
//!
//! Turns deviation-from-claim into an adaptive audit cadence: each
//! completed benchmark moves the provider's bounded score, and the score's
//! tier sets the mandatory re-verification interval the scheduler enforces.
//! This engine computes and exposes scores and flags; it never enacts
//! penalties.

pub mod engine;
pub mod score;

pub use engine::{
    apply_benchmark, deviation_percent, should_benchmark, should_benchmark_with_roll, BenchmarkDue,
};
pub use score::{Reputation, ReputationTier, DEFAULT_SCORE};
