//! Metric Probes
//!
//! Independent routines that each exercise one dimension of a provider over
//! the network. Every probe is self-contained, time-bounded, and tolerant
//! of individual request failure: a failed call is folded into the metric
//! as a zero or a failure count, never propagated. Partial data always
//! beats no data.

pub mod client;
pub mod content;
pub mod durability;
pub mod iops;
pub mod latency;
pub mod network;
pub mod throughput;

pub use client::{ProbeClient, ProbeResponse};
