//! TrustStack Scoring - signal mapping and score aggregation
//!
//! Two pure, synchronous components:
//! - [`SignalMapper`] translates raw detected attributes into canonical signals
//! - [`ScoringAggregator`] combines signals into dimension scores and the
//!   overall trust score under coverage, knockout and core-deficit rules
//!
//! Neither holds mutable state beyond the injected catalog, so concurrent
//! scoring of different content items needs no synchronization.

pub mod aggregator;
pub mod mapper;

pub use aggregator::*;
pub use mapper::*;
