//! TrustStack Runtime - scoring pass orchestration
//!
//! Wires the mapper, aggregator and verification manager into a single
//! scoring pipeline that takes detected attributes and content records in
//! and produces classified trust scores out.

pub mod pipeline;
pub mod telemetry;

pub use pipeline::{Classification, ScoredContent, ScoringPipeline};
pub use telemetry::init_tracing;
