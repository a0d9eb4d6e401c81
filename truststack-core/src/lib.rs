//! TrustStack Core - Signal types and scoring domain model
//!
//! This crate provides the foundational primitives:
//! - Canonical trust signals with normalized values, weights and confidence
//! - Dimension and overall trust score value objects
//! - Claim verification verdicts and issue records
//! - The immutable signal catalog (signal definitions, dimension weights,
//!   attribute mappings, visibility multipliers)

pub mod catalog;
pub mod content;
pub mod signals;
pub mod verdicts;

pub use catalog::*;
pub use content::*;
pub use signals::*;
pub use verdicts::*;

/// Default weight for a dimension with no configured weight
pub const DEFAULT_DIMENSION_WEIGHT: f64 = 0.2;

/// Neutral verification score when nothing verifiable exists
pub const NEUTRAL_VERIFICATION_SCORE: f64 = 0.5;

/// Maximum number of claims extracted per content item
pub const MAX_CLAIMS_PER_ITEM: usize = 5;

/// Signal values at or below this threshold count as critically low
pub const CRITICAL_SIGNAL_VALUE: f64 = 0.3;

/// Dimension cap applied when a knockout signal is critically low
pub const KNOCKOUT_CAP: f64 = 4.0;

/// Dimension cap applied when a required signal is missing or critically low
pub const CORE_DEFICIT_CAP: f64 = 6.0;

/// The five dimensions of the reference deployment
pub const REFERENCE_DIMENSIONS: [&str; 5] = [
    "Provenance",
    "Resonance",
    "Coherence",
    "Transparency",
    "Verification",
];
