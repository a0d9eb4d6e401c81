//! Canonical trust signals and score value objects
//!
//! Signals are the smallest unit of trust evidence:
//! - Scoped to exactly one dimension
//! - Carry a normalized value in [0, 1] (1.0 = strongest evidence for trust)
//! - Carry a weight expressing relative importance within the dimension
//! - Created fresh per content item per scoring pass, never mutated afterwards

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::DEFAULT_DIMENSION_WEIGHT;

/// Presence status of a signal
///
/// `Unknown` signals are excluded from every weighted sum but still register
/// presence for coverage checks: an unknown required signal satisfies coverage
/// while contributing nothing to the raw score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    #[default]
    Known,
    Present,
    Absent,
    Unknown,
}

impl SignalStatus {
    /// Whether this signal contributes to weighted aggregation
    pub fn scorable(&self) -> bool {
        !matches!(self, SignalStatus::Unknown)
    }
}

/// A single trust signal (e.g. `prov_author_bylines`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Stable signal identifier
    pub id: String,

    /// Human-readable label
    pub label: String,

    /// Owning dimension name ("Provenance", "Verification", ...)
    pub dimension: String,

    /// Normalized value (0.0 - 1.0)
    pub value: f64,

    /// Relative importance within the dimension (0.0 - 1.0)
    pub weight: f64,

    /// Raw evidence: snippets, URLs, selectors
    pub evidence: Vec<String>,

    /// Short explanation of where the signal came from
    pub rationale: String,

    /// Confidence in this specific signal (0.0 - 1.0)
    pub confidence: f64,

    /// Presence status
    pub status: SignalStatus,
}

impl Signal {
    /// Create a new signal builder
    pub fn builder(id: &str, dimension: &str) -> SignalBuilder {
        SignalBuilder::new(id, dimension)
    }
}

/// Builder for signals; setters clamp numeric fields into range
pub struct SignalBuilder {
    id: String,
    label: String,
    dimension: String,
    value: f64,
    weight: f64,
    evidence: Vec<String>,
    rationale: String,
    confidence: f64,
    status: SignalStatus,
}

impl SignalBuilder {
    pub fn new(id: &str, dimension: &str) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            dimension: dimension.to_string(),
            value: 0.0,
            weight: 1.0,
            evidence: Vec::new(),
            rationale: String::new(),
            confidence: 1.0,
            status: SignalStatus::Known,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = value.clamp(0.0, 1.0);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn rationale(mut self, rationale: &str) -> Self {
        self.rationale = rationale.to_string();
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn status(mut self, status: SignalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Signal {
        Signal {
            id: self.id,
            label: self.label,
            dimension: self.dimension,
            value: self.value,
            weight: self.weight,
            evidence: self.evidence,
            rationale: self.rationale,
            confidence: self.confidence,
            status: self.status,
        }
    }
}

/// Aggregated score for one trust dimension
///
/// Invariant: `value` is the minimum of the raw weighted score and every
/// applicable cap (coverage, knockout, core-deficit) - never higher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Dimension name ("Provenance")
    pub name: String,

    /// Aggregated value (0.0 - 10.0)
    pub value: f64,

    /// Blended confidence (0.0 - 1.0)
    pub confidence: f64,

    /// Fraction of required signals present (0.0 - 1.0)
    pub coverage: f64,

    /// Signals that contributed to this dimension
    pub signals: Vec<Signal>,

    /// Top-level weight in the overall score
    pub weight: f64,
}

impl DimensionScore {
    /// An empty dimension score: no evidence, zero value and confidence
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: 0.0,
            confidence: 0.0,
            coverage: 0.0,
            signals: Vec::new(),
            weight: DEFAULT_DIMENSION_WEIGHT,
        }
    }

    /// True "no evidence": distinct from "evidence says untrustworthy"
    pub fn has_no_evidence(&self) -> bool {
        self.value <= 0.0 && self.coverage <= 0.0
    }
}

/// Top-level trust score for one content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustScore {
    /// Overall score (0.0 - 100.0)
    pub overall: f64,

    /// Weighted confidence (0.0 - 1.0)
    pub confidence: f64,

    /// Weighted coverage (0.0 - 1.0)
    pub coverage: f64,

    /// Lowercase dimension name -> dimension score
    pub dimensions: HashMap<String, DimensionScore>,

    /// Free-form metadata (brand, timestamp, model version, ...)
    pub metadata: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_clamps_ranges() {
        let signal = Signal::builder("prov_author_bylines", "Provenance")
            .value(1.7)
            .weight(-0.5)
            .confidence(2.0)
            .build();

        assert_eq!(signal.value, 1.0);
        assert_eq!(signal.weight, 0.0);
        assert_eq!(signal.confidence, 1.0);
        assert_eq!(signal.status, SignalStatus::Known);
    }

    #[test]
    fn test_builder_label_defaults_to_id() {
        let signal = Signal::builder("trans_disclosures", "Transparency")
            .value(0.8)
            .build();
        assert_eq!(signal.label, "trans_disclosures");
    }

    #[test]
    fn test_unknown_status_not_scorable() {
        assert!(SignalStatus::Known.scorable());
        assert!(SignalStatus::Absent.scorable());
        assert!(!SignalStatus::Unknown.scorable());
    }

    #[test]
    fn test_empty_dimension_has_no_evidence() {
        let dim = DimensionScore::empty("Resonance");
        assert!(dim.has_no_evidence());
        assert_eq!(dim.weight, DEFAULT_DIMENSION_WEIGHT);
    }
}
