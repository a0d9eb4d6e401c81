//! Upstream content and detector records consumed by the scoring core
//!
//! Ingestion (fetching, text extraction, screenshots) and the attribute
//! detection heuristics live outside this workspace; these types are the
//! boundary contract they deliver their output through.

use serde::{Deserialize, Serialize};

/// Visual verification result from the out-of-scope visual pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualVerification {
    /// Platform the badge was detected on ("instagram", "x", ...)
    pub platform: String,

    /// Whether the badge marks the account as verified
    pub verified: bool,

    /// What the visual pipeline saw
    pub evidence: String,
}

/// Source ownership classification for a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// First-party content: the brand is the authoritative source for its
    /// own catalog data (prices, specs, inventory)
    BrandOwned,
    /// Third-party content (reviews, press, social)
    ThirdParty,
    #[default]
    Unknown,
}

/// The slice of a normalized content item the scoring core consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub content_id: String,
    pub title: String,
    pub body: String,
    pub url: String,
    pub source_type: SourceType,

    /// Present when the visual pipeline ran on this item
    pub visual_verification: Option<VisualVerification>,
}

impl ContentRecord {
    pub fn is_brand_owned(&self) -> bool {
        self.source_type == SourceType::BrandOwned
    }
}

/// Presence status reported by the attribute detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeStatus {
    #[default]
    Present,
    Absent,
    Partial,
    Unknown,
}

/// A raw attribute detected in content by the external detector
///
/// Values arrive on a free scale: heuristic detectors emit 1-10 ratings,
/// LLM-backed detectors emit 0-1 scores. The signal mapper normalizes both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedAttribute {
    pub attribute_id: String,

    /// Dimension the detector filed this under; the mapper may re-home the
    /// resulting signal to a different dimension
    pub dimension: String,

    pub label: String,

    /// Free-scale value (0-1 or 1-10)
    pub value: f64,

    /// Detection confidence (0.0 - 1.0)
    pub confidence: f64,

    /// What triggered the detection
    pub evidence: String,

    pub status: AttributeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_owned_flag() {
        let record = ContentRecord {
            content_id: "c-1".to_string(),
            title: "Acme store".to_string(),
            body: "Buy now".to_string(),
            url: "https://acme.example/shop".to_string(),
            source_type: SourceType::BrandOwned,
            visual_verification: None,
        };
        assert!(record.is_brand_owned());
    }

    #[test]
    fn test_source_type_default_unknown() {
        assert_eq!(SourceType::default(), SourceType::Unknown);
    }
}
