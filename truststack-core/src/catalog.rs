//! Signal catalog - the immutable scoring configuration
//!
//! Constructed once at startup and passed by reference into the mapper and
//! aggregator. Configuration loading is owned by an external collaborator;
//! this crate only defines the shape (serde) and the reference deployment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::DEFAULT_DIMENSION_WEIGHT;

/// Exposure level used by the visibility multiplier table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    High,
    Medium,
    Low,
}

/// How a signal counts toward dimension coverage
///
/// `Required` and `Core` signals are counted in the coverage ratio and
/// participate in the core-deficit check; `Core` additionally marks the
/// signal as central to the dimension's meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    #[default]
    Standard,
    Required,
    Core,
}

impl Requirement {
    pub fn counts_toward_coverage(&self) -> bool {
        matches!(self, Requirement::Required | Requirement::Core)
    }
}

/// Configuration for one signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalDef {
    /// Display label; empty means "use the detector's label"
    #[serde(default)]
    pub label: String,
    pub dimension: String,

    #[serde(default = "default_signal_weight")]
    pub weight: f64,

    #[serde(default)]
    pub requirement: Requirement,

    /// A critically low knockout signal caps its whole dimension
    #[serde(default)]
    pub knockout: bool,

    /// How easily the underlying evidence is discovered on the page
    #[serde(default)]
    pub discoverability: Option<Level>,

    /// How prominent the evidence is to a human reader
    #[serde(default)]
    pub visibility: Option<Level>,
}

fn default_signal_weight() -> f64 {
    1.0
}

/// Configuration for one dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionDef {
    #[serde(default = "default_dimension_weight")]
    pub weight: f64,
}

fn default_dimension_weight() -> f64 {
    DEFAULT_DIMENSION_WEIGHT
}

/// Multiplier applied to a signal's weight based on how visible its evidence
/// is. Hard-to-find evidence should not dominate a dimension score.
///
/// Unrecognized or unconfigured pairs fall back to 0.8.
pub const DEFAULT_VISIBILITY_MULTIPLIER: f64 = 0.8;

const VISIBILITY_MULTIPLIERS: [((Level, Level), f64); 6] = [
    ((Level::High, Level::High), 1.0),
    ((Level::High, Level::Low), 0.9),
    ((Level::Medium, Level::High), 0.85),
    ((Level::Medium, Level::Low), 0.7),
    ((Level::Low, Level::High), 0.6),
    ((Level::Low, Level::Low), 0.5),
];

/// Immutable scoring configuration: signal definitions keyed by stable id,
/// per-dimension weights, and the static attribute -> signal table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalCatalog {
    /// Signal id -> definition
    pub signals: HashMap<String, SignalDef>,

    /// Lowercase dimension name -> definition
    pub dimensions: HashMap<String, DimensionDef>,

    /// Attribute id -> target signal id. `None` marks an attribute that is
    /// intentionally unmapped (superseded, or awaiting a signal that does not
    /// exist yet) and must be silently skipped.
    pub attribute_map: HashMap<String, Option<String>>,
}

impl SignalCatalog {
    /// Look up a signal definition
    pub fn signal(&self, id: &str) -> Option<&SignalDef> {
        self.signals.get(id)
    }

    /// Top-level weight for a dimension, defaulting when unconfigured
    pub fn dimension_weight(&self, name: &str) -> f64 {
        self.dimensions
            .get(&name.to_lowercase())
            .map(|d| d.weight)
            .unwrap_or(DEFAULT_DIMENSION_WEIGHT)
    }

    /// Target signal id for a detected attribute, if one is configured
    pub fn attribute_target(&self, attribute_id: &str) -> Option<&str> {
        self.attribute_map
            .get(attribute_id)
            .and_then(|target| target.as_deref())
    }

    /// Whether an attribute id appears in the table at all (mapped or retired)
    pub fn knows_attribute(&self, attribute_id: &str) -> bool {
        self.attribute_map.contains_key(attribute_id)
    }

    /// Ids of signals counted in a dimension's coverage ratio
    pub fn required_signal_ids(&self, dimension: &str) -> Vec<&str> {
        let dim = dimension.to_lowercase();
        let mut ids: Vec<&str> = self
            .signals
            .iter()
            .filter(|(_, def)| {
                def.dimension.to_lowercase() == dim && def.requirement.counts_toward_coverage()
            })
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of knockout signals for a dimension
    pub fn knockout_signal_ids(&self, dimension: &str) -> Vec<&str> {
        let dim = dimension.to_lowercase();
        let mut ids: Vec<&str> = self
            .signals
            .iter()
            .filter(|(_, def)| def.dimension.to_lowercase() == dim && def.knockout)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Effective weight multiplier for a signal definition
    pub fn visibility_multiplier(&self, def: &SignalDef) -> f64 {
        match (def.discoverability, def.visibility) {
            (Some(d), Some(v)) => VISIBILITY_MULTIPLIERS
                .iter()
                .find(|((td, tv), _)| *td == d && *tv == v)
                .map(|(_, m)| *m)
                .unwrap_or(DEFAULT_VISIBILITY_MULTIPLIER),
            _ => DEFAULT_VISIBILITY_MULTIPLIER,
        }
    }

    /// The reference deployment: five dimensions at equal weight, the signal
    /// set the reference detectors feed, and the attribute bridge table.
    pub fn reference() -> Self {
        let mut signals = HashMap::new();

        let mut def = |id: &str,
                       label: &str,
                       dimension: &str,
                       weight: f64,
                       requirement: Requirement,
                       knockout: bool,
                       discoverability: Option<Level>,
                       visibility: Option<Level>| {
            signals.insert(
                id.to_string(),
                SignalDef {
                    label: label.to_string(),
                    dimension: dimension.to_string(),
                    weight,
                    requirement,
                    knockout,
                    discoverability,
                    visibility,
                },
            );
        };

        // Provenance
        def(
            "prov_author_bylines",
            "Author Bylines",
            "Provenance",
            0.3,
            Requirement::Required,
            false,
            Some(Level::High),
            Some(Level::High),
        );
        def(
            "prov_source_clarity",
            "Source Attribution",
            "Provenance",
            0.3,
            Requirement::Core,
            false,
            Some(Level::High),
            Some(Level::High),
        );
        def(
            "prov_metadata_c2pa",
            "Cryptographic Provenance",
            "Provenance",
            0.2,
            Requirement::Standard,
            false,
            Some(Level::Low),
            Some(Level::Low),
        );
        def(
            "prov_date_freshness",
            "Content Freshness",
            "Provenance",
            0.2,
            Requirement::Standard,
            false,
            Some(Level::High),
            Some(Level::Low),
        );

        // Resonance
        def(
            "res_cultural_fit",
            "Cultural/Audience Fit",
            "Resonance",
            0.4,
            Requirement::Required,
            false,
            None,
            None,
        );
        def(
            "res_personalization",
            "Dynamic Personalization",
            "Resonance",
            0.2,
            Requirement::Standard,
            false,
            Some(Level::Medium),
            Some(Level::High),
        );
        def(
            "res_engagement_metrics",
            "Engagement Authenticity",
            "Resonance",
            0.2,
            Requirement::Standard,
            false,
            Some(Level::Medium),
            Some(Level::High),
        );
        def(
            "res_readability",
            "Readability Fit",
            "Resonance",
            0.2,
            Requirement::Standard,
            false,
            Some(Level::High),
            Some(Level::High),
        );

        // Coherence
        def(
            "coh_voice_consistency",
            "Voice Consistency",
            "Coherence",
            0.4,
            Requirement::Required,
            false,
            None,
            None,
        );
        def(
            "coh_design_patterns",
            "Design System Consistency",
            "Coherence",
            0.3,
            Requirement::Standard,
            false,
            Some(Level::Medium),
            Some(Level::High),
        );
        def(
            "coh_technical_health",
            "Technical Health",
            "Coherence",
            0.3,
            Requirement::Standard,
            false,
            Some(Level::Medium),
            Some(Level::Low),
        );

        // Transparency
        def(
            "trans_disclosures",
            "Clear Disclosures",
            "Transparency",
            0.4,
            Requirement::Core,
            false,
            Some(Level::High),
            Some(Level::High),
        );
        def(
            "trans_ai_labeling",
            "AI/Automation Labeling",
            "Transparency",
            0.3,
            Requirement::Required,
            false,
            Some(Level::Medium),
            Some(Level::High),
        );
        def(
            "trans_contact_info",
            "Contact Information",
            "Transparency",
            0.3,
            Requirement::Standard,
            false,
            Some(Level::High),
            Some(Level::Low),
        );

        // Verification
        def(
            "ver_fact_accuracy",
            "Factual Accuracy",
            "Verification",
            0.4,
            Requirement::Core,
            true,
            None,
            None,
        );
        def(
            "ver_trust_badges",
            "Third-Party Trust Badges",
            "Verification",
            0.3,
            Requirement::Standard,
            false,
            Some(Level::Medium),
            Some(Level::High),
        );
        def(
            "ver_social_proof",
            "Authentic Social Proof",
            "Verification",
            0.3,
            Requirement::Standard,
            false,
            Some(Level::Medium),
            Some(Level::High),
        );

        let dimensions = crate::REFERENCE_DIMENSIONS
            .iter()
            .map(|name| {
                (
                    name.to_lowercase(),
                    DimensionDef {
                        weight: DEFAULT_DIMENSION_WEIGHT,
                    },
                )
            })
            .collect();

        let mut attribute_map: HashMap<String, Option<String>> = HashMap::new();
        let mut bridge = |attr: &str, signal: Option<&str>| {
            attribute_map.insert(attr.to_string(), signal.map(|s| s.to_string()));
        };

        // Provenance
        bridge("author_brand_identity_verified", Some("prov_author_bylines"));
        bridge("c2pa_cai_manifest_present", Some("prov_metadata_c2pa"));
        bridge("source_domain_trust_baseline", Some("prov_source_clarity"));
        bridge(
            "digital_watermark_fingerprint_detected",
            Some("prov_metadata_c2pa"),
        );
        bridge("exif_metadata_integrity", Some("prov_metadata_c2pa"));
        bridge("metadata_completeness", Some("prov_source_clarity"));
        bridge(
            "canonical_url_matches_declared_source",
            Some("prov_source_clarity"),
        );

        // Resonance
        bridge(
            "personalization_relevance_embedding_similarity",
            Some("res_personalization"),
        );
        bridge("engagement_authenticity_ratio", Some("res_engagement_metrics"));
        bridge("language_locale_match", Some("res_cultural_fit"));
        bridge("readability_grade_level_fit", Some("res_readability"));

        // Coherence
        bridge("brand_voice_consistency_score", Some("coh_voice_consistency"));
        bridge("multimodal_consistency_score", Some("coh_design_patterns"));
        bridge("claim_consistency_across_pages", Some("coh_voice_consistency"));
        bridge("broken_link_rate", Some("coh_technical_health"));
        bridge("schema_compliance", Some("coh_technical_health"));

        // Transparency (note the cross-dimension entries: sponsorship labels
        // are detected during verification scans but score transparency)
        bridge(
            "privacy_policy_link_availability_clarity",
            Some("trans_disclosures"),
        );
        bridge(
            "ai_generated_assisted_disclosure_present",
            Some("trans_ai_labeling"),
        );
        bridge("ai_vs_human_labeling_clarity", Some("trans_ai_labeling"));
        bridge("bot_disclosure_response_audit", Some("trans_ai_labeling"));
        bridge("contact_info_availability", Some("trans_contact_info"));
        bridge("ad_sponsored_label_consistency", Some("trans_disclosures"));

        // Verification
        bridge("claim_to_source_traceability", Some("ver_fact_accuracy"));
        bridge("seller_product_verification_rate", Some("ver_trust_badges"));
        bridge("verified_purchaser_review_rate", Some("ver_social_proof"));
        bridge("review_authenticity_confidence", Some("ver_social_proof"));

        // Retired attributes: kept in the table so detectors can keep
        // emitting them, but deliberately dropped from scoring
        bridge("domain_age_heuristic", None);
        bridge("outbound_link_reputation", None);

        Self {
            signals,
            dimensions,
            attribute_map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_weight_defaults() {
        let catalog = SignalCatalog::reference();
        assert_eq!(catalog.dimension_weight("Provenance"), 0.2);
        assert_eq!(catalog.dimension_weight("nonexistent"), 0.2);
    }

    #[test]
    fn test_attribute_target_lookup() {
        let catalog = SignalCatalog::reference();
        assert_eq!(
            catalog.attribute_target("author_brand_identity_verified"),
            Some("prov_author_bylines")
        );
        // Retired attribute: present in the table, no target
        assert!(catalog.knows_attribute("domain_age_heuristic"));
        assert_eq!(catalog.attribute_target("domain_age_heuristic"), None);
        // Unknown attribute: not in the table at all
        assert!(!catalog.knows_attribute("never_heard_of_it"));
    }

    #[test]
    fn test_cross_dimension_remap_target() {
        let catalog = SignalCatalog::reference();
        let target = catalog
            .attribute_target("ad_sponsored_label_consistency")
            .unwrap();
        assert_eq!(
            catalog.signal(target).unwrap().dimension,
            "Transparency"
        );
    }

    #[test]
    fn test_required_and_knockout_ids() {
        let catalog = SignalCatalog::reference();
        let required = catalog.required_signal_ids("Provenance");
        assert_eq!(required, vec!["prov_author_bylines", "prov_source_clarity"]);

        let knockouts = catalog.knockout_signal_ids("Verification");
        assert_eq!(knockouts, vec!["ver_fact_accuracy"]);
    }

    #[test]
    fn test_visibility_multiplier_table() {
        let catalog = SignalCatalog::reference();
        let high = catalog.signal("prov_author_bylines").unwrap();
        assert_eq!(catalog.visibility_multiplier(high), 1.0);

        let buried = catalog.signal("prov_metadata_c2pa").unwrap();
        assert_eq!(catalog.visibility_multiplier(buried), 0.5);

        // Unconfigured pair falls back to the default
        let unset = catalog.signal("ver_fact_accuracy").unwrap();
        assert_eq!(
            catalog.visibility_multiplier(unset),
            DEFAULT_VISIBILITY_MULTIPLIER
        );
    }

    #[test]
    fn test_catalog_round_trips_through_json() {
        let catalog = SignalCatalog::reference();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: SignalCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.signals.len(), catalog.signals.len());
        assert_eq!(
            parsed.attribute_target("broken_link_rate"),
            Some("coh_technical_health")
        );
    }
}
