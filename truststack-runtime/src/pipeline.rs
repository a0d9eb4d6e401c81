//! Scoring Pipeline
//!
//! Orchestrates one scoring pass for one content item: claim verification,
//! attribute-to-signal mapping, per-dimension aggregation and the overall
//! trust score. The pipeline itself never fails; every collaborator degrades
//! internally and the pass always yields a score.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use truststack_core::{
    ContentRecord, DetectedAttribute, Signal, SignalCatalog, SignalStatus, TrustScore,
    VerificationReport, REFERENCE_DIMENSIONS,
};
use truststack_scoring::{ScoringAggregator, SignalMapper};
use truststack_verify::VerificationManager;

/// Signal id the verification report feeds into
const VERIFICATION_SIGNAL_ID: &str = "ver_fact_accuracy";

/// Qualitative banding of the overall trust score
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Classification {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Classification {
    /// Band an overall score (0-100)
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 75.0 {
            Classification::Excellent
        } else if overall >= 50.0 {
            Classification::Good
        } else if overall >= 25.0 {
            Classification::Fair
        } else {
            Classification::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Excellent => "Excellent",
            Classification::Good => "Good",
            Classification::Fair => "Fair",
            Classification::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete scoring output for one content item
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScoredContent {
    pub content_id: String,
    pub trust: TrustScore,
    pub verification: VerificationReport,
    pub classification: Classification,
}

/// One-pass scoring orchestrator.
///
/// Shareable across concurrent passes: the catalog is immutable and the
/// collaborators are stateless per call.
pub struct ScoringPipeline {
    catalog: Arc<SignalCatalog>,
    mapper: SignalMapper,
    aggregator: ScoringAggregator,
    verifier: VerificationManager,
}

impl ScoringPipeline {
    pub fn new(catalog: Arc<SignalCatalog>, verifier: VerificationManager) -> Self {
        Self {
            mapper: SignalMapper::new(Arc::clone(&catalog)),
            aggregator: ScoringAggregator::new(Arc::clone(&catalog)),
            catalog,
            verifier,
        }
    }

    /// Score one content item.
    ///
    /// `attributes` come from the page detectors; `judged_signals` are
    /// canonical signals produced upstream by LLM evaluators (voice
    /// consistency, cultural fit) that bypass the attribute bridge.
    pub async fn score_content(
        &self,
        content: &ContentRecord,
        attributes: &[DetectedAttribute],
        judged_signals: &[Signal],
    ) -> ScoredContent {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, content_id = %content.content_id, "scoring pass started");

        let verification = self.verifier.verify(content).await;

        let mut signals = self.mapper.map(attributes);
        signals.extend_from_slice(judged_signals);
        signals.push(self.verification_signal(&verification));

        let dimension_scores = REFERENCE_DIMENSIONS
            .iter()
            .map(|name| self.aggregator.aggregate_dimension(name, &signals))
            .collect();

        let metadata = self.run_metadata(run_id, content, &verification);
        let trust = self.aggregator.aggregate_trust(dimension_scores, metadata);
        let classification = Classification::from_overall(trust.overall);

        info!(
            run_id = %run_id,
            content_id = %content.content_id,
            overall = trust.overall,
            classification = %classification,
            "scoring pass finished"
        );

        ScoredContent {
            content_id: content.content_id.clone(),
            trust,
            verification,
            classification,
        }
    }

    /// Fold the verification report into the `ver_fact_accuracy` signal
    fn verification_signal(&self, report: &VerificationReport) -> Signal {
        let weight = self
            .catalog
            .signal(VERIFICATION_SIGNAL_ID)
            .map(|def| def.weight)
            .unwrap_or(1.0);

        let evidence = report
            .issues
            .iter()
            .map(|issue| issue.evidence.clone())
            .collect();

        Signal::builder(VERIFICATION_SIGNAL_ID, "Verification")
            .label("Factual Accuracy")
            .value(report.score)
            .weight(weight)
            .evidence(evidence)
            .rationale("RAG-based verification")
            .confidence(evidence_confidence(report.meta.evidence_hits))
            .status(SignalStatus::Known)
            .build()
    }

    fn run_metadata(
        &self,
        run_id: Uuid,
        content: &ContentRecord,
        verification: &VerificationReport,
    ) -> HashMap<String, serde_json::Value> {
        let mut metadata = HashMap::new();
        metadata.insert("run_id".to_string(), serde_json::json!(run_id.to_string()));
        metadata.insert(
            "scored_at".to_string(),
            serde_json::json!(Utc::now().to_rfc3339()),
        );
        metadata.insert("url".to_string(), serde_json::json!(content.url));
        metadata.insert(
            "claims_verified".to_string(),
            serde_json::json!(verification.meta.total),
        );
        metadata.insert(
            "claims_contradicted".to_string(),
            serde_json::json!(verification.meta.contradicted),
        );
        metadata
    }
}

/// Confidence in the verification signal, by evidence volume.
/// A verdict reached on thin evidence deserves less weight downstream.
fn evidence_confidence(evidence_hits: usize) -> f64 {
    if evidence_hits == 0 {
        0.3
    } else if evidence_hits < 3 {
        0.7
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use truststack_core::{AttributeStatus, SearchHit, SourceType};
    use truststack_verify::{EvidenceRetriever, LlmBackend, LlmError, SearchError};

    struct StubJudge {
        replies: Mutex<VecDeque<String>>,
    }

    impl StubJudge {
        fn new(replies: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            })
        }
    }

    #[async_trait]
    impl LlmBackend for StubJudge {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyResponse)
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    struct StubRetriever {
        hits_per_claim: usize,
    }

    #[async_trait]
    impl EvidenceRetriever for StubRetriever {
        async fn retrieve(&self, _claim: &str) -> Result<Vec<SearchHit>, SearchError> {
            Ok((0..self.hits_per_claim)
                .map(|i| SearchHit {
                    title: format!("Result {i}"),
                    url: "https://example.com".to_string(),
                    snippet: "snippet".to_string(),
                })
                .collect())
        }
    }

    fn pipeline(replies: Vec<&str>, hits_per_claim: usize) -> ScoringPipeline {
        let catalog = Arc::new(SignalCatalog::reference());
        let verifier = VerificationManager::new(
            StubJudge::new(replies),
            Arc::new(StubRetriever { hits_per_claim }),
        );
        ScoringPipeline::new(catalog, verifier)
    }

    fn content() -> ContentRecord {
        ContentRecord {
            content_id: "c-1".to_string(),
            title: "About Acme".to_string(),
            body: "Acme was founded in 1998.".to_string(),
            url: "https://acme.example/about".to_string(),
            source_type: SourceType::ThirdParty,
            visual_verification: None,
        }
    }

    fn attribute(id: &str, dimension: &str, value: f64) -> DetectedAttribute {
        DetectedAttribute {
            attribute_id: id.to_string(),
            dimension: dimension.to_string(),
            label: "Detector Label".to_string(),
            value,
            confidence: 0.9,
            evidence: "matched selector".to_string(),
            status: AttributeStatus::Present,
        }
    }

    fn judged(id: &str, dimension: &str, value: f64) -> Signal {
        Signal::builder(id, dimension)
            .value(value)
            .weight(0.4)
            .confidence(0.9)
            .rationale("LLM evaluation")
            .build()
    }

    #[test]
    fn test_classification_bands() {
        assert_eq!(Classification::from_overall(80.0), Classification::Excellent);
        assert_eq!(Classification::from_overall(75.0), Classification::Excellent);
        assert_eq!(Classification::from_overall(74.9), Classification::Good);
        assert_eq!(Classification::from_overall(50.0), Classification::Good);
        assert_eq!(Classification::from_overall(25.0), Classification::Fair);
        assert_eq!(Classification::from_overall(10.0), Classification::Poor);
        assert_eq!(Classification::from_overall(0.0), Classification::Poor);
    }

    #[test]
    fn test_evidence_confidence_tiers() {
        assert_eq!(evidence_confidence(0), 0.3);
        assert_eq!(evidence_confidence(2), 0.7);
        assert_eq!(evidence_confidence(3), 1.0);
        assert_eq!(evidence_confidence(12), 1.0);
    }

    #[tokio::test]
    async fn test_pass_with_no_claims_yields_neutral_verification_signal() {
        let pipeline = pipeline(vec![r#"{"claims": []}"#], 0);

        let scored = pipeline.score_content(&content(), &[], &[]).await;

        assert_eq!(scored.verification.score, 0.5);
        let verification = &scored.trust.dimensions["verification"];
        let signal = verification
            .signals
            .iter()
            .find(|s| s.id == VERIFICATION_SIGNAL_ID)
            .unwrap();
        assert_eq!(signal.value, 0.5);
        assert_eq!(signal.weight, 0.4);
        assert_eq!(signal.confidence, 0.3);
        assert_eq!(signal.rationale, "RAG-based verification");
    }

    #[tokio::test]
    async fn test_pass_produces_all_reference_dimensions() {
        let pipeline = pipeline(vec![r#"{"claims": []}"#], 0);

        let scored = pipeline
            .score_content(
                &content(),
                &[attribute("author_brand_identity_verified", "Provenance", 0.8)],
                &[judged("coh_voice_consistency", "Coherence", 0.7)],
            )
            .await;

        for name in REFERENCE_DIMENSIONS {
            assert!(
                scored.trust.dimensions.contains_key(&name.to_lowercase()),
                "missing dimension {name}"
            );
        }
        assert!((0.0..=100.0).contains(&scored.trust.overall));
        assert_eq!(
            scored.classification,
            Classification::from_overall(scored.trust.overall)
        );
    }

    #[tokio::test]
    async fn test_judged_signals_bypass_the_attribute_bridge() {
        let pipeline = pipeline(vec![r#"{"claims": []}"#], 0);

        let scored = pipeline
            .score_content(&content(), &[], &[judged("res_cultural_fit", "Resonance", 0.9)])
            .await;

        let resonance = &scored.trust.dimensions["resonance"];
        assert_eq!(resonance.signals.len(), 1);
        assert_eq!(resonance.signals[0].id, "res_cultural_fit");
        assert!(resonance.value > 0.0);
    }

    #[tokio::test]
    async fn test_verification_signal_confidence_scales_with_evidence() {
        let extraction = r#"{"claims": ["Founded in 1998"]}"#;
        let judgment = r#"{"status": "SUPPORTED", "confidence": 0.9, "reasoning": "backed"}"#;
        let pipeline = pipeline(vec![extraction, judgment], 3);

        let scored = pipeline.score_content(&content(), &[], &[]).await;

        assert_eq!(scored.verification.meta.evidence_hits, 3);
        let signal = scored.trust.dimensions["verification"]
            .signals
            .iter()
            .find(|s| s.id == VERIFICATION_SIGNAL_ID)
            .cloned()
            .unwrap();
        assert_eq!(signal.confidence, 1.0);
        // One supported claim: 0.5 + 0.1
        assert!((signal.value - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_contradicted_claim_sinks_verification_dimension() {
        let extraction = r#"{"claims": ["Founded in 1998"]}"#;
        let contradicted =
            r#"{"status": "CONTRADICTED", "confidence": 0.9, "reasoning": "conflicts"}"#;
        let supported = r#"{"status": "SUPPORTED", "confidence": 0.9, "reasoning": "backed"}"#;

        let low = pipeline(vec![extraction, contradicted], 3)
            .score_content(&content(), &[], &[])
            .await;
        let high = pipeline(vec![extraction, supported], 3)
            .score_content(&content(), &[], &[])
            .await;

        assert!(low.verification.score < high.verification.score);
        let low_dim = &low.trust.dimensions["verification"];
        let high_dim = &high.trust.dimensions["verification"];
        assert!(low_dim.value < high_dim.value);
        // 0.3 verification score trips the knockout on ver_fact_accuracy
        assert!(low_dim.value <= 4.0);
    }

    #[tokio::test]
    async fn test_run_metadata_recorded() {
        let pipeline = pipeline(vec![r#"{"claims": []}"#], 0);
        let scored = pipeline.score_content(&content(), &[], &[]).await;

        let metadata = &scored.trust.metadata;
        assert!(metadata.contains_key("run_id"));
        assert!(metadata.contains_key("scored_at"));
        assert_eq!(metadata["url"], serde_json::json!("https://acme.example/about"));
        assert_eq!(metadata["claims_verified"], serde_json::json!(0));
    }
}
