//! Verification Manager
//!
//! Extracts candidate factual claims from content, verifies each claim
//! concurrently against externally retrieved evidence, and folds the
//! verdicts into a verification score plus actionable issues.
//!
//! Failure isolation: a failure verifying one claim degrades that single
//! claim to `UNVERIFIED` and never aborts the batch.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};

use truststack_core::{
    ContentRecord, Issue, SearchHit, Severity, Verdict, VerdictStatus, VerificationMeta,
    VerificationReport, MAX_CLAIMS_PER_ITEM,
};

use crate::judgment::{parse_claims, parse_verdict};
use crate::{EvidenceRetriever, LlmError, SharedBackend};

/// Bounded pool size for claim verification. Each task performs a blocking
/// search call followed by a blocking LLM call; the parallelism hides I/O
/// latency, nothing else.
const VERIFY_CONCURRENCY: usize = 3;

/// Confidence when evidence retrieval comes back empty: "no evidence found"
/// is itself an informative, deterministic outcome.
const NO_EVIDENCE_CONFIDENCE: f64 = 0.9;

/// Confidence for verdicts degraded by a task failure
const DEGRADED_CONFIDENCE: f64 = 0.5;

/// Confidence of a verdict synthesized from a visual verification badge
const VISUAL_VERDICT_CONFIDENCE: f64 = 0.95;

const CLAIM_EXTRACTION_SYSTEM: &str = r#"
You are a fact-checking assistant. Extract the key factual claims from the
provided content - specific, checkable assertions about the world (statistics,
dates, certifications, partnerships, product capabilities).

Rules:
1. Extract at most 5 claims
2. Each claim must be a single short sentence, self-contained and checkable
3. Skip opinions, marketing superlatives, and forward-looking statements
4. Respond with JSON: {"claims": ["claim 1", "claim 2"]}
"#;

const VERIFICATION_SYSTEM: &str = r#"
You are a fact-checking assistant. Given a claim and web search evidence,
classify the claim.

Rules:
1. status must be exactly one of SUPPORTED, CONTRADICTED, UNVERIFIED
2. SUPPORTED only when the evidence directly backs the claim
3. CONTRADICTED only when the evidence directly conflicts with the claim
4. UNVERIFIED when the evidence is insufficient or off-topic
5. Respond with JSON: {"status": "...", "confidence": 0.0, "reasoning": "..."}
"#;

/// Extra extraction rule for first-party content: the brand is the
/// authoritative source for its own catalog data.
const BRAND_OWNED_EXCLUSION: &str = "This content is brand-owned. Exclude \
first-party commercial assertions (prices, inventory, product specifications) \
from extraction; only extract claims about the outside world.";

/// Orchestrates claim extraction, evidence retrieval and judgment
pub struct VerificationManager {
    judge: SharedBackend,
    retriever: Arc<dyn EvidenceRetriever>,
}

impl VerificationManager {
    pub fn new(judge: SharedBackend, retriever: Arc<dyn EvidenceRetriever>) -> Self {
        Self { judge, retriever }
    }

    /// Verify a content item end to end.
    ///
    /// Returns a neutral report when nothing verifiable exists; never fails.
    pub async fn verify(&self, content: &ContentRecord) -> VerificationReport {
        let visual = self.visual_verdict(content);

        let claims = self.extract_claims(content).await;
        if claims.is_empty() && visual.is_none() {
            info!(content_id = %content.content_id, "no verifiable claims found");
            return VerificationReport::neutral();
        }

        let outcomes: Vec<(Verdict, usize)> = stream::iter(claims)
            .map(|claim| async move {
                match self.verify_claim(&claim).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(claim = %claim, error = %e, "claim verification failed");
                        (
                            Verdict::unverified(
                                &claim,
                                DEGRADED_CONFIDENCE,
                                &format!("Verification error: {e}"),
                            ),
                            0,
                        )
                    }
                }
            })
            .buffer_unordered(VERIFY_CONCURRENCY)
            .collect()
            .await;

        let mut evidence_hits = 0;
        let mut verdicts = Vec::with_capacity(outcomes.len() + 1);
        if let Some(v) = visual {
            verdicts.push(v);
        }
        for (verdict, hits) in outcomes {
            evidence_hits += hits;
            verdicts.push(verdict);
        }

        aggregate(verdicts, evidence_hits)
    }

    /// Synthesize a SUPPORTED verdict from a visual verification badge
    fn visual_verdict(&self, content: &ContentRecord) -> Option<Verdict> {
        let visual = content.visual_verification.as_ref()?;
        if !visual.verified {
            return None;
        }

        info!(
            content_id = %content.content_id,
            platform = %visual.platform,
            "visual verification badge found"
        );

        Some(Verdict {
            claim: format!("Account is verified on {}", visual.platform),
            status: VerdictStatus::Supported,
            confidence: VISUAL_VERDICT_CONFIDENCE,
            reasoning: format!(
                "Visual analysis confirmed verification badge: {}",
                visual.evidence
            ),
            evidence: None,
            source: Some("visual_analysis".to_string()),
        })
    }

    /// Extract up to 5 key factual claims from the content body.
    ///
    /// Extraction failure is not fatal: it yields an empty claim list.
    async fn extract_claims(&self, content: &ContentRecord) -> Vec<String> {
        let body: String = content.body.chars().take(4000).collect();

        let mut prompt = String::new();
        if content.is_brand_owned() {
            info!(
                content_id = %content.content_id,
                "brand-owned content, excluding first-party product data from claims"
            );
            prompt.push_str(BRAND_OWNED_EXCLUSION);
            prompt.push_str("\n\n");
        }
        prompt.push_str("Content:\n");
        prompt.push_str(&body);

        match self.judge.complete(CLAIM_EXTRACTION_SYSTEM, &prompt).await {
            Ok(reply) => {
                let mut claims = parse_claims(&reply);
                claims.truncate(MAX_CLAIMS_PER_ITEM);
                claims
            }
            Err(e) => {
                error!(content_id = %content.content_id, error = %e, "claim extraction failed");
                Vec::new()
            }
        }
    }

    /// Retrieve evidence for one claim and judge it.
    ///
    /// A retrieval failure is treated as empty evidence; empty evidence is a
    /// deterministic `UNVERIFIED` verdict, not a judgment call.
    async fn verify_claim(&self, claim: &str) -> Result<(Verdict, usize), LlmError> {
        let hits = match self.retriever.retrieve(claim).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(claim, error = %e, "evidence retrieval failed");
                Vec::new()
            }
        };

        if hits.is_empty() {
            return Ok((
                Verdict::unverified(claim, NO_EVIDENCE_CONFIDENCE, "No search results found."),
                0,
            ));
        }

        let context = evidence_context(&hits);
        let prompt = format!("Claim: {claim}\n\nEvidence:\n{context}");

        let reply = self.judge.complete(VERIFICATION_SYSTEM, &prompt).await?;
        Ok((parse_verdict(claim, &context, &reply), hits.len()))
    }
}

fn evidence_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("- [{}]({}): {}", hit.title, hit.url, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fold verdicts into the verification score and issue list
fn aggregate(verdicts: Vec<Verdict>, evidence_hits: usize) -> VerificationReport {
    let supported = count(&verdicts, VerdictStatus::Supported);
    let contradicted = count(&verdicts, VerdictStatus::Contradicted);
    let unverified = count(&verdicts, VerdictStatus::Unverified);

    let score = (0.5 + 0.1 * supported as f64 - 0.2 * contradicted as f64
        - 0.05 * unverified as f64)
        .clamp(0.0, 1.0);

    let issues = verdicts.iter().filter_map(issue_for).collect();

    VerificationReport {
        score,
        issues,
        meta: VerificationMeta {
            total: verdicts.len(),
            supported,
            contradicted,
            unverified,
            evidence_hits,
        },
        verdicts,
    }
}

fn count(verdicts: &[Verdict], status: VerdictStatus) -> usize {
    verdicts.iter().filter(|v| v.status == status).count()
}

fn issue_for(verdict: &Verdict) -> Option<Issue> {
    match verdict.status {
        VerdictStatus::Supported => None,
        VerdictStatus::Contradicted => Some(Issue {
            kind: "unverified_claims".to_string(),
            severity: Severity::High,
            confidence: verdict.confidence,
            evidence: format!(
                "Claim: '{}'\nVerdict: CONTRADICTED\n{}",
                verdict.claim, verdict.reasoning
            ),
            suggestion: format!("Remove or correct this claim: {}", verdict.reasoning),
        }),
        VerdictStatus::Unverified => Some(Issue {
            kind: "unverified_claims".to_string(),
            severity: Severity::Medium,
            confidence: 0.8,
            evidence: format!(
                "Claim: '{}'\nVerdict: UNVERIFIED\n{}",
                verdict.claim, verdict.reasoning
            ),
            suggestion: "Add a citation or source for this claim.".to_string(),
        }),
    }
}
