//! Claim verification verdicts and issue records

use serde::{Deserialize, Serialize};

/// Outcome of verifying one factual claim against retrieved evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Supported,
    Contradicted,
    #[default]
    Unverified,
}

impl VerdictStatus {
    /// Parse a status string from an LLM judgment payload.
    ///
    /// Anything outside the known set degrades to `Unverified` - the most
    /// conservative reading of a malformed judgment.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUPPORTED" => VerdictStatus::Supported,
            "CONTRADICTED" => VerdictStatus::Contradicted,
            _ => VerdictStatus::Unverified,
        }
    }
}

/// Verdict for a single claim; produced exactly once, immutable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// The claim text this verdict describes
    pub claim: String,

    pub status: VerdictStatus,

    /// Confidence in the verdict (0.0 - 1.0)
    pub confidence: f64,

    /// Why the claim was judged this way
    pub reasoning: String,

    /// Evidence context the judgment saw, if any
    pub evidence: Option<String>,

    /// Origin tag for non-text-derived verdicts (e.g. "visual_analysis")
    pub source: Option<String>,
}

impl Verdict {
    /// An `UNVERIFIED` verdict carrying a degradation reason
    pub fn unverified(claim: &str, confidence: f64, reasoning: &str) -> Self {
        Self {
            claim: claim.to_string(),
            status: VerdictStatus::Unverified,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.to_string(),
            evidence: None,
            source: None,
        }
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
}

/// An actionable issue derived from a non-supported verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue type tag consumed by downstream reporting
    pub kind: String,

    pub severity: Severity,

    /// Confidence carried over from the verdict
    pub confidence: f64,

    /// Offending claim text plus verdict reasoning
    pub evidence: String,

    /// Generated remediation suggestion
    pub suggestion: String,
}

/// Verdict tallies and retrieval stats for a verification pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationMeta {
    pub total: usize,
    pub supported: usize,
    pub contradicted: usize,
    pub unverified: usize,

    /// Total evidence snippets retrieved across all claims
    pub evidence_hits: usize,
}

/// Aggregated output of the verification manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Verification score (0.0 - 1.0)
    pub score: f64,

    pub issues: Vec<Issue>,

    pub meta: VerificationMeta,

    /// Individual verdicts, self-describing, collection order not guaranteed
    pub verdicts: Vec<Verdict>,
}

impl VerificationReport {
    /// Neutral report for content with nothing verifiable
    pub fn neutral() -> Self {
        Self {
            score: crate::NEUTRAL_VERIFICATION_SCORE,
            issues: Vec::new(),
            meta: VerificationMeta::default(),
            verdicts: Vec::new(),
        }
    }
}

/// One externally retrieved evidence snippet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
