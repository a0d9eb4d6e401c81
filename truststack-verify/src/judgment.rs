//! Strict parsing of LLM judgment payloads
//!
//! Judgment replies are parsed then validated; every failure mode collapses
//! into the `UNVERIFIED` degradation path explicitly, with the failure
//! reason preserved for observability. Nothing here raises.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;

use truststack_core::{Verdict, VerdictStatus};

/// Raw shape of a verification judgment reply
#[derive(Debug, Deserialize)]
struct RawJudgment {
    status: Option<String>,
    confidence: Option<f64>,
    reasoning: Option<String>,
}

/// Raw shape of a claim extraction reply
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    claims: Vec<String>,
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("static regex"))
}

/// Strip a markdown code fence if the model wrapped its JSON in one
fn strip_fences(reply: &str) -> &str {
    fence_re()
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(reply)
        .trim()
}

/// Parse a claim extraction reply into claim texts.
///
/// A malformed reply yields an empty list; extraction simply found nothing.
pub fn parse_claims(reply: &str) -> Vec<String> {
    match serde_json::from_str::<RawClaims>(strip_fences(reply)) {
        Ok(raw) => raw
            .claims
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        Err(e) => {
            debug!(error = %e, "claim extraction reply was not valid JSON");
            Vec::new()
        }
    }
}

/// Parse a verification judgment reply into a verdict for `claim`.
///
/// Missing or invalid `status`, or an unparseable payload, degrades to
/// `UNVERIFIED` with the parse failure recorded as the reasoning.
pub fn parse_verdict(claim: &str, evidence: &str, reply: &str) -> Verdict {
    let raw: RawJudgment = match serde_json::from_str(strip_fences(reply)) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(claim, error = %e, "malformed judgment payload");
            return Verdict::unverified(claim, 0.5, &format!("Malformed judgment payload: {e}"));
        }
    };

    let status = raw
        .status
        .as_deref()
        .map(VerdictStatus::parse)
        .unwrap_or(VerdictStatus::Unverified);

    Verdict {
        claim: claim.to_string(),
        status,
        confidence: raw.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
        reasoning: raw.reasoning.unwrap_or_default(),
        evidence: Some(evidence.to_string()),
        source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_claims() {
        let reply = r#"{"claims": ["Founded in 1998", " ", "Ships to 40 countries"]}"#;
        let claims = parse_claims(reply);
        assert_eq!(claims, vec!["Founded in 1998", "Ships to 40 countries"]);
    }

    #[test]
    fn test_parse_claims_strips_fences() {
        let reply = "```json\n{\"claims\": [\"Founded in 1998\"]}\n```";
        assert_eq!(parse_claims(reply), vec!["Founded in 1998"]);
    }

    #[test]
    fn test_parse_claims_malformed_yields_empty() {
        assert!(parse_claims("I could not find any claims.").is_empty());
    }

    #[test]
    fn test_parse_verdict_valid() {
        let reply = r#"{"status": "supported", "confidence": 0.85, "reasoning": "Matches press release"}"#;
        let verdict = parse_verdict("Founded in 1998", "- snippet", reply);
        assert_eq!(verdict.status, VerdictStatus::Supported);
        assert_eq!(verdict.confidence, 0.85);
        assert_eq!(verdict.evidence.as_deref(), Some("- snippet"));
    }

    #[test]
    fn test_parse_verdict_invalid_status_degrades() {
        let reply = r#"{"status": "LIKELY", "confidence": 0.9}"#;
        let verdict = parse_verdict("claim", "", reply);
        assert_eq!(verdict.status, VerdictStatus::Unverified);
    }

    #[test]
    fn test_parse_verdict_missing_status_degrades() {
        let reply = r#"{"confidence": 0.9, "reasoning": "shrug"}"#;
        let verdict = parse_verdict("claim", "", reply);
        assert_eq!(verdict.status, VerdictStatus::Unverified);
        assert_eq!(verdict.reasoning, "shrug");
    }

    #[test]
    fn test_parse_verdict_garbage_degrades_with_reason() {
        let verdict = parse_verdict("claim", "", "SUPPORTED, definitely");
        assert_eq!(verdict.status, VerdictStatus::Unverified);
        assert_eq!(verdict.confidence, 0.5);
        assert!(verdict.reasoning.starts_with("Malformed judgment payload"));
    }

    #[test]
    fn test_parse_verdict_clamps_confidence() {
        let reply = r#"{"status": "CONTRADICTED", "confidence": 7.0}"#;
        let verdict = parse_verdict("claim", "", reply);
        assert_eq!(verdict.confidence, 1.0);
    }
}
