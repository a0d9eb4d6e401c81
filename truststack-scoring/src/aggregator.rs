//! Scoring Aggregator
//!
//! Combines canonical signals into per-dimension scores and the overall
//! trust score. The dimension value is always the minimum of the raw
//! weighted score and every applicable cap:
//!
//! - Coverage cap: thin evidence limits how high a dimension can score
//! - Knockout cap (4.0): a critically low knockout signal
//! - Core-deficit cap (6.0): a required signal missing or critically low
//!
//! Signals in `unknown` status are excluded from every weighted sum but
//! still satisfy presence checks; they can neither raise nor sink a score.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use truststack_core::{
    DimensionScore, Signal, SignalCatalog, TrustScore, CORE_DEFICIT_CAP, CRITICAL_SIGNAL_VALUE,
    KNOCKOUT_CAP,
};

/// Aggregates signals into dimension and trust scores.
///
/// Stateless across calls: safe to share between concurrent scoring passes.
pub struct ScoringAggregator {
    catalog: Arc<SignalCatalog>,
}

impl ScoringAggregator {
    pub fn new(catalog: Arc<SignalCatalog>) -> Self {
        Self { catalog }
    }

    /// Aggregate the signals belonging to one dimension.
    ///
    /// A dimension with zero signals yields value 0, confidence 0,
    /// coverage 0 - a valid result, not an error.
    pub fn aggregate_dimension(&self, name: &str, signals: &[Signal]) -> DimensionScore {
        let dim_lower = name.to_lowercase();
        let dimension_signals: Vec<Signal> = signals
            .iter()
            .filter(|s| s.dimension.to_lowercase() == dim_lower)
            .cloned()
            .collect();

        let weight = self.catalog.dimension_weight(name);

        if dimension_signals.is_empty() {
            debug!(dimension = %name, "no signals for dimension");
            let mut empty = DimensionScore::empty(name);
            empty.weight = weight;
            return empty;
        }

        let mut total_weighted = 0.0;
        let mut total_weight = 0.0;
        let mut total_confidence = 0.0;

        for signal in dimension_signals.iter().filter(|s| s.status.scorable()) {
            let multiplier = self
                .catalog
                .signal(&signal.id)
                .map(|def| self.catalog.visibility_multiplier(def))
                .unwrap_or(truststack_core::DEFAULT_VISIBILITY_MULTIPLIER);

            let effective_weight = signal.weight * multiplier;
            total_weighted += signal.value.clamp(0.0, 1.0) * effective_weight;
            total_weight += effective_weight;
            total_confidence += signal.confidence * effective_weight;
        }

        let raw = if total_weight > 0.0 {
            (total_weighted / total_weight) * 10.0
        } else {
            0.0
        };

        let coverage = self.coverage_ratio(name, &dimension_signals);
        let knockout = self.knockout_cap(name, &dimension_signals);
        let core_deficit = self.core_deficit_cap(name, &dimension_signals);

        let value = raw
            .min(coverage_cap(coverage))
            .min(knockout.unwrap_or(10.0))
            .min(core_deficit.unwrap_or(10.0))
            .clamp(0.0, 10.0);

        let confidence = if total_weight > 0.0 {
            0.5 * (total_confidence / total_weight) + 0.5 * coverage
        } else {
            0.0
        };

        debug!(
            dimension = %name,
            raw,
            value,
            coverage,
            knockout = ?knockout,
            core_deficit = ?core_deficit,
            "aggregated dimension"
        );

        DimensionScore {
            name: name.to_string(),
            value,
            confidence,
            coverage,
            signals: dimension_signals,
            weight,
        }
    }

    /// Combine dimension scores into the overall trust score.
    ///
    /// Dimensions with no evidence at all (`value <= 0 && coverage <= 0`)
    /// are excluded from the weighted sums but still appear in the returned
    /// dimension map. "Evidence says untrustworthy" is not the same as
    /// "no evidence".
    pub fn aggregate_trust(
        &self,
        dimension_scores: Vec<DimensionScore>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> TrustScore {
        let mut total_score = 0.0;
        let mut total_weight = 0.0;
        let mut total_confidence = 0.0;
        let mut total_coverage = 0.0;

        let mut dimensions = HashMap::new();

        for dim in dimension_scores {
            if !dim.has_no_evidence() {
                total_score += dim.value * dim.weight;
                total_confidence += dim.confidence * dim.weight;
                total_coverage += dim.coverage * dim.weight;
                total_weight += dim.weight;
            }
            dimensions.insert(dim.name.to_lowercase(), dim);
        }

        let (overall, confidence, coverage) = if total_weight > 0.0 {
            (
                (total_score / total_weight) * 10.0,
                total_confidence / total_weight,
                total_coverage / total_weight,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        info!(overall, confidence, coverage, "aggregated trust score");

        TrustScore {
            overall,
            confidence,
            coverage,
            dimensions,
            metadata,
        }
    }

    /// Fraction of required signals present. Unknown-status signals count as
    /// present: absence of knowledge is not absence of the signal.
    fn coverage_ratio(&self, dimension: &str, signals: &[Signal]) -> f64 {
        let required = self.catalog.required_signal_ids(dimension);
        if required.is_empty() {
            return 1.0;
        }

        let present = required
            .iter()
            .filter(|id| signals.iter().any(|s| s.id == **id))
            .count();

        (present as f64 / required.len() as f64).min(1.0)
    }

    /// Cap 4.0 when any knockout signal is present with best observed value
    /// at or below the critical threshold.
    fn knockout_cap(&self, dimension: &str, signals: &[Signal]) -> Option<f64> {
        for id in self.catalog.knockout_signal_ids(dimension) {
            if let Some(best) = best_observed_value(signals, id) {
                if best <= CRITICAL_SIGNAL_VALUE {
                    return Some(KNOCKOUT_CAP);
                }
            }
        }
        None
    }

    /// Cap 6.0 when any required signal is missing entirely or present with
    /// best observed value at or below the critical threshold. Unknown-status
    /// signals satisfy presence and never trip the deficit.
    fn core_deficit_cap(&self, dimension: &str, signals: &[Signal]) -> Option<f64> {
        for id in self.catalog.required_signal_ids(dimension) {
            let any_present = signals.iter().any(|s| s.id == id);
            if !any_present {
                return Some(CORE_DEFICIT_CAP);
            }
            if let Some(best) = best_observed_value(signals, id) {
                if best <= CRITICAL_SIGNAL_VALUE {
                    return Some(CORE_DEFICIT_CAP);
                }
            }
        }
        None
    }
}

/// Best observed value for a signal id across scorable instances.
/// `None` when the id has no scorable instance (absent or all unknown).
fn best_observed_value(signals: &[Signal], id: &str) -> Option<f64> {
    signals
        .iter()
        .filter(|s| s.id == id && s.status.scorable())
        .map(|s| s.value)
        .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v))))
}

/// Three-tier coverage cap: thin evidence limits the ceiling
fn coverage_cap(coverage: f64) -> f64 {
    if coverage < 0.5 {
        6.0
    } else if coverage < 0.8 {
        8.0
    } else {
        10.0
    }
}

/// Qualitative confidence level derived from coverage and knockout state.
/// Informational only - never stored on the score objects.
pub fn confidence_label(coverage: f64, knockout_hit: bool) -> &'static str {
    if knockout_hit || coverage < 0.5 {
        "low"
    } else if coverage < 0.8 {
        "medium"
    } else {
        "high"
    }
}
