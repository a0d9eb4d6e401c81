//! Signal Mapper
//!
//! Bridges the attribute detectors and the signal-based aggregator: each
//! detected attribute either maps to a configured signal or is silently
//! dropped. The emitted signal always takes its dimension, weight and label
//! from the target signal's configuration, so an attribute detected while
//! scanning one dimension may legitimately score a different one.

use std::sync::Arc;
use tracing::{debug, warn};

use truststack_core::{
    AttributeStatus, DetectedAttribute, Signal, SignalCatalog, SignalStatus,
};

/// Maps detected attributes to catalog signals
pub struct SignalMapper {
    catalog: Arc<SignalCatalog>,
}

impl SignalMapper {
    pub fn new(catalog: Arc<SignalCatalog>) -> Self {
        Self { catalog }
    }

    /// Convert detected attributes into canonical signals.
    ///
    /// Attributes without a table entry, with a retired (`None`) entry, or
    /// whose target signal has no definition are skipped - configuration gaps
    /// are filters, never errors.
    pub fn map(&self, attributes: &[DetectedAttribute]) -> Vec<Signal> {
        let mut mapped = Vec::new();

        for attr in attributes {
            let signal_id = match self.catalog.attribute_target(&attr.attribute_id) {
                Some(id) => id,
                None => {
                    debug!(
                        attribute = %attr.attribute_id,
                        retired = self.catalog.knows_attribute(&attr.attribute_id),
                        "attribute has no signal target, skipping"
                    );
                    continue;
                }
            };

            let def = match self.catalog.signal(signal_id) {
                Some(def) => def,
                None => {
                    warn!(
                        signal = %signal_id,
                        attribute = %attr.attribute_id,
                        "mapped signal id not found in catalog"
                    );
                    continue;
                }
            };

            let label = if def.label.is_empty() {
                attr.label.as_str()
            } else {
                def.label.as_str()
            };

            let evidence = if attr.evidence.is_empty() {
                Vec::new()
            } else {
                vec![attr.evidence.clone()]
            };

            let signal = Signal::builder(signal_id, &def.dimension)
                .label(label)
                .value(normalize_value(attr.value))
                .weight(def.weight)
                .evidence(evidence)
                .rationale(&format!("Detected via {}", attr.attribute_id))
                .confidence(attr.confidence)
                .status(signal_status(attr.status))
                .build();

            mapped.push(signal);
        }

        mapped
    }
}

/// Normalize a free-scale attribute value onto [0, 1].
///
/// Heuristic detectors rate on 1-10; LLM detectors score on 0-1. Anything
/// above 1.0 is treated as the former.
fn normalize_value(raw: f64) -> f64 {
    let value = if raw > 1.0 { raw / 10.0 } else { raw };
    value.clamp(0.0, 1.0)
}

fn signal_status(status: AttributeStatus) -> SignalStatus {
    match status {
        AttributeStatus::Present => SignalStatus::Present,
        AttributeStatus::Absent => SignalStatus::Absent,
        AttributeStatus::Partial => SignalStatus::Known,
        AttributeStatus::Unknown => SignalStatus::Unknown,
    }
}
