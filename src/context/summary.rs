//! Read-only snapshots of a context for consoles and exporters.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::event::CoherenceSample;

/// Direction of the coherence history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    /// Classify a window of samples by newest minus oldest.
    pub fn from_samples(samples: &[CoherenceSample]) -> Self {
        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return Self::Stable;
        };
        if samples.len() < 2 {
            return Self::Stable;
        }
        let diff = last.value - first.value;
        if diff > 0.05 {
            Self::Improving
        } else if diff < -0.05 {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Improving => write!(f, "improving"),
            Self::Declining => write!(f, "declining"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub nodes: usize,
    pub edges: usize,
    pub isolated_nodes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    pub coherence_trend: Trend,
    /// Significant events among the last five.
    pub significant_events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OntologicalHealth {
    pub active_tensions: usize,
    pub dialogues: usize,
    pub blind_spots_acknowledged: usize,
}

/// Structured state of a context at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSummary {
    pub name: String,
    pub created_at: u64,
    pub operator_id: Option<String>,
    pub graph_metrics: GraphMetrics,
    pub current_coherence: f64,
    /// Up to the last ten samples.
    pub coherence_history: Vec<CoherenceSample>,
    pub recent_activity: RecentActivity,
    pub ontological_health: OntologicalHealth,
    pub blind_spots: BTreeMap<String, String>,
    pub fair_care_enabled: bool,
}

/// Export metadata: fixed provenance plus per-context figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairCareMetadata {
    #[serde(flatten)]
    pub provenance: BTreeMap<String, String>,
    pub context_name: String,
    pub operator: Option<String>,
    pub entity_count: usize,
    pub relation_count: usize,
    pub coherence_final: f64,
    pub blind_spots_count: usize,
    pub dialogues_count: usize,
    pub created_at: u64,
}

impl fmt::Display for ContextSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "context: {}", self.name)?;
        if let Some(op) = &self.operator_id {
            writeln!(f, "  operator: {op}")?;
        }
        writeln!(
            f,
            "  nodes: {} (isolated {}), edges: {}",
            self.graph_metrics.nodes, self.graph_metrics.isolated_nodes, self.graph_metrics.edges
        )?;
        writeln!(
            f,
            "  coherence: {:.3} ({})",
            self.current_coherence, self.recent_activity.coherence_trend
        )?;
        writeln!(
            f,
            "  significant recent events: {}",
            self.recent_activity.significant_events
        )?;
        writeln!(
            f,
            "  tensions: {}, dialogues: {}, blind spots: {}",
            self.ontological_health.active_tensions,
            self.ontological_health.dialogues,
            self.ontological_health.blind_spots_acknowledged
        )?;
        for (key, desc) in &self.blind_spots {
            writeln!(f, "    {key}: {desc}")?;
        }
        write!(f, "  FAIR+CARE validation: {}", if self.fair_care_enabled { "on" } else { "off" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[f64]) -> Vec<CoherenceSample> {
        values
            .iter()
            .map(|&value| CoherenceSample { timestamp: 0, value })
            .collect()
    }

    #[test]
    fn fewer_than_two_samples_is_stable() {
        assert_eq!(Trend::from_samples(&[]), Trend::Stable);
        assert_eq!(Trend::from_samples(&samples(&[0.9])), Trend::Stable);
    }

    #[test]
    fn trend_compares_newest_with_oldest() {
        assert_eq!(Trend::from_samples(&samples(&[0.1, 0.9, 0.2])), Trend::Improving);
        assert_eq!(Trend::from_samples(&samples(&[0.5, 0.1, 0.4])), Trend::Declining);
        assert_eq!(Trend::from_samples(&samples(&[0.5, 0.0, 0.53])), Trend::Stable);
    }

    #[test]
    fn trend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Improving).unwrap(), "\"improving\"");
    }
}
