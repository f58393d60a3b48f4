//! Append-only logs of the graph context: events, tensions, dialogues and
//! coherence samples.

use std::fmt;

use serde::Serialize;

use super::entity::Attributes;

/// Events above this significance count as recent activity.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.3;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    EntityCreated,
    RelationEstablished,
    BlindSpotRegistered,
    EntityEnriched,
    EntityReturned,
    LifecycleChanged,
    TensionRecorded,
    DialogueRecorded,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EntityCreated => "entity_created",
            Self::RelationEstablished => "relation_established",
            Self::BlindSpotRegistered => "blind_spot_registered",
            Self::EntityEnriched => "entity_enriched",
            Self::EntityReturned => "entity_returned",
            Self::LifecycleChanged => "lifecycle_changed",
            Self::TensionRecorded => "tension_recorded",
            Self::DialogueRecorded => "dialogue_recorded",
        }
    }

    /// Base weight of this kind in the significance score.
    fn weight(self) -> f64 {
        match self {
            Self::EntityCreated | Self::EntityEnriched | Self::LifecycleChanged => 0.1,
            Self::RelationEstablished | Self::EntityReturned => 0.2,
            Self::DialogueRecorded => 0.3,
            Self::BlindSpotRegistered | Self::TensionRecorded => 0.4,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the context's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub coherence_before: f64,
    pub coherence_after: f64,
    pub intentions: Vec<String>,
    pub affected_entities: Vec<String>,
    pub attributes: Attributes,
    pub timestamp: u64,
}

impl Event {
    /// Significance in `[0, 1]`.
    ///
    /// Kind weight, plus twice the coherence shift, plus 0.1 per stated
    /// intention (at most three count).
    pub fn significance(&self) -> f64 {
        let shift = (self.coherence_after - self.coherence_before).abs() * 2.0;
        let intent = 0.1 * self.intentions.len().min(3) as f64;
        (self.kind.weight() + shift + intent).clamp(0.0, 1.0)
    }

    pub fn is_significant(&self) -> bool {
        self.significance() > SIGNIFICANCE_THRESHOLD
    }
}

/// A recorded contradiction or unresolved reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tension {
    pub kind: String,
    pub description: String,
    pub entities: Vec<String>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DialogueScore {
    pub overall: f64,
}

/// One Φ exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dialogue {
    pub prompt: String,
    pub response: String,
    pub intentions: Vec<String>,
    pub score: DialogueScore,
    pub timestamp: u64,
}

/// `(timestamp, value)` pair in the coherence history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoherenceSample {
    pub timestamp: u64,
    pub value: f64,
}
