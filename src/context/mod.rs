//! Graph context: the mutable world a LOGOS-κ program acts on.
//!
//! Entities live in a node table keyed by name, relations in an edge table
//! keyed by the ordered `(source, target)` pair. Every mutation appends an
//! [`Event`] recording coherence before and after, so the context's history
//! is a complete account of how it came to be. Nothing is ever removed.
//!
//! Coherence is derived on demand: one minus the fraction of isolated nodes
//! and a tension penalty, clamped to `[0, 1]`. Reading it through
//! [`Context::coherence`] also appends a sample to the coherence history;
//! [`Context::measure_coherence`] is the side-effect-free half.

pub mod entity;
pub mod event;
pub mod summary;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::axioms::Axioms;
use crate::error::LimitError;
use crate::value::Value;

pub use entity::{Attributes, Entity, HabeasRecord, Relation, edge_id};
pub use event::{CoherenceSample, Dialogue, DialogueScore, Event, EventKind, Tension};
pub use summary::{ContextSummary, FairCareMetadata, Trend};

use entity::{STATUS_RETURNED, take_intentions};
use summary::{GraphMetrics, OntologicalHealth, RecentActivity};

/// Canonical operator entities: glyph, name, meaning.
pub const OPERATOR_ENTITIES: &[(&str, &str, &str)] = &[
    ("Α", "Alpha", "collapse"),
    ("Λ", "Lambda", "connection"),
    ("Σ", "Sigma", "synthesis"),
    ("Ω", "Omega", "return"),
    ("∇", "Nabla", "enrichment"),
    ("Φ", "Phi", "dialogue"),
];

/// Default relation type.
pub const DEFAULT_RELATION: &str = "Λ";

/// Coherence samples considered by the trend.
const TREND_WINDOW: usize = 5;

/// Coherence samples included in a summary.
const SUMMARY_HISTORY: usize = 10;

/// Tensions at which the penalty saturates.
const TENSION_SATURATION: f64 = 10.0;

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// The graph context.
#[derive(Debug)]
pub struct Context {
    name: String,
    created_at: u64,
    nodes: HashMap<String, Entity>,
    edges: BTreeMap<(String, String), Relation>,
    events: Vec<Event>,
    tensions: Vec<Tension>,
    dialogues: Vec<Dialogue>,
    blind_spots: BTreeMap<String, String>,
    coherence_history: Vec<CoherenceSample>,
    habeas: Vec<HabeasRecord>,
    fair_care_enabled: bool,
    operator_id: Option<String>,
    axioms: Axioms,
}

impl Context {
    /// Create a context, register the required blind spots and the six
    /// canonical operator entities.
    ///
    /// Fails only when the population ceiling is below six.
    pub fn new(name: impl Into<String>, axioms: Axioms) -> Result<Self, LimitError> {
        let mut ctx = Self::bare(name.into(), axioms);

        let required = ctx.axioms.required_blind_spots().clone();
        for (key, description) in required {
            ctx.register_blind_spot(&key, &description);
        }

        for (glyph, name, meaning) in OPERATOR_ENTITIES {
            let attrs = Attributes::from([
                ("type".to_string(), Value::str("ontological_operator")),
                ("name".to_string(), Value::str(*name)),
                ("meaning".to_string(), Value::str(*meaning)),
                ("system".to_string(), Value::Bool(true)),
            ]);
            ctx.add_entity(glyph, attrs)?;
        }

        tracing::info!(
            context = %ctx.name,
            nodes = ctx.nodes.len(),
            blind_spots = ctx.blind_spots.len(),
            "context created"
        );
        Ok(ctx)
    }

    fn bare(name: String, axioms: Axioms) -> Self {
        Self {
            name,
            created_at: now_secs(),
            nodes: HashMap::new(),
            edges: BTreeMap::new(),
            events: Vec::new(),
            tensions: Vec::new(),
            dialogues: Vec::new(),
            blind_spots: BTreeMap::new(),
            coherence_history: Vec::new(),
            habeas: Vec::new(),
            fair_care_enabled: false,
            operator_id: None,
            axioms,
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Create or update an entity, returning its name.
    ///
    /// Checks the population ceiling against the current count plus one
    /// before touching anything. An existing entity keeps its creation time
    /// and lifecycle status; caller attributes are merged over the rest.
    pub fn add_entity(&mut self, name: &str, mut attrs: Attributes) -> Result<String, LimitError> {
        self.axioms.check_entity_count(self.nodes.len() + 1)?;

        let intentions = take_intentions(&mut attrs);
        let now = now_secs();
        self.habeas.push(HabeasRecord {
            subject: name.to_string(),
            right_type: "to_exist".to_string(),
            granted_by: self.operator_id.clone().unwrap_or_else(|| "system".to_string()),
            granted_at: now,
            context: self.name.clone(),
        });

        let before = self.coherence();
        let mut event_attrs = attrs.clone();
        event_attrs.insert("name".to_string(), Value::str(name));
        self.nodes
            .entry(name.to_string())
            .or_insert_with(|| Entity::new(name, now))
            .merge(attrs);
        let after = self.coherence();

        self.push_event(
            EventKind::EntityCreated,
            before,
            after,
            intentions,
            vec![name.to_string()],
            event_attrs,
        );
        tracing::debug!(entity = name, nodes = self.nodes.len(), "entity added");
        Ok(name.to_string())
    }

    /// Fail unless every missing entity among `names` fits under the
    /// population ceiling. Repeated names count once; existing ones not at all.
    pub fn ensure_room<'a, I>(&self, names: I) -> Result<(), LimitError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let missing: HashSet<&str> = names
            .into_iter()
            .filter(|name| !self.nodes.contains_key(*name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        self.axioms.check_entity_count(self.nodes.len() + missing.len())
    }

    /// Connect two entities, creating missing endpoints. Returns the edge id.
    ///
    /// One edge per ordered pair: a later relation between the same pair
    /// replaces the earlier one, whatever its type. When the endpoints do not
    /// both fit under the population ceiling, neither is created.
    pub fn add_relation(
        &mut self,
        source: &str,
        target: &str,
        kind: &str,
        mut attrs: Attributes,
    ) -> Result<String, LimitError> {
        self.ensure_room([source, target])?;
        if !self.nodes.contains_key(source) {
            self.add_entity(source, Attributes::new())?;
        }
        if !self.nodes.contains_key(target) {
            self.add_entity(target, Attributes::new())?;
        }

        let intentions = take_intentions(&mut attrs);
        let before = self.coherence();
        let id = edge_id(source, target, kind);
        let relation = Relation {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            kind: kind.to_string(),
            intentions: intentions.clone(),
            context: self.name.clone(),
            attributes: attrs,
            created_at: now_secs(),
        };
        if let Some(old) = self
            .edges
            .insert((source.to_string(), target.to_string()), relation)
        {
            tracing::debug!(replaced = %old.id, edge = %id, "relation overwritten");
        }
        let after = self.coherence();

        let event_attrs = Attributes::from([
            ("edge_id".to_string(), Value::str(&id)),
            ("type".to_string(), Value::str(kind)),
        ]);
        self.push_event(
            EventKind::RelationEstablished,
            before,
            after,
            intentions,
            vec![source.to_string(), target.to_string()],
            event_attrs,
        );
        tracing::debug!(edge = %id, edges = self.edges.len(), "relation established");
        Ok(id)
    }

    /// Record a deliberately unresolved concept. Always appends an event.
    pub fn register_blind_spot(&mut self, key: &str, description: &str) {
        let before = self.coherence();
        self.blind_spots
            .insert(key.to_string(), description.to_string());
        let after = self.coherence();

        let attrs = Attributes::from([
            ("key".to_string(), Value::str(key)),
            ("description".to_string(), Value::str(description)),
        ]);
        self.push_event(
            EventKind::BlindSpotRegistered,
            before,
            after,
            vec![format!("acknowledged: {key}")],
            vec![],
            attrs,
        );
    }

    /// Log a tension. Each one lowers coherence until the penalty saturates.
    pub fn record_tension(&mut self, kind: &str, description: &str, entities: Vec<String>) {
        let before = self.coherence();
        self.tensions.push(Tension {
            kind: kind.to_string(),
            description: description.to_string(),
            entities: entities.clone(),
            timestamp: now_secs(),
        });
        let after = self.coherence();

        let attrs = Attributes::from([
            ("kind".to_string(), Value::str(kind)),
            ("description".to_string(), Value::str(description)),
        ]);
        self.push_event(EventKind::TensionRecorded, before, after, vec![], entities, attrs);
        tracing::debug!(kind, tensions = self.tensions.len(), "tension recorded");
    }

    /// Archive a Φ exchange, scored by the current coherence. Returns the score.
    pub fn record_dialogue(&mut self, prompt: &str, response: &str, intentions: Vec<String>) -> f64 {
        let before = self.coherence();
        self.dialogues.push(Dialogue {
            prompt: prompt.to_string(),
            response: response.to_string(),
            intentions: intentions.clone(),
            score: DialogueScore { overall: before },
            timestamp: now_secs(),
        });
        let after = self.coherence();

        let attrs = Attributes::from([("prompt".to_string(), Value::str(prompt))]);
        self.push_event(EventKind::DialogueRecorded, before, after, intentions, vec![], attrs);
        before
    }

    /// Change an entity's lifecycle status. Returns `false` if it does not exist.
    pub fn set_lifecycle(&mut self, name: &str, status: &str, intentions: Vec<String>) -> bool {
        if !self.nodes.contains_key(name) {
            return false;
        }
        let before = self.coherence();
        if let Some(entity) = self.nodes.get_mut(name) {
            entity.lifecycle_status = status.to_string();
        }
        let after = self.coherence();

        let kind = if status == STATUS_RETURNED {
            EventKind::EntityReturned
        } else {
            EventKind::LifecycleChanged
        };
        let attrs = Attributes::from([("status".to_string(), Value::str(status))]);
        self.push_event(kind, before, after, intentions, vec![name.to_string()], attrs);
        true
    }

    /// Merge attributes into an entity, creating it if needed.
    pub fn enrich(&mut self, name: &str, mut attrs: Attributes) -> Result<String, LimitError> {
        if !self.nodes.contains_key(name) {
            self.add_entity(name, Attributes::new())?;
        }

        let intentions = take_intentions(&mut attrs);
        let before = self.coherence();
        let keys: Vec<Value> = attrs.keys().map(Value::str).collect();
        if let Some(entity) = self.nodes.get_mut(name) {
            entity.merge(attrs);
        }
        let after = self.coherence();

        let event_attrs = Attributes::from([("keys".to_string(), Value::List(keys))]);
        self.push_event(
            EventKind::EntityEnriched,
            before,
            after,
            intentions,
            vec![name.to_string()],
            event_attrs,
        );
        Ok(name.to_string())
    }

    pub fn enable_fair_care_validation(&mut self) {
        self.fair_care_enabled = true;
    }

    /// Set the operator identity recorded on grants and exports.
    pub fn set_operator(&mut self, operator_id: impl Into<String>) {
        self.operator_id = Some(operator_id.into());
    }

    fn push_event(
        &mut self,
        kind: EventKind,
        coherence_before: f64,
        coherence_after: f64,
        intentions: Vec<String>,
        affected_entities: Vec<String>,
        attributes: Attributes,
    ) {
        self.events.push(Event {
            kind,
            coherence_before,
            coherence_after,
            intentions,
            affected_entities,
            attributes,
            timestamp: now_secs(),
        });
    }

    // -----------------------------------------------------------------------
    // Coherence
    // -----------------------------------------------------------------------

    /// Current coherence without recording a sample.
    pub fn measure_coherence(&self) -> f64 {
        if self.nodes.is_empty() {
            return 1.0;
        }
        let isolated = self.isolated_count() as f64 / self.nodes.len().max(1) as f64;
        let tension = (self.tensions.len() as f64 / TENSION_SATURATION).min(1.0);
        (1.0 - (isolated + tension)).clamp(0.0, 1.0)
    }

    /// Current coherence, appended to the history.
    ///
    /// An empty graph is fully coherent and leaves no sample.
    pub fn coherence(&mut self) -> f64 {
        if self.nodes.is_empty() {
            return 1.0;
        }
        let value = self.measure_coherence();
        self.coherence_history.push(CoherenceSample {
            timestamp: now_secs(),
            value,
        });
        value
    }

    /// Direction of the last few coherence samples.
    pub fn coherence_trend(&self) -> Trend {
        let start = self.coherence_history.len().saturating_sub(TREND_WINDOW);
        Trend::from_samples(&self.coherence_history[start..])
    }

    fn isolated_count(&self) -> usize {
        let connected: HashSet<&str> = self
            .edges
            .keys()
            .flat_map(|(s, t)| [s.as_str(), t.as_str()])
            .collect();
        self.nodes
            .keys()
            .filter(|name| !connected.contains(name.as_str()))
            .count()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// The edge from `source` to `target`, if any.
    pub fn relation(&self, source: &str, target: &str) -> Option<&Relation> {
        self.edges.get(&(source.to_string(), target.to_string()))
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.edges.values()
    }

    /// In-degree plus out-degree. A self-loop counts twice.
    pub fn degree(&self, name: &str) -> usize {
        self.edges
            .keys()
            .map(|(s, t)| usize::from(s == name) + usize::from(t == name))
            .sum()
    }

    /// Entities adjacent to `name` in either direction, sorted.
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .edges
            .keys()
            .filter_map(|(s, t)| {
                if s == name {
                    Some(t.as_str())
                } else if t == name {
                    Some(s.as_str())
                } else {
                    None
                }
            })
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn tensions(&self) -> &[Tension] {
        &self.tensions
    }

    pub fn dialogues(&self) -> &[Dialogue] {
        &self.dialogues
    }

    pub fn blind_spots(&self) -> &BTreeMap<String, String> {
        &self.blind_spots
    }

    pub fn coherence_history(&self) -> &[CoherenceSample] {
        &self.coherence_history
    }

    pub fn habeas_records(&self) -> &[HabeasRecord] {
        &self.habeas
    }

    pub fn operator_id(&self) -> Option<&str> {
        self.operator_id.as_deref()
    }

    pub fn fair_care_enabled(&self) -> bool {
        self.fair_care_enabled
    }

    pub fn axioms(&self) -> &Axioms {
        &self.axioms
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Snapshot of the context. Records a coherence sample.
    pub fn summary(&mut self) -> ContextSummary {
        let current_coherence = self.coherence();
        let start = self.events.len().saturating_sub(TREND_WINDOW);
        let significant_events = self.events[start..]
            .iter()
            .filter(|e| e.is_significant())
            .count();
        let history_start = self.coherence_history.len().saturating_sub(SUMMARY_HISTORY);

        ContextSummary {
            name: self.name.clone(),
            created_at: self.created_at,
            operator_id: self.operator_id.clone(),
            graph_metrics: GraphMetrics {
                nodes: self.nodes.len(),
                edges: self.edges.len(),
                isolated_nodes: self.isolated_count(),
            },
            current_coherence,
            coherence_history: self.coherence_history[history_start..].to_vec(),
            recent_activity: RecentActivity {
                coherence_trend: self.coherence_trend(),
                significant_events,
            },
            ontological_health: OntologicalHealth {
                active_tensions: self.tensions.len(),
                dialogues: self.dialogues.len(),
                blind_spots_acknowledged: self.blind_spots.len(),
            },
            blind_spots: self.blind_spots.clone(),
            fair_care_enabled: self.fair_care_enabled,
        }
    }

    /// Provenance defaults plus this context's figures. Records a coherence sample.
    pub fn fair_care_metadata(&mut self) -> FairCareMetadata {
        FairCareMetadata {
            provenance: self.axioms.default_fair_care_metadata(),
            context_name: self.name.clone(),
            operator: self.operator_id.clone(),
            entity_count: self.nodes.len(),
            relation_count: self.edges.len(),
            coherence_final: self.coherence(),
            blind_spots_count: self.blind_spots.len(),
            dialogues_count: self.dialogues.len(),
            created_at: self.created_at,
        }
    }
}
