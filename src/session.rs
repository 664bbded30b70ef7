//! Learning-hook glue: owns the graph plus every stateful subsystem around
//! it and sequences ingest -> diffuse -> predict -> reinforce for `think`
//! (`spec.md` §4.H).

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::Path;

use hashbrown::HashMap;

use crate::config::Config;
use crate::embeddings::EmbeddingBridge;
use crate::error::Result;
use crate::ingest;
use crate::leap;
use crate::leap_controller::{self, LeapController};
use crate::model::{EdgeKind, NodeId};
use crate::predictive::{self, PredictiveSampler};
use crate::reasoning::{ContextField, ThoughtBank};
use crate::storage::{persist, Graph};
use crate::telemetry::{Event, Telemetry};

/// Result of a `think` call: either generated text, or a refusal to guess
/// when the top continuation candidates are too close to call (`spec.md`
/// §7 "Ambiguous query").
#[derive(Debug, Clone, PartialEq)]
pub enum ThinkOutcome {
    Generated(String),
    Abstain { reason: String },
}

/// Snapshot of graph size and edge-kind split, for monitoring (§4.H).
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub nodes: usize,
    pub exact_edges: usize,
    pub leap_edges: usize,
    pub transient_leap_nodes: usize,
}

/// Everything `think` needs: the graph, its auxiliary indexes, and the
/// runtime state of the predictive and LEAP-controller subsystems.
pub struct Session {
    pub graph: Graph,
    pub embeddings: EmbeddingBridge,
    pub bank: ThoughtBank,
    pub sampler: PredictiveSampler,
    pub controller: LeapController,
    pub telemetry: Telemetry,
    pub config: Config,
    rng: StdRng,
    /// Transient nudges from LeapController escalation, applied to the next
    /// `ContextField` and then decayed, rather than baked into node weight
    /// permanently (`spec.md` §4.F escalation is a temporary bias).
    pending_bias: HashMap<NodeId, f32>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let sampler = PredictiveSampler::new(&config);
        Self {
            graph: Graph::new(),
            embeddings: EmbeddingBridge::new(config.embedding_dim),
            bank: ThoughtBank::new(config.ctx_k),
            sampler,
            controller: LeapController::new(),
            telemetry: Telemetry::new(),
            rng: StdRng::seed_from_u64(0),
            pending_bias: HashMap::new(),
            config,
        }
    }

    pub fn with_seed(config: Config, seed: u64) -> Self {
        let mut s = Self::new(config);
        s.rng = StdRng::seed_from_u64(seed);
        s
    }

    /// Ingest `utf8`, attempt LEAP inference over any template gap it
    /// contains, diffuse context from the ingested tokens, generate a
    /// continuation, and reinforce what was traversed. Abstains instead of
    /// generating when the top continuation candidates are too close to
    /// call (`spec.md` §7 "Ambiguous query").
    pub fn think(&mut self, utf8: &str) -> ThinkOutcome {
        let handles = ingest::teach_text(&mut self.graph, utf8);
        if handles.is_empty() {
            return ThinkOutcome::Generated(String::new());
        }
        self.bank.record(&handles);

        if self.config.enable_leap_system {
            self.try_leap(utf8);
        }

        if self.config.reasoning_only_mode {
            return ThinkOutcome::Generated(String::new());
        }

        let mut field = ContextField::new();
        for &h in &handles {
            field.activate(h, 1.0);
        }
        self.apply_pending_bias(&mut field);
        field.diffuse(&self.graph, 3, 0.5);

        let start = *handles.last().unwrap();
        let candidates = predictive::score_candidates(&self.graph, &self.embeddings, &self.bank, &self.config, start, &handles);
        if predictive::is_ambiguous(&candidates, &self.config) {
            let reason = match self.graph.node(start) {
                Some(n) => format!("continuations after \"{}\" are too close to call", n.payload),
                None => "continuations are too close to call".to_string(),
            };
            self.telemetry.emit(&Event::Abstain { reason: reason.clone() });
            return ThinkOutcome::Abstain { reason };
        }

        let generation = self.sampler.generate(&self.graph, &self.embeddings, &self.bank, &self.config, start, &mut self.rng);

        if self.controller.should_trigger(generation.entropy_after, start, &self.config) {
            self.escalate(&field, generation.entropy_before);
        }

        if !self.controller.transient.is_empty() {
            let hits = generation.path.windows(2).filter(|w| self.bank.bonus(&[w[0]], w[1]) > 0.0).count();
            let coherence_gain = hits as f32 / generation.path.len().max(1) as f32;
            self.leap_feedback(generation.entropy_after, coherence_gain);
        }

        self.sampler.self_reinforce(&mut self.graph, &generation.path, &self.config);
        self.reinforce_embeddings(&generation.path);

        let text = generation
            .path
            .iter()
            .filter_map(|&n| self.graph.node(n).map(|n| n.payload.clone()))
            .collect::<Vec<_>>()
            .join(" ");
        ThinkOutcome::Generated(text)
    }

    /// Apply any pending LeapController bias into `field` and let it fade
    /// by half, rather than leaving it as a permanent nudge.
    fn apply_pending_bias(&mut self, field: &mut ContextField) {
        for (&id, &delta) in self.pending_bias.iter() {
            field.add(id, delta);
        }
        self.pending_bias.retain(|_, delta| {
            *delta *= 0.5;
            delta.abs() > 1e-3
        });
    }

    /// Hebbian-reinforce the embedding bridge along the generated path, so
    /// each traversed edge nudges its token and node embeddings toward the
    /// context that produced it (`spec.md` §4.D).
    fn reinforce_embeddings(&mut self, path: &[NodeId]) {
        for pair in path.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let Some(tau) = self.graph.node(next).map(|n| n.payload.clone()) else { continue };
            let (activation, is_zero) = self.embeddings.activation_vector(&[prev], &[1.0], None);
            if is_zero {
                continue;
            }
            self.embeddings.learn(&tau, 1.0, &[(prev, 1.0)], &activation, &self.config);
        }
    }

    /// Scan `utf8`'s tokens for a recognized `X CONNECTOR Y` template gap.
    /// If the gap already has a standing LEAP edge, a repeat of the same
    /// query is treated as a confirming outcome and reinforces it in place
    /// (`spec.md` §8 S3); otherwise run crowd aggregation and conflict
    /// arbitration to try to create one.
    fn try_leap(&mut self, utf8: &str) {
        let tokens = ingest::tokenize(utf8);
        let Some(gap) = leap::detect_gap(&self.graph, &tokens) else { return };
        let Some(connector_node) = self.graph.find_payload(gap.connector.canonical_str()) else { return };
        let relation = gap.connector.semantic_relation();

        if let Some(target) = gap.object {
            if let Some(existing) = self.graph.find_edge(gap.subject, target, relation) {
                if self.graph.edge(existing).map(|e| e.kind) == Some(EdgeKind::Leap) {
                    leap::record_outcome(&mut self.graph, &self.telemetry, &self.config, existing, true, 0.5);
                }
                return;
            }
        }

        if let Some(edge_id) = leap::try_create(&mut self.graph, &self.telemetry, &self.config, &gap, connector_node) {
            if let Some(edge) = self.graph.edge(edge_id) {
                let target = edge.b;
                leap::arbitrate(&mut self.graph, &self.telemetry, &self.config, gap.subject, relation, target);
            }
        } else {
            leap::fallback_leap(&mut self.graph, &self.telemetry, &self.config, &[gap.subject], 8);
        }
    }

    /// Entropy/repetition escalation: form clusters from the current field,
    /// build a transient LeapNode, and queue its bias as a temporary
    /// `ContextField` nudge rather than a permanent node-weight change.
    fn escalate(&mut self, field: &ContextField, entropy_before: f32) {
        let clusters = leap_controller::form_clusters(&self.graph, field, &self.config);
        let now = self.graph.nodes().last().map(|n| n.last_touched).unwrap_or(0);
        let Some(mut node) = leap_controller::construct(&clusters, &self.embeddings, &self.config, now) else { return };
        node.entropy_before = entropy_before;

        let bias = leap_controller::apply_bias(&self.graph, &node, &self.config);
        for (id, delta) in bias {
            *self.pending_bias.entry(id).or_insert(0.0) += delta;
        }
        self.controller.transient.push(node);
    }

    /// Apply feedback to the most recently pushed transient LeapNode.
    /// Called automatically from `think` once an escalation is in flight,
    /// using that turn's own entropy and a path-coherence proxy.
    pub fn leap_feedback(&mut self, entropy_after: f32, coherence_gain: f32) {
        if self.controller.transient.is_empty() {
            return;
        }
        let idx = self.controller.transient.len() - 1;
        let now = self.graph.nodes().last().map(|n| n.last_touched).unwrap_or(0);
        self.controller.feedback(&mut self.graph, &self.telemetry, &self.config, idx, entropy_after, coherence_gain, now);
    }

    pub fn stats(&self) -> Stats {
        let (exact, leap) = self
            .graph
            .edges()
            .iter()
            .fold((0usize, 0usize), |(e, l), edge| match edge.kind {
                EdgeKind::Exact => (e + 1, l),
                EdgeKind::Leap => (e, l + 1),
            });
        Stats {
            nodes: self.graph.node_count(),
            exact_edges: exact,
            leap_edges: leap,
            transient_leap_nodes: self.controller.transient.len(),
        }
    }

    /// One global decay tick across nodes, edges, and the predictive
    /// sampler's self-reinforced frequency ratios (§3 Decay).
    pub fn decay(&mut self, rate: f32) {
        self.graph.decay(rate);
    }

    /// Persist the graph and its embedding tables to `path` and
    /// `path.with_extension("emb")`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::save(&self.graph, &path)?;
        let emb_path = embeddings_path(path.as_ref());
        let mut file = std::fs::File::create(emb_path)?;
        let entries = self.graph.nodes().iter().filter_map(|n| {
            let v = self.embeddings.node(n.id);
            (v.iter().any(|&x| x != 0.0)).then(|| (n.id.0.to_string(), v))
        });
        persist::save_embeddings(&mut file, self.config.embedding_dim, entries)?;
        Ok(())
    }

    /// Load a graph (and its embedding tables, if present) from `path`.
    pub fn load(config: Config, path: impl AsRef<Path>) -> Result<Self> {
        let graph = persist::load(&path)?;
        let mut session = Self::new(config);
        session.graph = graph;

        let emb_path = embeddings_path(path.as_ref());
        if let Ok(mut file) = std::fs::File::open(emb_path) {
            let (dim, entries) = persist::load_embeddings(&mut file)?;
            if dim == session.config.embedding_dim {
                for (key, vec) in entries {
                    if let Ok(id) = key.parse::<u32>() {
                        session.embeddings.set_node(NodeId(id), vec);
                    }
                }
            }
        }
        Ok(session)
    }
}

fn embeddings_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".emb");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn think_ingests_and_returns_generated_text() {
        let mut s = Session::with_seed(Config::default(), 7);
        match s.think("dogs are mammals.") {
            ThinkOutcome::Generated(text) => assert!(!text.is_empty()),
            ThinkOutcome::Abstain { reason } => assert!(!reason.is_empty()),
        }
        assert!(s.stats().nodes >= 3);
    }

    #[test]
    fn repeated_ingest_of_same_sentence_does_not_explode_node_count() {
        let mut s = Session::with_seed(Config::default(), 1);
        s.think("dogs are mammals.");
        let after_first = s.stats().nodes;
        s.think("dogs are mammals.");
        assert_eq!(s.stats().nodes, after_first);
    }

    #[test]
    fn scenario_s1_crowd_leap_creation() {
        let mut s = Session::with_seed(Config::default(), 2);
        s.think("dogs are mammals.");
        s.think("cats are mammals.");
        s.think("wolves are mammals.");
        s.think("are foxes mammals.");

        let foxes = s.graph.find_payload("foxes").unwrap();
        let mammals = s.graph.find_payload("mammals").unwrap();
        let leap = s
            .graph
            .outgoing_edges(foxes)
            .find(|e| e.kind == EdgeKind::Leap && e.b == mammals);
        assert!(leap.is_some());
    }

    #[test]
    fn save_and_load_round_trip_preserves_graph_shape() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("synapse-session-test-{}.bin", std::process::id()));

        let mut s = Session::with_seed(Config::default(), 3);
        s.think("dogs are mammals.");
        s.save(&path).unwrap();

        let loaded = Session::load(Config::default(), &path).unwrap();
        assert_eq!(loaded.graph.node_count(), s.graph.node_count());
        assert_eq!(loaded.graph.edge_count(), s.graph.edge_count());

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(embeddings_path(&path));
    }
}
