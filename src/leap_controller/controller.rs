//! Entropy/repetition trigger and success-feedback driven promotion
//! (`spec.md` §4.F).

use std::collections::VecDeque;

use crate::config::Config;
use crate::leap_controller::leap_node::LeapNode;
use crate::model::{EdgeKind, Modality, NodeId, NodeKind, Relation};
use crate::storage::Graph;
use crate::telemetry::{Event, Telemetry};

/// Owns the rolling repetition window and the set of currently transient
/// LeapNodes awaiting feedback.
#[derive(Debug, Default)]
pub struct LeapController {
    recent_nodes: VecDeque<NodeId>,
    pub transient: Vec<LeapNode>,
}

impl LeapController {
    pub fn new() -> Self {
        Self::default()
    }

    /// `H >= leap_entropy_threshold` OR the same node has appeared
    /// `>= repetition_threshold` times in the last
    /// `context_window_for_repetition` generated tokens.
    pub fn should_trigger(&mut self, entropy: f32, latest: NodeId, cfg: &Config) -> bool {
        self.recent_nodes.push_back(latest);
        while self.recent_nodes.len() > cfg.context_window_for_repetition {
            self.recent_nodes.pop_front();
        }
        let repeats = self.recent_nodes.iter().filter(|&&n| n == latest).count();

        entropy >= cfg.leap_entropy_threshold || repeats >= cfg.repetition_threshold
    }

    /// Record generation feedback for `transient[idx]`. A leap succeeds when
    /// entropy dropped by >= 0.15 and coherence_gain >= 0.1. Promotes to a
    /// permanent node once `success_count >= leap_promotion_threshold`.
    pub fn feedback(&mut self, graph: &mut Graph, telemetry: &Telemetry, cfg: &Config, idx: usize, entropy_after: f32, coherence_gain: f32, now: i64) {
        let Some(leap) = self.transient.get_mut(idx) else { return };
        leap.usage_count += 1;
        let dropped = leap.entropy_before - entropy_after;
        leap.entropy_after = entropy_after;

        if dropped >= 0.15 && coherence_gain >= 0.1 {
            leap.success_count += 1;
        } else {
            leap.failure_count += 1;
        }

        if leap.success_count >= cfg.leap_promotion_threshold && !leap.is_permanent {
            promote(graph, telemetry, leap, now);
        }
    }
}

fn promote(graph: &mut Graph, telemetry: &Telemetry, leap: &mut LeapNode, now: i64) {
    let id = graph.create_or_touch(&leap.label, NodeKind::LeapPermanent, Modality::Abstract);
    if let Some(n) = graph.node_mut(id) {
        n.embedding = Some(leap.concept_vector.clone());
        n.last_touched = now;
    }
    for &member in &leap.members {
        graph.connect(id, member, Relation::LeapGeneralization, 0.6, EdgeKind::Leap);
    }
    leap.is_permanent = true;
    leap.permanent_node = Some(id);
    telemetry.emit(&Event::LeapPromote { edge: id.0, leap_score: leap.success_count as f32 });
}
