//! Conflict arbitration: a fresh EXACT edge penalizes disagreeing LEAP
//! edges out of the same subject (`spec.md` §4.C).

use crate::config::Config;
use crate::model::{EdgeId, EdgeKind, NodeId, Relation};
use crate::storage::Graph;
use crate::telemetry::{Event, Telemetry};

/// Called after a new EXACT edge `subject -[relation]-> target` is recorded.
/// Every LEAP edge out of `subject` under the same relation whose target
/// disagrees loses `cfg.penalty`, unless its `leap_score` clears
/// `cfg.override_threshold`.
pub fn arbitrate(graph: &mut Graph, telemetry: &Telemetry, cfg: &Config, subject: NodeId, relation: Relation, target: NodeId) {
    let disagreeing: Vec<EdgeId> = graph
        .outgoing_edges(subject)
        .filter(|e| e.kind == EdgeKind::Leap && e.relation == relation && e.b != target && e.leap_score < cfg.override_threshold)
        .map(|e| e.id)
        .collect();

    for edge in disagreeing {
        graph.reinforce(edge, -cfg.penalty);
        telemetry.emit(&Event::ConflictDetected {
            subject: subject.0,
            connector: target.0,
            penalized_edge: edge.0,
            delta: -cfg.penalty,
        });
    }
}
