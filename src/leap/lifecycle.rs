//! LEAP reinforcement, promotion, and pruning (`spec.md` §4.C).

use crate::config::Config;
use crate::model::EdgeId;
use crate::model::EdgeKind;
use crate::storage::Graph;
use crate::telemetry::{Event, Telemetry};

/// Record the outcome of a reasoning path that traversed `edge`. Promotes to
/// EXACT or prunes as thresholds are crossed.
pub fn record_outcome(graph: &mut Graph, telemetry: &Telemetry, cfg: &Config, edge: EdgeId, success: bool, reward: f32) {
    let Some(e) = graph.edge_mut(edge) else { return };
    if e.kind != EdgeKind::Leap {
        return;
    }

    if success {
        e.successes += 1;
    } else {
        e.failures += 1;
    }
    graph.reinforce(edge, if success { reward } else { -reward });

    maybe_promote(graph, telemetry, cfg, edge);
    maybe_prune(graph, telemetry, edge);
}

fn maybe_promote(graph: &mut Graph, telemetry: &Telemetry, cfg: &Config, edge: EdgeId) {
    let Some(e) = graph.edge(edge) else { return };
    if e.kind == EdgeKind::Leap && e.w_core > cfg.promote_threshold && e.successes >= cfg.min_successes {
        let leap_score = e.leap_score;
        graph.promote_to_exact(edge);
        telemetry.emit(&Event::LeapPromote { edge: edge.0, leap_score });
    }
}

fn maybe_prune(graph: &mut Graph, telemetry: &Telemetry, edge: EdgeId) {
    let Some(e) = graph.edge(edge) else { return };
    if e.kind == EdgeKind::Leap && e.prunable() {
        let w = e.w;
        graph.prune(edge);
        telemetry.emit(&Event::LeapDecay { edge: edge.0, w });
    }
}
