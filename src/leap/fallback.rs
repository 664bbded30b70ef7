//! Fallback LEAP creation when no template gap is detected (`spec.md` §4.C).

use crate::config::Config;
use crate::model::{EdgeId, EdgeKind, NodeId, Relation};
use crate::reasoning::{jaccard, ContextField};
use crate::storage::Graph;
use crate::telemetry::Telemetry;
use crate::telemetry::Event;

/// Diffuse the context field from `query_nodes`, take the `top_k` activated
/// nodes, and create a LEAP edge for any (query-node, activated-node) pair
/// scoring above `cfg.leap_threshold` and not already EXACT-connected.
pub fn fallback_leap(
    graph: &mut Graph,
    telemetry: &Telemetry,
    cfg: &Config,
    query_nodes: &[NodeId],
    top_k: usize,
) -> Vec<EdgeId> {
    let mut field = ContextField::new();
    for &n in query_nodes {
        field.activate(n, 1.0);
    }
    field.diffuse(graph, 3, 0.5);

    let activated = field.top_k(top_k);
    let mut created = Vec::new();

    for &a in query_nodes {
        for &(b, _) in &activated {
            if a == b {
                continue;
            }
            if graph.find_edge(a, b, Relation::CrossModal).is_some() {
                continue;
            }
            let already_exact = graph
                .outgoing_edges(a)
                .any(|e| e.b == b && e.kind == EdgeKind::Exact);
            if already_exact {
                continue;
            }

            let score = jaccard(graph, a, b) * (field.get(a) + field.get(b));
            if score > cfg.leap_threshold {
                let id = graph.connect(a, b, Relation::CoOccurs, score.min(0.8), EdgeKind::Leap);
                if let Some(e) = graph.edge_mut(id) {
                    e.leap_score = score;
                }
                telemetry.emit(&Event::LeapCreate { subject: a.0, target: b.0, support: score, diversity: 0 });
                created.push(id);
            }
        }
    }

    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Modality, NodeKind};

    #[test]
    fn creates_leap_when_score_exceeds_threshold() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        let shared = g.create_or_touch("shared", NodeKind::Concept, Modality::Text);
        g.connect(a, shared, Relation::Has, 0.9, EdgeKind::Exact);
        g.connect(b, shared, Relation::Has, 0.9, EdgeKind::Exact);

        let cfg = Config::default();
        let telemetry = Telemetry::new();
        let created = fallback_leap(&mut g, &telemetry, &cfg, &[a, b], 10);
        assert!(!created.is_empty());
    }

    #[test]
    fn skips_pair_already_exact() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::Has, 0.9, EdgeKind::Exact);

        let cfg = Config::default();
        let telemetry = Telemetry::new();
        let created = fallback_leap(&mut g, &telemetry, &cfg, &[a, b], 10);
        assert!(created.is_empty());
    }
}
