//! Greedy and probabilistic graph traversal (`spec.md` §4.B).

use rand::Rng;

use crate::model::{EdgeKind, NodeId};
use crate::storage::Graph;

/// At each step, follow the highest-weight outgoing edge. When
/// `prefer_exact`, any EXACT edge beats any LEAP edge lexicographically
/// (kind compared before weight). Touches every visited node; stops at a
/// dead end or `max_steps`.
pub fn traverse(graph: &mut Graph, start: NodeId, max_steps: usize, prefer_exact: bool) -> Vec<NodeId> {
    let mut path = vec![start];
    let mut current = start;

    for _ in 0..max_steps {
        let best = graph
            .outgoing_edges(current)
            .filter(|e| e.w > 0.0)
            .max_by(|a, b| {
                if prefer_exact {
                    let kind_order = |k: EdgeKind| matches!(k, EdgeKind::Exact) as u8;
                    match kind_order(a.kind).cmp(&kind_order(b.kind)) {
                        std::cmp::Ordering::Equal => a.w.partial_cmp(&b.w).unwrap_or(std::cmp::Ordering::Equal),
                        other => other,
                    }
                } else {
                    a.w.partial_cmp(&b.w).unwrap_or(std::cmp::Ordering::Equal)
                }
            })
            .map(|e| (e.b, e.id));

        let Some((next, _)) = best else { break };
        if let Some(n) = graph.node_mut(next) {
            n.touch(chrono::Utc::now().timestamp());
        }
        path.push(next);
        current = next;
    }

    path
}

/// Sample the next hop proportional to `w^(1/T)`, optionally amplified by
/// `cross_modal_bonus`. Returns `None` at a dead end.
pub fn sample_next<R: Rng + ?Sized>(graph: &Graph, current: NodeId, temperature: f32, rng: &mut R) -> Option<NodeId> {
    let candidates: Vec<_> = graph.outgoing_edges(current).filter(|e| e.w > 0.0).collect();
    if candidates.is_empty() {
        return None;
    }

    let t = temperature.max(1e-3);
    let weights: Vec<f32> = candidates
        .iter()
        .map(|e| (e.w + e.cross_modal_bonus).max(1e-6).powf(1.0 / t))
        .collect();
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let pick = rng.random::<f32>() * total;
    let mut acc = 0.0f32;
    for (edge, w) in candidates.iter().zip(weights.iter()) {
        acc += w;
        if pick <= acc {
            return Some(edge.b);
        }
    }
    candidates.last().map(|e| e.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, Modality, NodeKind, Relation};

    #[test]
    fn prefer_exact_beats_higher_weight_leap() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        let c = g.create_or_touch("c", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::Has, 0.2, EdgeKind::Exact);
        g.connect(a, c, Relation::Has, 0.9, EdgeKind::Leap);

        let path = traverse(&mut g, a, 1, true);
        assert_eq!(path, vec![a, b]);
    }

    #[test]
    fn without_prefer_exact_highest_weight_wins() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        let c = g.create_or_touch("c", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::Has, 0.2, EdgeKind::Exact);
        g.connect(a, c, Relation::Has, 0.9, EdgeKind::Leap);

        let path = traverse(&mut g, a, 1, false);
        assert_eq!(path, vec![a, c]);
    }

    #[test]
    fn dead_end_stops_traversal() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let path = traverse(&mut g, a, 5, true);
        assert_eq!(path, vec![a]);
    }
}
