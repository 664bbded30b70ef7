//! Bias field injection from an active LeapNode (`spec.md` §4.F).

use hashbrown::HashMap;

use crate::config::Config;
use crate::leap_controller::leap_node::LeapNode;
use crate::model::{EdgeKind, NodeId};
use crate::storage::Graph;

/// For each member and its immediate EXACT neighbors, add
/// `lambda_leap * (activation*cohesion)` to the bias field; halved again at
/// second-degree neighbors.
pub fn apply_bias(graph: &Graph, leap: &LeapNode, cfg: &Config) -> HashMap<NodeId, f32> {
    let base = cfg.lambda_leap * leap.activation * leap.cohesion;
    let mut bias: HashMap<NodeId, f32> = HashMap::new();

    for &m in &leap.members {
        *bias.entry(m).or_insert(0.0) += base;
    }

    let first_degree: Vec<NodeId> = leap
        .members
        .iter()
        .flat_map(|&m| graph.outgoing_edges(m).filter(|e| e.kind == EdgeKind::Exact).map(|e| e.b))
        .collect();
    for &n in &first_degree {
        *bias.entry(n).or_insert(0.0) += base;
    }

    for &n in &first_degree {
        for edge in graph.outgoing_edges(n).filter(|e| e.kind == EdgeKind::Exact) {
            *bias.entry(edge.b).or_insert(0.0) += base * 0.5;
        }
    }

    bias
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Modality, NodeKind, Relation};

    #[test]
    fn members_and_neighbors_get_biased() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::Has, 0.5, EdgeKind::Exact);

        let leap = LeapNode {
            members: vec![a],
            concept_vector: vec![],
            activation: 1.0,
            cohesion: 1.0,
            usage_count: 0,
            success_count: 0,
            failure_count: 0,
            entropy_before: 0.0,
            entropy_after: 0.0,
            label: "a_leap_1".into(),
            is_permanent: false,
            permanent_node: None,
        };
        let cfg = Config::default();
        let bias = apply_bias(&g, &leap, &cfg);
        assert!(bias.get(&a).copied().unwrap_or(0.0) > 0.0);
        assert!(bias.get(&b).copied().unwrap_or(0.0) > 0.0);
    }
}
