//! Jaccard similarity over out-neighbor sets. Used for cluster cohesion
//! and fallback LEAP scoring (`spec.md` §4.B, §4.C).

use hashbrown::HashSet;

use crate::model::NodeId;
use crate::storage::Graph;

/// `jaccard(a,b)`: 1 if `a == b`, 0 if either has no out-neighbors.
pub fn jaccard(graph: &Graph, a: NodeId, b: NodeId) -> f32 {
    if a == b {
        return 1.0;
    }
    let na: HashSet<NodeId> = graph.outgoing_edges(a).map(|e| e.b).collect();
    let nb: HashSet<NodeId> = graph.outgoing_edges(b).map(|e| e.b).collect();
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }
    let intersection = na.intersection(&nb).count();
    let union = na.union(&nb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, Modality, NodeKind, Relation};

    #[test]
    fn identical_node_is_similarity_one() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        assert_eq!(jaccard(&g, a, a), 1.0);
    }

    #[test]
    fn disjoint_neighbors_give_zero() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        assert_eq!(jaccard(&g, a, b), 0.0);
    }

    #[test]
    fn shared_neighbor_increases_similarity() {
        let mut g = Graph::new();
        let a = g.create_or_touch("dogs", NodeKind::Instance, Modality::Text);
        let b = g.create_or_touch("cats", NodeKind::Instance, Modality::Text);
        let mammals = g.create_or_touch("mammals", NodeKind::Concept, Modality::Text);
        g.connect(a, mammals, Relation::IsA, 0.5, EdgeKind::Leap);
        g.connect(b, mammals, Relation::IsA, 0.5, EdgeKind::Leap);
        assert_eq!(jaccard(&g, a, b), 1.0);
    }
}
