//! EXACT-chain search: BFS restricted to EXACT edges, the preferred
//! reasoning path when a query names two recognized terms (`spec.md` §4.B).

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::model::{EdgeKind, NodeId};
use crate::storage::Graph;

pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Shortest handle sequence from `start` to `target` using only EXACT
/// edges, or an empty vec if none exists within `max_depth` hops.
pub fn exact_chain_search(graph: &Graph, start: NodeId, target: NodeId, max_depth: usize) -> Vec<NodeId> {
    if start == target {
        return vec![start];
    }

    let mut visited = HashMap::new();
    visited.insert(start, start);
    let mut queue = VecDeque::new();
    queue.push_back((start, 0usize));

    while let Some((node, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for edge in graph.outgoing_edges(node) {
            if edge.kind != EdgeKind::Exact || edge.w <= 0.0 {
                continue;
            }
            if visited.contains_key(&edge.b) {
                continue;
            }
            visited.insert(edge.b, node);
            if edge.b == target {
                return reconstruct(&visited, start, target);
            }
            queue.push_back((edge.b, depth + 1));
        }
    }

    Vec::new()
}

fn reconstruct(visited: &HashMap<NodeId, NodeId>, start: NodeId, target: NodeId) -> Vec<NodeId> {
    let mut path = vec![target];
    let mut cur = target;
    while cur != start {
        cur = visited[&cur];
        path.push(cur);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, Modality, NodeKind, Relation};

    #[test]
    fn finds_shortest_exact_path() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        let c = g.create_or_touch("c", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::Has, 0.5, EdgeKind::Exact);
        g.connect(b, c, Relation::Has, 0.5, EdgeKind::Exact);

        let path = exact_chain_search(&g, a, c, DEFAULT_MAX_DEPTH);
        assert_eq!(path, vec![a, b, c]);
    }

    #[test]
    fn ignores_leap_edges() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::IsA, 0.5, EdgeKind::Leap);

        assert!(exact_chain_search(&g, a, b, DEFAULT_MAX_DEPTH).is_empty());
    }

    #[test]
    fn no_path_returns_empty() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        assert!(exact_chain_search(&g, a, b, DEFAULT_MAX_DEPTH).is_empty());
    }
}
