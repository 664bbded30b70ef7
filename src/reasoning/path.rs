//! Path scoring: `score = sum(log(1+w_i)) + kappa*n_exact - mu*n_leap +
//! sigma*(unique/|p|)` (`spec.md` §4.B). Higher is better; ties broken by
//! lower leap count, then higher min weight.

use hashbrown::HashSet;

use crate::model::{EdgeKind, NodeId};
use crate::storage::Graph;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathScore {
    pub score: f32,
    pub n_leap: usize,
    pub min_w: f32,
}

impl PathScore {
    /// Total order matching "higher score wins; ties broken by lower leap
    /// count, then higher min weight".
    pub fn better_than(&self, other: &PathScore) -> bool {
        if (self.score - other.score).abs() > 1e-6 {
            return self.score > other.score;
        }
        if self.n_leap != other.n_leap {
            return self.n_leap < other.n_leap;
        }
        self.min_w > other.min_w
    }
}

/// Score a sequence of node handles `path` by the weights of the edges
/// connecting consecutive nodes.
pub fn score_path(graph: &Graph, path: &[NodeId], kappa: f32, mu: f32, sigma: f32) -> PathScore {
    if path.len() < 2 {
        return PathScore { score: 0.0, n_leap: 0, min_w: 0.0 };
    }

    let mut score = 0.0f32;
    let mut n_exact = 0usize;
    let mut n_leap = 0usize;
    let mut min_w = f32::INFINITY;

    for window in path.windows(2) {
        let (a, b) = (window[0], window[1]);
        let edge = graph
            .outgoing_edges(a)
            .filter(|e| e.b == b && e.w > 0.0)
            .max_by(|x, y| x.w.partial_cmp(&y.w).unwrap_or(std::cmp::Ordering::Equal));

        let w = edge.map(|e| e.w).unwrap_or(0.0);
        score += (1.0 + w).ln();
        min_w = min_w.min(w);
        match edge.map(|e| e.kind) {
            Some(EdgeKind::Exact) => n_exact += 1,
            Some(EdgeKind::Leap) => n_leap += 1,
            None => {}
        }
    }

    let unique: HashSet<NodeId> = path.iter().copied().collect();
    score += kappa * n_exact as f32 - mu * n_leap as f32 + sigma * (unique.len() as f32 / path.len() as f32);

    PathScore {
        score,
        n_leap,
        min_w: if min_w.is_finite() { min_w } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Modality, NodeKind, Relation};

    #[test]
    fn exact_path_scores_higher_than_equal_weight_leap_path() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        let c = g.create_or_touch("c", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::Has, 0.5, EdgeKind::Exact);
        g.connect(a, c, Relation::Has, 0.5, EdgeKind::Leap);

        let exact_score = score_path(&g, &[a, b], 0.5, 0.7, 0.2);
        let leap_score = score_path(&g, &[a, c], 0.5, 0.7, 0.2);
        assert!(exact_score.better_than(&leap_score));
    }
}
