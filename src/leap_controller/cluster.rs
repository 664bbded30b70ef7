//! Transient cluster formation over currently-activated nodes (`spec.md` §4.F).

use crate::config::Config;
use crate::model::NodeId;
use crate::reasoning::{jaccard, ContextField};
use crate::storage::Graph;

#[derive(Debug, Clone)]
pub struct Cluster {
    pub members: Vec<NodeId>,
    pub centroid_activation: f32,
    pub cohesion: f32,
    pub novelty: f32,
    pub dominant: NodeId,
}

/// Greedy grouping: seed with the highest-activation unassigned node, pull
/// in any other unassigned node with jaccard similarity >= 0.3, repeat.
/// Discards clusters below `cfg.min_cluster_size`.
pub fn form_clusters(graph: &Graph, field: &ContextField, cfg: &Config) -> Vec<Cluster> {
    const SIMILARITY_JOIN: f32 = 0.3;

    let mut pool = field.active_above(cfg.cluster_min_activation);
    pool.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut assigned = hashbrown::HashSet::new();
    let mut clusters = Vec::new();

    for &(seed, seed_activation) in &pool {
        if assigned.contains(&seed) {
            continue;
        }
        let mut members = vec![seed];
        assigned.insert(seed);

        for &(candidate, _) in &pool {
            if assigned.contains(&candidate) {
                continue;
            }
            if jaccard(graph, seed, candidate) >= SIMILARITY_JOIN {
                members.push(candidate);
                assigned.insert(candidate);
            }
        }

        if members.len() < cfg.min_cluster_size {
            continue;
        }

        let cohesion = mean_pairwise_jaccard(graph, &members);
        let centroid_activation = members.iter().map(|&m| field.get(m)).sum::<f32>() / members.len() as f32;
        clusters.push(Cluster {
            members,
            centroid_activation,
            cohesion,
            novelty: seed_activation,
            dominant: seed,
        });
    }

    clusters
}

fn mean_pairwise_jaccard(graph: &Graph, members: &[NodeId]) -> f32 {
    if members.len() < 2 {
        return 0.0;
    }
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            sum += jaccard(graph, members[i], members[j]);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, Modality, NodeKind, Relation};

    #[test]
    fn forms_cluster_of_similar_nodes() {
        let mut g = Graph::new();
        let shared = g.create_or_touch("mammal", NodeKind::Concept, Modality::Text);
        let a = g.create_or_touch("dog", NodeKind::Instance, Modality::Text);
        let b = g.create_or_touch("cat", NodeKind::Instance, Modality::Text);
        let c = g.create_or_touch("wolf", NodeKind::Instance, Modality::Text);
        for n in [a, b, c] {
            g.connect(n, shared, Relation::IsA, 0.8, EdgeKind::Exact);
        }

        let mut field = ContextField::new();
        for n in [a, b, c] {
            field.activate(n, 0.5);
        }

        let cfg = Config::default();
        let clusters = form_clusters(&g, &field, &cfg);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 3);
    }

    #[test]
    fn small_groups_are_discarded() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let mut field = ContextField::new();
        field.activate(a, 0.5);
        let cfg = Config::default();
        assert!(form_clusters(&g, &field, &cfg).is_empty());
    }
}
