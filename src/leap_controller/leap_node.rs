//! LeapNode construction: union of the top clusters by activation·cohesion
//! (`spec.md` §3 LeapNode, §4.F).

use hashbrown::HashSet;

use crate::config::Config;
use crate::embeddings::EmbeddingBridge;
use crate::leap_controller::cluster::Cluster;
use crate::model::NodeId;

#[derive(Debug, Clone)]
pub struct LeapNode {
    pub members: Vec<NodeId>,
    pub concept_vector: Vec<f32>,
    pub activation: f32,
    pub cohesion: f32,
    pub usage_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub entropy_before: f32,
    pub entropy_after: f32,
    pub label: String,
    pub is_permanent: bool,
    /// Backing node once promoted; `None` while transient.
    pub permanent_node: Option<NodeId>,
}

/// Pick the top `cfg.max_clusters_per_leap` clusters by `activation *
/// cohesion`, union their members, and build the LeapNode. `now` stamps the
/// transient label.
pub fn construct(clusters: &[Cluster], embeddings: &EmbeddingBridge, cfg: &Config, now: i64) -> Option<LeapNode> {
    if clusters.is_empty() {
        return None;
    }

    let mut ranked: Vec<&Cluster> = clusters.iter().collect();
    ranked.sort_by(|a, b| {
        let sa = a.centroid_activation * a.cohesion;
        let sb = b.centroid_activation * b.cohesion;
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(cfg.max_clusters_per_leap.max(1));

    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for c in &ranked {
        for &m in &c.members {
            if seen.insert(m) {
                members.push(m);
            }
        }
    }
    if members.is_empty() {
        return None;
    }

    let dim = embeddings.dim();
    let mut concept_vector = vec![0.0f32; dim];
    for &m in &members {
        let e = embeddings.node(m);
        for (c, v) in concept_vector.iter_mut().zip(&e) {
            *c += v;
        }
    }
    for c in concept_vector.iter_mut() {
        *c /= members.len() as f32;
    }

    let total_weight: f32 = ranked.iter().map(|c| c.members.len() as f32).sum();
    let activation = ranked
        .iter()
        .map(|c| c.centroid_activation * c.members.len() as f32)
        .sum::<f32>()
        / total_weight.max(1.0);
    let cohesion = mean_pairwise_over_union(&ranked);

    let dominant = ranked[0].dominant;
    Some(LeapNode {
        members,
        concept_vector,
        activation,
        cohesion,
        usage_count: 0,
        success_count: 0,
        failure_count: 0,
        entropy_before: 0.0,
        entropy_after: 0.0,
        label: format!("{}_leap_{now}", dominant.0),
        is_permanent: false,
        permanent_node: None,
    })
}

fn mean_pairwise_over_union(ranked: &[&Cluster]) -> f32 {
    let n = ranked.len() as f32;
    if n == 0.0 {
        return 0.0;
    }
    ranked.iter().map(|c| c.cohesion).sum::<f32>() / n
}
