//! Per-node activation field, diffused along weighted edges to bias
//! traversal and cluster formation (`spec.md` §3 ContextField, §4.B).

use crate::model::NodeId;
use crate::storage::Graph;

/// Dense, non-negative activation potential, one entry per node. Grown
/// lazily as new nodes are activated; entries default to zero.
#[derive(Debug, Clone, Default)]
pub struct ContextField {
    potentials: Vec<f32>,
}

impl ContextField {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_len(&mut self, len: usize) {
        if self.potentials.len() < len {
            self.potentials.resize(len, 0.0);
        }
    }

    pub fn get(&self, id: NodeId) -> f32 {
        self.potentials.get(id.0 as usize).copied().unwrap_or(0.0)
    }

    /// Set the activation potential at `id` directly.
    pub fn activate(&mut self, id: NodeId, x: f32) {
        self.ensure_len(id.0 as usize + 1);
        self.potentials[id.0 as usize] = x;
    }

    pub fn add(&mut self, id: NodeId, delta: f32) {
        self.ensure_len(id.0 as usize + 1);
        self.potentials[id.0 as usize] += delta;
    }

    pub fn len(&self) -> usize {
        self.potentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.potentials.is_empty()
    }

    /// Run `steps` diffusion iterations across every edge in `graph`. Each
    /// step: for every edge `(a->b, w)`, `flow = w*(F[a]-F[b])` (halved if
    /// cross-modal), then `F[b] += tau*flow`, `F[a] -= tau*flow`; finally
    /// the whole field decays ×0.95.
    pub fn diffuse(&mut self, graph: &Graph, steps: usize, tau: f32) {
        self.ensure_len(graph.node_count());
        for _ in 0..steps {
            let mut delta = vec![0.0f32; self.potentials.len()];
            for edge in graph.edges() {
                if edge.w <= 0.0 {
                    continue;
                }
                let a = edge.a.0 as usize;
                let b = edge.b.0 as usize;
                if a >= self.potentials.len() || b >= self.potentials.len() {
                    continue;
                }
                let mut flow = edge.w * (self.potentials[a] - self.potentials[b]);
                if edge.cross_modal {
                    flow *= 0.5;
                }
                delta[b] += tau * flow;
                delta[a] -= tau * flow;
            }
            for (p, d) in self.potentials.iter_mut().zip(delta.iter()) {
                *p = (*p + d).max(0.0);
            }
            for p in self.potentials.iter_mut() {
                *p *= 0.95;
            }
        }
    }

    /// The `k` highest-activation nodes, descending.
    pub fn top_k(&self, k: usize) -> Vec<(NodeId, f32)> {
        let mut entries: Vec<(NodeId, f32)> = self
            .potentials
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > 0.0)
            .map(|(i, &v)| (NodeId(i as u32), v))
            .collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries.truncate(k);
        entries
    }

    /// Nodes above `threshold`, used by cluster formation (§4.F).
    pub fn active_above(&self, threshold: f32) -> Vec<(NodeId, f32)> {
        self.potentials
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > threshold)
            .map(|(i, &v)| (NodeId(i as u32), v))
            .collect()
    }
}

/// Whether the edge crosses modalities, for diffusion attenuation.
pub fn is_cross_modal_edge(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    match (graph.node(a), graph.node(b)) {
        (Some(na), Some(nb)) => na.modality != nb.modality,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, Modality, NodeKind, Relation};

    #[test]
    fn diffuse_moves_activation_toward_neighbor() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::Has, 0.9, EdgeKind::Exact);

        let mut field = ContextField::new();
        field.activate(a, 1.0);
        field.diffuse(&g, 1, 0.5);

        assert!(field.get(b) > 0.0);
        assert!(field.get(a) < 1.0);
    }

    #[test]
    fn decay_shrinks_field_over_steps_with_no_activation() {
        let g = Graph::new();
        let mut field = ContextField::new();
        field.activate(NodeId(0), 1.0);
        field.diffuse(&g, 5, 0.5);
        assert!(field.get(NodeId(0)) < 1.0);
    }

    #[test]
    fn top_k_orders_descending() {
        let mut field = ContextField::new();
        field.activate(NodeId(0), 0.2);
        field.activate(NodeId(1), 0.9);
        field.activate(NodeId(2), 0.5);
        let top = field.top_k(2);
        assert_eq!(top[0].0, NodeId(1));
        assert_eq!(top[1].0, NodeId(2));
    }
}
