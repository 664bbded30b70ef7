//! Node/token embedding tables and the activation-vector <-> token-bias
//! coupling between them (`spec.md` §4.D).

use hashbrown::HashMap;

use crate::config::Config;
use crate::embeddings::vector::{cosine, normalize, scale_add};
use crate::model::NodeId;

/// Contribution of an active LeapNode to an activation vector, per
/// `spec.md` §4.D.
#[derive(Debug, Clone)]
pub struct LeapActivation {
    pub activation: f32,
    pub cohesion: f32,
    pub boost: f32,
    pub concept_vector: Vec<f32>,
}

/// Node and token embedding tables, unit-normalized on every write. Unknown
/// entries return the zero vector and contribute nothing.
#[derive(Debug, Clone)]
pub struct EmbeddingBridge {
    dim: usize,
    node_emb: HashMap<NodeId, Vec<f32>>,
    token_emb: HashMap<String, Vec<f32>>,
}

impl EmbeddingBridge {
    pub fn new(dim: usize) -> Self {
        Self { dim, node_emb: HashMap::new(), token_emb: HashMap::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn node(&self, id: NodeId) -> Vec<f32> {
        self.node_emb.get(&id).cloned().unwrap_or_else(|| vec![0.0; self.dim])
    }

    pub fn token(&self, token: &str) -> Vec<f32> {
        self.token_emb.get(token).cloned().unwrap_or_else(|| vec![0.0; self.dim])
    }

    pub fn set_node(&mut self, id: NodeId, mut v: Vec<f32>) {
        v.resize(self.dim, 0.0);
        normalize(&mut v);
        self.node_emb.insert(id, v);
    }

    pub fn set_token(&mut self, token: &str, mut v: Vec<f32>) {
        v.resize(self.dim, 0.0);
        normalize(&mut v);
        self.token_emb.insert(token.to_string(), v);
    }

    /// `v = sum(w_i * emb(node_i)) / total_weight`, with an optional LeapNode
    /// contribution folded in before normalization. Returns `(vector,
    /// is_zero)`; `is_zero` is true when accumulated weight < 1e-6.
    pub fn activation_vector(&self, handles: &[NodeId], weights: &[f32], leap: Option<&LeapActivation>) -> (Vec<f32>, bool) {
        let mut v = vec![0.0f32; self.dim];
        let mut total = 0.0f32;

        for (&h, &w) in handles.iter().zip(weights) {
            scale_add(&mut v, &self.node(h), w);
            total += w;
        }
        if let Some(leap) = leap {
            let boost = leap.activation * leap.cohesion * leap.boost;
            scale_add(&mut v, &leap.concept_vector, boost);
            total += boost.abs();
        }

        if total < 1e-6 {
            return (vec![0.0; self.dim], true);
        }
        for x in v.iter_mut() {
            *x /= total;
        }
        (v, false)
    }

    /// Cosine-similarity bias for each candidate token against `activation`:
    /// `bias = lambda * sim` when `sim > cfg.similarity_threshold`.
    pub fn token_bias(&self, candidates: &[String], activation: &[f32], cfg: &Config) -> Vec<(String, f32)> {
        candidates
            .iter()
            .filter_map(|tok| {
                let sim = cosine(activation, &self.token(tok));
                (sim > cfg.similarity_threshold).then(|| (tok.clone(), cfg.lambda_graph_bias * sim))
            })
            .collect()
    }

    /// Hebbian-style online update after a reward `r` for predicting token
    /// `tau` from `contributors` (node, weight) pairs and their combined
    /// `activation_vec`.
    pub fn learn(&mut self, tau: &str, r: f32, contributors: &[(NodeId, f32)], activation_vec: &[f32], cfg: &Config) {
        let alpha = cfg.learning_rate_embeddings;

        let mut token_v = self.token(tau);
        for (t, a) in token_v.iter_mut().zip(activation_vec) {
            *t = (1.0 - alpha) * *t + alpha * r * a;
        }
        normalize(&mut token_v);
        self.token_emb.insert(tau.to_string(), token_v.clone());

        for &(n, w) in contributors {
            if w <= 0.1 {
                continue;
            }
            let mut node_v = self.node(n);
            let step = alpha * w;
            for (nv, tv) in node_v.iter_mut().zip(&token_v) {
                *nv = (1.0 - step) * *nv + step * r * tv;
            }
            normalize(&mut node_v);
            self.node_emb.insert(n, node_v);
        }
    }
}
