//! Adaptive tuning, self-reinforcement, and anti-repetition glue around
//! beam/top-p generation (`spec.md` §4.E).

use std::collections::VecDeque;

use rand::Rng;

use crate::config::Config;
use crate::embeddings::EmbeddingBridge;
use crate::model::NodeId;
use crate::predictive::scoring::{entropy, score_candidates, softmax};
use crate::predictive::search::{beam_search, top_p_step};
use crate::reasoning::ThoughtBank;
use crate::storage::Graph;

/// Runtime-adapted sampler parameters and anti-repetition history. Separate
/// from `Config` because `alpha`/`beta` drift per generation while the rest
/// of the config stays fixed.
#[derive(Debug, Clone)]
pub struct PredictiveSampler {
    pub alpha: f32,
    pub beta: f32,
    recent: VecDeque<Vec<NodeId>>,
    window: usize,
}

pub struct Generation {
    pub path: Vec<NodeId>,
    pub entropy_before: f32,
    pub entropy_after: f32,
    /// True if anti-repetition escalated to the LeapController hand-off.
    pub escalate: bool,
}

impl PredictiveSampler {
    pub fn new(cfg: &Config) -> Self {
        Self { alpha: cfg.alpha, beta: cfg.beta, recent: VecDeque::new(), window: cfg.anti_repetition_window }
    }

    fn effective_cfg(&self, cfg: &Config) -> Config {
        let mut c = cfg.clone();
        c.alpha = self.alpha;
        c.beta = self.beta;
        c
    }

    /// Run beam search from `start`, then sampled continuation if the beam
    /// terminated early from a dead end, applying anti-repetition and
    /// adaptive tuning around the result.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        graph: &Graph,
        embeddings: &EmbeddingBridge,
        bank: &ThoughtBank,
        cfg: &Config,
        start: NodeId,
        rng: &mut R,
    ) -> Generation {
        let eff = self.effective_cfg(cfg);
        let entropy_before = candidate_entropy(graph, embeddings, bank, &eff, start, &[start]);

        let mut path = beam_search(graph, embeddings, bank, &eff, start);
        let mut escalate = false;

        if self.is_repeat(&path) {
            path = self.restart_from_tail(graph, embeddings, bank, &eff, &path, rng);
            if self.is_repeat(&path) {
                escalate = true;
            }
        }
        self.record(path.clone());

        let entropy_after = path
            .last()
            .map(|&n| candidate_entropy(graph, embeddings, bank, &eff, n, &path))
            .unwrap_or(entropy_before);

        self.adapt(entropy_after, !escalate);

        Generation { path, entropy_before, entropy_after, escalate }
    }

    fn restart_from_tail<R: Rng + ?Sized>(&self, graph: &Graph, embeddings: &EmbeddingBridge, bank: &ThoughtBank, cfg: &Config, prior: &[NodeId], rng: &mut R) -> Vec<NodeId> {
        let Some(&tail) = prior.last() else { return prior.to_vec() };
        let mut path = vec![tail];
        for _ in 0..cfg.max_hops {
            let Some(next) = top_p_step(graph, embeddings, bank, cfg, *path.last().unwrap(), &path, rng) else { break };
            path.push(next);
            if crate::predictive::search::sequence_terminator_reached(graph, &path) {
                break;
            }
        }
        path
    }

    /// True if `path` duplicates one of the last `window` generations.
    fn is_repeat(&self, path: &[NodeId]) -> bool {
        self.recent.iter().any(|prev| prev == path)
    }

    fn record(&mut self, path: Vec<NodeId>) {
        self.recent.push_back(path);
        while self.recent.len() > self.window {
            self.recent.pop_front();
        }
    }

    /// `H<0.5` -> explore more (beta -= 0.2); `H>1.5` -> exploit more
    /// (beta += 0.2), clamped [1,15]. `alpha += 0.01` on success else
    /// `-0.01`, clamped [0.5, 0.9].
    fn adapt(&mut self, h: f32, success: bool) {
        if h < 0.5 {
            self.beta -= 0.2;
        } else if h > 1.5 {
            self.beta += 0.2;
        }
        self.beta = self.beta.clamp(1.0, 15.0);
        self.alpha = (self.alpha + if success { 0.01 } else { -0.01 }).clamp(0.5, 0.9);
    }

    /// `freq_ratio <- (1-eta)*freq_ratio + eta/total_nodes` for every edge
    /// traversed in `path`, applied once the path is fully generated.
    pub fn self_reinforce(&self, graph: &mut Graph, path: &[NodeId], cfg: &Config) {
        let total = graph.node_count().max(1) as f32;
        for window in path.windows(2) {
            let (a, b) = (window[0], window[1]);
            let id = graph.outgoing_edges(a).find(|e| e.b == b).map(|e| e.id);
            if let Some(id) = id {
                if let Some(e) = graph.edge_mut(id) {
                    e.freq_ratio = (1.0 - cfg.self_reinforce_eta) * e.freq_ratio + cfg.self_reinforce_eta / total;
                }
            }
        }
    }
}

fn candidate_entropy(graph: &Graph, embeddings: &EmbeddingBridge, bank: &ThoughtBank, cfg: &Config, node: NodeId, ctx: &[NodeId]) -> f32 {
    let candidates = score_candidates(graph, embeddings, bank, cfg, node, ctx);
    if candidates.is_empty() {
        return 0.0;
    }
    let mut scores: Vec<f32> = candidates.iter().map(|c| c.score).collect();
    softmax(&mut scores);
    entropy(&scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeKind, Modality, NodeKind, Relation};
    use rand::SeedableRng;

    #[test]
    fn adapt_decreases_beta_on_low_entropy() {
        let cfg = Config::default();
        let mut sampler = PredictiveSampler::new(&cfg);
        let before = sampler.beta;
        sampler.adapt(0.1, true);
        assert!(sampler.beta < before);
    }

    #[test]
    fn adapt_increases_alpha_on_success() {
        let cfg = Config::default();
        let mut sampler = PredictiveSampler::new(&cfg);
        let before = sampler.alpha;
        sampler.adapt(1.0, true);
        assert!(sampler.alpha > before);
    }

    #[test]
    fn self_reinforce_updates_freq_ratio() {
        let mut g = Graph::new();
        let a = g.create_or_touch("a", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("b.", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::TemporalNext, 0.5, EdgeKind::Exact);
        let cfg = Config::default();
        let sampler = PredictiveSampler::new(&cfg);
        sampler.self_reinforce(&mut g, &[a, b], &cfg);
        let edge = g.find_edge(a, b, Relation::TemporalNext).unwrap();
        assert!(g.edge(edge).unwrap().freq_ratio > 0.0);
    }

    #[test]
    fn generate_terminates_on_punctuation() {
        let mut g = Graph::new();
        let a = g.create_or_touch("the", NodeKind::Concept, Modality::Text);
        let b = g.create_or_touch("end.", NodeKind::Concept, Modality::Text);
        g.connect(a, b, Relation::TemporalNext, 0.8, EdgeKind::Exact);
        let embeddings = EmbeddingBridge::new(4);
        let bank = ThoughtBank::new(2);
        let cfg = Config::default();
        let mut sampler = PredictiveSampler::new(&cfg);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let result = sampler.generate(&g, &embeddings, &bank, &cfg, a, &mut rng);
        assert_eq!(result.path.last(), Some(&b));
    }
}
