//! Candidate scoring and softmax for the predictive sampler (`spec.md` §4.E).

use crate::config::Config;
use crate::embeddings::{cosine, EmbeddingBridge};
use crate::model::{EdgeId, NodeId};
use crate::reasoning::ThoughtBank;
use crate::storage::Graph;

/// One scored continuation candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub edge: EdgeId,
    pub node: NodeId,
    pub score: f32,
}

/// Score every outgoing edge of `current` as a continuation candidate.
/// `ctx_window` is the recent node history used both for the embedding
/// context mean and the n-gram continuation bonus. Candidates whose token
/// embedding sits above `cfg.similarity_threshold` of the context
/// activation get an extra `token_bias` nudge (`spec.md` §4.D).
pub fn score_candidates(graph: &Graph, embeddings: &EmbeddingBridge, bank: &ThoughtBank, cfg: &Config, current: NodeId, ctx_window: &[NodeId]) -> Vec<Candidate> {
    let ctx_emb = context_mean(embeddings, ctx_window);
    let edges: Vec<_> = graph.outgoing_edges(current).filter(|e| e.w > 0.0).collect();
    let tokens: Vec<String> = edges.iter().filter_map(|e| graph.node(e.b)).map(|n| n.payload.clone()).collect();
    let biases = embeddings.token_bias(&tokens, &ctx_emb, cfg);

    edges
        .into_iter()
        .map(|e| {
            let freq_term = cfg.alpha * (e.freq_ratio + cfg.epsilon);
            let sim_term = (1.0 - cfg.alpha) * cosine(&ctx_emb, &embeddings.node(e.b));
            let rel_term = cfg.gamma * e.relation.score_bias();
            let mut score = cfg.beta * (freq_term + sim_term) + rel_term;

            if bank.bonus(ctx_window, e.b) > 0.0 {
                score += cfg.ngram_bonus;
            }
            if let Some(token) = graph.node(e.b).map(|n| &n.payload) {
                if let Some((_, bias)) = biases.iter().find(|(t, _)| t == token) {
                    score += bias;
                }
            }

            Candidate { edge: e.id, node: e.b, score }
        })
        .collect()
}

/// True when the top two candidates' scores differ by less than
/// `cfg.abstain_margin` — an ambiguous query a reasoning step should not
/// guess its way through (`spec.md` §7 "Ambiguous query"). Never ambiguous
/// with fewer than two candidates.
pub fn is_ambiguous(candidates: &[Candidate], cfg: &Config) -> bool {
    if candidates.len() < 2 {
        return false;
    }
    let mut scores: Vec<f32> = candidates.iter().map(|c| c.score).collect();
    scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    scores[0] - scores[1] < cfg.abstain_margin
}

fn context_mean(embeddings: &EmbeddingBridge, ctx_window: &[NodeId]) -> Vec<f32> {
    if ctx_window.is_empty() {
        return vec![0.0; embeddings.dim()];
    }
    let mut sum = vec![0.0f32; embeddings.dim()];
    for &n in ctx_window {
        let e = embeddings.node(n);
        for (s, v) in sum.iter_mut().zip(&e) {
            *s += v;
        }
    }
    let k = ctx_window.len() as f32;
    for s in sum.iter_mut() {
        *s /= k;
    }
    sum
}

/// Numerically-stable softmax, in place.
pub fn softmax(scores: &mut [f32]) {
    if scores.is_empty() {
        return;
    }
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0f32;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    if sum > 0.0 {
        for s in scores.iter_mut() {
            *s /= sum;
        }
    }
}

/// Shannon entropy (base 2) of a probability distribution.
pub fn entropy(probs: &[f32]) -> f32 {
    probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let mut scores = vec![1.0, 2.0, 3.0];
        softmax(&mut scores);
        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn softmax_handles_empty() {
        let mut scores: Vec<f32> = vec![];
        softmax(&mut scores);
        assert!(scores.is_empty());
    }

    #[test]
    fn entropy_of_certain_distribution_is_zero() {
        assert_eq!(entropy(&[1.0, 0.0]), 0.0);
    }

    #[test]
    fn entropy_of_uniform_two_way_is_one() {
        assert!((entropy(&[0.5, 0.5]) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn single_candidate_is_never_ambiguous() {
        let cfg = Config::default();
        let candidates = vec![Candidate { edge: EdgeId(0), node: NodeId(0), score: 0.1 }];
        assert!(!is_ambiguous(&candidates, &cfg));
    }

    #[test]
    fn close_top_two_scores_are_ambiguous() {
        let cfg = Config::default();
        let candidates = vec![
            Candidate { edge: EdgeId(0), node: NodeId(0), score: 0.5 },
            Candidate { edge: EdgeId(1), node: NodeId(1), score: 0.5 + cfg.abstain_margin * 0.1 },
        ];
        assert!(is_ambiguous(&candidates, &cfg));
    }

    #[test]
    fn wide_top_two_gap_is_not_ambiguous() {
        let cfg = Config::default();
        let candidates = vec![
            Candidate { edge: EdgeId(0), node: NodeId(0), score: 0.0 },
            Candidate { edge: EdgeId(1), node: NodeId(1), score: cfg.abstain_margin * 2.0 },
        ];
        assert!(!is_ambiguous(&candidates, &cfg));
    }
}
