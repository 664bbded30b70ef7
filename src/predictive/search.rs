//! Beam search and nucleus (top-p) sampling over scored candidates
//! (`spec.md` §4.E).

use rand::Rng;

use crate::config::Config;
use crate::embeddings::EmbeddingBridge;
use crate::model::NodeId;
use crate::predictive::scoring::{score_candidates, softmax};
use crate::reasoning::ThoughtBank;
use crate::storage::Graph;

fn is_terminator(graph: &Graph, node: NodeId) -> bool {
    graph
        .node(node)
        .map(|n| n.payload.ends_with('.') || n.payload.ends_with('?') || n.payload.ends_with('!'))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
struct BeamState {
    path: Vec<NodeId>,
    log_prob: f32,
    done: bool,
}

/// Width-`cfg.beam_width`, depth-`cfg.max_hops` beam search from `start`.
/// Returns the highest cumulative-log-prob path found.
pub fn beam_search(graph: &Graph, embeddings: &EmbeddingBridge, bank: &ThoughtBank, cfg: &Config, start: NodeId) -> Vec<NodeId> {
    let mut beams = vec![BeamState { path: vec![start], log_prob: 0.0, done: is_terminator(graph, start) }];

    for _ in 0..cfg.max_hops {
        if beams.iter().all(|b| b.done) {
            break;
        }

        let mut next = Vec::new();
        for beam in &beams {
            if beam.done {
                next.push(beam.clone());
                continue;
            }
            let current = *beam.path.last().unwrap();
            let mut candidates = score_candidates(graph, embeddings, bank, cfg, current, &beam.path);
            if candidates.is_empty() {
                next.push(BeamState { done: true, ..beam.clone() });
                continue;
            }
            let mut scores: Vec<f32> = candidates.iter().map(|c| c.score).collect();
            softmax(&mut scores);
            for (cand, p) in candidates.drain(..).zip(scores) {
                let mut path = beam.path.clone();
                path.push(cand.node);
                next.push(BeamState {
                    done: is_terminator(graph, cand.node),
                    log_prob: beam.log_prob + p.max(1e-9).ln(),
                    path,
                });
            }
        }

        next.sort_by(|a, b| b.log_prob.partial_cmp(&a.log_prob).unwrap_or(std::cmp::Ordering::Equal));
        next.truncate(cfg.beam_width);
        beams = next;
    }

    beams
        .into_iter()
        .max_by(|a, b| a.log_prob.partial_cmp(&b.log_prob).unwrap_or(std::cmp::Ordering::Equal))
        .map(|b| b.path)
        .unwrap_or_else(|| vec![start])
}

/// One nucleus-sampling step: sort candidates by probability, take the
/// smallest prefix whose mass reaches `cfg.top_p`, sample uniformly within
/// it. Returns `None` at a dead end.
pub fn top_p_step<R: Rng + ?Sized>(graph: &Graph, embeddings: &EmbeddingBridge, bank: &ThoughtBank, cfg: &Config, current: NodeId, ctx: &[NodeId], rng: &mut R) -> Option<NodeId> {
    let candidates = score_candidates(graph, embeddings, bank, cfg, current, ctx);
    if candidates.is_empty() {
        return None;
    }

    let mut scores: Vec<f32> = candidates.iter().map(|c| c.score).collect();
    softmax(&mut scores);
    let mut indexed: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut mass = 0.0f32;
    let mut prefix_len = 0;
    for (_, p) in &indexed {
        mass += p;
        prefix_len += 1;
        if mass >= cfg.top_p {
            break;
        }
    }
    let prefix = &indexed[..prefix_len.max(1)];
    let pick = rng.random_range(0..prefix.len());
    Some(candidates[prefix[pick].0].node)
}

/// Generation output, for terminating a full run at sentence punctuation.
pub fn sequence_terminator_reached(graph: &Graph, path: &[NodeId]) -> bool {
    path.last().map(|&n| is_terminator(graph, n)).unwrap_or(false)
}
