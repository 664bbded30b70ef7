//! Records accepted generation sequences as n-grams, so the predictive
//! sampler can bonus a continuation it has produced successfully before
//! (`SPEC_FULL.md` §5, Open Question 2).

use hashbrown::HashMap;

use crate::model::NodeId;

/// Maps a trailing window of node handles to the handles that followed it,
/// each with an occurrence count. Window length is fixed per bank.
#[derive(Debug, Clone)]
pub struct ThoughtBank {
    order: usize,
    continuations: HashMap<Vec<NodeId>, HashMap<NodeId, u32>>,
}

impl ThoughtBank {
    pub fn new(order: usize) -> Self {
        Self {
            order: order.max(1),
            continuations: HashMap::new(),
        }
    }

    /// Record every `order`-gram window in `sequence` and what followed it.
    pub fn record(&mut self, sequence: &[NodeId]) {
        if sequence.len() <= self.order {
            return;
        }
        for window in sequence.windows(self.order + 1) {
            let (key, next) = window.split_at(self.order);
            let entry = self.continuations.entry(key.to_vec()).or_default();
            *entry.entry(next[0]).or_insert(0) += 1;
        }
    }

    /// Candidate continuations for the trailing window of `context`, most
    /// frequent first. Empty if `context` is shorter than the bank's order
    /// or the window was never observed.
    pub fn continuations(&self, context: &[NodeId]) -> Vec<(NodeId, u32)> {
        if context.len() < self.order {
            return Vec::new();
        }
        let key = &context[context.len() - self.order..];
        let Some(counts) = self.continuations.get(key) else {
            return Vec::new();
        };
        let mut entries: Vec<(NodeId, u32)> = counts.iter().map(|(&id, &c)| (id, c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// The bonus weight for `candidate` continuing `context`: observed
    /// count over total observations for that window, or 0.0 if unseen.
    pub fn bonus(&self, context: &[NodeId], candidate: NodeId) -> f32 {
        let conts = self.continuations(context);
        let total: u32 = conts.iter().map(|(_, c)| c).sum();
        if total == 0 {
            return 0.0;
        }
        conts
            .iter()
            .find(|(id, _)| *id == candidate)
            .map(|(_, c)| *c as f32 / total as f32)
            .unwrap_or(0.0)
    }
}
