//! Edge (directed, typed, weighted link) in the knowledge graph.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// Opaque edge handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "~{}", self.0)
    }
}

/// Provenance of an edge: factual/training-confirmed vs. crowd-inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EdgeKind {
    /// Training-confirmed, bidirectional, high baseline weight.
    Exact = 0,
    /// Inferred, unidirectional, created only on crowd evidence.
    Leap = 1,
}

/// Relation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Relation {
    TemporalNext = 0,
    IsA = 1,
    Has = 2,
    Can = 3,
    Consumes = 4,
    CrossModal = 5,
    InstanceOf = 6,
    ObservedAs = 7,
    CoOccurs = 8,
    SpokenAs = 9,
    Sound = 10,
    LooksLike = 11,
    LeapGeneralization = 12,
}

impl Relation {
    pub fn from_u32(v: u32) -> Self {
        match v {
            0 => Relation::TemporalNext,
            1 => Relation::IsA,
            2 => Relation::Has,
            3 => Relation::Can,
            4 => Relation::Consumes,
            5 => Relation::CrossModal,
            6 => Relation::InstanceOf,
            7 => Relation::ObservedAs,
            8 => Relation::CoOccurs,
            9 => Relation::SpokenAs,
            10 => Relation::Sound,
            11 => Relation::LooksLike,
            _ => Relation::LeapGeneralization,
        }
    }

    /// Fixed prior bias used by the predictive sampler's `rel_term`.
    /// Distilled from the original `PredictiveConfig::rel_bias` table.
    pub fn score_bias(self) -> f32 {
        match self {
            Relation::IsA | Relation::InstanceOf => 0.35,
            Relation::Consumes => 0.25,
            Relation::TemporalNext => 0.1,
            _ => 0.0,
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Relation::TemporalNext => "temporal-next",
            Relation::IsA => "is-a",
            Relation::Has => "has",
            Relation::Can => "can",
            Relation::Consumes => "consumes",
            Relation::CrossModal => "cross-modal",
            Relation::InstanceOf => "instance-of",
            Relation::ObservedAs => "observed-as",
            Relation::CoOccurs => "co-occurs",
            Relation::SpokenAs => "spoken-as",
            Relation::Sound => "sound",
            Relation::LooksLike => "looks-like",
            Relation::LeapGeneralization => "leap-generalization",
        };
        write!(f, "{s}")
    }
}

/// A directed, typed, weighted link between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub a: NodeId,
    pub b: NodeId,
    pub relation: Relation,
    pub kind: EdgeKind,

    /// Durable (slow-moving) component of the composite weight.
    pub w_core: f32,
    /// Contextual (fast-moving) component of the composite weight.
    pub w_ctx: f32,
    /// Composite weight `0.3*w_core + 0.7*w_ctx`, recomputed on every update.
    pub w: f32,

    pub count: u32,
    pub successes: u32,
    pub failures: u32,
    /// Support count at LEAP birth; 0 for edges born EXACT.
    pub leap_score: f32,
    pub last_touched: i64,

    pub cross_modal: bool,
    pub cross_modal_bonus: f32,
    /// Online-learned frequency ratio, bumped by the predictive sampler's
    /// self-reinforcement step after each completed generation.
    pub freq_ratio: f32,
}

impl Edge {
    pub fn new(id: EdgeId, a: NodeId, b: NodeId, relation: Relation, kind: EdgeKind, w: f32, now: i64) -> Self {
        let (w_core, w_ctx) = match kind {
            EdgeKind::Exact => (0.5, 0.5),
            EdgeKind::Leap => (w, w),
        };
        Self {
            id,
            a,
            b,
            relation,
            kind,
            w_core,
            w_ctx,
            w: recompute_w(w_core, w_ctx),
            count: 1,
            successes: 0,
            failures: 0,
            leap_score: 0.0,
            last_touched: now,
            cross_modal: false,
            cross_modal_bonus: 0.0,
            freq_ratio: 0.0,
        }
    }

    /// `w = 0.3*w_core + 0.7*w_ctx`. Context adapts fast, core remembers slowly.
    pub fn recompute_weight(&mut self) {
        self.w = recompute_w(self.w_core, self.w_ctx);
    }

    /// Strengthen the edge toward `reward` (may be negative).
    pub fn reinforce(&mut self, reward: f32, now: i64) {
        self.w_core = (self.w_core + 0.3 * reward).clamp(0.0, 1.0);
        self.w_ctx = (self.w_ctx + 0.7 * reward).clamp(0.0, 1.0);
        self.recompute_weight();
        if self.cross_modal {
            self.cross_modal_bonus = (self.cross_modal_bonus + 0.1 * reward).max(0.0);
        }
        self.last_touched = now;
    }

    /// One decay tick toward the EXACT baseline (0.1 core / 0.2 ctx).
    pub fn decay(&mut self, rate: f32) {
        self.w_core = (1.0 - rate) * self.w_core + rate * 0.1;
        self.w_ctx = (1.0 - rate) * self.w_ctx + rate * 0.2;
        self.cross_modal_bonus = (1.0 - rate) * self.cross_modal_bonus;
        self.recompute_weight();
    }

    /// Eligible for pruning: negligible weight and little corroborating traffic.
    pub fn prunable(&self) -> bool {
        (self.w < 0.05 && self.count <= 2) || self.w < 0.1 || self.failures > 5
    }
}

fn recompute_w(w_core: f32, w_ctx: f32) -> f32 {
    (0.3 * w_core + 0.7 * w_ctx).clamp(0.0, 1.0)
}
