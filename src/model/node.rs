//! Node in the knowledge graph.

use serde::{Deserialize, Serialize};

/// Opaque node handle, stable for the lifetime of the graph.
///
/// Nodes are never deleted (only decayed), so a handle obtained at any
/// point remains valid for every later call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Semantic kind of a node's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum NodeKind {
    Concept = 0,
    Instance = 1,
    Connector = 2,
    Thought = 3,
    AudioToken = 4,
    ImagePercept = 5,
    LeapPermanent = 6,
    Speech = 7,
}

impl NodeKind {
    pub fn from_u32(v: u32) -> Self {
        match v {
            0 => NodeKind::Concept,
            1 => NodeKind::Instance,
            2 => NodeKind::Connector,
            3 => NodeKind::Thought,
            4 => NodeKind::AudioToken,
            5 => NodeKind::ImagePercept,
            6 => NodeKind::LeapPermanent,
            _ => NodeKind::Speech,
        }
    }
}

/// Sensory/representational modality of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum Modality {
    Text = 0,
    Audio = 1,
    Image = 2,
    Motor = 3,
    Abstract = 4,
}

impl Modality {
    pub fn from_u32(v: u32) -> Self {
        match v {
            0 => Modality::Text,
            1 => Modality::Audio,
            2 => Modality::Image,
            3 => Modality::Motor,
            _ => Modality::Abstract,
        }
    }
}

/// A discrete unit of meaning.
///
/// `payload` is the label or raw text; payload→handle lookup is unique
/// and enforced by `Graph::create_or_touch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub payload: String,
    pub kind: NodeKind,
    pub modality: Modality,
    /// Durable weight in [0,2]; decayed slowly, never removed.
    pub weight: f32,
    pub usage_count: u32,
    pub created_at: i64,
    pub last_touched: i64,
    /// Fixed-dimension dense embedding, populated lazily by the embedding bridge.
    pub embedding: Option<Vec<f32>>,
}

impl Node {
    pub fn new(id: NodeId, payload: impl Into<String>, kind: NodeKind, modality: Modality, now: i64) -> Self {
        Self {
            id,
            payload: payload.into(),
            kind,
            modality,
            weight: 1.0,
            usage_count: 1,
            created_at: now,
            last_touched: now,
            embedding: None,
        }
    }

    /// Record an access: bump usage counter and last-touch timestamp.
    pub fn touch(&mut self, now: i64) {
        self.usage_count += 1;
        self.last_touched = now;
    }

    /// Apply a single decay tick to the durable weight. Never drops below 0.1.
    pub fn decay(&mut self, rate: f32) {
        self.weight = (self.weight * (1.0 - rate / 2.0)).max(0.1);
    }
}
