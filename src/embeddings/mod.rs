//! Node/token embedding tables coupled by an activation-vector to
//! token-bias map, with online Hebbian-style learning (`spec.md` §4.D).

pub mod bridge;
pub mod vector;

pub use bridge::{EmbeddingBridge, LeapActivation};
pub use vector::{cosine, normalize};
