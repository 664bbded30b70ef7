//! # Graph Data Model
//!
//! Clean DTOs that define the knowledge graph's substrate: nodes, edges,
//! and their typed attributes. These types cross every module boundary —
//! storage, reasoning, leap inference, embeddings, prediction.
//!
//! Design rule: no I/O, no global state, no async here. Pure data.

pub mod node;
pub mod edge;

pub use node::{Node, NodeId, NodeKind, Modality};
pub use edge::{Edge, EdgeId, EdgeKind, Relation};
