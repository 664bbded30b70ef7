//! # synapse-graph — a persistent, self-learning knowledge graph
//!
//! Typed nodes joined by weighted EXACT (bidirectional, training-confirmed)
//! and LEAP (unidirectional, crowd-inferred) edges, a context-diffusion
//! reasoning layer, a predictive token-sequence sampler, and an
//! entropy-triggered generalization controller. See `SPEC_FULL.md` for the
//! full module-by-module contract.
//!
//! ## Quick start
//!
//! ```rust
//! use synapse_graph::{Config, Session};
//!
//! let mut session = Session::new(Config::default());
//! session.think("dogs are mammals.");
//! session.think("cats are mammals.");
//! session.think("wolves are mammals.");
//! let _ = session.think("are foxes mammals.");
//! let stats = session.stats();
//! assert!(stats.nodes > 0);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod leap;
pub mod leap_controller;
pub mod model;
pub mod predictive;
pub mod reasoning;
pub mod session;
pub mod storage;
pub mod telemetry;

// ============================================================================
// Re-exports: the public surface
// ============================================================================

pub use config::Config;
pub use error::{Error, Result};
pub use model::{Edge, EdgeId, EdgeKind, Modality, Node, NodeId, NodeKind, Relation};
pub use session::{Session, Stats, ThinkOutcome};
pub use storage::Graph;
pub use telemetry::{Event, RejectReason, Telemetry};
