//! Context diffusion, similarity, search, scoring, and traversal over the
//! knowledge graph (`spec.md` §4.B).

pub mod context_field;
pub mod path;
pub mod search;
pub mod similarity;
pub mod thought_bank;
pub mod traverse;

pub use context_field::ContextField;
pub use path::{score_path, PathScore};
pub use search::{exact_chain_search, DEFAULT_MAX_DEPTH};
pub use similarity::jaccard;
pub use thought_bank::ThoughtBank;
pub use traverse::{sample_next, traverse};
