//! Crowd-supported LEAP inference: template-gap detection, crowd
//! aggregation, thresholded creation, reinforcement, promotion, conflict
//! arbitration, and pruning (`spec.md` §4.C).

pub mod conflict;
pub mod connector;
pub mod crowd;
pub mod fallback;
pub mod gap;
pub mod lifecycle;

pub use conflict::arbitrate;
pub use connector::{normalize, Connector};
pub use crowd::{aggregate, try_create, CrowdRow};
pub use fallback::fallback_leap;
pub use gap::{detect_gap, TemplateGap};
pub use lifecycle::record_outcome;
