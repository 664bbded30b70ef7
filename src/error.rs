//! Error types.
//!
//! Pure domain conditions — insufficient LEAP evidence, ambiguous queries,
//! invalid handles — are never bubbled as `Err`; they surface as fields on
//! the relevant outcome type and as telemetry events. Only I/O and
//! malformed-input faults at an API boundary produce an `Error`.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed persistence data: {0}")]
    Malformed(String),

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
