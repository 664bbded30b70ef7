//! Structured telemetry events, one JSON object per line (append-only).
//!
//! Distinct from `tracing`: `tracing` is for developer diagnostics, this
//! module is the durable event stream external consumers (training
//! pipelines, ops dashboards) read. Matches `spec.md` §6.

use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    LeapCreate {
        subject: u32,
        target: u32,
        support: f32,
        diversity: usize,
    },
    LeapReject {
        reason: RejectReason,
        subject: Option<u32>,
    },
    LeapPromote {
        edge: u32,
        leap_score: f32,
    },
    LeapDecay {
        edge: u32,
        w: f32,
    },
    ConflictDetected {
        subject: u32,
        connector: u32,
        penalized_edge: u32,
        delta: f32,
    },
    Abstain {
        reason: String,
    },
    Timer {
        name: String,
        ms: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InsufficientSupport,
    LowDiversity,
    LowMargin,
    ConflictWithExact,
}

/// Append-only JSON-lines sink. A no-op sink (writing nowhere) is the
/// default so the core never requires a file handle to function.
pub struct Telemetry {
    sink: Mutex<Option<Box<dyn Write + Send>>>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self { sink: Mutex::new(None) }
    }
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { sink: Mutex::new(Some(writer)) }
    }

    pub fn emit(&self, event: &Event) {
        tracing::debug!(?event, "telemetry");
        let mut guard = self.sink.lock().unwrap();
        if let Some(w) = guard.as_mut() {
            if let Ok(line) = serde_json::to_string(event) {
                let _ = writeln!(w, "{line}");
            }
        }
    }
}
