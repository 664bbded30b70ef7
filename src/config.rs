//! Tunable constants, read from environment or supplied by the caller.
//!
//! Distilled from the original `src/util/config.h` single-header-of-constants
//! convention: every knob has a compiled-in default, and any of them may be
//! overridden by an environment variable of the same name. Out-of-range
//! overrides are clamped to the documented domain and a warning is logged
//! rather than failing construction — malformed input leaves state usable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // --- LEAP crowd-aggregation thresholds (§4.C) ---
    pub th_support: f32,
    pub th_diversity: usize,
    pub th_margin: f32,
    pub abstain_margin: f32,

    // --- LEAP lifecycle (§4.C) ---
    pub promote_threshold: f32,
    pub min_successes: u32,
    pub penalty: f32,
    pub override_threshold: f32,
    pub leap_threshold: f32,

    // --- Path scoring (§4.B) ---
    pub kappa: f32,
    pub mu: f32,
    pub sigma: f32,

    // --- Embedding bridge (§4.D) ---
    pub lambda_graph_bias: f32,
    pub learning_rate_embeddings: f32,
    pub embedding_dim: usize,
    pub similarity_threshold: f32,

    // --- Predictive sampler (§4.E) ---
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub epsilon: f32,
    pub ctx_k: usize,
    pub beam_width: usize,
    pub max_hops: usize,
    pub top_p: f32,
    pub ngram_bonus: f32,
    pub self_reinforce_eta: f32,
    pub anti_repetition_window: usize,

    // --- LeapController (§4.F) ---
    pub leap_entropy_threshold: f32,
    pub repetition_threshold: usize,
    pub context_window_for_repetition: usize,
    pub cluster_min_activation: f32,
    pub min_cluster_size: usize,
    pub max_clusters_per_leap: usize,
    pub lambda_leap: f32,
    pub leap_promotion_threshold: u32,

    // --- Feature toggles / modes ---
    pub enable_leap_system: bool,
    pub enable_embedding_bridge: bool,
    pub reasoning_only_mode: bool,
    pub log_predictions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            th_support: 3.0,
            th_diversity: 2,
            th_margin: 1.0,
            abstain_margin: 1.0,

            promote_threshold: 0.7,
            min_successes: 3,
            penalty: 1.0,
            override_threshold: 8.0,
            leap_threshold: 0.4,

            kappa: 0.5,
            mu: 0.7,
            sigma: 0.2,

            lambda_graph_bias: 0.5,
            learning_rate_embeddings: 0.1,
            embedding_dim: 64,
            similarity_threshold: 0.4,

            alpha: 0.7,
            beta: 8.0,
            gamma: 1.0,
            epsilon: 1e-6,
            ctx_k: 4,
            beam_width: 4,
            max_hops: 24,
            top_p: 0.9,
            ngram_bonus: 0.15,
            self_reinforce_eta: 0.002,
            anti_repetition_window: 10,

            leap_entropy_threshold: 0.6,
            repetition_threshold: 3,
            context_window_for_repetition: 5,
            cluster_min_activation: 0.1,
            min_cluster_size: 3,
            max_clusters_per_leap: 3,
            lambda_leap: 0.3,
            leap_promotion_threshold: 3,

            enable_leap_system: true,
            enable_embedding_bridge: true,
            reasoning_only_mode: false,
            log_predictions: false,
        }
    }
}

macro_rules! overlay_f32 {
    ($self:ident, $field:ident, $key:literal, $lo:expr, $hi:expr) => {
        if let Ok(raw) = std::env::var($key) {
            match raw.parse::<f32>() {
                Ok(v) => $self.$field = v.clamp($lo, $hi),
                Err(_) => tracing::warn!(key = $key, raw, "ignoring unparseable config override"),
            }
        }
    };
}

macro_rules! overlay_usize {
    ($self:ident, $field:ident, $key:literal) => {
        if let Ok(raw) = std::env::var($key) {
            match raw.parse::<usize>() {
                Ok(v) => $self.$field = v,
                Err(_) => tracing::warn!(key = $key, raw, "ignoring unparseable config override"),
            }
        }
    };
}

macro_rules! overlay_u32 {
    ($self:ident, $field:ident, $key:literal) => {
        if let Ok(raw) = std::env::var($key) {
            match raw.parse::<u32>() {
                Ok(v) => $self.$field = v,
                Err(_) => tracing::warn!(key = $key, raw, "ignoring unparseable config override"),
            }
        }
    };
}

macro_rules! overlay_bool {
    ($self:ident, $field:ident, $key:literal) => {
        if let Ok(raw) = std::env::var($key) {
            match raw.parse::<bool>() {
                Ok(v) => $self.$field = v,
                Err(_) => tracing::warn!(key = $key, raw, "ignoring unparseable config override"),
            }
        }
    };
}

impl Config {
    /// Overlay `std::env::var` onto `Config::default()` for every documented knob.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        overlay_f32!(cfg, th_support, "TH_SUPPORT", 0.0, 100.0);
        overlay_usize!(cfg, th_diversity, "TH_DIVERSITY");
        overlay_f32!(cfg, th_margin, "TH_MARGIN", 0.0, 100.0);
        overlay_f32!(cfg, abstain_margin, "ABSTAIN_MARGIN", 0.0, 100.0);

        overlay_f32!(cfg, promote_threshold, "PROMOTE_THRESHOLD", 0.0, 1.0);
        overlay_u32!(cfg, min_successes, "MIN_SUCCESSES");
        overlay_f32!(cfg, penalty, "PENALTY", 0.0, 10.0);
        overlay_f32!(cfg, override_threshold, "OVERRIDE_THRESHOLD", 0.0, 100.0);
        overlay_f32!(cfg, leap_threshold, "LEAP_THRESHOLD", 0.0, 1.0);

        overlay_f32!(cfg, kappa, "KAPPA", 0.0, 10.0);
        overlay_f32!(cfg, mu, "MU", 0.0, 10.0);
        overlay_f32!(cfg, sigma, "SIGMA", 0.0, 10.0);

        overlay_f32!(cfg, lambda_graph_bias, "LAMBDA_GRAPH_BIAS", 0.0, 1.0);
        overlay_f32!(cfg, learning_rate_embeddings, "LEARNING_RATE_EMBEDDINGS", 0.0, 1.0);

        overlay_f32!(cfg, leap_entropy_threshold, "LEAP_ENTROPY_THRESHOLD", 0.0, 10.0);

        overlay_bool!(cfg, enable_leap_system, "ENABLE_LEAP_SYSTEM");
        overlay_bool!(cfg, enable_embedding_bridge, "ENABLE_EMBEDDING_BRIDGE");
        overlay_bool!(cfg, reasoning_only_mode, "REASONING_ONLY_MODE");
        overlay_bool!(cfg, log_predictions, "LOG_PREDICTIONS");
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert_eq!(cfg.th_support, 3.0);
        assert_eq!(cfg.th_diversity, 2);
        assert_eq!(cfg.th_margin, 1.0);
        assert_eq!(cfg.promote_threshold, 0.7);
        assert_eq!(cfg.min_successes, 3);
        assert_eq!(cfg.override_threshold, 8.0);
        assert_eq!(cfg.leap_threshold, 0.4);
    }

    #[test]
    fn env_override_clamped() {
        unsafe {
            std::env::set_var("PROMOTE_THRESHOLD", "5.0");
        }
        let cfg = Config::from_env();
        assert_eq!(cfg.promote_threshold, 1.0);
        unsafe {
            std::env::remove_var("PROMOTE_THRESHOLD");
        }
    }
}
