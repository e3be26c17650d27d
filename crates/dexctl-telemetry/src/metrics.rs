//! Prometheus metrics for the control plane.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error surfaced on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter_vec, register_int_gauge, register_int_gauge_vec, Encoder,
    IntCounterVec, IntGauge, IntGaugeVec, TextEncoder,
};

use crate::error::TelemetryResult;

/// Admin and registry operations by outcome.
/// Labels: op, outcome (ok / rejected error kind)
pub static ADMIN_OPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dexctl_admin_ops_total",
        "Total control plane operations by outcome",
        &["op", "outcome"]
    )
    .unwrap()
});

/// Fee resolutions by fee kind and whether a tier or the default matched.
pub static FEE_RESOLUTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dexctl_fee_resolutions_total",
        "Total fee resolutions",
        &["kind", "source"]
    )
    .unwrap()
});

/// Registered markets.
pub static MARKETS_REGISTERED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("dexctl_markets_registered", "Number of registered markets").unwrap()
});

/// Configured fee tiers per table.
pub static FEE_TIERS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!("dexctl_fee_tiers", "Number of fee tiers", &["kind"]).unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record an operation outcome.
    pub fn admin_op(op: &str, outcome: &str) {
        ADMIN_OPS_TOTAL.with_label_values(&[op, outcome]).inc();
    }

    /// Record a fee resolution.
    pub fn fee_resolved(kind: &str, source: &str) {
        FEE_RESOLUTIONS_TOTAL.with_label_values(&[kind, source]).inc();
    }

    pub fn markets_registered(count: usize) {
        MARKETS_REGISTERED.set(count as i64);
    }

    pub fn fee_tiers(kind: &str, count: usize) {
        FEE_TIERS.with_label_values(&[kind]).set(count as i64);
    }

    /// Render the default registry in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = ADMIN_OPS_TOTAL.with_label_values(&["init", "ok"]).get();
        Metrics::admin_op("init", "ok");
        assert_eq!(
            ADMIN_OPS_TOTAL.with_label_values(&["init", "ok"]).get(),
            before + 1
        );
    }

    #[test]
    fn test_gauges_and_text_output() {
        Metrics::markets_registered(3);
        Metrics::fee_tiers("protocol", 2);
        Metrics::fee_resolved("taker", "tier");

        assert_eq!(MARKETS_REGISTERED.get(), 3);
        assert_eq!(FEE_TIERS.with_label_values(&["protocol"]).get(), 2);

        let text = Metrics::gather_text().unwrap();
        assert!(text.contains("dexctl_markets_registered 3"));
        assert!(text.contains("dexctl_fee_resolutions_total"));
    }
}
