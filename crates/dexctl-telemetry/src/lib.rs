//! Prometheus metrics and structured logging for dexctl.
//!
//! - Structured logging with tracing (JSON in production)
//! - Prometheus counters for admin operations and fee resolutions

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
