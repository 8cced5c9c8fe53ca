//! Prometheus metrics and structured logging for the market maker.
//!
//! - Prometheus metrics for cycles, cancels, creates and balances
//! - Structured logging with tracing (JSON in production)

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
