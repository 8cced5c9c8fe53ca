//! XRPL single-pair market maker.
//!
//! Main application that orchestrates:
//! - Configuration loading
//! - Ledger connection lifecycle
//! - Fixed-interval cycles with an in-flight guard

pub mod app;
pub mod config;
pub mod error;
pub mod scheduler;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use scheduler::{Scheduler, TickOutcome};
