//! Ledger access for the XRPL market maker.
//!
//! - `LedgerClient`: the async seam the decision engine depends on
//! - `JsonRpcLedger`: rippled JSON-RPC implementation over HTTP
//! - `MockLedger`: in-memory implementation for tests

pub mod client;
pub mod error;
pub mod mock;
pub mod rpc;
pub mod secret;
pub mod wire;

pub use client::{BoxFuture, DynLedgerClient, LedgerClient, SubmitOutcome};
pub use error::{LedgerError, LedgerResult};
pub use mock::MockLedger;
pub use rpc::{JsonRpcLedger, LedgerConfig};
pub use secret::{AccountSecret, SecretSource};
