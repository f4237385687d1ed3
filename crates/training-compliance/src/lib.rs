//! Training compliance and promotion eligibility rules.
//!
//! The evaluators under [`workflows`] are pure functions over caller-supplied
//! snapshots. The `config`, `error`, and `telemetry` modules carry the ambient
//! plumbing shared with the CLI/HTTP service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
