//! GoBarber scheduling client
//!
//! Browse service providers, inspect a provider's day availability and book
//! appointments against the GoBarber HTTP API.
//!
//! # Architecture
//!
//! - **api**: wire types, collaborator traits and the reqwest client
//! - **scheduling**: selection state, slot derivations, the view-model
//! - **session / config**: injected user context and TOML configuration
//! - **telemetry / cli**: counters, logging setup and the command line

pub mod errors;
pub mod config;
pub mod session;
pub mod api;
pub mod scheduling;
pub mod telemetry;
pub mod cli;

// Re-export commonly used types
pub use errors::{GoBarberError, Result};
pub use scheduling::{SchedulingEvent, SchedulingViewModel, SubmitOutcome};
