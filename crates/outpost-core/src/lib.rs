//! Orchestration layer for the Outpost decision engine.
//!
//! This crate wires the agent logic layer to the world: typed
//! configuration, the population controller, the defense dispatcher, and
//! the [`run_tick`] entry point the outer driver invokes once per discrete
//! time step.
//!
//! # Modules
//!
//! - [`config`] -- Typed thresholds with YAML loading ([`ControlConfig`])
//! - [`defense`] -- The three-tier turret dispatch
//! - [`population`] -- Per-zone reconciliation and memory housekeeping
//! - [`tick`] -- The per-tick entry point ([`run_tick`], [`TickSummary`])
//!
//! [`run_tick`]: tick::run_tick
//! [`ControlConfig`]: config::ControlConfig
//! [`TickSummary`]: tick::TickSummary

pub mod config;
pub mod defense;
pub mod population;
pub mod tick;

// Re-export primary types at crate root.
pub use config::{ConfigError, ControlConfig};
pub use defense::{DefenseOutcome, dispatch};
pub use population::{ReconcileOutcome, cleanup_stale_memory, reconcile};
pub use tick::{TickSummary, run_tick};
