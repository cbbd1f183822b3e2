//! Agent logic for the Outpost decision engine.
//!
//! This crate is the logic layer between `outpost-types` (data) and
//! `outpost-core` (orchestration): everything that reasons about one agent
//! at a time, with no I/O beyond the [`World`] collaborator.
//!
//! # Modules
//!
//! - [`allocator`] -- Capability budget allocation for new-agent loadouts
//! - [`selector`] -- Shared stable target ranking ([`rank`])
//! - [`roles`] -- The [`Role`] trait, the [`RoleRoster`], and the six role
//!   task state machines
//!
//! [`World`]: outpost_world::World
//! [`rank`]: selector::rank
//! [`Role`]: roles::Role
//! [`RoleRoster`]: roles::RoleRoster

pub mod allocator;
pub mod roles;
pub mod selector;

// Re-export primary types at crate root.
pub use allocator::{ALLOCATION_ROUNDS, MIN_VIABLE_MODULES, allocate};
pub use roles::{Builder, Charger, Harvester, Loader, Maintainer, Role, RoleRoster, Scout};
pub use selector::{Metric, Rankable, rank};
