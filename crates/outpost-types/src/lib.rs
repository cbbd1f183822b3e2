//! Shared type definitions for the Outpost decision engine.
//!
//! This crate is the single source of truth for the types every Outpost
//! crate speaks: identifiers, domain enums, entity snapshots, the
//! persisted per-agent memory record, and the per-role module catalog.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity and zone identifiers
//! - [`enums`] -- Enumeration types (resources, facilities, roles, modules,
//!   task states, action verbs and statuses)
//! - [`structs`] -- Entity snapshot structs, [`AgentMemory`], and the
//!   module catalog types

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActionStatus, ActionVerb, CapabilityModule, FacilityKind, ResourceKind, RoleKind, TaskState,
};
pub use ids::{EntityId, ZoneId};
pub use structs::{
    Agent, AgentMemory, Facility, Health, ModuleCatalog, ModuleEntry, Position, ResourceNode,
    Salvage, Site, Stock, Zone,
};
