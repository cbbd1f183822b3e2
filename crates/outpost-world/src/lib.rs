//! World collaborator interface and in-memory reference host for the
//! Outpost decision engine.
//!
//! The decision core consumes the [`World`] trait; the host environment
//! provides it. This crate defines that contract and ships everything a
//! host needs: checked stock arithmetic, resource-node regeneration, and
//! [`SimWorld`], a complete in-memory host used by the demo engine and the
//! test suites.
//!
//! # Modules
//!
//! - [`error`] -- Error types for world state operations ([`WorldError`])
//! - [`resource`] -- Regeneration and harvest logic for resource nodes
//! - [`sim`] -- The in-memory reference host ([`SimWorld`]) and its
//!   gameplay constants
//! - [`starting_world`] -- Canonical demo world constructor
//! - [`stock`] -- Checked deposit/withdraw/transfer operations on stocks
//! - [`world`] -- The [`World`] collaborator trait

pub mod error;
pub mod resource;
pub mod sim;
pub mod starting_world;
pub mod stock;
pub mod world;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use sim::SimWorld;
pub use starting_world::{StartingIds, create_starting_world};
pub use world::World;
