//! Error types for the outpost-world crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! The decision core itself never sees these: action primitives translate
//! failures into [`ActionStatus`] codes, and stock errors only surface to
//! hosts manipulating world state directly.
//!
//! [`ActionStatus`]: outpost_types::ActionStatus

use outpost_types::{EntityId, ResourceKind, ZoneId};

/// Errors that can occur during world state operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Attempted to add resources that would exceed a stock's capacity.
    #[error("stock overflow: adding {attempted} of {resource:?} would exceed capacity (current load: {current_load}, capacity: {capacity})")]
    StockOverflow {
        /// The resource type being added.
        resource: ResourceKind,
        /// The quantity the caller attempted to add.
        attempted: u32,
        /// The stock's current total load.
        current_load: u32,
        /// The stock's maximum capacity.
        capacity: u32,
    },

    /// Attempted to remove more of a resource than the stock holds.
    #[error("insufficient resource: wanted {requested} of {resource:?} but only have {available}")]
    InsufficientResource {
        /// The resource type being removed.
        resource: ResourceKind,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity the stock actually holds.
        available: u32,
    },

    /// An arithmetic overflow occurred during a world computation.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// No zone with the given ID exists.
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),

    /// No entity with the given ID exists.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// An agent name is already in use by a living agent or a pending
    /// production job.
    #[error("duplicate agent name: {0}")]
    DuplicateAgentName(String),
}
