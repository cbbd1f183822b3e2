//! The `World` collaborator trait.
//!
//! The decision core is pure orchestration: everything it knows about the
//! world comes through this trait, and everything it does to the world goes
//! back through it. Implementations are provided by the host environment;
//! this crate ships one reference host, [`SimWorld`].
//!
//! # Contract
//!
//! - **Snapshot reads.** Query methods return owned snapshots that are
//!   consistent within one tick. The core never relies on same-tick
//!   read-back of its own mutations; ordering effects (who claims a
//!   contested target first) are resolved by the host on the next tick.
//! - **Stable query order.** Within a tick, repeated queries return
//!   entities in the same order. That order is the documented tie-break
//!   for every "first found" decision.
//! - **Fire-and-forget movement.** [`move_toward`] returns immediately;
//!   arrival is only observable on a later tick by re-querying positions.
//! - **Same-tick action statuses.** [`perform`] returns an
//!   [`ActionStatus`] for this tick. Multi-tick effects (production,
//!   travel) complete on later ticks.
//! - **Fail-silent production.** [`produce`] returns a non-[`Ok`] status
//!   instead of raising when the factory is busy or the budget cannot be
//!   paid; callers pre-check what they care about.
//!
//! [`move_toward`]: World::move_toward
//! [`perform`]: World::perform
//! [`produce`]: World::produce
//! [`Ok`]: ActionStatus::Ok
//! [`SimWorld`]: crate::SimWorld

use outpost_types::{
    ActionStatus, ActionVerb, Agent, AgentMemory, CapabilityModule, EntityId, Facility,
    ResourceKind, ResourceNode, Salvage, Site, Zone, ZoneId,
};

/// The collaborator interface the host environment must provide.
pub trait World {
    /// The current tick number.
    fn tick(&self) -> u64;

    /// All zones, in stable order.
    fn zones(&self) -> Vec<Zone>;

    /// One zone's snapshot, re-readable after budget-affecting actions.
    fn zone(&self, id: ZoneId) -> Option<Zone>;

    /// Facilities in a zone, in stable query order.
    fn facilities(&self, zone: ZoneId) -> Vec<Facility>;

    /// Resource nodes in a zone, in stable query order.
    fn nodes(&self, zone: ZoneId) -> Vec<ResourceNode>;

    /// Construction sites in a zone, in stable query order.
    fn sites(&self, zone: ZoneId) -> Vec<Site>;

    /// Agents in a zone (friendly and hostile), in stable query order.
    fn agents(&self, zone: ZoneId) -> Vec<Agent>;

    /// Salvage piles in a zone, in stable query order.
    fn salvage(&self, zone: ZoneId) -> Vec<Salvage>;

    /// Refetch one facility by ID (for persisted targets).
    fn facility(&self, id: EntityId) -> Option<Facility>;

    /// Refetch one resource node by ID (for persisted sources).
    fn node(&self, id: EntityId) -> Option<ResourceNode>;

    /// Refetch one construction site by ID.
    fn site(&self, id: EntityId) -> Option<Site>;

    /// Issue fire-and-forget movement of `actor` one leg toward `target`.
    ///
    /// Unknown actors or targets are ignored; movement has no status.
    fn move_toward(&mut self, actor: EntityId, target: EntityId);

    /// Perform one world-mutating action and return its same-tick status.
    ///
    /// `resource` defaults to [`ResourceKind::Energy`] for verbs that move
    /// resources.
    fn perform(
        &mut self,
        actor: EntityId,
        verb: ActionVerb,
        target: EntityId,
        resource: Option<ResourceKind>,
    ) -> ActionStatus;

    /// Start producing a new agent at a factory.
    ///
    /// Fails silently (non-`Ok` status) when the factory is busy, the name
    /// is taken, or the zone budget cannot pay for the loadout.
    fn produce(
        &mut self,
        facility: EntityId,
        loadout: &[CapabilityModule],
        name: &str,
        memory: &AgentMemory,
    ) -> ActionStatus;

    /// Whether a factory is mid-production this tick.
    fn is_producing(&self, facility: EntityId) -> bool;

    /// Read an agent's persisted memory record.
    fn memory(&self, name: &str) -> Option<AgentMemory>;

    /// Write an agent's persisted memory record.
    fn set_memory(&mut self, name: &str, memory: AgentMemory);

    /// Delete an agent's persisted memory record.
    fn delete_memory(&mut self, name: &str);

    /// Names of all persisted memory records, in stable order.
    fn memory_names(&self) -> Vec<String>;
}
