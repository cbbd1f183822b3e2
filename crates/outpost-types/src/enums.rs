//! Enumeration types for the Outpost decision engine.
//!
//! These enums form the closed vocabulary the decision core shares with the
//! host environment: what resources exist, what kinds of facility a zone can
//! hold, which roles agents play, which capability modules a loadout is
//! built from, the task states the role state machines move through, and
//! the verb/status pairs of the action protocol.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A resource type that can be held in a stock and moved by actions.
///
/// Energy is the working resource of every role: harvested from nodes,
/// delivered to facilities, spent on production. Metal exists so that
/// multi-resource stocks flow through the same typed maps unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// The universal working resource.
    Energy,
    /// Structural material; carried and stored but not consumed by any role.
    Metal,
}

// ---------------------------------------------------------------------------
// Facilities
// ---------------------------------------------------------------------------

/// The kind of a stationary facility in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacilityKind {
    /// Produces new agents; its stored energy counts toward the zone budget.
    Factory,
    /// Auxiliary energy store that extends the production budget.
    Capacitor,
    /// Defensive installation; attacks, heals, and repairs from stored energy.
    Turret,
    /// Large general-purpose resource store.
    Storehouse,
    /// Small local resource store.
    Cache,
    /// Transit surface; decays under traffic and needs periodic repair.
    Conduit,
    /// Passive fortification with a very large health pool.
    Barrier,
    /// Active fortification protecting the tile it stands on.
    Bulwark,
    /// The zone's charge sink; chargers feed harvested energy into it.
    Core,
    /// A placed marker; scouts travel to it and hold position.
    Beacon,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The behavior template an agent is created with.
///
/// A role never changes after creation; it selects the task state machine,
/// the module catalog used to size the agent's loadout, and the
/// desired-count rule the population controller enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    /// Harvests energy and delivers it to budget and defense facilities.
    Harvester,
    /// Harvests energy and channels it into the zone core.
    Charger,
    /// Harvests energy and completes construction sites.
    Builder,
    /// Collects salvage and repairs conduits and fortifications.
    Maintainer,
    /// Keeps turrets stocked with energy.
    Loader,
    /// Travels to the zone beacon and holds position there.
    Scout,
}

impl RoleKind {
    /// Canonical lower-case identifier, used for produced-agent names and
    /// log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Harvester => "harvester",
            Self::Charger => "charger",
            Self::Builder => "builder",
            Self::Maintainer => "maintainer",
            Self::Loader => "loader",
            Self::Scout => "scout",
        }
    }
}

impl core::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Capability modules
// ---------------------------------------------------------------------------

/// A unit of an agent's capability loadout.
///
/// Variants are declared in lexical order of their identifiers so that the
/// derived ordering matches the stable lexical sort applied to finished
/// loadouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapabilityModule {
    /// Cargo capacity; each unit raises the agent's stock ceiling.
    Carry,
    /// Mobility; each unit speeds up movement.
    Move,
    /// Actuation; each unit raises harvest/build/repair throughput.
    Work,
}

impl CapabilityModule {
    /// Canonical lower-case identifier, the key for the deterministic
    /// lexical loadout sort.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Carry => "carry",
            Self::Move => "move",
            Self::Work => "work",
        }
    }
}

impl core::fmt::Display for CapabilityModule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Task states
// ---------------------------------------------------------------------------

/// A named state of a role's task state machine.
///
/// The full set is shared; each role declares the subset it uses and an
/// initial state. A persisted state outside the role's declared subset is
/// reset to the initial state (one idle tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Gathering energy from a resource node (or withdrawing from a store).
    Harvesting,
    /// Transferring carried energy into budget/defense facilities.
    Delivering,
    /// Channeling carried energy into the zone core.
    Charging,
    /// Spending carried energy on a construction site.
    Building,
    /// Picking up salvage piles.
    Cleanup,
    /// Scanning for a repair target while idling at the rally point.
    Choosing,
    /// Repairing the persisted target facility.
    Fixing,
    /// Transferring carried energy into the persisted turret.
    Refilling,
    /// Idling at the rally point until a turret needs energy.
    Waiting,
    /// Holding position at the zone beacon.
    Scouting,
    /// Moving back to the rally factory.
    Returning,
}

// ---------------------------------------------------------------------------
// Action protocol
// ---------------------------------------------------------------------------

/// A world-mutating action an actor can perform on a target this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionVerb {
    /// Damage a hostile agent (turrets only).
    Attack,
    /// Spend carried energy to advance a construction site.
    Build,
    /// Feed carried energy into the zone core.
    Charge,
    /// Self-destruct; the actor is removed and drops its stock as salvage.
    Decommission,
    /// Extract energy from a resource node.
    Harvest,
    /// Restore a damaged friendly agent's health (turrets only).
    Heal,
    /// Collect a salvage pile into the actor's stock.
    Pickup,
    /// Restore a damaged facility's health.
    Repair,
    /// Move carried resource into a facility's stock.
    Transfer,
    /// Move resource from a facility's stock into the actor's.
    Withdraw,
}

/// The same-tick status code returned by every action primitive.
///
/// Movement has no status: it is fire-and-forget, and arrival is only
/// observable on a later tick by re-querying positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    /// The action succeeded this tick.
    Ok,
    /// The target is out of range; the actor should move toward it.
    NotInRange,
    /// The target does not exist or cannot receive this verb.
    InvalidTarget,
    /// The actor (or source) lacks the resource the action needs.
    NotEnoughResources,
    /// The destination has no free capacity.
    Full,
    /// The target is occupied with a multi-tick job (e.g. a producing factory).
    Busy,
}
