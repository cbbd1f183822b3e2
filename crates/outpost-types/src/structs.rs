//! Core entity structs for the Outpost decision engine.
//!
//! Everything here is a *snapshot* type: world queries return owned copies
//! that are valid for the current tick only. The decision core never holds
//! a snapshot across ticks — only the small [`AgentMemory`] record persists,
//! and the host environment owns that storage.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{CapabilityModule, FacilityKind, ResourceKind, RoleKind, TaskState};
use crate::ids::{EntityId, ZoneId};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A position on a zone's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal grid coordinate.
    pub x: i32,
    /// Vertical grid coordinate.
    pub y: i32,
}

impl Position {
    /// Create a position from coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance to another position.
    pub const fn distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Whether the other position is within interaction range (the same
    /// cell or one of the eight neighbouring cells).
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) <= 1
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// A current/max health pair. Invariant: `current <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Current health.
    pub current: u32,
    /// Maximum health.
    pub max: u32,
}

impl Health {
    /// Create a full-health pair.
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Whether current health is below maximum.
    pub const fn is_damaged(self) -> bool {
        self.current < self.max
    }

    /// Whether current health has reached maximum.
    pub const fn is_full(self) -> bool {
        self.current >= self.max
    }

    /// Compare health ratios (`current / max`) without floating point,
    /// by cross-multiplying in `u64`. A zero `max` compares as full.
    pub fn ratio_cmp(self, other: Self) -> Ordering {
        let lhs = u64::from(self.current).saturating_mul(u64::from(other.max.max(1)));
        let rhs = u64::from(other.current).saturating_mul(u64::from(self.max.max(1)));
        lhs.cmp(&rhs)
    }

    /// Whether this health ratio is strictly below `pct` percent of max.
    pub fn is_below_pct(self, pct: u32) -> bool {
        let lhs = u64::from(self.current).saturating_mul(100);
        let rhs = u64::from(self.max).saturating_mul(u64::from(pct));
        lhs < rhs
    }
}

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

/// A typed resource store with a shared capacity across resource kinds.
/// Invariant: total held never exceeds `capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stock {
    /// Maximum total units across all resource kinds.
    pub capacity: u32,
    /// Held units per resource kind.
    pub held: BTreeMap<ResourceKind, u32>,
}

impl Stock {
    /// Create an empty stock with the given capacity.
    pub const fn empty(capacity: u32) -> Self {
        Self {
            capacity,
            held: BTreeMap::new(),
        }
    }

    /// Total units held across all resource kinds.
    pub fn used(&self) -> u32 {
        self.held
            .values()
            .fold(0_u32, |acc, qty| acc.saturating_add(*qty))
    }

    /// Remaining capacity shared by all resource kinds.
    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.used())
    }

    /// Units held of one resource kind.
    pub fn amount_of(&self, resource: ResourceKind) -> u32 {
        self.held.get(&resource).copied().unwrap_or(0)
    }

    /// Whether no capacity remains.
    pub fn is_full(&self) -> bool {
        self.free_capacity() == 0
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.used() == 0
    }

    /// Compare fill ratios (`used / capacity`) without floating point.
    /// A zero-capacity stock compares as empty.
    pub fn fill_cmp(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.used()).saturating_mul(u64::from(other.capacity.max(1)));
        let rhs = u64::from(other.used()).saturating_mul(u64::from(self.capacity.max(1)));
        lhs.cmp(&rhs)
    }
}

// ---------------------------------------------------------------------------
// World entities
// ---------------------------------------------------------------------------

/// A zone snapshot: a bounded world region with its production budget.
///
/// `energy_available` is the sum of energy stored in the zone's factories
/// and capacitors and acts as the production budget ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// The zone's identifier.
    pub id: ZoneId,
    /// Human-readable zone name.
    pub name: String,
    /// Energy currently available for production.
    pub energy_available: u32,
    /// Upper bound on `energy_available` given current facilities.
    pub energy_capacity: u32,
}

/// A stationary facility snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    /// The facility's identifier.
    pub id: EntityId,
    /// The zone the facility stands in.
    pub zone: ZoneId,
    /// What kind of facility this is.
    pub kind: FacilityKind,
    /// Current/max health.
    pub health: Health,
    /// Resource store, if this facility kind has one.
    pub stock: Option<Stock>,
    /// Grid position.
    pub pos: Position,
}

impl Facility {
    /// Free energy capacity, or zero for facilities without a store.
    pub fn free_energy_capacity(&self) -> u32 {
        self.stock.as_ref().map_or(0, Stock::free_capacity)
    }

    /// Stored energy, or zero for facilities without a store.
    pub fn stored_energy(&self) -> u32 {
        self.stock
            .as_ref()
            .map_or(0, |s| s.amount_of(ResourceKind::Energy))
    }
}

/// A harvestable resource node snapshot.
/// Invariant: `available <= capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// The node's identifier.
    pub id: EntityId,
    /// The zone the node sits in.
    pub zone: ZoneId,
    /// What the node yields.
    pub resource: ResourceKind,
    /// Units currently extractable.
    pub available: u32,
    /// Ceiling `available` regenerates toward.
    pub capacity: u32,
    /// Units restored per tick by the host.
    pub regen_per_tick: u32,
    /// Grid position.
    pub pos: Position,
}

/// A facility under construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// The site's identifier.
    pub id: EntityId,
    /// The zone the site sits in.
    pub zone: ZoneId,
    /// The facility kind the site becomes when finished.
    pub kind: FacilityKind,
    /// Build progress accumulated so far.
    pub progress: u32,
    /// Progress required to finish.
    pub total: u32,
    /// Grid position.
    pub pos: Position,
}

/// A dropped resource pile awaiting pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salvage {
    /// The pile's identifier.
    pub id: EntityId,
    /// The zone the pile lies in.
    pub zone: ZoneId,
    /// What the pile contains.
    pub resource: ResourceKind,
    /// Units in the pile.
    pub amount: u32,
    /// Grid position.
    pub pos: Position,
}

/// An agent snapshot.
///
/// The role tag lives in the agent's persisted [`AgentMemory`], not here:
/// the snapshot is world-observable state only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// The agent's identifier.
    pub id: EntityId,
    /// Unique name; the key of the agent's persisted memory record.
    pub name: String,
    /// The zone the agent is in.
    pub zone: ZoneId,
    /// Whether the agent belongs to a hostile force.
    pub hostile: bool,
    /// Current/max health.
    pub health: Health,
    /// Carried resources.
    pub stock: Stock,
    /// Grid position.
    pub pos: Position,
    /// Capability loadout, fixed at creation.
    pub loadout: Vec<CapabilityModule>,
    /// The tick the agent was produced on.
    pub created_tick: u64,
}

impl Agent {
    /// Count of one capability module in the loadout.
    pub fn module_count(&self, module: CapabilityModule) -> u32 {
        let count = self.loadout.iter().filter(|m| **m == module).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

// ---------------------------------------------------------------------------
// Agent memory
// ---------------------------------------------------------------------------

/// The small per-agent record that survives between ticks.
///
/// Persisted by the host keyed on agent name; deleted by housekeeping once
/// the agent no longer exists. Everything else the state machines need is
/// re-read from the world every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMemory {
    /// The agent's role, set at creation and never changed.
    pub role: RoleKind,
    /// Current task state; `None` until the first tick runs.
    #[serde(default)]
    pub state: Option<TaskState>,
    /// Persisted gather source (a resource node), if one has been picked.
    #[serde(default)]
    pub source: Option<EntityId>,
    /// Persisted work target (repair or refill), if one has been chosen.
    #[serde(default)]
    pub target: Option<EntityId>,
}

impl AgentMemory {
    /// A fresh record for a newly produced agent of the given role.
    pub const fn new(role: RoleKind) -> Self {
        Self {
            role,
            state: None,
            source: None,
            target: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Module catalog
// ---------------------------------------------------------------------------

/// One module's allocation parameters in a role's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// The capability module this entry sizes.
    pub module: CapabilityModule,
    /// Cost of one unit.
    pub unit_cost: u32,
    /// Share of the total budget this module may consume, in percent
    /// (1..=100).
    pub budget_share_pct: u32,
    /// Upper bound on this module's count in one loadout; `None` means
    /// unlimited.
    pub per_agent_limit: Option<u32>,
    /// A module appended together with this one as a bundle, if any.
    pub companion: Option<CapabilityModule>,
}

impl ModuleEntry {
    /// An entry with no per-agent limit and no companion.
    pub const fn new(module: CapabilityModule, unit_cost: u32, budget_share_pct: u32) -> Self {
        Self {
            module,
            unit_cost,
            budget_share_pct,
            per_agent_limit: None,
            companion: None,
        }
    }
}

/// A role's module catalog, in declared allocation order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleCatalog {
    /// Catalog entries; the allocator walks them in this order.
    pub entries: Vec<ModuleEntry>,
}

impl ModuleCatalog {
    /// Build a catalog from entries in declared order.
    pub const fn new(entries: Vec<ModuleEntry>) -> Self {
        Self { entries }
    }

    /// Look up the entry for a module, if declared.
    pub fn get(&self, module: CapabilityModule) -> Option<&ModuleEntry> {
        self.entries.iter().find(|e| e.module == module)
    }

    /// Unit cost of a module, or zero when the module is not declared.
    pub fn cost_of(&self, module: CapabilityModule) -> u32 {
        self.get(module).map_or(0, |e| e.unit_cost)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_distance_and_adjacency() {
        let a = Position::new(3, 4);
        assert_eq!(a.distance(Position::new(3, 4)), 0);
        assert_eq!(a.distance(Position::new(4, 5)), 1);
        assert_eq!(a.distance(Position::new(6, 4)), 3);
        assert!(a.is_adjacent(Position::new(2, 5)));
        assert!(!a.is_adjacent(Position::new(5, 4)));
    }

    #[test]
    fn health_ratio_ordering() {
        let low = Health { current: 20, max: 100 };
        let high = Health { current: 90, max: 100 };
        assert_eq!(low.ratio_cmp(high), Ordering::Less);
        assert_eq!(high.ratio_cmp(low), Ordering::Greater);
        // 1/2 == 50/100
        let half_small = Health { current: 1, max: 2 };
        let half_big = Health { current: 50, max: 100 };
        assert_eq!(half_small.ratio_cmp(half_big), Ordering::Equal);
    }

    #[test]
    fn health_pct_threshold() {
        let h = Health { current: 74, max: 100 };
        assert!(h.is_below_pct(75));
        let h = Health { current: 75, max: 100 };
        assert!(!h.is_below_pct(75));
    }

    #[test]
    fn stock_accounting() {
        let mut stock = Stock::empty(100);
        stock.held.insert(ResourceKind::Energy, 30);
        stock.held.insert(ResourceKind::Metal, 20);
        assert_eq!(stock.used(), 50);
        assert_eq!(stock.free_capacity(), 50);
        assert_eq!(stock.amount_of(ResourceKind::Energy), 30);
        assert!(!stock.is_full());
        assert!(!stock.is_empty());
    }

    #[test]
    fn stock_fill_ordering() {
        let mut fuller = Stock::empty(100);
        fuller.held.insert(ResourceKind::Energy, 80);
        let mut emptier = Stock::empty(200);
        emptier.held.insert(ResourceKind::Energy, 40);
        assert_eq!(fuller.fill_cmp(&emptier), Ordering::Greater);
    }

    #[test]
    fn memory_roundtrip_serde() {
        let mut memory = AgentMemory::new(RoleKind::Maintainer);
        memory.state = Some(TaskState::Fixing);
        memory.target = Some(EntityId::new());
        let json = serde_json::to_string(&memory).unwrap();
        let restored: AgentMemory = serde_json::from_str(&json).unwrap();
        assert_eq!(memory, restored);
    }

    #[test]
    fn memory_missing_optionals_deserialize() {
        let restored: AgentMemory =
            serde_json::from_str(r#"{"role":"Scout"}"#).unwrap();
        assert_eq!(restored.role, RoleKind::Scout);
        assert!(restored.state.is_none());
        assert!(restored.source.is_none());
        assert!(restored.target.is_none());
    }

    #[test]
    fn catalog_lookup_and_cost() {
        let catalog = ModuleCatalog::new(vec![
            ModuleEntry::new(CapabilityModule::Work, 100, 50),
            ModuleEntry::new(CapabilityModule::Carry, 50, 25),
        ]);
        assert_eq!(catalog.cost_of(CapabilityModule::Work), 100);
        assert_eq!(catalog.cost_of(CapabilityModule::Move), 0);
        assert!(catalog.get(CapabilityModule::Carry).is_some());
    }
}
