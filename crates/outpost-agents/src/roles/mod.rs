//! Role task state machines.
//!
//! Each role is one implementation of the [`Role`] trait: a named-state
//! machine that inspects one agent's memory and the world, performs at most
//! one world-mutating action per tick, and writes the next state back into
//! memory. The next state is always fully determined by the current state
//! and the action's same-tick status code; the only randomness anywhere is
//! the initial gather-source pick, which is persisted on first use.
//!
//! Failure semantics: a status outside a handler's explicitly handled set
//! is logged and treated as a no-op — the agent stays in its state and
//! retries next tick. One agent's confusion never stops the loop.

pub mod builder;
pub mod charger;
pub mod harvester;
pub mod loader;
pub mod maintainer;
pub mod scout;

use rand::Rng;
use tracing::{debug, warn};

use outpost_types::{
    ActionStatus, ActionVerb, Agent, AgentMemory, CapabilityModule, FacilityKind, ModuleCatalog,
    ResourceKind, RoleKind, TaskState, ZoneId,
};
use outpost_world::World;

pub use builder::Builder;
pub use charger::Charger;
pub use harvester::Harvester;
pub use loader::Loader;
pub use maintainer::Maintainer;
pub use scout::Scout;

/// A behavior template shared by all agents of one role.
///
/// Implementations are immutable at runtime; one instance per role lives in
/// the [`RoleRoster`] and is shared by every agent of that role.
pub trait Role {
    /// Which role this is.
    fn kind(&self) -> RoleKind;

    /// How many agents of this role the zone wants right now. Zero means
    /// the role should not be produced (and excess members are
    /// decommissioned).
    fn desired_count(&self, world: &dyn World, zone: ZoneId) -> u32;

    /// The module catalog used to size this role's loadouts.
    fn catalog(&self) -> ModuleCatalog;

    /// The minimum loadout every agent of this role is guaranteed.
    fn min_loadout(&self) -> Vec<CapabilityModule>;

    /// The task states this role's machine declares.
    fn states(&self) -> &'static [TaskState];

    /// The state entered when memory holds no recognized state.
    fn initial_state(&self) -> TaskState;

    /// Execute one tick for one agent in the given (validated) state and
    /// return the next state.
    fn handle(
        &self,
        state: TaskState,
        agent: &Agent,
        memory: &mut AgentMemory,
        world: &mut dyn World,
    ) -> TaskState;

    /// Run one tick for one agent: validate the persisted state, dispatch
    /// the handler, and write the next state back into memory.
    ///
    /// An unrecognized or missing state resets to the initial state and
    /// performs no action this tick.
    fn run(&self, agent: &Agent, memory: &mut AgentMemory, world: &mut dyn World) {
        let Some(state) = memory.state.filter(|s| self.states().contains(s)) else {
            debug!(
                agent = %agent.name,
                role = %self.kind(),
                state = ?self.initial_state(),
                "Resetting task state"
            );
            memory.state = Some(self.initial_state());
            return;
        };
        let next = self.handle(state, agent, memory, world);
        memory.state = Some(next);
    }
}

/// The role catalog, in declared processing order.
///
/// The order here is the order the population controller reconciles roles
/// in, which in turn decides which role's agents claim contested targets
/// first within a tick.
pub struct RoleRoster {
    roles: Vec<Box<dyn Role>>,
}

impl RoleRoster {
    /// The standard six-role roster.
    pub fn standard() -> Self {
        Self {
            roles: vec![
                Box::new(Harvester),
                Box::new(Charger),
                Box::new(Builder),
                Box::new(Maintainer),
                Box::new(Loader),
                Box::new(Scout),
            ],
        }
    }

    /// Iterate roles in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Role> {
        self.roles.iter().map(|role| role.as_ref())
    }

    /// Look up one role by kind.
    pub fn get(&self, kind: RoleKind) -> Option<&dyn Role> {
        self.iter().find(|role| role.kind() == kind)
    }
}

impl Default for RoleRoster {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Shared handlers
// ---------------------------------------------------------------------------

/// Gather energy from the agent's persisted source node.
///
/// A full stock transitions to `when_full` without acting. The source is
/// picked uniformly at random on first use and persisted; it is only
/// cleared when the world reports it invalid. `NotInRange` issues
/// fire-and-forget movement toward the source the same tick.
pub(crate) fn gather(
    agent: &Agent,
    memory: &mut AgentMemory,
    world: &mut dyn World,
    current: TaskState,
    when_full: TaskState,
) -> TaskState {
    if agent.stock.is_full() {
        return when_full;
    }

    let source = match memory.source {
        Some(id) => id,
        None => {
            let nodes = world.nodes(agent.zone);
            if nodes.is_empty() {
                rally(agent, world);
                return current;
            }
            let idx = rand::rng().random_range(0..nodes.len());
            let Some(node) = nodes.get(idx) else {
                return current;
            };
            debug!(agent = %agent.name, source = %node.id, "Picked gather source");
            memory.source = Some(node.id);
            node.id
        }
    };

    match world.perform(agent.id, ActionVerb::Harvest, source, Some(ResourceKind::Energy)) {
        ActionStatus::Ok => current,
        ActionStatus::NotInRange => {
            world.move_toward(agent.id, source);
            current
        }
        ActionStatus::InvalidTarget => {
            // Stale source; re-select next tick.
            memory.source = None;
            current
        }
        ActionStatus::NotEnoughResources => {
            // Node ran dry; it regenerates, so wait in place.
            current
        }
        other => {
            warn!(agent = %agent.name, status = ?other, "Unhandled harvest status");
            current
        }
    }
}

/// Move toward the zone's rally point (its first factory).
pub(crate) fn rally(agent: &Agent, world: &mut dyn World) {
    let factory = world
        .facilities(agent.zone)
        .iter()
        .find(|f| f.kind == FacilityKind::Factory)
        .map(|f| f.id);
    if let Some(id) = factory {
        world.move_toward(agent.id, id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    //! Fixture helpers shared by the role test suites.

    use outpost_types::{Position, RoleKind};
    use outpost_world::{SimWorld, stock};

    use super::*;

    /// A standard worker loadout.
    pub fn worker_loadout() -> Vec<CapabilityModule> {
        vec![
            CapabilityModule::Carry,
            CapabilityModule::Move,
            CapabilityModule::Work,
        ]
    }

    /// One zone with a factory at (10, 10) and a node at (2, 2).
    pub fn gather_world() -> (SimWorld, ZoneId) {
        let mut world = SimWorld::new();
        let zone = world.add_zone("Test");
        world
            .add_facility(zone, FacilityKind::Factory, Position::new(10, 10))
            .unwrap();
        world.add_node(zone, 1_000, 1_000, 10, Position::new(2, 2)).unwrap();
        (world, zone)
    }

    /// Add a friendly agent of `role` and return its snapshot and memory.
    pub fn spawn_member(
        world: &mut SimWorld,
        zone: ZoneId,
        role: RoleKind,
        name: &str,
        pos: Position,
    ) -> (Agent, AgentMemory) {
        world
            .add_agent(zone, name, AgentMemory::new(role), worker_loadout(), pos)
            .unwrap();
        let agent = world.agent_by_name(name).unwrap();
        let memory = World::memory(world, name).unwrap();
        (agent, memory)
    }

    /// Fill an agent's stock with energy.
    pub fn fill_with_energy(world: &mut SimWorld, agent: &Agent) {
        let free = agent.stock.free_capacity();
        if let Some(a) = world.agent_mut(agent.id) {
            stock::deposit(&mut a.stock, ResourceKind::Energy, free).unwrap();
        }
    }

    /// Run one tick of `role` for the named agent against live world state,
    /// returning the updated memory.
    pub fn run_once(role: &dyn Role, world: &mut SimWorld, name: &str) -> AgentMemory {
        let agent = world.agent_by_name(name).unwrap();
        let mut memory = World::memory(world, name).unwrap();
        role.run(&agent, &mut memory, world);
        World::set_memory(world, name, memory.clone());
        memory
    }

    #[test]
    fn unrecognized_state_resets_to_initial() {
        let (mut world, zone) = gather_world();
        let (agent, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Harvester, "h-1", Position::new(3, 3));
        // A state the harvester never declares.
        memory.state = Some(TaskState::Fixing);

        Harvester.run(&agent, &mut memory, &mut world);

        assert_eq!(memory.state, Some(TaskState::Harvesting));
        // The reset tick performs no action: no source picked yet.
        assert!(memory.source.is_none());
    }

    #[test]
    fn roster_is_in_declared_order() {
        let roster = RoleRoster::standard();
        let kinds: Vec<RoleKind> = roster.iter().map(Role::kind).collect();
        assert_eq!(
            kinds,
            vec![
                RoleKind::Harvester,
                RoleKind::Charger,
                RoleKind::Builder,
                RoleKind::Maintainer,
                RoleKind::Loader,
                RoleKind::Scout,
            ]
        );
        assert!(roster.get(RoleKind::Scout).is_some());
    }
}
