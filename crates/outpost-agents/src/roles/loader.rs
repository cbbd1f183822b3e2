//! Loader: keeps turrets stocked with energy.
//!
//! Three states. `Waiting` idles at the rally point until a turret has
//! meaningful headroom, then locks onto it. `Harvesting` prefers
//! withdrawing from the fullest storehouse or cache before falling back to
//! node harvest. `Refilling` feeds the persisted turret until it has no
//! free capacity left.

use tracing::warn;

use outpost_types::{
    ActionStatus, ActionVerb, Agent, AgentMemory, CapabilityModule, FacilityKind, ModuleCatalog,
    ModuleEntry, ResourceKind, RoleKind, TaskState, ZoneId,
};
use outpost_world::World;

use crate::selector::{Metric, rank};

use super::{Role, gather, rally};

/// A turret only becomes a refill target once its free energy capacity
/// exceeds this headroom, so loaders do not chase single-shot top-ups.
pub const REFILL_HEADROOM: u32 = 200;

/// Withdrawal sources, preferred before harvesting from nodes.
pub const WITHDRAW_PRIORITY: [FacilityKind; 2] =
    [FacilityKind::Storehouse, FacilityKind::Cache];

/// The loader role.
pub struct Loader;

impl Role for Loader {
    fn kind(&self) -> RoleKind {
        RoleKind::Loader
    }

    // Only staffed while the zone has turrets to feed.
    fn desired_count(&self, world: &dyn World, zone: ZoneId) -> u32 {
        let has_turret = world
            .facilities(zone)
            .iter()
            .any(|f| f.kind == FacilityKind::Turret);
        if has_turret { 2 } else { 0 }
    }

    fn catalog(&self) -> ModuleCatalog {
        ModuleCatalog::new(vec![
            ModuleEntry::new(CapabilityModule::Work, 100, 30),
            ModuleEntry::new(CapabilityModule::Carry, 50, 20),
            ModuleEntry::new(CapabilityModule::Move, 50, 50),
        ])
    }

    fn min_loadout(&self) -> Vec<CapabilityModule> {
        vec![
            CapabilityModule::Work,
            CapabilityModule::Carry,
            CapabilityModule::Move,
        ]
    }

    fn states(&self) -> &'static [TaskState] {
        &[
            TaskState::Waiting,
            TaskState::Harvesting,
            TaskState::Refilling,
        ]
    }

    fn initial_state(&self) -> TaskState {
        TaskState::Waiting
    }

    fn handle(
        &self,
        state: TaskState,
        agent: &Agent,
        memory: &mut AgentMemory,
        world: &mut dyn World,
    ) -> TaskState {
        match state {
            TaskState::Harvesting => restock(agent, memory, world),
            TaskState::Refilling => refill(agent, memory, world),
            _ => wait(agent, memory, world),
        }
    }
}

fn wait(agent: &Agent, memory: &mut AgentMemory, world: &mut dyn World) -> TaskState {
    let needy = world
        .facilities(agent.zone)
        .iter()
        .find(|f| f.kind == FacilityKind::Turret && f.free_energy_capacity() > REFILL_HEADROOM)
        .map(|f| f.id);

    if let Some(turret) = needy {
        memory.target = Some(turret);
        return TaskState::Refilling;
    }

    if !agent.stock.is_full() {
        return TaskState::Harvesting;
    }

    // Loaded and nothing to feed: hold at the rally point.
    rally(agent, world);
    TaskState::Waiting
}

/// Fill the cargo, preferring the fullest store over raw harvesting.
fn restock(agent: &Agent, memory: &mut AgentMemory, world: &mut dyn World) -> TaskState {
    if agent.stock.is_full() {
        return TaskState::Waiting;
    }

    let candidates: Vec<_> = world
        .facilities(agent.zone)
        .into_iter()
        .filter(|f| WITHDRAW_PRIORITY.contains(&f.kind) && f.stored_energy() > 0)
        .collect();
    let ranked = rank(candidates, &WITHDRAW_PRIORITY, Metric::FillDescending);

    let Some(store) = ranked.first() else {
        return gather(agent, memory, world, TaskState::Harvesting, TaskState::Waiting);
    };

    match world.perform(
        agent.id,
        ActionVerb::Withdraw,
        store.id,
        Some(ResourceKind::Energy),
    ) {
        ActionStatus::Ok => TaskState::Harvesting,
        ActionStatus::NotInRange => {
            world.move_toward(agent.id, store.id);
            TaskState::Harvesting
        }
        // Drained or gone since the query; re-rank next tick.
        ActionStatus::NotEnoughResources | ActionStatus::InvalidTarget => TaskState::Harvesting,
        ActionStatus::Full => TaskState::Waiting,
        other => {
            warn!(agent = %agent.name, status = ?other, "Unhandled withdraw status");
            TaskState::Harvesting
        }
    }
}

fn refill(agent: &Agent, memory: &mut AgentMemory, world: &mut dyn World) -> TaskState {
    let Some(target) = memory.target else {
        return TaskState::Waiting;
    };

    match world.perform(
        agent.id,
        ActionVerb::Transfer,
        target,
        Some(ResourceKind::Energy),
    ) {
        ActionStatus::InvalidTarget => {
            memory.target = None;
            TaskState::Waiting
        }
        ActionStatus::NotInRange => {
            world.move_toward(agent.id, target);
            TaskState::Refilling
        }
        ActionStatus::NotEnoughResources => TaskState::Harvesting,
        ActionStatus::Full => {
            memory.target = None;
            TaskState::Waiting
        }
        ActionStatus::Ok => {
            // Keep feeding until the turret has no free capacity.
            let topped_up = world
                .facility(target)
                .is_none_or(|f| f.free_energy_capacity() == 0);
            if topped_up {
                memory.target = None;
                TaskState::Waiting
            } else {
                TaskState::Refilling
            }
        }
        other => {
            warn!(agent = %agent.name, status = ?other, "Unhandled refill status");
            TaskState::Refilling
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::Position;
    use outpost_world::{SimWorld, stock};

    use super::super::test_support::{fill_with_energy, run_once, spawn_member};
    use super::*;

    fn turret_world() -> (SimWorld, ZoneId, outpost_types::EntityId) {
        let mut world = SimWorld::new();
        let zone = world.add_zone("Test");
        world
            .add_facility(zone, FacilityKind::Factory, Position::new(10, 10))
            .unwrap();
        let turret = world
            .add_facility(zone, FacilityKind::Turret, Position::new(5, 5))
            .unwrap();
        world.add_node(zone, 1_000, 1_000, 10, Position::new(2, 2)).unwrap();
        (world, zone, turret)
    }

    #[test]
    fn desired_count_requires_turrets() {
        let (world, zone, _) = turret_world();
        assert_eq!(Loader.desired_count(&world, zone), 2);

        let mut bare = SimWorld::new();
        let bare_zone = bare.add_zone("Bare");
        assert_eq!(Loader.desired_count(&bare, bare_zone), 0);
    }

    #[test]
    fn waiting_locks_onto_needy_turret() {
        let (mut world, zone, turret) = turret_world();
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Loader, "l-1", Position::new(8, 8));
        memory.state = Some(TaskState::Waiting);
        World::set_memory(&mut world, "l-1", memory);

        let memory = run_once(&Loader, &mut world, "l-1");
        assert_eq!(memory.state, Some(TaskState::Refilling));
        assert_eq!(memory.target, Some(turret));
    }

    #[test]
    fn waiting_with_topped_up_turret_goes_harvesting() {
        let (mut world, zone, turret) = turret_world();
        // Leave less than the headroom free.
        if let Some(store) = world.facility_mut(turret).and_then(|f| f.stock.as_mut()) {
            stock::deposit(store, ResourceKind::Energy, 900).unwrap();
        }
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Loader, "l-1", Position::new(8, 8));
        memory.state = Some(TaskState::Waiting);
        World::set_memory(&mut world, "l-1", memory);

        let memory = run_once(&Loader, &mut world, "l-1");
        assert_eq!(memory.state, Some(TaskState::Harvesting));
    }

    #[test]
    fn restock_withdraws_from_fullest_store() {
        let (mut world, zone, _) = turret_world();
        let cache = world
            .add_facility(zone, FacilityKind::Cache, Position::new(8, 9))
            .unwrap();
        if let Some(store) = world.facility_mut(cache).and_then(|f| f.stock.as_mut()) {
            stock::deposit(store, ResourceKind::Energy, 1_500).unwrap();
        }
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Loader, "l-1", Position::new(8, 8));
        memory.state = Some(TaskState::Harvesting);
        World::set_memory(&mut world, "l-1", memory);

        let memory = run_once(&Loader, &mut world, "l-1");
        assert_eq!(memory.state, Some(TaskState::Harvesting));
        let loader = world.agent_by_name("l-1").unwrap();
        assert!(
            loader.stock.amount_of(ResourceKind::Energy) > 0,
            "withdrawal must beat node harvest when a store has energy"
        );
        // The node was untouched.
        let node = world.nodes(zone).into_iter().next().unwrap();
        assert_eq!(node.available, 1_000);
    }

    #[test]
    fn refill_feeds_turret_until_topped_up() {
        let (mut world, zone, turret) = turret_world();
        // 960 stored: 40 free, topped up after one 40-unit transfer.
        if let Some(store) = world.facility_mut(turret).and_then(|f| f.stock.as_mut()) {
            stock::deposit(store, ResourceKind::Energy, 960).unwrap();
        }
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Loader, "l-1", Position::new(5, 6));
        memory.state = Some(TaskState::Refilling);
        memory.target = Some(turret);
        World::set_memory(&mut world, "l-1", memory);
        let agent = world.agent_by_name("l-1").unwrap();
        fill_with_energy(&mut world, &agent);

        let memory = run_once(&Loader, &mut world, "l-1");
        assert_eq!(memory.state, Some(TaskState::Waiting));
        assert!(memory.target.is_none());
        assert_eq!(
            world.facility(turret).unwrap().free_energy_capacity(),
            0
        );
    }

    #[test]
    fn refill_with_empty_cargo_goes_harvesting() {
        let (mut world, zone, turret) = turret_world();
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Loader, "l-1", Position::new(5, 6));
        memory.state = Some(TaskState::Refilling);
        memory.target = Some(turret);
        World::set_memory(&mut world, "l-1", memory);

        let memory = run_once(&Loader, &mut world, "l-1");
        assert_eq!(memory.state, Some(TaskState::Harvesting));
    }
}
