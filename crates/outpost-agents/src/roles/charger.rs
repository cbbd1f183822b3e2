//! Charger: gathers energy and channels it into the zone core.
//!
//! Two states mirroring the harvester's loop, with the core as the only
//! destination. A zone without a core leaves the charger rallying until
//! one appears.

use tracing::warn;

use outpost_types::{
    ActionStatus, ActionVerb, Agent, AgentMemory, CapabilityModule, FacilityKind, ModuleCatalog,
    ModuleEntry, ResourceKind, RoleKind, TaskState, ZoneId,
};
use outpost_world::World;

use super::{Role, gather, rally};

/// The charger role.
pub struct Charger;

impl Role for Charger {
    fn kind(&self) -> RoleKind {
        RoleKind::Charger
    }

    // The core always wants feeding.
    fn desired_count(&self, _world: &dyn World, _zone: ZoneId) -> u32 {
        5
    }

    fn catalog(&self) -> ModuleCatalog {
        ModuleCatalog::new(vec![
            ModuleEntry::new(CapabilityModule::Work, 100, 30),
            ModuleEntry::new(CapabilityModule::Carry, 50, 40),
            ModuleEntry::new(CapabilityModule::Move, 50, 30),
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
        &[TaskState::Harvesting, TaskState::Charging]
    }

    fn initial_state(&self) -> TaskState {
        TaskState::Harvesting
    }

    fn handle(
        &self,
        state: TaskState,
        agent: &Agent,
        memory: &mut AgentMemory,
        world: &mut dyn World,
    ) -> TaskState {
        match state {
            TaskState::Charging => charge(agent, world),
            _ => gather(agent, memory, world, TaskState::Harvesting, TaskState::Charging),
        }
    }
}

fn charge(agent: &Agent, world: &mut dyn World) -> TaskState {
    if agent.stock.amount_of(ResourceKind::Energy) == 0 {
        return TaskState::Harvesting;
    }

    let core = world
        .facilities(agent.zone)
        .iter()
        .find(|f| f.kind == FacilityKind::Core)
        .map(|f| f.id);
    let Some(core) = core else {
        rally(agent, world);
        return TaskState::Charging;
    };

    match world.perform(agent.id, ActionVerb::Charge, core, Some(ResourceKind::Energy)) {
        ActionStatus::Ok => TaskState::Charging,
        ActionStatus::NotInRange => {
            world.move_toward(agent.id, core);
            TaskState::Charging
        }
        ActionStatus::NotEnoughResources => TaskState::Harvesting,
        // A saturated or rebuilt core clears up on its own; hold position.
        ActionStatus::Full | ActionStatus::InvalidTarget => TaskState::Charging,
        other => {
            warn!(agent = %agent.name, status = ?other, "Unhandled charge status");
            TaskState::Charging
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::Position;
    use outpost_world::SimWorld;

    use super::super::test_support::{fill_with_energy, run_once, spawn_member};
    use super::*;

    fn core_world() -> (SimWorld, ZoneId) {
        let mut world = SimWorld::new();
        let zone = world.add_zone("Test");
        world
            .add_facility(zone, FacilityKind::Factory, Position::new(10, 10))
            .unwrap();
        world
            .add_facility(zone, FacilityKind::Core, Position::new(5, 5))
            .unwrap();
        world.add_node(zone, 1_000, 1_000, 10, Position::new(2, 2)).unwrap();
        (world, zone)
    }

    #[test]
    fn charges_adjacent_core_and_stays() {
        let (mut world, zone) = core_world();
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Charger, "c-1", Position::new(5, 6));
        memory.state = Some(TaskState::Charging);
        World::set_memory(&mut world, "c-1", memory);
        let agent = world.agent_by_name("c-1").unwrap();
        fill_with_energy(&mut world, &agent);
        let before = world
            .agent_by_name("c-1")
            .unwrap()
            .stock
            .amount_of(ResourceKind::Energy);

        let memory = run_once(&Charger, &mut world, "c-1");
        assert_eq!(memory.state, Some(TaskState::Charging));
        let after = world
            .agent_by_name("c-1")
            .unwrap()
            .stock
            .amount_of(ResourceKind::Energy);
        assert!(after < before, "charging must spend carried energy");
    }

    #[test]
    fn empty_stock_flips_to_harvesting() {
        let (mut world, zone) = core_world();
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Charger, "c-1", Position::new(5, 6));
        memory.state = Some(TaskState::Charging);
        World::set_memory(&mut world, "c-1", memory);

        let memory = run_once(&Charger, &mut world, "c-1");
        assert_eq!(memory.state, Some(TaskState::Harvesting));
    }

    #[test]
    fn full_stock_flips_to_charging() {
        let (mut world, zone) = core_world();
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Charger, "c-1", Position::new(3, 3));
        memory.state = Some(TaskState::Harvesting);
        World::set_memory(&mut world, "c-1", memory);
        let agent = world.agent_by_name("c-1").unwrap();
        fill_with_energy(&mut world, &agent);

        let memory = run_once(&Charger, &mut world, "c-1");
        assert_eq!(memory.state, Some(TaskState::Charging));
    }
}
