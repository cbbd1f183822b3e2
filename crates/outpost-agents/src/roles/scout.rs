//! Scout: travels to the zone beacon and holds position there.
//!
//! Two states and no actions — the scout only moves. `Returning` walks
//! back to the rally factory and flips once adjacent; `Scouting` walks to
//! the beacon and holds. A removed beacon sends the scout home, and the
//! role's desired count drops to zero with it.

use outpost_types::{
    Agent, AgentMemory, CapabilityModule, FacilityKind, ModuleCatalog, ModuleEntry, RoleKind,
    TaskState, ZoneId,
};
use outpost_world::World;

use super::Role;

/// The scout role.
pub struct Scout;

impl Role for Scout {
    fn kind(&self) -> RoleKind {
        RoleKind::Scout
    }

    // Staffed only while a beacon is placed.
    fn desired_count(&self, world: &dyn World, zone: ZoneId) -> u32 {
        let has_beacon = world
            .facilities(zone)
            .iter()
            .any(|f| f.kind == FacilityKind::Beacon);
        if has_beacon { 1 } else { 0 }
    }

    fn catalog(&self) -> ModuleCatalog {
        ModuleCatalog::new(vec![
            ModuleEntry::new(CapabilityModule::Work, 100, 33),
            ModuleEntry::new(CapabilityModule::Carry, 50, 25),
            ModuleEntry::new(CapabilityModule::Move, 50, 25),
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
        &[TaskState::Returning, TaskState::Scouting]
    }

    fn initial_state(&self) -> TaskState {
        TaskState::Returning
    }

    fn handle(
        &self,
        state: TaskState,
        agent: &Agent,
        _memory: &mut AgentMemory,
        world: &mut dyn World,
    ) -> TaskState {
        match state {
            TaskState::Scouting => scout(agent, world),
            _ => go_home(agent, world),
        }
    }
}

fn go_home(agent: &Agent, world: &mut dyn World) -> TaskState {
    let factory = world
        .facilities(agent.zone)
        .iter()
        .find(|f| f.kind == FacilityKind::Factory)
        .map(|f| (f.id, f.pos));
    let Some((factory, pos)) = factory else {
        return TaskState::Returning;
    };

    if agent.pos.is_adjacent(pos) {
        return TaskState::Scouting;
    }
    world.move_toward(agent.id, factory);
    TaskState::Returning
}

fn scout(agent: &Agent, world: &mut dyn World) -> TaskState {
    let beacon = world
        .facilities(agent.zone)
        .iter()
        .find(|f| f.kind == FacilityKind::Beacon)
        .map(|f| (f.id, f.pos));
    let Some((beacon, pos)) = beacon else {
        return TaskState::Returning;
    };

    if !agent.pos.is_adjacent(pos) {
        world.move_toward(agent.id, beacon);
    }
    TaskState::Scouting
}
