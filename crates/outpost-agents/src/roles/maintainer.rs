//! Maintainer: collects salvage and keeps transit surfaces and
//! fortifications repaired.
//!
//! Four states. `Cleanup` sweeps dropped salvage; `Choosing` idles toward
//! the rally point while scanning for the most health-depleted repairable
//! facility; `Fixing` works the persisted target until it reaches full
//! health; `Harvesting` refills the stock when repairs run the cargo dry.

use tracing::warn;

use outpost_types::{
    ActionStatus, ActionVerb, Agent, AgentMemory, CapabilityModule, FacilityKind, ModuleCatalog,
    ModuleEntry, ResourceKind, RoleKind, TaskState, ZoneId,
};
use outpost_world::World;

use crate::selector::{Metric, rank};

use super::{Role, gather, rally};

/// Facility kinds the maintainer services, in repair priority order.
pub const REPAIR_PRIORITY: [FacilityKind; 3] = [
    FacilityKind::Conduit,
    FacilityKind::Barrier,
    FacilityKind::Bulwark,
];

/// A facility is repair-eligible below this percentage of max health.
pub const REPAIR_RATIO_PCT: u32 = 75;

/// The maintainer role.
pub struct Maintainer;

impl Role for Maintainer {
    fn kind(&self) -> RoleKind {
        RoleKind::Maintainer
    }

    // One caretaker per zone, always.
    fn desired_count(&self, _world: &dyn World, _zone: ZoneId) -> u32 {
        1
    }

    fn catalog(&self) -> ModuleCatalog {
        ModuleCatalog::new(vec![
            ModuleEntry::new(CapabilityModule::Work, 100, 50),
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
        &[
            TaskState::Cleanup,
            TaskState::Choosing,
            TaskState::Fixing,
            TaskState::Harvesting,
        ]
    }

    fn initial_state(&self) -> TaskState {
        TaskState::Cleanup
    }

    fn handle(
        &self,
        state: TaskState,
        agent: &Agent,
        memory: &mut AgentMemory,
        world: &mut dyn World,
    ) -> TaskState {
        match state {
            TaskState::Choosing => choose(agent, memory, world),
            TaskState::Fixing => fix(agent, memory, world),
            TaskState::Harvesting => {
                gather(agent, memory, world, TaskState::Harvesting, TaskState::Choosing)
            }
            _ => cleanup(agent, world),
        }
    }
}

fn cleanup(agent: &Agent, world: &mut dyn World) -> TaskState {
    let pile = world.salvage(agent.zone).first().map(|p| p.id);
    let Some(pile) = pile else {
        return TaskState::Choosing;
    };

    match world.perform(agent.id, ActionVerb::Pickup, pile, None) {
        ActionStatus::Ok => TaskState::Cleanup,
        ActionStatus::NotInRange => {
            world.move_toward(agent.id, pile);
            TaskState::Cleanup
        }
        ActionStatus::Full => TaskState::Choosing,
        // Someone else got there first; re-query next tick.
        ActionStatus::InvalidTarget => TaskState::Cleanup,
        other => {
            warn!(agent = %agent.name, status = ?other, "Unhandled pickup status");
            TaskState::Cleanup
        }
    }
}

fn choose(agent: &Agent, memory: &mut AgentMemory, world: &mut dyn World) -> TaskState {
    // Drift toward the rally point while scanning.
    rally(agent, world);

    let candidates: Vec<_> = world
        .facilities(agent.zone)
        .into_iter()
        .filter(|f| REPAIR_PRIORITY.contains(&f.kind) && f.health.is_below_pct(REPAIR_RATIO_PCT))
        .collect();
    let ranked = rank(candidates, &REPAIR_PRIORITY, Metric::HealthRatioAscending);

    match ranked.first() {
        Some(target) => {
            memory.target = Some(target.id);
            TaskState::Fixing
        }
        None => TaskState::Harvesting,
    }
}

fn fix(agent: &Agent, memory: &mut AgentMemory, world: &mut dyn World) -> TaskState {
    let Some(target) = memory.target else {
        return TaskState::Choosing;
    };

    match world.perform(agent.id, ActionVerb::Repair, target, None) {
        ActionStatus::InvalidTarget => {
            memory.target = None;
            TaskState::Choosing
        }
        ActionStatus::NotInRange => {
            world.move_toward(agent.id, target);
            TaskState::Fixing
        }
        ActionStatus::NotEnoughResources => TaskState::Harvesting,
        ActionStatus::Ok => {
            // Work the target until it is whole, then pick the next one.
            if world.facility(target).is_none_or(|f| f.health.is_full()) {
                memory.target = None;
                TaskState::Choosing
            } else {
                TaskState::Fixing
            }
        }
        other => {
            warn!(agent = %agent.name, status = ?other, "Unhandled repair status");
            TaskState::Fixing
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

    fn repair_world() -> (SimWorld, ZoneId) {
        let mut world = SimWorld::new();
        let zone = world.add_zone("Test");
        world
            .add_facility(zone, FacilityKind::Factory, Position::new(10, 10))
            .unwrap();
        world.add_node(zone, 1_000, 1_000, 10, Position::new(2, 2)).unwrap();
        (world, zone)
    }

    #[test]
    fn cleanup_sweeps_salvage_then_chooses() {
        let (mut world, zone) = repair_world();
        world
            .add_salvage(zone, ResourceKind::Energy, 20, Position::new(4, 4))
            .unwrap();
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Maintainer, "m-1", Position::new(4, 5));
        memory.state = Some(TaskState::Cleanup);
        World::set_memory(&mut world, "m-1", memory);

        let memory = run_once(&Maintainer, &mut world, "m-1");
        assert_eq!(memory.state, Some(TaskState::Cleanup));
        assert!(world.salvage(zone).is_empty(), "pile must be swept");
        assert_eq!(
            world
                .agent_by_name("m-1")
                .unwrap()
                .stock
                .amount_of(ResourceKind::Energy),
            20
        );

        // Nothing left to sweep: move on to choosing work.
        let memory = run_once(&Maintainer, &mut world, "m-1");
        assert_eq!(memory.state, Some(TaskState::Choosing));
    }

    #[test]
    fn choosing_targets_most_depleted_conduit() {
        let (mut world, zone) = repair_world();
        let healthy = world
            .add_facility(zone, FacilityKind::Conduit, Position::new(5, 5))
            .unwrap();
        let worn = world
            .add_facility(zone, FacilityKind::Conduit, Position::new(6, 6))
            .unwrap();
        if let Some(f) = world.facility_mut(worn) {
            f.health.current = 1_000;
        }
        if let Some(f) = world.facility_mut(healthy) {
            f.health.current = 3_000;
        }
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Maintainer, "m-1", Position::new(7, 7));
        memory.state = Some(TaskState::Choosing);
        World::set_memory(&mut world, "m-1", memory);

        let memory = run_once(&Maintainer, &mut world, "m-1");
        assert_eq!(memory.state, Some(TaskState::Fixing));
        assert_eq!(memory.target, Some(worn));
    }

    #[test]
    fn facilities_above_ratio_gate_are_ignored() {
        let (mut world, zone) = repair_world();
        let conduit = world
            .add_facility(zone, FacilityKind::Conduit, Position::new(5, 5))
            .unwrap();
        if let Some(f) = world.facility_mut(conduit) {
            // 80% of max: above the 75% eligibility gate.
            f.health.current = 4_000;
        }
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Maintainer, "m-1", Position::new(7, 7));
        memory.state = Some(TaskState::Choosing);
        World::set_memory(&mut world, "m-1", memory);

        let memory = run_once(&Maintainer, &mut world, "m-1");
        assert_eq!(memory.state, Some(TaskState::Harvesting));
    }

    #[test]
    fn fixing_until_full_then_rechooses() {
        let (mut world, zone) = repair_world();
        let conduit = world
            .add_facility(zone, FacilityKind::Conduit, Position::new(5, 5))
            .unwrap();
        if let Some(f) = world.facility_mut(conduit) {
            // One Work module restores 100 per tick; two ticks to full.
            f.health.current = 4_850;
        }
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Maintainer, "m-1", Position::new(5, 6));
        memory.state = Some(TaskState::Fixing);
        memory.target = Some(conduit);
        World::set_memory(&mut world, "m-1", memory);
        let agent = world.agent_by_name("m-1").unwrap();
        fill_with_energy(&mut world, &agent);

        let memory = run_once(&Maintainer, &mut world, "m-1");
        assert_eq!(memory.state, Some(TaskState::Fixing));
        assert_eq!(memory.target, Some(conduit));

        let memory = run_once(&Maintainer, &mut world, "m-1");
        assert_eq!(memory.state, Some(TaskState::Choosing));
        assert!(memory.target.is_none());
        assert!(world.facility(conduit).unwrap().health.is_full());
    }

    #[test]
    fn fixing_without_energy_goes_harvesting() {
        let (mut world, zone) = repair_world();
        let conduit = world
            .add_facility(zone, FacilityKind::Conduit, Position::new(5, 5))
            .unwrap();
        if let Some(f) = world.facility_mut(conduit) {
            f.health.current = 100;
        }
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Maintainer, "m-1", Position::new(5, 6));
        memory.state = Some(TaskState::Fixing);
        memory.target = Some(conduit);
        World::set_memory(&mut world, "m-1", memory);

        let memory = run_once(&Maintainer, &mut world, "m-1");
        assert_eq!(memory.state, Some(TaskState::Harvesting));
    }
}
