//! Builder: gathers energy and completes construction sites.
//!
//! Sites are worked in query order; a site finishing underneath the agent
//! surfaces as `InvalidTarget` and the next tick simply re-queries. With
//! no sites open the builder idles at the rally point — and the role's
//! desired count drops to zero, so idle builders are decommissioned rather
//! than left loitering.

use tracing::warn;

use outpost_types::{
    ActionStatus, ActionVerb, Agent, AgentMemory, CapabilityModule, ModuleCatalog, ModuleEntry,
    ResourceKind, RoleKind, TaskState, ZoneId,
};
use outpost_world::World;

use super::{Role, gather, rally};

/// The builder role.
pub struct Builder;

impl Role for Builder {
    fn kind(&self) -> RoleKind {
        RoleKind::Builder
    }

    // Staff the role only while there is something to build.
    fn desired_count(&self, world: &dyn World, zone: ZoneId) -> u32 {
        if world.sites(zone).is_empty() { 0 } else { 4 }
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
        &[TaskState::Harvesting, TaskState::Building]
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
            TaskState::Building => build(agent, world),
            _ => gather(agent, memory, world, TaskState::Harvesting, TaskState::Building),
        }
    }
}

fn build(agent: &Agent, world: &mut dyn World) -> TaskState {
    if agent.stock.amount_of(ResourceKind::Energy) == 0 {
        return TaskState::Harvesting;
    }

    let site = world.sites(agent.zone).first().map(|s| s.id);
    let Some(site) = site else {
        rally(agent, world);
        return TaskState::Building;
    };

    match world.perform(agent.id, ActionVerb::Build, site, Some(ResourceKind::Energy)) {
        ActionStatus::Ok => TaskState::Building,
        ActionStatus::NotInRange => {
            world.move_toward(agent.id, site);
            TaskState::Building
        }
        ActionStatus::NotEnoughResources => TaskState::Harvesting,
        // The site completed or vanished since the query.
        ActionStatus::InvalidTarget => TaskState::Building,
        other => {
            warn!(agent = %agent.name, status = ?other, "Unhandled build status");
            TaskState::Building
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::{FacilityKind, Position};
    use outpost_world::SimWorld;

    use super::super::test_support::{fill_with_energy, run_once, spawn_member};
    use super::*;

    fn site_world() -> (SimWorld, ZoneId) {
        let mut world = SimWorld::new();
        let zone = world.add_zone("Test");
        world
            .add_facility(zone, FacilityKind::Factory, Position::new(10, 10))
            .unwrap();
        world.add_node(zone, 1_000, 1_000, 10, Position::new(2, 2)).unwrap();
        world
            .add_site(zone, FacilityKind::Capacitor, 100, Position::new(6, 6))
            .unwrap();
        (world, zone)
    }

    #[test]
    fn desired_count_tracks_open_sites() {
        let (world, zone) = site_world();
        assert_eq!(Builder.desired_count(&world, zone), 4);

        let empty = {
            let mut w = SimWorld::new();
            let z = w.add_zone("Empty");
            (w, z)
        };
        assert_eq!(Builder.desired_count(&empty.0, empty.1), 0);
    }

    #[test]
    fn builds_adjacent_site() {
        let (mut world, zone) = site_world();
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Builder, "b-1", Position::new(6, 7));
        memory.state = Some(TaskState::Building);
        World::set_memory(&mut world, "b-1", memory);
        let agent = world.agent_by_name("b-1").unwrap();
        fill_with_energy(&mut world, &agent);

        let memory = run_once(&Builder, &mut world, "b-1");
        assert_eq!(memory.state, Some(TaskState::Building));
        let site = world.sites(zone).into_iter().next().unwrap();
        assert!(site.progress > 0, "building must advance the site");
    }

    #[test]
    fn empty_stock_returns_to_harvesting() {
        let (mut world, zone) = site_world();
        let (_, mut memory) =
            spawn_member(&mut world, zone, RoleKind::Builder, "b-1", Position::new(6, 7));
        memory.state = Some(TaskState::Building);
        World::set_memory(&mut world, "b-1", memory);

        let memory = run_once(&Builder, &mut world, "b-1");
        assert_eq!(memory.state, Some(TaskState::Harvesting));
    }
}
