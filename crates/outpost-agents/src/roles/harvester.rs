//! Harvester: gathers energy and delivers it to budget and defense
//! facilities.
//!
//! Two states. `Harvesting` fills the stock from the persisted source
//! node; `Delivering` ranks every facility with free energy capacity by
//! the delivery priority list and tops up the best candidate. An empty
//! delivery board sends the agent to the rally point while it keeps
//! re-checking every tick.

use tracing::warn;

use outpost_types::{
    ActionStatus, ActionVerb, Agent, AgentMemory, CapabilityModule, FacilityKind, ModuleCatalog,
    ModuleEntry, ResourceKind, RoleKind, TaskState, ZoneId,
};
use outpost_world::World;

use crate::selector::{Metric, rank};

use super::{Role, gather, rally};

/// Delivery priority: the production budget first, then defense, then bulk
/// storage.
pub const DELIVERY_PRIORITY: [FacilityKind; 5] = [
    FacilityKind::Factory,
    FacilityKind::Capacitor,
    FacilityKind::Turret,
    FacilityKind::Storehouse,
    FacilityKind::Cache,
];

/// The harvester role.
pub struct Harvester;

impl Role for Harvester {
    fn kind(&self) -> RoleKind {
        RoleKind::Harvester
    }

    // Always keep the energy loop staffed.
    fn desired_count(&self, _world: &dyn World, _zone: ZoneId) -> u32 {
        4
    }

    fn catalog(&self) -> ModuleCatalog {
        ModuleCatalog::new(vec![
            ModuleEntry::new(CapabilityModule::Move, 50, 30),
            ModuleEntry {
                module: CapabilityModule::Work,
                unit_cost: 100,
                budget_share_pct: 20,
                per_agent_limit: None,
                // Extra actuation always brings its own mobility.
                companion: Some(CapabilityModule::Move),
            },
            ModuleEntry::new(CapabilityModule::Carry, 50, 50),
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
        &[TaskState::Harvesting, TaskState::Delivering]
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
            TaskState::Delivering => deliver(agent, world),
            // Validated states only reach here; everything else gathers.
            _ => gather(agent, memory, world, TaskState::Harvesting, TaskState::Delivering),
        }
    }
}

fn deliver(agent: &Agent, world: &mut dyn World) -> TaskState {
    let candidates: Vec<_> = world
        .facilities(agent.zone)
        .into_iter()
        .filter(|f| DELIVERY_PRIORITY.contains(&f.kind) && f.free_energy_capacity() > 0)
        .collect();
    let ranked = rank(candidates, &DELIVERY_PRIORITY, Metric::FillDescending);

    let Some(target) = ranked.first() else {
        rally(agent, world);
        return TaskState::Delivering;
    };

    match world.perform(
        agent.id,
        ActionVerb::Transfer,
        target.id,
        Some(ResourceKind::Energy),
    ) {
        ActionStatus::Ok => TaskState::Harvesting,
        ActionStatus::NotInRange => {
            world.move_toward(agent.id, target.id);
            TaskState::Delivering
        }
        // Cargo exhausted: go refill.
        ActionStatus::NotEnoughResources => TaskState::Harvesting,
        // Destination filled or vanished since the query; re-rank next tick.
        ActionStatus::Full | ActionStatus::InvalidTarget => TaskState::Delivering,
        other => {
            warn!(agent = %agent.name, status = ?other, "Unhandled delivery status");
            TaskState::Delivering
        }
    }
}
